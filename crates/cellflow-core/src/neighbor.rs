//! Neighbour-region evaluation for diagonal pour points.
//!
//! The cell polygon is shifted half a cell towards the candidate corner so
//! that the new region straddles the corner. Where flow exits that region
//! tells whether the stream really continues diagonally.
use crate::direction::Diagonal;
use crate::error::ClipError;
use crate::geometry::CellPolygon;
use crate::grid::{locate_pour_point, PourPoint};
use crate::raster::RasterSource;

/// Cell polygon translated by half of `cell_size` towards `corner`.
pub fn neighbor_region(polygon: &CellPolygon, corner: Diagonal, cell_size: f64) -> CellPolygon {
    let (sx, sy) = corner.signs();
    let half = cell_size / 2.0;
    polygon.translate(sx * half, sy * half)
}

/// Coarse quadrant of a pour point in a `rows`×`cols` grid. Midpoints are
/// true halves and the comparison is inclusive, so the centre row/column
/// counts as north/west.
pub fn coarse_direction(rows: usize, cols: usize, pour: PourPoint, reference_compat: bool) -> Diagonal {
    let half_rows = rows as f64 / 2.0;
    let half_cols = cols as f64 / 2.0;
    let (row, col) = (pour.row as f64, pour.col as f64);
    if reference_compat {
        Diagonal::from_halves(col <= half_cols, row <= half_rows)
    } else {
        Diagonal::from_halves(row <= half_rows, col <= half_cols)
    }
}

/// Clip the neighbour region towards `corner` and return the quadrant its
/// flow leaves through.
pub fn evaluate_neighbor<R: RasterSource + ?Sized>(
    polygon: &CellPolygon,
    corner: Diagonal,
    raster: &R,
    cell_size: f64,
    reference_compat: bool,
) -> Result<Diagonal, ClipError> {
    let region = neighbor_region(polygon, corner, cell_size);
    let grid = raster.clip(&region)?;
    let pour = locate_pour_point(&grid)?;
    let quadrant = coarse_direction(grid.height, grid.width, pour, reference_compat);
    tracing::debug!(
        %corner,
        row = pour.row,
        col = pour.col,
        rows = grid.height,
        cols = grid.width,
        %quadrant,
        "neighbour region pour point"
    );
    Ok(quadrant)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::{FlowRaster, GeoTransform};
    use approx::assert_relative_eq;

    fn pp(row: usize, col: usize) -> PourPoint {
        PourPoint { row, col }
    }

    #[test]
    fn offsets_follow_corner() {
        let cell = CellPolygon::rect(1.0, 1.0, 1.0625, 1.0625).unwrap();
        let cases = [
            (Diagonal::NE, 1.03125, 1.03125),
            (Diagonal::SE, 1.03125, 0.96875),
            (Diagonal::SW, 0.96875, 0.96875),
            (Diagonal::NW, 0.96875, 1.03125),
        ];
        for (corner, min_x, min_y) in cases {
            let b = neighbor_region(&cell, corner, 0.0625).bounds();
            assert_relative_eq!(b.min_x, min_x);
            assert_relative_eq!(b.min_y, min_y);
            assert_relative_eq!(b.max_x - b.min_x, 0.0625);
        }
    }

    #[test]
    fn midpoint_is_inclusive() {
        // 4x4: h/2 = 2, so rows/cols 0..=2 are N/W.
        assert_eq!(coarse_direction(4, 4, pp(2, 2), false), Diagonal::NW);
        assert_eq!(coarse_direction(4, 4, pp(3, 2), false), Diagonal::SW);
        assert_eq!(coarse_direction(4, 4, pp(2, 3), false), Diagonal::NE);
        assert_eq!(coarse_direction(4, 4, pp(3, 3), false), Diagonal::SE);
    }

    #[test]
    fn odd_sizes_use_true_division() {
        // 5x5: h/2 = 2.5, row 2 is north, row 3 is south.
        assert_eq!(coarse_direction(5, 5, pp(2, 0), false), Diagonal::NW);
        assert_eq!(coarse_direction(5, 5, pp(3, 0), false), Diagonal::SW);
        assert_eq!(coarse_direction(3, 3, pp(1, 2), false), Diagonal::NE);
    }

    #[test]
    fn reference_compat_swaps_axes() {
        // Pour point in the top-right corner of a 6x6 grid.
        assert_eq!(coarse_direction(6, 6, pp(0, 5), false), Diagonal::NE);
        assert_eq!(coarse_direction(6, 6, pp(0, 5), true), Diagonal::SW);
    }

    #[test]
    fn evaluates_shifted_region() {
        // 8x8 raster with 1-unit pixels; a 4x4 cell at cols 2..6, rows 2..6.
        let mut data = vec![1.0f32; 64];
        data[7] = 90.0; // raster (0, 7)
        data[8 + 5] = 50.0; // raster (1, 5)
        data[3 * 8 + 3] = 99.0; // raster (3, 3), inside the cell only
        let raster = FlowRaster::new(8, 8, data, GeoTransform::north_up(0.0, 8.0, 1.0), None).unwrap();
        let cell = CellPolygon::rect(2.0, 2.0, 6.0, 6.0).unwrap();
        // NE shift of 2 units: x 4..8, y 4..8 -> rows 0..4, cols 4..8.
        let q = evaluate_neighbor(&cell, Diagonal::NE, &raster, 4.0, false).unwrap();
        // (0, 7) -> local (0, 3): row 0 <= 2 is N, col 3 > 2 is E.
        assert_eq!(q, Diagonal::NE);

        let q = evaluate_neighbor(&cell, Diagonal::NW, &raster, 4.0, false).unwrap();
        // NW shift: x 0..4, y 4..8 -> rows 0..4, cols 0..4; (3, 3) dominates.
        assert_eq!(q, Diagonal::SE);
    }

    #[test]
    fn neighbour_off_raster_propagates_clip_error() {
        let raster = FlowRaster::new(4, 4, vec![1.0; 16], GeoTransform::north_up(0.0, 4.0, 1.0), None).unwrap();
        let cell = CellPolygon::rect(0.0, 0.0, 4.0, 4.0).unwrap();
        let err = evaluate_neighbor(&cell, Diagonal::SW, &raster, 8.0, false).unwrap_err();
        assert_eq!(err, ClipError::NoOverlap);
    }
}
