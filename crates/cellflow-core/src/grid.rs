//! Clipped flow-accumulation grids and pour-point location.
use serde::{Deserialize, Serialize};

use crate::error::ClipError;

/// Row-major window of flow-accumulation values cut out of a raster.
/// `None` marks pixels masked out by the clip polygon or nodata.
#[derive(Debug, Clone, PartialEq)]
pub struct ClippedGrid {
    cells: Vec<Option<f32>>,
    pub width: usize,
    pub height: usize,
}

impl ClippedGrid {
    /// Build from row-major cells. Fails if the shape is empty or the length
    /// does not match.
    pub fn new(width: usize, height: usize, cells: Vec<Option<f32>>) -> Result<Self, ClipError> {
        if width == 0 || height == 0 || cells.len() != width * height {
            return Err(ClipError::EmptyGrid);
        }
        Ok(Self { cells, width, height })
    }

    /// Fully unmasked grid from nested rows. Rows must share one length.
    pub fn from_rows(rows: &[&[f32]]) -> Result<Self, ClipError> {
        let height = rows.len();
        let width = rows.first().map_or(0, |r| r.len());
        if rows.iter().any(|r| r.len() != width) {
            return Err(ClipError::EmptyGrid);
        }
        let cells = rows.iter().flat_map(|r| r.iter().map(|&v| Some(v))).collect();
        Self::new(width, height, cells)
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Option<f32> {
        self.cells[row * self.width + col]
    }

    /// (rows, cols)
    pub fn shape(&self) -> (usize, usize) {
        (self.height, self.width)
    }

    pub fn valid_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    pub fn max_value(&self) -> Option<f32> {
        self.cells.iter().flatten().cloned().reduce(f32::max)
    }
}

/// Pixel through which accumulated flow leaves a clipped region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PourPoint {
    pub row: usize,
    pub col: usize,
}

/// Locate the maximum-valued cell. Ties resolve to the first match in
/// row-major order (lowest row, then lowest column); masked cells are skipped.
pub fn locate_pour_point(grid: &ClippedGrid) -> Result<PourPoint, ClipError> {
    let mut best: Option<(f32, usize)> = None;
    for (i, cell) in grid.cells.iter().enumerate() {
        let Some(v) = *cell else { continue };
        if v.is_nan() {
            continue;
        }
        // Strict comparison keeps the earliest index among equal maxima.
        if best.map_or(true, |(b, _)| v > b) {
            best = Some((v, i));
        }
    }
    let (_, i) = best.ok_or(ClipError::EmptyGrid)?;
    Ok(PourPoint {
        row: i / grid.width,
        col: i % grid.width,
    })
}
