//! Direction resolution: clip → pour point → naive sector → corner check.
//!
//! Each stage is a plain function of the previous stage's output;
//! [`classify`] chains them and [`GridCell`] caches the result.
use serde::Serialize;

use crate::config::ClassifierConfig;
use crate::direction::{Diagonal, Direction};
use crate::error::FlowError;
use crate::geometry::CellPolygon;
use crate::grid::{locate_pour_point, PourPoint};
use crate::neighbor::evaluate_neighbor;
use crate::raster::RasterSource;
use crate::sector::{naive_direction, NaiveDirection};

/// Combine a cell's diagonal exit with the quadrant its neighbour region
/// drains through. Pairs not listed keep the diagonal.
///
/// The NW row bends to N when the neighbour drains NW. With
/// `reference_compat` it bends to N on a NE neighbour instead, as the
/// reference tool does.
pub fn disambiguate(current: Diagonal, neighbor: Diagonal, reference_compat: bool) -> Direction {
    use Diagonal as D;
    match (current, neighbor) {
        (D::NE, D::NW) => Direction::N,
        (D::NE, D::SE) => Direction::E,
        (D::SE, D::NE) => Direction::E,
        (D::SE, D::SW) => Direction::S,
        (D::SW, D::NW) => Direction::W,
        (D::SW, D::SE) => Direction::S,
        (D::NW, D::NW) if !reference_compat => Direction::N,
        (D::NW, D::NE) if reference_compat => Direction::N,
        (D::NW, D::SW) => Direction::W,
        (current, _) => current.into(),
    }
}

/// Intermediate values of one classification, kept for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub pour_point: PourPoint,
    /// (rows, cols) of the clipped cell grid.
    pub shape: (usize, usize),
    pub naive: Direction,
    /// Quadrant of the neighbour region; only set for diagonal naive results.
    pub neighbor: Option<Diagonal>,
    pub direction: Direction,
}

/// Classify one cell polygon against `raster`.
pub fn classify<R: RasterSource + ?Sized>(
    polygon: &CellPolygon,
    raster: &R,
    config: &ClassifierConfig,
) -> Result<Classification, FlowError> {
    config.validate()?;

    let grid = raster.clip(polygon)?;
    let pour_point = locate_pour_point(&grid)?;
    let (rows, cols) = grid.shape();
    let naive = naive_direction(rows, cols, pour_point, config.reference_compat);

    let (neighbor, direction) = match naive {
        NaiveDirection::Terminal(d) => (None, d),
        NaiveDirection::CornerCheck(corner) => {
            let quadrant =
                evaluate_neighbor(polygon, corner, raster, config.cell_size, config.reference_compat)?;
            (Some(quadrant), disambiguate(corner, quadrant, config.reference_compat))
        }
    };

    tracing::debug!(
        row = pour_point.row,
        col = pour_point.col,
        rows,
        cols,
        naive = %naive.direction(),
        %direction,
        "classified cell"
    );

    Ok(Classification {
        pour_point,
        shape: (rows, cols),
        naive: naive.direction(),
        neighbor,
        direction,
    })
}

/// One hydrological grid cell with its direction computed at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct GridCell<I> {
    id: I,
    polygon: CellPolygon,
    cell_size: f64,
    classification: Classification,
}

impl<I> GridCell<I> {
    pub fn new<R: RasterSource + ?Sized>(
        id: I,
        polygon: CellPolygon,
        raster: &R,
        config: &ClassifierConfig,
    ) -> Result<Self, FlowError> {
        let classification = classify(&polygon, raster, config)?;
        Ok(Self {
            id,
            polygon,
            cell_size: config.cell_size,
            classification,
        })
    }

    /// Validate `ring` first, then classify.
    pub fn from_ring<R: RasterSource + ?Sized>(
        id: I,
        ring: Vec<(f64, f64)>,
        raster: &R,
        config: &ClassifierConfig,
    ) -> Result<Self, FlowError> {
        let polygon = CellPolygon::new(ring)?;
        Self::new(id, polygon, raster, config)
    }

    pub fn id(&self) -> &I {
        &self.id
    }

    pub fn polygon(&self) -> &CellPolygon {
        &self.polygon
    }

    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    pub fn direction(&self) -> Direction {
        self.classification.direction
    }

    pub fn classification(&self) -> &Classification {
        &self.classification
    }
}
