//! Classifier parameters.
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Nominal side length of a hydrological grid cell, in georeferenced units
/// (1/16 degree).
pub const DEFAULT_CELL_SIZE: f64 = 0.0625;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Cell side length; neighbour regions are offset by half of it.
    pub cell_size: f64,
    /// Reproduce the reference tool's index handling: the clean-exit test
    /// checks both axes against (0, H-1, W-1), and the neighbour quadrant
    /// takes its vertical half from the column and its horizontal half from
    /// the row. The NW corner also bends to N on a NE neighbour instead of a
    /// NW one.
    pub reference_compat: bool,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            cell_size: DEFAULT_CELL_SIZE,
            reference_compat: false,
        }
    }
}

impl ClassifierConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.cell_size.is_finite() && self.cell_size > 0.0) {
            return Err(ConfigError::CellSize(self.cell_size));
        }
        Ok(())
    }
}
