//! Dominant flow-exit direction of hydrological grid cells.
//!
//! A variant of the Donnel et al. (1999) pour-point classification: clip a
//! flow-accumulation raster to the cell polygon, find the pixel of maximum
//! accumulation, assign it to one of eight sectors (or `Dirty` when it is not
//! on the cell boundary), and settle diagonal results by looking at a region
//! shifted half a cell towards that corner.
pub mod config;
pub mod direction;
pub mod error;
pub mod geometry;
pub mod grid;
pub mod neighbor;
pub mod raster;
pub mod resolver;
pub mod sector;

pub use config::{ClassifierConfig, DEFAULT_CELL_SIZE};
pub use direction::{Diagonal, Direction};
pub use error::{ClipError, ConfigError, FlowError, GeometryError, RasterError};
pub use geometry::{Bounds, CellPolygon};
pub use grid::{locate_pour_point, ClippedGrid, PourPoint};
pub use raster::{FlowRaster, GeoTransform, PixelWindow, RasterSource};
pub use resolver::{classify, disambiguate, Classification, GridCell};
