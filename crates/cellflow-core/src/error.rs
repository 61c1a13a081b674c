//! Error taxonomy. `Direction::Dirty` is a classification, never an error.
use thiserror::Error;

/// Cell polygon rejected before any clipping is attempted.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    #[error("polygon ring has {0} distinct vertices, need at least 3")]
    TooFewVertices(usize),
    #[error("polygon vertex {index} has a non-finite coordinate")]
    NonFinite { index: usize },
    #[error("polygon ring self-intersects between segments {first} and {second}")]
    SelfIntersecting { first: usize, second: usize },
    #[error("polygon ring has zero area")]
    ZeroArea,
}

/// Raster source could not be constructed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RasterError {
    #[error("raster has zero size ({width}x{height})")]
    ZeroSize { width: usize, height: usize },
    #[error("raster data length {actual} does not match {width}x{height}")]
    DataLength { width: usize, height: usize, actual: usize },
    #[error("invalid geotransform: {0}")]
    Transform(&'static str),
}

/// Clipping a polygon against the raster produced no usable pixels.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClipError {
    #[error("polygon does not overlap the raster extent")]
    NoOverlap,
    #[error("no valid raster pixel centre lies inside the polygon ({rows}x{cols} window)")]
    EmptyMask { rows: usize, cols: usize },
    #[error("clipped grid has no valid cells")]
    EmptyGrid,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("cell size must be finite and positive, got {0}")]
    CellSize(f64),
}

/// Anything that stops a single cell from being classified.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FlowError {
    #[error("invalid cell geometry: {0}")]
    Geometry(#[from] GeometryError),
    #[error("clip failed: {0}")]
    Clip(#[from] ClipError),
    #[error("invalid classifier config: {0}")]
    Config(#[from] ConfigError),
}
