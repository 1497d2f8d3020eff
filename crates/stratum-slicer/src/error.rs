//! Error types for the slicer.

use stratum_geom2d::GeomError;
use thiserror::Error;

/// Errors that can occur during slicing.
///
/// Cached stage results hold these by value, so the type is `Clone`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SlicerError {
    /// Invalid slice settings.
    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    /// A 2D kernel operation failed.
    #[error("geometry error: {0}")]
    Geometry(#[from] GeomError),

    /// Fill generation failed for one layer.
    #[error("fill generation failed on layer {layer}: {source}")]
    FillFailed {
        /// Global layer index.
        layer: usize,
        /// Kernel error.
        source: GeomError,
    },
}

/// Result type for slicer operations.
pub type Result<T> = std::result::Result<T, SlicerError>;
