//! Centralized error handling for gridzone
//!
//! Every fallible operation in the crate returns [`Result`]. Errors raised by
//! the geometry and array layers are wrapped, not translated, so callers see
//! the original message through [`std::error::Error::source`].

use thiserror::Error;

/// Main error type for gridzone operations
#[derive(Error, Debug)]
pub enum GridZoneError {
    /// A named axis is missing from the array
    #[error("Dimension '{dim}' not found in array with dimensions {available:?}")]
    DimensionNotFound { dim: String, available: Vec<String> },

    /// A new axis would shadow an existing one
    #[error("Dimension '{dim}' already exists")]
    DimensionExists { dim: String },

    /// Coordinate labels are empty, non-numeric or of the wrong length
    #[error("Invalid coordinate for dimension '{dim}': {message}")]
    InvalidCoordinate { dim: String, message: String },

    /// Zone names and zone shapes are not paired one to one
    #[error("Got {zones} zone names but {shapes} zone shapes")]
    ZoneCountMismatch { zones: usize, shapes: usize },

    /// The same zone name was supplied twice
    #[error("Duplicate zone name '{0}'")]
    DuplicateZone(String),

    /// Geometry that cannot be used as a zone mask
    #[error("Invalid zone geometry: {0}")]
    InvalidGeometry(String),

    /// Malformed coordinate reference system descriptor
    #[error("Invalid CRS '{crs}': {reason}")]
    InvalidCrs { crs: String, reason: String },

    /// A numeric parameter outside its valid range
    #[error("Invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },

    /// Chunk specification does not tile the array
    #[error("Invalid chunks for dimension '{dim}': {message}")]
    InvalidChunks { dim: String, message: String },

    /// Arrays that must share a shape do not
    #[error("Shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    /// Thread pool configuration error
    #[error("Thread pool error: {0}")]
    ThreadPool(String),

    /// Array shape or dimension error
    #[error("Array error: {0}")]
    Array(#[from] ndarray::ShapeError),

    /// GeoJSON parsing or conversion error
    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O operation errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for gridzone operations
pub type Result<T> = std::result::Result<T, GridZoneError>;

impl GridZoneError {
    pub(crate) fn invalid_parameter(
        name: &'static str,
        value: impl ToString,
        reason: impl Into<String>,
    ) -> Self {
        GridZoneError::InvalidParameter {
            name,
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}
