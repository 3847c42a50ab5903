//! Error types for the weather-fields core.

use thiserror::Error;

/// Result type alias using FieldError.
pub type FieldResult<T> = Result<T, FieldError>;

/// Primary error type for field decoding and sampling operations.
///
/// Invalid input shape and unsupported encodings fail fast with one of
/// these variants. No-data pixels and out-of-range samples are *values*
/// (NaN results, omitted features), never errors.
#[derive(Debug, Error)]
pub enum FieldError {
    #[error("invalid raster shape: {len} values cannot tile a {width}x{height} grid")]
    InvalidShape {
        len: usize,
        width: usize,
        height: usize,
    },

    #[error("unsupported band count: {bands} ({message})")]
    UnsupportedBands { bands: usize, message: String },

    #[error("unsupported encoding: {0}")]
    UnsupportedEncoding(String),

    #[error("snapshot mismatch: {0}")]
    SnapshotMismatch(String),

    #[error("invalid parameter value for '{param}': {message}")]
    InvalidParameter { param: String, message: String },
}

impl FieldError {
    /// Create an InvalidShape error.
    pub fn invalid_shape(len: usize, width: usize, height: usize) -> Self {
        Self::InvalidShape { len, width, height }
    }

    /// Create an UnsupportedBands error.
    pub fn unsupported_bands(bands: usize, message: impl Into<String>) -> Self {
        Self::UnsupportedBands {
            bands,
            message: message.into(),
        }
    }

    /// Create a SnapshotMismatch error.
    pub fn snapshot_mismatch(message: impl Into<String>) -> Self {
        Self::SnapshotMismatch(message.into())
    }

    /// Create an InvalidParameter error.
    pub fn invalid_parameter(param: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            param: param.into(),
            message: message.into(),
        }
    }
}
