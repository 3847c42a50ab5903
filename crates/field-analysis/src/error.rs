//! Error types for the analysis passes.

use thiserror::Error;

/// Errors that can occur during isoline extraction and extrema detection.
///
/// Degenerate inputs (flat fields, all-NaN grids, grids smaller than the
/// classification window) are not errors; they produce empty outputs.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Invalid analysis configuration.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// Failed to read a config file from disk.
    #[error("failed to read config file {path}: {source}")]
    ConfigIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse a config document.
    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] serde_json::Error),

    /// A transfer buffer does not match the expected flat layout.
    #[error("invalid transfer buffer: {0}")]
    TransferLayout(String),

    /// Invalid input shape from the sampling layer.
    #[error(transparent)]
    Field(#[from] fields_common::FieldError),
}

impl AnalysisError {
    /// Create an InvalidConfig error.
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create a TransferLayout error.
    pub fn transfer_layout(msg: impl Into<String>) -> Self {
        Self::TransferLayout(msg.into())
    }
}

/// Result type for analysis operations.
pub type Result<T> = std::result::Result<T, AnalysisError>;
