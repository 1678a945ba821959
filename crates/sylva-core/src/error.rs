//! Error types for snapshot loading.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors raised while reading host-supplied data.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The snapshot file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The snapshot is not valid JSON or does not match the schema.
    #[error("malformed snapshot: {0}")]
    Json(#[from] serde_json::Error),

    /// The snapshot parsed but contradicts itself.
    #[error("invalid snapshot: {0}")]
    InvalidSnapshot(String),
}
