//! Error types for file discovery.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while enumerating candidate files.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Input directory does not exist.
    #[error("directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    /// Directory could not be read.
    #[error("failed to read directory {path}: {source}")]
    DirectoryRead {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Result type alias for discovery operations.
pub type Result<T> = std::result::Result<T, IngestError>;
