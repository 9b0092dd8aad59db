//! Error types for mesh loading.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading or encoding meshes.
#[derive(Error, Debug)]
pub enum MeshError {
    /// The file could not be read.
    #[error("failed to read {path}: {source}")]
    IoRead {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The file could not be written.
    #[error("failed to write {path}: {source}")]
    IoWrite {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The file extension is not a supported mesh format.
    #[error("unsupported mesh format: {}", extension.as_deref().unwrap_or("<none>"))]
    UnsupportedFormat {
        /// The offending extension, if any.
        extension: Option<String>,
    },

    /// The bytes are not a valid STL file.
    #[error("failed to parse STL: {0}")]
    Parse(String),

    /// STL encoding failed.
    #[error("failed to encode STL: {0}")]
    Encode(#[source] std::io::Error),
}

/// Result type for mesh operations.
pub type Result<T> = std::result::Result<T, MeshError>;
