//! Error types for base detection.

use thiserror::Error;

/// Errors that can occur during base detection.
#[derive(Error, Debug)]
pub enum DetectError {
    /// No orientation had any triangles to evaluate.
    #[error("cannot detect any base: mesh has no triangles")]
    NoGeometry,

    /// Invalid detection settings.
    #[error("invalid settings: {0}")]
    InvalidSettings(String),
}

/// Result type for detection operations.
pub type Result<T> = std::result::Result<T, DetectError>;
