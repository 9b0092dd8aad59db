//! Error types for script generation and evaluation setup.

use thiserror::Error;

/// Errors from building a cut script.
#[derive(Error, Debug)]
pub enum ScadError {
    /// The reference mesh has no detected base to copy.
    #[error("reference mesh has no detectable base")]
    NoReferenceBase,

    /// Invalid script or evaluator settings.
    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    /// A detection carried a NaN or infinite coordinate.
    #[error("{0} is not a finite number")]
    NonFinite(&'static str),
}

/// Result type for script operations.
pub type Result<T> = std::result::Result<T, ScadError>;
