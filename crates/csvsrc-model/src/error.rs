//! Error types for the source model.

use thiserror::Error;

/// Errors raised while parsing model values from text.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// Header option outside `auto`, `on`, `off`.
    #[error("invalid header option '{value}' (expected auto, on or off)")]
    InvalidHeaderPolicy { value: String },

    /// Failure policy outside `skip`, `abort`.
    #[error("invalid on_error option '{value}' (expected skip or abort)")]
    InvalidFailurePolicy { value: String },
}

/// Result type for model operations.
pub type Result<T> = std::result::Result<T, ModelError>;
