//! Model validation errors.

use thiserror::Error;

/// Result type for model validation.
pub type ModelResult<T> = Result<T, ModelError>;

/// Errors raised while validating caller-supplied clip parameters.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error("Invalid shot type: {0}")]
    InvalidShotType(String),

    #[error("Invalid time range: {0}")]
    InvalidRange(String),
}

impl ModelError {
    pub fn invalid_shot_type(msg: impl Into<String>) -> Self {
        Self::InvalidShotType(msg.into())
    }

    pub fn invalid_range(msg: impl Into<String>) -> Self {
        Self::InvalidRange(msg.into())
    }
}
