//! Error types for the estimation pipeline.
//!
//! Only caller contract violations end up here. Malformed entities and
//! rejected polygons are counted in the stage results instead.

use thiserror::Error;

/// Result type alias for estimation operations.
pub type EstimateResult<T> = Result<T, EstimateError>;

#[derive(Debug, Error, PartialEq)]
pub enum EstimateError {
    /// Total area was negative, NaN or infinite.
    #[error("invalid area input: {0} (must be finite and non-negative)")]
    InvalidAreaInput(f64),

    /// Wall length was negative, NaN or infinite.
    #[error("invalid wall length: {0} (must be finite and non-negative)")]
    InvalidWallLength(f64),

    #[error("invalid wall spec: {0}")]
    InvalidWallSpec(String),

    /// Material profile failed validation.
    #[error("invalid material profile: {0}")]
    InvalidProfile(String),

    #[error("drawing has {count} entities, maximum allowed is {max}")]
    TooManyEntities { count: usize, max: usize },

    #[error("drawing has {count} vertices, maximum allowed is {max}")]
    TooManyVertices { count: usize, max: usize },
}

impl EstimateError {
    #[must_use]
    pub fn invalid_profile(details: impl Into<String>) -> Self {
        Self::InvalidProfile(details.into())
    }

    #[must_use]
    pub fn invalid_wall_spec(details: impl Into<String>) -> Self {
        Self::InvalidWallSpec(details.into())
    }

    /// Stable upper-snake code for API responses.
    pub fn code(&self) -> &'static str {
        match self {
            EstimateError::InvalidAreaInput(_) => "INVALID_AREA",
            EstimateError::InvalidWallLength(_) => "INVALID_WALL_LENGTH",
            EstimateError::InvalidWallSpec(_) => "INVALID_WALL_SPEC",
            EstimateError::InvalidProfile(_) => "INVALID_PROFILE",
            EstimateError::TooManyEntities { .. } | EstimateError::TooManyVertices { .. } => {
                "INPUT_TOO_LARGE"
            }
        }
    }
}
