//! Confidence scorer construction errors.

use super::error_code::{self, DriftErrorCode};

/// Fatal errors raised while constructing a confidence scorer.
#[derive(Debug, thiserror::Error)]
pub enum ConfidenceError {
    #[error("Confidence weights must sum to 1.0 (±{tolerance}), got {sum}")]
    InvalidWeights { sum: f64, tolerance: f64 },

    #[error("Invalid age normalization: {message}")]
    InvalidAgeNormalization { message: String },
}

impl DriftErrorCode for ConfidenceError {
    fn error_code(&self) -> &'static str {
        error_code::CONFIDENCE_ERROR
    }
}
