//! Pattern matching errors.

use super::error_code::{self, DriftErrorCode};

/// Errors raised by a single match strategy. The matcher never lets these
/// fail a file: they degrade to zero matches for the (file, pattern) pair.
#[derive(Debug, thiserror::Error)]
pub enum DetectionError {
    #[error("Invalid pattern {pattern_id}: {message}")]
    InvalidPattern { pattern_id: String, message: String },

    #[error("Regex compilation failed for {pattern_id}: {message}")]
    RegexCompilationFailed { pattern_id: String, message: String },

    #[error("No parse tree available for {file} (pattern {pattern_id})")]
    MissingAst { pattern_id: String, file: String },

    #[error("Invalid glob '{glob}': {message}")]
    InvalidGlob { glob: String, message: String },
}

impl DriftErrorCode for DetectionError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::RegexCompilationFailed { .. } => error_code::INVALID_REGEX,
            Self::MissingAst { .. } => error_code::MISSING_AST,
            _ => error_code::DETECTION_ERROR,
        }
    }
}
