//! DriftErrorCode trait for structured error codes at binding boundaries.

/// Trait for converting Drift errors to structured error codes.
/// Every error enum implements this so callers outside Rust get a stable
/// code string alongside the human-readable message.
pub trait DriftErrorCode {
    /// Returns the error code string (e.g., "DETECTION_ERROR").
    fn error_code(&self) -> &'static str;

    /// Returns the formatted error string: `[ERROR_CODE] message`.
    fn napi_string(&self) -> String
    where
        Self: std::fmt::Display,
    {
        format!("[{}] {}", self.error_code(), self)
    }
}

pub const CONFIG_ERROR: &str = "CONFIG_ERROR";
pub const DETECTION_ERROR: &str = "DETECTION_ERROR";
pub const INVALID_REGEX: &str = "INVALID_REGEX";
pub const MISSING_AST: &str = "MISSING_AST";
pub const CONFIDENCE_ERROR: &str = "CONFIDENCE_ERROR";
pub const STORAGE_ERROR: &str = "STORAGE_ERROR";
pub const STORAGE_LOCKED: &str = "STORAGE_LOCKED";
pub const SERIALIZATION_ERROR: &str = "SERIALIZATION_ERROR";
