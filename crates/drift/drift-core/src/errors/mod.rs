//! Error handling for Drift.
//! One error enum per subsystem, `thiserror` only, zero `anyhow`.

pub mod confidence_error;
pub mod config_error;
pub mod detection_error;
pub mod error_code;
pub mod storage_error;

pub use confidence_error::ConfidenceError;
pub use config_error::ConfigError;
pub use detection_error::DetectionError;
pub use error_code::DriftErrorCode;
pub use storage_error::StorageError;
