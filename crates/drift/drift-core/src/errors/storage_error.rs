//! Storage-layer errors for the audit artifact store.

use super::error_code::{self, DriftErrorCode};

/// Errors that can occur while persisting or reading audit artifacts.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("I/O error on {path}: {message}")]
    Io { path: String, message: String },

    #[error("Serialization error for {path}: {message}")]
    Serialization { path: String, message: String },

    #[error("Audit store locked: {message}")]
    Locked { message: String },

    #[error("Invalid snapshot date '{value}': expected YYYY-MM-DD")]
    InvalidSnapshotDate { value: String },
}

impl StorageError {
    /// Build an I/O error tagged with the path being accessed.
    pub fn io(path: &std::path::Path, err: std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            message: err.to_string(),
        }
    }

    /// Build a serialization error tagged with the artifact path.
    pub fn serialization(path: &std::path::Path, err: impl std::fmt::Display) -> Self {
        Self::Serialization {
            path: path.display().to_string(),
            message: err.to_string(),
        }
    }
}

impl DriftErrorCode for StorageError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Locked { .. } => error_code::STORAGE_LOCKED,
            Self::Serialization { .. } => error_code::SERIALIZATION_ERROR,
            _ => error_code::STORAGE_ERROR,
        }
    }
}
