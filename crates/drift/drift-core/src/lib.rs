//! Drift core: errors, configuration, tracing, constants and shared collection
//! types used by the matcher, scorer, audit engine and audit store.

pub mod config;
pub mod constants;
pub mod errors;
pub mod tracing;
pub mod types;

pub use config::DriftConfig;
pub use errors::error_code::DriftErrorCode;
pub use types::collections::{FxHashMap, FxHashSet};
