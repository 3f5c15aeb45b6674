//! Configuration system for Drift.
//! TOML-based, layered resolution: overrides > env > project > user > defaults.

pub mod audit_config;
pub mod confidence_config;
pub mod drift_config;
pub mod matcher_config;
pub mod storage_config;

pub use audit_config::AuditConfig;
pub use confidence_config::ConfidenceConfig;
pub use drift_config::{ConfigOverrides, DriftConfig};
pub use matcher_config::MatcherConfig;
pub use storage_config::StorageConfig;
