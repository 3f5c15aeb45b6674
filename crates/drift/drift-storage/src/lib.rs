//! Drift storage: file-backed persistence for audit results under `.drift/audit/`.

pub mod audit;
pub mod fs;
pub mod retention;

pub use audit::{AuditStore, AuditStoreConfig};
pub use retention::{RetentionPolicy, RetentionReport};
