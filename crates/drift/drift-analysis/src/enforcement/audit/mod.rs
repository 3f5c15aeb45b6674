//! Pattern audit: duplicate detection, cross-validation, recommendations,
//! health scoring, degradation comparison and trend tracking.

pub mod auto_approve;
pub mod cross_validation;
pub mod deduplication;
pub mod degradation;
pub mod engine;
pub mod health_scorer;
pub mod trends;
pub mod types;

pub use auto_approve::AutoApprover;
pub use cross_validation::{AuditContext, CallGraphIndex, ConstraintRef, CrossValidator};
pub use deduplication::DuplicateDetector;
pub use degradation::{DegradationConfig, DegradationDetector};
pub use engine::{scan_hash, AuditEngine, AuditEngineConfig};
pub use health_scorer::HealthScorer;
pub use trends::TrendAnalyzer;
pub use types::*;
