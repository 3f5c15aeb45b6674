//! Pattern model, confidence scoring and match aggregation.

pub mod aggregation;
pub mod confidence;
pub mod types;

pub use types::{Pattern, PatternLocation, PatternMetadata, PatternStatus};
