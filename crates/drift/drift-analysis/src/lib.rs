//! Drift analysis: multi-strategy pattern matching, confidence scoring,
//! match aggregation, and the pattern audit engine.

pub mod enforcement;
pub mod matcher;
pub mod patterns;
