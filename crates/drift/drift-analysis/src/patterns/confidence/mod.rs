//! Confidence scoring: four weighted factors (frequency, consistency, age,
//! spread) folded into a single 0-1 trust score and a level.

pub mod factors;
pub mod scorer;
pub mod types;

pub use scorer::{AgeNormalization, ConfidenceInput, ConfidenceScorer, ConfidenceWeights};
pub use types::{ConfidenceLevel, ConfidenceScore};
