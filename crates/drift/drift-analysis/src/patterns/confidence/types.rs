//! Core types for confidence scoring.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Score at or above which a pattern is `High`.
pub const HIGH_THRESHOLD: f64 = 0.85;
/// Score at or above which a pattern is `Medium`.
pub const MEDIUM_THRESHOLD: f64 = 0.70;
/// Score at or above which a pattern is `Low`.
pub const LOW_THRESHOLD: f64 = 0.50;

/// A fully computed confidence score. Recomputed as a whole, never patched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfidenceScore {
    pub frequency: f64,
    pub consistency: f64,
    pub age_factor: f64,
    pub spread: f64,
    /// Raw input behind `age_factor`.
    pub age_days: f64,
    /// Raw input behind `spread`.
    pub file_count: u64,
    pub total_files: u64,
    /// Weighted composite in [0, 1].
    pub score: f64,
    pub level: ConfidenceLevel,
}

impl ConfidenceScore {
    /// A score known only by its composite value, with no factor breakdown.
    pub fn from_value(score: f64) -> Self {
        let score = if score.is_finite() { score.clamp(0.0, 1.0) } else { 0.0 };
        Self {
            frequency: 0.0,
            consistency: 0.0,
            age_factor: 0.0,
            spread: 0.0,
            age_days: 0.0,
            file_count: 0,
            total_files: 0,
            score,
            level: ConfidenceLevel::from_score(score),
        }
    }
}

/// Graduated confidence levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceLevel {
    /// score ≥ 0.85
    High,
    /// score ≥ 0.70
    Medium,
    /// score ≥ 0.50
    Low,
    Uncertain,
}

impl ConfidenceLevel {
    pub fn from_score(score: f64) -> Self {
        if score >= HIGH_THRESHOLD {
            Self::High
        } else if score >= MEDIUM_THRESHOLD {
            Self::Medium
        } else if score >= LOW_THRESHOLD {
            Self::Low
        } else {
            Self::Uncertain
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
            Self::Uncertain => "uncertain",
        }
    }
}

impl fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
