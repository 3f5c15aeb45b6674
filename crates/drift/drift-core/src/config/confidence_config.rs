//! Confidence scorer configuration.

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_MAX_AGE_DAYS, DEFAULT_MIN_AGE_FACTOR, DEFAULT_WEIGHT_AGE,
    DEFAULT_WEIGHT_CONSISTENCY, DEFAULT_WEIGHT_FREQUENCY, DEFAULT_WEIGHT_SPREAD,
};

/// Factor weights and age normalization for the confidence scorer.
/// The four effective weights must sum to 1.0.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ConfidenceConfig {
    /// Weight of the frequency factor. Default: 0.40.
    pub weight_frequency: Option<f64>,
    /// Weight of the consistency factor. Default: 0.30.
    pub weight_consistency: Option<f64>,
    /// Weight of the age factor. Default: 0.15.
    pub weight_age: Option<f64>,
    /// Weight of the spread factor. Default: 0.15.
    pub weight_spread: Option<f64>,
    /// Age factor for a pattern first seen today. Default: 0.1.
    pub min_age_factor: Option<f64>,
    /// Days until the age factor reaches 1.0. Default: 30.
    pub max_age_days: Option<f64>,
}

impl ConfidenceConfig {
    pub fn effective_weight_frequency(&self) -> f64 {
        self.weight_frequency.unwrap_or(DEFAULT_WEIGHT_FREQUENCY)
    }

    pub fn effective_weight_consistency(&self) -> f64 {
        self.weight_consistency.unwrap_or(DEFAULT_WEIGHT_CONSISTENCY)
    }

    pub fn effective_weight_age(&self) -> f64 {
        self.weight_age.unwrap_or(DEFAULT_WEIGHT_AGE)
    }

    pub fn effective_weight_spread(&self) -> f64 {
        self.weight_spread.unwrap_or(DEFAULT_WEIGHT_SPREAD)
    }

    pub fn effective_min_age_factor(&self) -> f64 {
        self.min_age_factor.unwrap_or(DEFAULT_MIN_AGE_FACTOR)
    }

    pub fn effective_max_age_days(&self) -> f64 {
        self.max_age_days.unwrap_or(DEFAULT_MAX_AGE_DAYS)
    }

    /// Sum of the four effective weights.
    pub fn weight_sum(&self) -> f64 {
        self.effective_weight_frequency()
            + self.effective_weight_consistency()
            + self.effective_weight_age()
            + self.effective_weight_spread()
    }
}
