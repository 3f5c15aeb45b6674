//! Weighted four-factor confidence scorer.

use serde::{Deserialize, Serialize};

use drift_core::config::ConfidenceConfig;
use drift_core::constants::{
    DEFAULT_MAX_AGE_DAYS, DEFAULT_MIN_AGE_FACTOR, DEFAULT_WEIGHT_AGE, DEFAULT_WEIGHT_CONSISTENCY,
    DEFAULT_WEIGHT_FREQUENCY, DEFAULT_WEIGHT_SPREAD, WEIGHT_SUM_TOLERANCE,
};
use drift_core::errors::ConfidenceError;

use super::factors;
use super::types::{ConfidenceLevel, ConfidenceScore};

/// Factor weights. Must sum to 1.0 within `WEIGHT_SUM_TOLERANCE`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceWeights {
    pub frequency: f64,
    pub consistency: f64,
    pub age: f64,
    pub spread: f64,
}

impl ConfidenceWeights {
    pub fn sum(&self) -> f64 {
        self.frequency + self.consistency + self.age + self.spread
    }

    pub fn validate(&self) -> Result<(), ConfidenceError> {
        let sum = self.sum();
        // Written so NaN fails too.
        if !((sum - 1.0).abs() <= WEIGHT_SUM_TOLERANCE) {
            return Err(ConfidenceError::InvalidWeights {
                sum,
                tolerance: WEIGHT_SUM_TOLERANCE,
            });
        }
        Ok(())
    }
}

impl Default for ConfidenceWeights {
    fn default() -> Self {
        Self {
            frequency: DEFAULT_WEIGHT_FREQUENCY,
            consistency: DEFAULT_WEIGHT_CONSISTENCY,
            age: DEFAULT_WEIGHT_AGE,
            spread: DEFAULT_WEIGHT_SPREAD,
        }
    }
}

impl From<&ConfidenceConfig> for ConfidenceWeights {
    fn from(config: &ConfidenceConfig) -> Self {
        Self {
            frequency: config.effective_weight_frequency(),
            consistency: config.effective_weight_consistency(),
            age: config.effective_weight_age(),
            spread: config.effective_weight_spread(),
        }
    }
}

/// Age ramp: `min_age_factor` at day zero, 1.0 from `max_age_days` on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AgeNormalization {
    pub min_age_factor: f64,
    pub max_age_days: f64,
}

impl AgeNormalization {
    pub fn validate(&self) -> Result<(), ConfidenceError> {
        if !(0.0..=1.0).contains(&self.min_age_factor) {
            return Err(ConfidenceError::InvalidAgeNormalization {
                message: format!("min_age_factor must be in [0, 1], got {}", self.min_age_factor),
            });
        }
        if !(self.max_age_days > 0.0) {
            return Err(ConfidenceError::InvalidAgeNormalization {
                message: format!("max_age_days must be positive, got {}", self.max_age_days),
            });
        }
        Ok(())
    }
}

impl Default for AgeNormalization {
    fn default() -> Self {
        Self {
            min_age_factor: DEFAULT_MIN_AGE_FACTOR,
            max_age_days: DEFAULT_MAX_AGE_DAYS,
        }
    }
}

impl From<&ConfidenceConfig> for AgeNormalization {
    fn from(config: &ConfidenceConfig) -> Self {
        Self {
            min_age_factor: config.effective_min_age_factor(),
            max_age_days: config.effective_max_age_days(),
        }
    }
}

/// Aggregate observation statistics for one pattern.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceInput {
    pub occurrences: u64,
    pub total_locations: u64,
    /// Variance of per-location confidence (0 = perfectly consistent).
    pub variance: f64,
    pub days_since_first_seen: f64,
    pub file_count: u64,
    pub total_files: u64,
}

/// Pure scorer. Construction validates the weights once.
#[derive(Debug, Clone, Copy)]
pub struct ConfidenceScorer {
    weights: ConfidenceWeights,
    age: AgeNormalization,
}

impl ConfidenceScorer {
    /// Fails if the weights do not sum to 1.0 or the age ramp is degenerate.
    pub fn new(weights: ConfidenceWeights, age: AgeNormalization) -> Result<Self, ConfidenceError> {
        weights.validate()?;
        age.validate()?;
        Ok(Self { weights, age })
    }

    pub fn from_config(config: &ConfidenceConfig) -> Result<Self, ConfidenceError> {
        Self::new(ConfidenceWeights::from(config), AgeNormalization::from(config))
    }

    pub fn weights(&self) -> &ConfidenceWeights {
        &self.weights
    }

    pub fn calculate_confidence(&self, input: &ConfidenceInput) -> ConfidenceScore {
        let frequency = factors::frequency(input.occurrences, input.total_locations);
        let consistency = factors::consistency(input.variance);
        let age_factor = factors::age(
            input.days_since_first_seen,
            self.age.min_age_factor,
            self.age.max_age_days,
        );
        let spread = factors::spread(input.file_count, input.total_files);

        let score = (frequency * self.weights.frequency
            + consistency * self.weights.consistency
            + age_factor * self.weights.age
            + spread * self.weights.spread)
            .clamp(0.0, 1.0);

        ConfidenceScore {
            frequency,
            consistency,
            age_factor,
            spread,
            age_days: input.days_since_first_seen.max(0.0),
            file_count: input.file_count,
            total_files: input.total_files,
            score,
            level: Self::classify_level(score),
        }
    }

    pub fn classify_level(score: f64) -> ConfidenceLevel {
        ConfidenceLevel::from_score(score)
    }
}

impl Default for ConfidenceScorer {
    fn default() -> Self {
        Self {
            weights: ConfidenceWeights::default(),
            age: AgeNormalization::default(),
        }
    }
}
