//! Audit store configuration: snapshot retention and degradation thresholds.

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_CONFIDENCE_CRITICAL_DROP, DEFAULT_CONFIDENCE_WARNING_DROP,
    DEFAULT_FALSE_POSITIVE_GROWTH_RATIO, DEFAULT_FALSE_POSITIVE_MIN_INCREASE,
    DEFAULT_HEALTH_CRITICAL_DROP, DEFAULT_HEALTH_WARNING_DROP, DEFAULT_SNAPSHOT_RETENTION,
    DEFAULT_TREND_STABILITY_BAND,
};

/// Configuration for the audit store.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct StorageConfig {
    /// Maximum dated snapshots retained. Default: 30.
    pub snapshot_retention: Option<usize>,
    /// Health drop (points) raising a warning alert. Default: 5.0.
    pub health_warning_drop: Option<f64>,
    /// Health drop (points) raising a critical alert. Default: 15.0.
    pub health_critical_drop: Option<f64>,
    /// Symmetric band around zero classified as a stable trend. Default: 2.0.
    pub trend_stability_band: Option<f64>,
    /// Mean-confidence drop raising a warning alert. Default: 0.05.
    pub confidence_warning_drop: Option<f64>,
    /// Mean-confidence drop raising a critical alert. Default: 0.15.
    pub confidence_critical_drop: Option<f64>,
    /// Minimum absolute rise in likely false positives. Default: 5.
    pub false_positive_min_increase: Option<usize>,
    /// Minimum relative rise in likely false positives. Default: 1.5.
    pub false_positive_growth_ratio: Option<f64>,
}

impl StorageConfig {
    pub fn effective_snapshot_retention(&self) -> usize {
        self.snapshot_retention.unwrap_or(DEFAULT_SNAPSHOT_RETENTION)
    }

    pub fn effective_health_warning_drop(&self) -> f64 {
        self.health_warning_drop.unwrap_or(DEFAULT_HEALTH_WARNING_DROP)
    }

    pub fn effective_health_critical_drop(&self) -> f64 {
        self.health_critical_drop.unwrap_or(DEFAULT_HEALTH_CRITICAL_DROP)
    }

    pub fn effective_trend_stability_band(&self) -> f64 {
        self.trend_stability_band.unwrap_or(DEFAULT_TREND_STABILITY_BAND)
    }

    pub fn effective_confidence_warning_drop(&self) -> f64 {
        self.confidence_warning_drop
            .unwrap_or(DEFAULT_CONFIDENCE_WARNING_DROP)
    }

    pub fn effective_confidence_critical_drop(&self) -> f64 {
        self.confidence_critical_drop
            .unwrap_or(DEFAULT_CONFIDENCE_CRITICAL_DROP)
    }

    pub fn effective_false_positive_min_increase(&self) -> usize {
        self.false_positive_min_increase
            .unwrap_or(DEFAULT_FALSE_POSITIVE_MIN_INCREASE)
    }

    pub fn effective_false_positive_growth_ratio(&self) -> f64 {
        self.false_positive_growth_ratio
            .unwrap_or(DEFAULT_FALSE_POSITIVE_GROWTH_RATIO)
    }
}
