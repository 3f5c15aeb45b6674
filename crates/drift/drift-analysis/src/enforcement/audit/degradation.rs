//! Degradation detection: compares an audit against its predecessor.

use std::collections::BTreeSet;

use drift_core::config::StorageConfig;
use drift_core::constants::{
    DEFAULT_CONFIDENCE_CRITICAL_DROP, DEFAULT_CONFIDENCE_WARNING_DROP,
    DEFAULT_FALSE_POSITIVE_GROWTH_RATIO, DEFAULT_FALSE_POSITIVE_MIN_INCREASE,
    DEFAULT_HEALTH_CRITICAL_DROP, DEFAULT_HEALTH_WARNING_DROP, DEFAULT_TREND_STABILITY_BAND,
};

use super::types::{
    AlertSeverity, AlertType, AuditResult, DegradationAlert, DegradationResult, TrendDirection,
};

/// Thresholds for degradation alerts and the trend band.
#[derive(Debug, Clone, PartialEq)]
pub struct DegradationConfig {
    /// Health drop (points) that raises a warning.
    pub health_warning_drop: f64,
    /// Health drop (points) that raises a critical alert.
    pub health_critical_drop: f64,
    pub confidence_warning_drop: f64,
    pub confidence_critical_drop: f64,
    /// Health deltas within ±band are stable.
    pub trend_stability_band: f64,
    pub false_positive_min_increase: usize,
    pub false_positive_growth_ratio: f64,
}

impl Default for DegradationConfig {
    fn default() -> Self {
        Self {
            health_warning_drop: DEFAULT_HEALTH_WARNING_DROP,
            health_critical_drop: DEFAULT_HEALTH_CRITICAL_DROP,
            confidence_warning_drop: DEFAULT_CONFIDENCE_WARNING_DROP,
            confidence_critical_drop: DEFAULT_CONFIDENCE_CRITICAL_DROP,
            trend_stability_band: DEFAULT_TREND_STABILITY_BAND,
            false_positive_min_increase: DEFAULT_FALSE_POSITIVE_MIN_INCREASE,
            false_positive_growth_ratio: DEFAULT_FALSE_POSITIVE_GROWTH_RATIO,
        }
    }
}

impl From<&StorageConfig> for DegradationConfig {
    fn from(config: &StorageConfig) -> Self {
        Self {
            health_warning_drop: config.effective_health_warning_drop(),
            health_critical_drop: config.effective_health_critical_drop(),
            confidence_warning_drop: config.effective_confidence_warning_drop(),
            confidence_critical_drop: config.effective_confidence_critical_drop(),
            trend_stability_band: config.effective_trend_stability_band(),
            false_positive_min_increase: config.effective_false_positive_min_increase(),
            false_positive_growth_ratio: config.effective_false_positive_growth_ratio(),
        }
    }
}

/// Degradation detector: diffs two audit results.
pub struct DegradationDetector {
    config: DegradationConfig,
}

impl DegradationDetector {
    pub fn new(config: DegradationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DegradationConfig {
        &self.config
    }

    pub fn compare(&self, current: &AuditResult, previous: &AuditResult) -> DegradationResult {
        let cur = &current.summary;
        let prev = &previous.summary;

        let health_delta = cur.health_score - prev.health_score;
        let confidence_delta = cur.avg_confidence - prev.avg_confidence;

        let current_issues = issue_messages(current);
        let previous_issues = issue_messages(previous);

        let mut alerts = Vec::new();
        self.health_alert(cur.health_score, prev.health_score, health_delta, &mut alerts);
        self.confidence_alert(cur.avg_confidence, prev.avg_confidence, confidence_delta, &mut alerts);
        self.false_positive_alert(cur.likely_false_positives, prev.likely_false_positives, &mut alerts);

        DegradationResult {
            health_score_delta: health_delta,
            confidence_delta,
            pattern_count_delta: cur.total_patterns as i64 - prev.total_patterns as i64,
            new_issues: current_issues.difference(&previous_issues).map(|s| s.to_string()).collect(),
            resolved_issues: previous_issues.difference(&current_issues).map(|s| s.to_string()).collect(),
            trend: self.trend(health_delta),
            alerts,
        }
    }

    fn trend(&self, health_delta: f64) -> TrendDirection {
        if health_delta > self.config.trend_stability_band {
            TrendDirection::Improving
        } else if health_delta < -self.config.trend_stability_band {
            TrendDirection::Declining
        } else {
            TrendDirection::Stable
        }
    }

    fn health_alert(&self, current: f64, previous: f64, delta: f64, alerts: &mut Vec<DegradationAlert>) {
        let (severity, message) = if delta <= -self.config.health_critical_drop {
            (
                AlertSeverity::Critical,
                format!("Critical health regression: {previous:.1} → {current:.1} ({delta:+.1} points)"),
            )
        } else if delta <= -self.config.health_warning_drop {
            (
                AlertSeverity::Warning,
                format!("Health score declining: {previous:.1} → {current:.1} ({delta:+.1} points)"),
            )
        } else {
            return;
        };
        alerts.push(DegradationAlert {
            alert_type: AlertType::HealthDrop,
            severity,
            message,
            current_value: current,
            previous_value: previous,
            delta,
        });
    }

    fn confidence_alert(&self, current: f64, previous: f64, delta: f64, alerts: &mut Vec<DegradationAlert>) {
        let (severity, message) = if delta <= -self.config.confidence_critical_drop {
            (
                AlertSeverity::Critical,
                format!("Critical confidence drop: {previous:.2} → {current:.2}"),
            )
        } else if delta <= -self.config.confidence_warning_drop {
            (
                AlertSeverity::Warning,
                format!("Confidence declining: {previous:.2} → {current:.2}"),
            )
        } else {
            return;
        };
        alerts.push(DegradationAlert {
            alert_type: AlertType::ConfidenceDrop,
            severity,
            message,
            current_value: current,
            previous_value: previous,
            delta,
        });
    }

    /// Raised when the count grows by at least the minimum increase and by
    /// the growth ratio (any growth from zero counts).
    fn false_positive_alert(&self, current: usize, previous: usize, alerts: &mut Vec<DegradationAlert>) {
        let increase = current.saturating_sub(previous);
        if increase == 0 || increase < self.config.false_positive_min_increase {
            return;
        }
        if previous > 0 && (current as f64 / previous as f64) < self.config.false_positive_growth_ratio {
            return;
        }
        alerts.push(DegradationAlert {
            alert_type: AlertType::NewFalsePositives,
            severity: AlertSeverity::Warning,
            message: format!("Likely false positives rose from {previous} to {current}"),
            current_value: current as f64,
            previous_value: previous as f64,
            delta: increase as f64,
        });
    }
}

impl Default for DegradationDetector {
    fn default() -> Self {
        Self::new(DegradationConfig::default())
    }
}

fn issue_messages(audit: &AuditResult) -> BTreeSet<&str> {
    audit
        .cross_validation
        .issues
        .iter()
        .map(|i| i.message.as_str())
        .collect()
}
