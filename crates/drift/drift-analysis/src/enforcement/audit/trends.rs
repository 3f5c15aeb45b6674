//! Trend classification, linear-regression prediction and anomaly detection
//! over the per-date audit history.

use drift_core::constants::DEFAULT_TREND_STABILITY_BAND;

use super::types::{
    AuditAnomaly, AuditHistoryEntry, AuditTrends, DegradationTracking, PatternGrowth,
    TrendDirection, TrendPrediction,
};

/// Z-score above which the latest value is reported as anomalous.
pub const ANOMALY_Z_THRESHOLD: f64 = 2.0;

/// Window used for the recent/older rolling averages.
const WINDOW: usize = 7;

/// Trend analyzer: rolling averages over the history plus regression.
pub struct TrendAnalyzer {
    /// Half-width of the band around zero treated as stable.
    pub stability_band: f64,
}

impl TrendAnalyzer {
    pub fn new(stability_band: f64) -> Self {
        Self { stability_band }
    }

    /// Compare the recent window average against the preceding one.
    /// Short histories split in half instead.
    pub fn classify_trend(&self, scores: &[f64]) -> TrendDirection {
        classify_series(scores, self.stability_band)
    }

    /// Classify the average per-entry increase in pattern count.
    pub fn classify_growth(&self, increases: &[f64]) -> PatternGrowth {
        if increases.is_empty() {
            return PatternGrowth::Stagnant;
        }
        let avg = increases.iter().sum::<f64>() / increases.len() as f64;
        if avg > 5.0 {
            PatternGrowth::Rapid
        } else if avg < 0.5 {
            PatternGrowth::Stagnant
        } else {
            PatternGrowth::Healthy
        }
    }

    /// Least-squares line through the scores; needs at least five points.
    pub fn predict(&self, scores: &[f64]) -> Option<TrendPrediction> {
        if scores.len() < 5 {
            return None;
        }

        let n = scores.len() as f64;
        let x_mean = (n - 1.0) / 2.0;
        let y_mean = scores.iter().sum::<f64>() / n;

        let (numerator, denominator) = scores.iter().enumerate().fold((0.0, 0.0), |(num, den), (i, y)| {
            let dx = i as f64 - x_mean;
            (num + dx * (y - y_mean), den + dx * dx)
        });
        if denominator.abs() < f64::EPSILON {
            return None;
        }

        let slope = numerator / denominator;
        let intercept = y_mean - slope * x_mean;
        let last_x = n - 1.0;

        let ss_res: f64 = scores
            .iter()
            .enumerate()
            .map(|(i, y)| (y - (slope * i as f64 + intercept)).powi(2))
            .sum();
        let ss_tot: f64 = scores.iter().map(|y| (y - y_mean).powi(2)).sum();
        let r_squared = if ss_tot > 0.0 { 1.0 - ss_res / ss_tot } else { 0.0 };

        let direction = if slope > 0.1 {
            TrendDirection::Improving
        } else if slope < -0.1 {
            TrendDirection::Declining
        } else {
            TrendDirection::Stable
        };

        Some(TrendPrediction {
            predicted_score_7d: (slope * (last_x + 7.0) + intercept).clamp(0.0, 100.0),
            predicted_score_30d: (slope * (last_x + 30.0) + intercept).clamp(0.0, 100.0),
            slope,
            confidence_interval: r_squared,
            direction,
        })
    }

    /// Z-score of the last value against the whole series.
    pub fn detect_anomalies(&self, metric: &str, values: &[f64], threshold: f64) -> Vec<AuditAnomaly> {
        let Some(&last) = values.last() else {
            return Vec::new();
        };
        if values.len() < 3 {
            return Vec::new();
        }

        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let std_dev = (values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n).sqrt();
        if std_dev < f64::EPSILON {
            return Vec::new();
        }

        let z_score = (last - mean) / std_dev;
        if z_score.abs() <= threshold {
            return Vec::new();
        }
        vec![AuditAnomaly {
            metric: metric.to_string(),
            z_score,
            value: last,
            mean,
            std_dev,
            message: format!("Anomaly in {metric}: value {last:.2} (z-score: {z_score:.2}, mean: {mean:.2})"),
        }]
    }

    /// Full tracking view for an ascending history.
    pub fn track(&self, history: Vec<AuditHistoryEntry>) -> DegradationTracking {
        let health: Vec<f64> = history.iter().map(|e| e.health_score).collect();
        let confidence: Vec<f64> = history.iter().map(|e| e.avg_confidence).collect();
        let increases: Vec<f64> = history
            .windows(2)
            .map(|w| w[1].total_patterns.saturating_sub(w[0].total_patterns) as f64)
            .collect();

        let trends = AuditTrends {
            health_trend: self.classify_trend(&health),
            // Confidence lives on a 0-1 scale.
            confidence_trend: classify_series(&confidence, self.stability_band / 100.0),
            pattern_growth: self.classify_growth(&increases),
        };

        DegradationTracking {
            prediction: self.predict(&health),
            anomalies: self.detect_anomalies("health_score", &health, ANOMALY_Z_THRESHOLD),
            trends,
            history,
        }
    }
}

impl Default for TrendAnalyzer {
    fn default() -> Self {
        Self::new(DEFAULT_TREND_STABILITY_BAND)
    }
}

fn classify_series(values: &[f64], band: f64) -> TrendDirection {
    let n = values.len();
    if n < 2 {
        return TrendDirection::Stable;
    }

    let (older, recent) = if n >= 2 * WINDOW {
        (&values[n - 2 * WINDOW..n - WINDOW], &values[n - WINDOW..])
    } else if n > WINDOW {
        (&values[..n - WINDOW], &values[n - WINDOW..])
    } else {
        values.split_at(n / 2)
    };

    let delta = mean(recent) - mean(older);
    if delta > band {
        TrendDirection::Improving
    } else if delta < -band {
        TrendDirection::Declining
    } else {
        TrendDirection::Stable
    }
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len().max(1) as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn entry(day: u32, health: f64, confidence: f64, total: usize) -> AuditHistoryEntry {
        AuditHistoryEntry {
            date: NaiveDate::from_ymd_opt(2026, 1, day).unwrap(),
            health_score: health,
            avg_confidence: confidence,
            total_patterns: total,
            auto_approve_eligible: 0,
            flagged_for_review: 0,
            likely_false_positives: 0,
            duplicate_groups: 0,
            cross_validation_score: 1.0,
        }
    }

    #[test]
    fn test_trend_uses_trajectory() {
        let analyzer = TrendAnalyzer::default();
        assert_eq!(analyzer.classify_trend(&[70.0, 72.0, 80.0, 85.0]), TrendDirection::Improving);
        assert_eq!(analyzer.classify_trend(&[90.0, 88.0, 75.0, 70.0]), TrendDirection::Declining);
        assert_eq!(analyzer.classify_trend(&[85.0, 86.0]), TrendDirection::Stable);
        assert_eq!(analyzer.classify_trend(&[85.0]), TrendDirection::Stable);
    }

    #[test]
    fn test_dip_and_recovery_is_not_first_vs_last() {
        // First and last equal, but the recent half is clearly lower.
        let scores = [90.0, 90.0, 90.0, 60.0, 60.0, 90.0];
        assert_eq!(TrendAnalyzer::default().classify_trend(&scores), TrendDirection::Declining);
    }

    #[test]
    fn test_growth() {
        let analyzer = TrendAnalyzer::default();
        assert_eq!(analyzer.classify_growth(&[]), PatternGrowth::Stagnant);
        assert_eq!(analyzer.classify_growth(&[10.0, 8.0]), PatternGrowth::Rapid);
        assert_eq!(analyzer.classify_growth(&[1.0, 2.0]), PatternGrowth::Healthy);
    }

    #[test]
    fn test_predict_linear() {
        let scores = [50.0, 52.0, 54.0, 56.0, 58.0];
        let p = TrendAnalyzer::default().predict(&scores).unwrap();
        assert!((p.slope - 2.0).abs() < 1e-9);
        assert!((p.predicted_score_7d - 72.0).abs() < 1e-9);
        assert!((p.predicted_score_30d - 100.0).abs() < 1e-9);
        assert!((p.confidence_interval - 1.0).abs() < 1e-9);
        assert_eq!(p.direction, TrendDirection::Improving);
        assert!(TrendAnalyzer::default().predict(&scores[..4]).is_none());
    }

    #[test]
    fn test_anomaly_on_last_value() {
        let analyzer = TrendAnalyzer::default();
        let values = [80.0, 80.0, 81.0, 79.0, 80.0, 80.0, 81.0, 79.0, 80.0, 30.0];
        let anomalies = analyzer.detect_anomalies("health_score", &values, ANOMALY_Z_THRESHOLD);
        assert_eq!(anomalies.len(), 1);
        assert!(anomalies[0].z_score < -2.0);
        assert!(analyzer.detect_anomalies("h", &[1.0, 1.0, 1.0], 2.0).is_empty());
    }

    #[test]
    fn test_track() {
        let history = vec![
            entry(1, 80.0, 0.80, 10),
            entry(2, 81.0, 0.80, 12),
            entry(3, 82.0, 0.81, 13),
        ];
        let tracking = TrendAnalyzer::default().track(history);
        assert_eq!(tracking.history.len(), 3);
        assert_eq!(tracking.trends.pattern_growth, PatternGrowth::Healthy);
        assert_eq!(tracking.trends.confidence_trend, TrendDirection::Stable);
        assert!(tracking.prediction.is_none());
    }
}
