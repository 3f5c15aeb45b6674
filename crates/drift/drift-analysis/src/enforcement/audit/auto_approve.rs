//! Per-pattern recommendations: auto-approve, review, or likely false positive.
//!
//! Auto-approve criteria: confidence ≥ 0.90, outlier ratio ≤ 0.50,
//! locations ≥ 3, no error-severity issues, not in a duplicate group.

use drift_core::constants::{
    DEFAULT_AUTO_APPROVE_THRESHOLD, DEFAULT_MAX_OUTLIER_RATIO,
    DEFAULT_MIN_LOCATIONS_FOR_ESTABLISHED, DEFAULT_REVIEW_THRESHOLD,
};

use super::types::{CrossValidationIssue, DuplicateGroup, IssueSeverity, Recommendation};
use crate::patterns::types::Pattern;

/// Auto-approver for patterns meeting stability criteria.
pub struct AutoApprover {
    pub min_confidence: f64,
    pub review_confidence: f64,
    pub max_outlier_ratio: f64,
    pub min_locations: usize,
}

impl AutoApprover {
    pub fn new() -> Self {
        Self {
            min_confidence: DEFAULT_AUTO_APPROVE_THRESHOLD,
            review_confidence: DEFAULT_REVIEW_THRESHOLD,
            max_outlier_ratio: DEFAULT_MAX_OUTLIER_RATIO,
            min_locations: DEFAULT_MIN_LOCATIONS_FOR_ESTABLISHED,
        }
    }

    /// Classify one pattern. `issues` are the cross-validation issues that
    /// name this pattern; `duplicate_group` is its group, if any.
    ///
    /// Reasons are ordered: classification facts, then warning and error
    /// issue messages, then the duplicate-membership note.
    pub fn recommend(
        &self,
        pattern: &Pattern,
        issues: &[&CrossValidationIssue],
        duplicate_group: Option<&DuplicateGroup>,
    ) -> (Recommendation, Vec<String>) {
        let confidence = pattern.confidence.score;
        let outlier_ratio = pattern.outlier_ratio();
        let locations = pattern.location_count();
        let has_errors = issues.iter().any(|i| i.severity == IssueSeverity::Error);

        let mut reasons = Vec::new();
        let mut recommendation = if confidence >= self.min_confidence
            && outlier_ratio <= self.max_outlier_ratio
            && locations >= self.min_locations
            && !has_errors
        {
            reasons.push(format!("High confidence ({confidence:.2})"));
            reasons.push(format!("{locations} consistent locations"));
            if outlier_ratio > 0.0 {
                reasons.push(format!("Outlier ratio {:.0}% within limit", outlier_ratio * 100.0));
            }
            Recommendation::AutoApprove
        } else if confidence >= self.review_confidence {
            if confidence >= self.min_confidence {
                reasons.push(format!("High confidence ({confidence:.2})"));
                if outlier_ratio > self.max_outlier_ratio {
                    reasons.push(format!(
                        "Outlier ratio {:.0}% exceeds {:.0}%",
                        outlier_ratio * 100.0,
                        self.max_outlier_ratio * 100.0
                    ));
                }
                if locations < self.min_locations {
                    reasons.push(format!(
                        "Only {locations} locations (need {})",
                        self.min_locations
                    ));
                }
                if has_errors {
                    reasons.push("Has error-level cross-validation issues".to_string());
                }
            } else {
                reasons.push(format!("Moderate confidence ({confidence:.2})"));
            }
            Recommendation::Review
        } else {
            reasons.push(format!("Low confidence ({confidence:.2})"));
            Recommendation::LikelyFalsePositive
        };

        reasons.extend(
            issues
                .iter()
                .filter(|i| i.severity != IssueSeverity::Info)
                .map(|i| i.message.clone()),
        );

        if let Some(group) = duplicate_group {
            let others: Vec<&str> = group
                .patterns
                .iter()
                .filter(|id| **id != pattern.id)
                .map(String::as_str)
                .collect();
            reasons.push(format!(
                "Possible duplicate of {} (group {}, similarity {:.2})",
                others.join(", "),
                group.id,
                group.similarity
            ));
            if recommendation == Recommendation::AutoApprove {
                recommendation = Recommendation::Review;
            }
        }

        (recommendation, reasons)
    }
}

impl Default for AutoApprover {
    fn default() -> Self {
        Self::new()
    }
}
