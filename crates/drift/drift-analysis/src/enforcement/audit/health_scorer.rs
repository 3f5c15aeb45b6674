//! 5-factor health scoring.
//!
//! health_score = (avgConfidence × 0.30 + approvalRatio × 0.20 + complianceRate × 0.20
//!                + crossValidationRate × 0.15 + duplicateFreeRate × 0.15) × 100

use std::collections::BTreeMap;

use drift_core::types::collections::FxHashSet;

use super::types::{CategoryHealth, DuplicateGroup, HealthBreakdown};
use crate::patterns::types::Pattern;

const W_CONFIDENCE: f64 = 0.30;
const W_APPROVAL: f64 = 0.20;
const W_COMPLIANCE: f64 = 0.20;
const W_CROSS_VALIDATION: f64 = 0.15;
const W_DUPLICATE_FREE: f64 = 0.15;

/// Computes 5-factor health scores.
pub struct HealthScorer;

impl HealthScorer {
    pub fn new() -> Self {
        Self
    }

    /// Overall score in [0, 100] plus its breakdown. An empty pattern set scores 100.
    pub fn compute(
        &self,
        patterns: &[Pattern],
        duplicate_groups: &[DuplicateGroup],
        cross_validation_rate: f64,
    ) -> (f64, HealthBreakdown) {
        if patterns.is_empty() {
            let breakdown = HealthBreakdown {
                avg_confidence: 0.0,
                approval_ratio: 0.0,
                compliance_rate: 1.0,
                cross_validation_rate: 1.0,
                duplicate_free_rate: 1.0,
                raw_score: 1.0,
            };
            return (100.0, breakdown);
        }

        let avg_confidence = average_confidence(patterns);
        let approval_ratio = self.compute_approval_ratio(patterns);
        let compliance_rate = compliance_rate(patterns);
        let duplicate_free_rate = self.compute_duplicate_free_rate(patterns, duplicate_groups);

        let raw_score = avg_confidence * W_CONFIDENCE
            + approval_ratio * W_APPROVAL
            + compliance_rate * W_COMPLIANCE
            + cross_validation_rate * W_CROSS_VALIDATION
            + duplicate_free_rate * W_DUPLICATE_FREE;

        let score = 100.0 * raw_score.clamp(0.0, 1.0);

        let breakdown = HealthBreakdown {
            avg_confidence,
            approval_ratio,
            compliance_rate,
            cross_validation_rate,
            duplicate_free_rate,
            raw_score,
        };

        (score, breakdown)
    }

    /// Per-category scores, using the global cross-validation rate.
    pub fn compute_per_category(
        &self,
        patterns: &[Pattern],
        duplicate_groups: &[DuplicateGroup],
        cross_validation_rate: f64,
    ) -> BTreeMap<String, CategoryHealth> {
        let mut categories: BTreeMap<&str, Vec<Pattern>> = BTreeMap::new();
        for p in patterns {
            categories.entry(p.category.as_str()).or_default().push(p.clone());
        }

        categories
            .into_iter()
            .map(|(category, cat_patterns)| {
                let (score, _) = self.compute(&cat_patterns, duplicate_groups, cross_validation_rate);
                let health = CategoryHealth {
                    category: category.to_string(),
                    score,
                    pattern_count: cat_patterns.len(),
                    avg_confidence: average_confidence(&cat_patterns),
                    compliance_rate: compliance_rate(&cat_patterns),
                };
                (category.to_string(), health)
            })
            .collect()
    }

    fn compute_approval_ratio(&self, patterns: &[Pattern]) -> f64 {
        let approved = patterns
            .iter()
            .filter(|p| p.is_approved())
            .count();
        approved as f64 / patterns.len().max(1) as f64
    }

    /// 1 - (distinct patterns in any group) / total. A pattern counts once.
    fn compute_duplicate_free_rate(&self, patterns: &[Pattern], duplicate_groups: &[DuplicateGroup]) -> f64 {
        let ids: FxHashSet<&str> = patterns.iter().map(|p| p.id.as_str()).collect();
        let in_groups: FxHashSet<&str> = duplicate_groups
            .iter()
            .flat_map(|g| g.patterns.iter().map(String::as_str))
            .filter(|id| ids.contains(id))
            .collect();
        (1.0 - in_groups.len() as f64 / patterns.len().max(1) as f64).max(0.0)
    }
}

impl Default for HealthScorer {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn average_confidence(patterns: &[Pattern]) -> f64 {
    if patterns.is_empty() {
        return 0.0;
    }
    patterns.iter().map(|p| p.confidence.score).sum::<f64>() / patterns.len() as f64
}

/// locations / (locations + outliers); 1.0 when both are zero.
fn compliance_rate(patterns: &[Pattern]) -> f64 {
    let locations: usize = patterns.iter().map(Pattern::location_count).sum();
    let outliers: usize = patterns.iter().map(Pattern::outlier_count).sum();
    if locations + outliers == 0 {
        return 1.0;
    }
    locations as f64 / (locations + outliers) as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enforcement::audit::types::DuplicateAction;
    use crate::patterns::confidence::ConfidenceScore;
    use crate::patterns::types::{PatternLocation, PatternMetadata, PatternStatus};
    use chrono::Utc;

    fn pattern(id: &str, category: &str, confidence: f64, status: PatternStatus) -> Pattern {
        Pattern {
            id: id.into(),
            name: id.into(),
            category: category.into(),
            confidence: ConfidenceScore::from_value(confidence),
            locations: vec![PatternLocation::new("a.ts", 1, 1), PatternLocation::new("a.ts", 2, 1)],
            outliers: vec![],
            status,
            metadata: PatternMetadata::seen_at(Utc::now()),
        }
    }

    fn group(ids: &[&str]) -> DuplicateGroup {
        DuplicateGroup {
            id: "dup".into(),
            patterns: ids.iter().map(|s| s.to_string()).collect(),
            pattern_names: vec![],
            similarity: 1.0,
            reason: String::new(),
            recommendation: DuplicateAction::Merge,
            overlapping_locations: 0,
            total_locations: 0,
        }
    }

    #[test]
    fn test_empty_is_perfect() {
        let (score, _) = HealthScorer::new().compute(&[], &[], 0.0);
        assert_eq!(score, 100.0);
    }

    #[test]
    fn test_all_ideal_scores_100() {
        let patterns = vec![pattern("a", "api", 1.0, PatternStatus::Approved)];
        let (score, breakdown) = HealthScorer::new().compute(&patterns, &[], 1.0);
        assert!((score - 100.0).abs() < 1e-9);
        assert_eq!(breakdown.duplicate_free_rate, 1.0);
    }

    #[test]
    fn test_weighted_components() {
        // conf 0.5, approval 0, compliance 1, cv 1, dup-free 1
        let patterns = vec![pattern("a", "api", 0.5, PatternStatus::Discovered)];
        let (score, _) = HealthScorer::new().compute(&patterns, &[], 1.0);
        assert!((score - 65.0).abs() < 1e-9);
    }

    #[test]
    fn test_duplicate_members_counted_once() {
        let patterns = vec![
            pattern("a", "api", 1.0, PatternStatus::Approved),
            pattern("b", "api", 1.0, PatternStatus::Approved),
            pattern("c", "api", 1.0, PatternStatus::Approved),
            pattern("d", "api", 1.0, PatternStatus::Approved),
        ];
        let groups = vec![group(&["a", "b"]), group(&["a", "b"])];
        let (_, breakdown) = HealthScorer::new().compute(&patterns, &groups, 1.0);
        assert_eq!(breakdown.duplicate_free_rate, 0.5);
    }

    #[test]
    fn test_per_category() {
        let patterns = vec![
            pattern("a", "api", 1.0, PatternStatus::Approved),
            pattern("b", "auth", 0.5, PatternStatus::Discovered),
        ];
        let by_cat = HealthScorer::new().compute_per_category(&patterns, &[], 1.0);
        assert_eq!(by_cat.len(), 2);
        assert!((by_cat["api"].score - 100.0).abs() < 1e-9);
        assert!((by_cat["auth"].score - 65.0).abs() < 1e-9);
    }
}
