//! Audit engine: orchestrates one pass over the pattern set.

use std::time::Instant;

use chrono::{DateTime, Utc};
use drift_core::config::AuditConfig;
use drift_core::constants::{
    AUDIT_SCHEMA_VERSION, DEFAULT_AUTO_APPROVE_THRESHOLD, DEFAULT_DUPLICATE_SIMILARITY_THRESHOLD,
    DEFAULT_MAX_OUTLIER_RATIO, DEFAULT_MIN_LOCATIONS_FOR_ESTABLISHED,
    DEFAULT_OUTLIER_WARNING_RATIO, DEFAULT_REVIEW_THRESHOLD,
};
use drift_core::tracing::metrics;
use drift_core::types::collections::{FxHashMap, FxHashSet};
use xxhash_rust::xxh3::xxh3_128;

use super::auto_approve::AutoApprover;
use super::cross_validation::{AuditContext, CrossValidator};
use super::deduplication::DuplicateDetector;
use super::health_scorer::{average_confidence, HealthScorer};
use super::types::{
    AuditResult, AuditSummary, CrossValidationIssue, CrossValidationResult, DuplicateGroup,
    PatternAuditResult, Recommendation,
};
use crate::patterns::types::Pattern;

/// Resolved audit options.
#[derive(Debug, Clone, PartialEq)]
pub struct AuditEngineConfig {
    pub auto_approve_threshold: f64,
    pub review_threshold: f64,
    pub duplicate_similarity_threshold: f64,
    pub min_locations_for_established: usize,
    pub max_outlier_ratio: f64,
    pub outlier_warning_ratio: f64,
    /// Restrict the audit to these categories. Empty means all.
    pub categories: Vec<String>,
}

impl Default for AuditEngineConfig {
    fn default() -> Self {
        Self {
            auto_approve_threshold: DEFAULT_AUTO_APPROVE_THRESHOLD,
            review_threshold: DEFAULT_REVIEW_THRESHOLD,
            duplicate_similarity_threshold: DEFAULT_DUPLICATE_SIMILARITY_THRESHOLD,
            min_locations_for_established: DEFAULT_MIN_LOCATIONS_FOR_ESTABLISHED,
            max_outlier_ratio: DEFAULT_MAX_OUTLIER_RATIO,
            outlier_warning_ratio: DEFAULT_OUTLIER_WARNING_RATIO,
            categories: Vec::new(),
        }
    }
}

impl From<&AuditConfig> for AuditEngineConfig {
    fn from(config: &AuditConfig) -> Self {
        Self {
            auto_approve_threshold: config.effective_auto_approve_threshold(),
            review_threshold: config.effective_review_threshold(),
            duplicate_similarity_threshold: config.effective_duplicate_similarity_threshold(),
            min_locations_for_established: config.effective_min_locations_for_established(),
            max_outlier_ratio: config.effective_max_outlier_ratio(),
            outlier_warning_ratio: config.effective_outlier_warning_ratio(),
            categories: config.categories.clone(),
        }
    }
}

pub struct AuditEngine {
    config: AuditEngineConfig,
    detector: DuplicateDetector,
    validator: CrossValidator,
    approver: AutoApprover,
    scorer: HealthScorer,
}

impl AuditEngine {
    pub fn new(config: AuditEngineConfig) -> Self {
        Self {
            detector: DuplicateDetector::new(config.duplicate_similarity_threshold),
            validator: CrossValidator::new(config.outlier_warning_ratio),
            approver: AutoApprover {
                min_confidence: config.auto_approve_threshold,
                review_confidence: config.review_threshold,
                max_outlier_ratio: config.max_outlier_ratio,
                min_locations: config.min_locations_for_established,
            },
            scorer: HealthScorer::new(),
            config,
        }
    }

    pub fn from_config(config: &AuditConfig) -> Self {
        Self::new(AuditEngineConfig::from(config))
    }

    pub fn config(&self) -> &AuditEngineConfig {
        &self.config
    }

    pub fn run_audit(&self, patterns: &[Pattern]) -> AuditResult {
        self.run_audit_at(patterns, Utc::now())
    }

    pub fn run_audit_at(&self, patterns: &[Pattern], now: DateTime<Utc>) -> AuditResult {
        self.run_audit_with(patterns, &AuditContext::default(), now)
    }

    /// Never fails: an empty input produces a complete result scoring 100.
    pub fn run_audit_with(
        &self,
        patterns: &[Pattern],
        context: &AuditContext,
        now: DateTime<Utc>,
    ) -> AuditResult {
        let started = Instant::now();
        let selected = self.select(patterns);

        let duplicates = self.detector.detect(&selected);
        let cross_validation = self.validator.validate(&selected, context);
        let pattern_results = self.recommend_all(&selected, &duplicates, &cross_validation);
        let summary = self.summarize(&selected, &pattern_results, &duplicates, &cross_validation);

        tracing::info!(
            { metrics::HEALTH_SCORE } = summary.health_score,
            { metrics::DUPLICATE_GROUPS } = duplicates.len(),
            { metrics::AUDIT_DURATION_MS } = started.elapsed().as_millis() as u64,
            patterns = summary.total_patterns,
            "audit complete"
        );

        AuditResult {
            version: AUDIT_SCHEMA_VERSION.to_string(),
            generated_at: now,
            scan_hash: scan_hash(&selected),
            summary,
            patterns: pattern_results,
            duplicates,
            cross_validation,
            degradation: None,
        }
    }

    fn select(&self, patterns: &[Pattern]) -> Vec<Pattern> {
        if self.config.categories.is_empty() {
            return patterns.to_vec();
        }
        patterns
            .iter()
            .filter(|p| self.config.categories.iter().any(|c| *c == p.category))
            .cloned()
            .collect()
    }

    fn recommend_all(
        &self,
        patterns: &[Pattern],
        duplicates: &[DuplicateGroup],
        cross_validation: &CrossValidationResult,
    ) -> Vec<PatternAuditResult> {
        let mut issues_by_pattern: FxHashMap<&str, Vec<&CrossValidationIssue>> = FxHashMap::default();
        for issue in &cross_validation.issues {
            if let Some(id) = issue.pattern_id.as_deref() {
                issues_by_pattern.entry(id).or_default().push(issue);
            }
        }

        let mut group_of: FxHashMap<&str, &DuplicateGroup> = FxHashMap::default();
        for group in duplicates {
            for id in &group.patterns {
                group_of.entry(id.as_str()).or_insert(group);
            }
        }

        patterns
            .iter()
            .map(|pattern| {
                let issues = issues_by_pattern
                    .get(pattern.id.as_str())
                    .map(Vec::as_slice)
                    .unwrap_or_default();
                let group = group_of.get(pattern.id.as_str()).copied();
                let (recommendation, reasons) = self.approver.recommend(pattern, issues, group);

                PatternAuditResult {
                    pattern_id: pattern.id.clone(),
                    pattern_name: pattern.name.clone(),
                    category: pattern.category.clone(),
                    confidence: pattern.confidence.score,
                    location_count: pattern.location_count(),
                    outlier_count: pattern.outlier_count(),
                    outlier_ratio: pattern.outlier_ratio(),
                    recommendation,
                    reasons,
                    duplicate_group_id: group.map(|g| g.id.clone()),
                }
            })
            .collect()
    }

    fn summarize(
        &self,
        patterns: &[Pattern],
        results: &[PatternAuditResult],
        duplicates: &[DuplicateGroup],
        cross_validation: &CrossValidationResult,
    ) -> AuditSummary {
        let count = |r: Recommendation| results.iter().filter(|p| p.recommendation == r).count();
        let duplicate_candidates = duplicates
            .iter()
            .flat_map(|g| g.patterns.iter().map(String::as_str))
            .collect::<FxHashSet<&str>>()
            .len();

        let rate = cross_validation.call_graph_rate();
        let (health_score, health_breakdown) = self.scorer.compute(patterns, duplicates, rate);

        AuditSummary {
            total_patterns: patterns.len(),
            auto_approve_eligible: count(Recommendation::AutoApprove),
            flagged_for_review: count(Recommendation::Review),
            likely_false_positives: count(Recommendation::LikelyFalsePositive),
            duplicate_candidates,
            health_score,
            avg_confidence: average_confidence(patterns),
            health_breakdown,
            category_health: self.scorer.compute_per_category(patterns, duplicates, rate),
        }
    }
}

impl Default for AuditEngine {
    fn default() -> Self {
        Self::new(AuditEngineConfig::default())
    }
}

/// xxh3-128 over the sorted `id:confidence:locations:outliers` lines.
pub fn scan_hash(patterns: &[Pattern]) -> String {
    let mut lines: Vec<String> = patterns
        .iter()
        .map(|p| {
            format!(
                "{}:{}:{}:{}",
                p.id,
                p.confidence.score,
                p.location_count(),
                p.outlier_count()
            )
        })
        .collect();
    lines.sort_unstable();
    format!("{:032x}", xxh3_128(lines.join("\n").as_bytes()))
}
