//! Audit system types.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Complete output of one audit run. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditResult {
    pub version: String,
    pub generated_at: DateTime<Utc>,
    /// Content-addressed fingerprint of the audited pattern state.
    pub scan_hash: String,
    pub summary: AuditSummary,
    pub patterns: Vec<PatternAuditResult>,
    pub duplicates: Vec<DuplicateGroup>,
    pub cross_validation: CrossValidationResult,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub degradation: Option<DegradationResult>,
}

impl AuditResult {
    /// Calendar date (UTC) the result is filed under.
    pub fn date(&self) -> NaiveDate {
        self.generated_at.date_naive()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditSummary {
    pub total_patterns: usize,
    pub auto_approve_eligible: usize,
    pub flagged_for_review: usize,
    pub likely_false_positives: usize,
    /// Distinct patterns appearing in any duplicate group.
    pub duplicate_candidates: usize,
    pub health_score: f64,
    /// Mean pattern confidence.
    pub avg_confidence: f64,
    pub health_breakdown: HealthBreakdown,
    #[serde(default)]
    pub category_health: BTreeMap<String, CategoryHealth>,
}

/// The five rates behind a health score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthBreakdown {
    pub avg_confidence: f64,
    pub approval_ratio: f64,
    pub compliance_rate: f64,
    pub cross_validation_rate: f64,
    pub duplicate_free_rate: f64,
    /// Weighted sum before scaling to 0-100.
    pub raw_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryHealth {
    pub category: String,
    pub score: f64,
    pub pattern_count: usize,
    pub avg_confidence: f64,
    pub compliance_rate: f64,
}

/// Per-pattern verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternAuditResult {
    pub pattern_id: String,
    pub pattern_name: String,
    pub category: String,
    pub confidence: f64,
    pub location_count: usize,
    pub outlier_count: usize,
    pub outlier_ratio: f64,
    pub recommendation: Recommendation,
    pub reasons: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duplicate_group_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Recommendation {
    AutoApprove,
    Review,
    LikelyFalsePositive,
}

impl Recommendation {
    pub fn name(&self) -> &'static str {
        match self {
            Self::AutoApprove => "auto-approve",
            Self::Review => "review",
            Self::LikelyFalsePositive => "likely-false-positive",
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A cluster of same-category patterns with overlapping locations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateGroup {
    pub id: String,
    pub patterns: Vec<String>,
    pub pattern_names: Vec<String>,
    pub similarity: f64,
    pub reason: String,
    pub recommendation: DuplicateAction,
    pub overlapping_locations: usize,
    pub total_locations: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DuplicateAction {
    Merge,
    KeepBoth,
    Review,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrossValidationResult {
    pub patterns_matching_call_graph: usize,
    pub patterns_not_in_call_graph: usize,
    pub constraint_alignment: f64,
    pub test_coverage_alignment: f64,
    pub issues: Vec<CrossValidationIssue>,
}

impl CrossValidationResult {
    /// matching / (matching + non-matching); 1.0 when no call graph was consulted.
    pub fn call_graph_rate(&self) -> f64 {
        let total = self.patterns_matching_call_graph + self.patterns_not_in_call_graph;
        if total == 0 {
            1.0
        } else {
            self.patterns_matching_call_graph as f64 / total as f64
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrossValidationIssue {
    #[serde(rename = "type")]
    pub issue_type: IssueType,
    pub severity: IssueSeverity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraint_id: Option<String>,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IssueType {
    OrphanPattern,
    InconsistentData,
    NotInCallGraph,
    ConstraintMismatch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueSeverity {
    Info,
    Warning,
    Error,
}

/// Difference between two audits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DegradationResult {
    pub health_score_delta: f64,
    pub confidence_delta: f64,
    pub pattern_count_delta: i64,
    pub new_issues: Vec<String>,
    pub resolved_issues: Vec<String>,
    pub trend: TrendDirection,
    pub alerts: Vec<DegradationAlert>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DegradationAlert {
    #[serde(rename = "type")]
    pub alert_type: AlertType,
    pub severity: AlertSeverity,
    pub message: String,
    pub current_value: f64,
    pub previous_value: f64,
    pub delta: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AlertType {
    HealthDrop,
    ConfidenceDrop,
    NewFalsePositives,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Warning,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Improving,
    Declining,
    Stable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternGrowth {
    Rapid,
    Healthy,
    Stagnant,
}

/// One row of audit history. At most one per calendar date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditHistoryEntry {
    pub date: NaiveDate,
    pub health_score: f64,
    pub avg_confidence: f64,
    pub total_patterns: usize,
    pub auto_approve_eligible: usize,
    pub flagged_for_review: usize,
    pub likely_false_positives: usize,
    pub duplicate_groups: usize,
    pub cross_validation_score: f64,
}

impl AuditHistoryEntry {
    pub fn from_audit(audit: &AuditResult) -> Self {
        Self {
            date: audit.date(),
            health_score: audit.summary.health_score,
            avg_confidence: audit.summary.avg_confidence,
            total_patterns: audit.summary.total_patterns,
            auto_approve_eligible: audit.summary.auto_approve_eligible,
            flagged_for_review: audit.summary.flagged_for_review,
            likely_false_positives: audit.summary.likely_false_positives,
            duplicate_groups: audit.duplicates.len(),
            cross_validation_score: audit.cross_validation.constraint_alignment,
        }
    }
}

/// Trajectory classification over the whole history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditTrends {
    pub health_trend: TrendDirection,
    pub confidence_trend: TrendDirection,
    pub pattern_growth: PatternGrowth,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendPrediction {
    pub predicted_score_7d: f64,
    pub predicted_score_30d: f64,
    pub slope: f64,
    /// R² of the fit.
    pub confidence_interval: f64,
    pub direction: TrendDirection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditAnomaly {
    pub metric: String,
    pub z_score: f64,
    pub value: f64,
    pub mean: f64,
    pub std_dev: f64,
    pub message: String,
}

/// Accumulated history plus derived trend signals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DegradationTracking {
    pub history: Vec<AuditHistoryEntry>,
    pub trends: AuditTrends,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prediction: Option<TrendPrediction>,
    #[serde(default)]
    pub anomalies: Vec<AuditAnomaly>,
}
