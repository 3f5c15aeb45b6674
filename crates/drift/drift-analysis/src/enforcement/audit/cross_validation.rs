//! Cross-validation of patterns against their own data and external signals.

use serde::{Deserialize, Serialize};

use drift_core::constants::DEFAULT_OUTLIER_WARNING_RATIO;
use drift_core::types::collections::{FxHashMap, FxHashSet};

use super::types::{CrossValidationIssue, CrossValidationResult, IssueSeverity, IssueType};
use crate::patterns::types::{Pattern, PatternStatus};

/// Confidence below which an approved pattern is flagged.
pub const APPROVED_LOW_CONFIDENCE: f64 = 0.5;

/// Files known to the call graph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallGraphIndex {
    pub files: FxHashSet<String>,
}

impl CallGraphIndex {
    pub fn from_files<I, S>(files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            files: files.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, file: &str) -> bool {
        self.files.contains(file)
    }
}

/// A constraint that depends on specific patterns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConstraintRef {
    pub id: String,
    pub pattern_ids: Vec<String>,
}

/// External signals consulted during an audit.
#[derive(Debug, Clone, Default)]
pub struct AuditContext {
    pub call_graph: Option<CallGraphIndex>,
    pub constraints: Vec<ConstraintRef>,
}

pub struct CrossValidator {
    pub outlier_warning_ratio: f64,
}

impl CrossValidator {
    pub fn new(outlier_warning_ratio: f64) -> Self {
        Self { outlier_warning_ratio }
    }

    pub fn validate(&self, patterns: &[Pattern], context: &AuditContext) -> CrossValidationResult {
        let mut issues = Vec::new();
        let mut matching = 0usize;
        let mut not_matching = 0usize;

        for pattern in patterns {
            self.check_pattern(pattern, &mut issues);

            if let Some(graph) = &context.call_graph {
                if pattern.locations.iter().any(|l| graph.contains(&l.file)) {
                    matching += 1;
                } else {
                    not_matching += 1;
                    issues.push(CrossValidationIssue {
                        issue_type: IssueType::NotInCallGraph,
                        severity: IssueSeverity::Info,
                        pattern_id: Some(pattern.id.clone()),
                        entry_id: None,
                        constraint_id: None,
                        message: format!(
                            "Pattern '{}' has no locations in call-graph files",
                            pattern.name
                        ),
                    });
                }
            }
        }

        self.check_constraints(patterns, &context.constraints, &mut issues);

        let non_info = issues
            .iter()
            .filter(|i| i.severity != IssueSeverity::Info)
            .count();
        let constraint_alignment = if patterns.is_empty() {
            1.0
        } else {
            (1.0 - non_info as f64 / patterns.len() as f64).max(0.0)
        };

        CrossValidationResult {
            patterns_matching_call_graph: matching,
            patterns_not_in_call_graph: not_matching,
            constraint_alignment,
            // No test-topology signal is wired in yet.
            test_coverage_alignment: 1.0,
            issues,
        }
    }

    fn check_pattern(&self, pattern: &Pattern, issues: &mut Vec<CrossValidationIssue>) {
        if pattern.locations.is_empty() {
            issues.push(issue(
                IssueType::OrphanPattern,
                IssueSeverity::Warning,
                pattern,
                format!("Pattern '{}' has no locations", pattern.name),
            ));
        }

        let ratio = pattern.outlier_ratio();
        if ratio > self.outlier_warning_ratio {
            issues.push(issue(
                IssueType::InconsistentData,
                IssueSeverity::Warning,
                pattern,
                format!(
                    "Pattern '{}' has a high outlier ratio ({:.0}%)",
                    pattern.name,
                    ratio * 100.0
                ),
            ));
        }

        if pattern.is_approved()
            && pattern.confidence.score < APPROVED_LOW_CONFIDENCE
        {
            issues.push(issue(
                IssueType::InconsistentData,
                IssueSeverity::Info,
                pattern,
                format!(
                    "Approved pattern '{}' has low confidence ({:.2})",
                    pattern.name, pattern.confidence.score
                ),
            ));
        }
    }

    /// Constraints must reference patterns that exist and are not ignored.
    fn check_constraints(
        &self,
        patterns: &[Pattern],
        constraints: &[ConstraintRef],
        issues: &mut Vec<CrossValidationIssue>,
    ) {
        if constraints.is_empty() {
            return;
        }
        let by_id: FxHashMap<&str, &Pattern> = patterns.iter().map(|p| (p.id.as_str(), p)).collect();

        for constraint in constraints {
            for pattern_id in &constraint.pattern_ids {
                let message = match by_id.get(pattern_id.as_str()) {
                    None => format!(
                        "Constraint '{}' references unknown pattern '{}'",
                        constraint.id, pattern_id
                    ),
                    Some(p) if p.status == PatternStatus::Ignored => format!(
                        "Constraint '{}' references ignored pattern '{}'",
                        constraint.id, pattern_id
                    ),
                    Some(_) => continue,
                };
                issues.push(CrossValidationIssue {
                    issue_type: IssueType::ConstraintMismatch,
                    severity: IssueSeverity::Warning,
                    pattern_id: Some(pattern_id.clone()),
                    entry_id: None,
                    constraint_id: Some(constraint.id.clone()),
                    message,
                });
            }
        }
    }
}

impl Default for CrossValidator {
    fn default() -> Self {
        Self::new(DEFAULT_OUTLIER_WARNING_RATIO)
    }
}

fn issue(
    issue_type: IssueType,
    severity: IssueSeverity,
    pattern: &Pattern,
    message: String,
) -> CrossValidationIssue {
    CrossValidationIssue {
        issue_type,
        severity,
        pattern_id: Some(pattern.id.clone()),
        entry_id: None,
        constraint_id: None,
        message,
    }
}
