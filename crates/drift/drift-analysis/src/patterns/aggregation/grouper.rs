//! Groups match results by pattern and derives scorer inputs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use drift_core::types::collections::{FxHashMap, FxHashSet};

use crate::matcher::PatternMatchResult;
use crate::patterns::confidence::{ConfidenceInput, ConfidenceScorer};
use crate::patterns::types::{Pattern, PatternLocation, PatternMetadata, PatternStatus};

/// Per-pattern rollup of match results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternStats {
    pub pattern_id: String,
    pub occurrences: u64,
    pub file_count: u64,
    pub mean_confidence: f64,
    /// Population variance of per-match confidence.
    pub confidence_variance: f64,
}

#[derive(Debug, Default)]
struct Accumulator {
    count: u64,
    sum: f64,
    sum_sq: f64,
    files: FxHashSet<String>,
    locations: Vec<(PatternLocation, f64)>,
}

/// Accumulates match results across files.
#[derive(Debug, Default)]
pub struct MatchAggregator {
    by_pattern: FxHashMap<String, Accumulator>,
    files: FxHashSet<String>,
}

impl MatchAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count a file toward the spread denominator even if nothing matched in it.
    pub fn observe_file(&mut self, file: &str) {
        if !self.files.contains(file) {
            self.files.insert(file.to_string());
        }
    }

    pub fn add(&mut self, result: &PatternMatchResult) {
        self.observe_file(&result.location.file);
        let acc = self.by_pattern.entry(result.pattern_id.clone()).or_default();
        acc.count += 1;
        acc.sum += result.confidence;
        acc.sum_sq += result.confidence * result.confidence;
        if !acc.files.contains(&result.location.file) {
            acc.files.insert(result.location.file.clone());
        }
        acc.locations.push((
            PatternLocation {
                file: result.location.file.clone(),
                line: result.location.line,
                column: result.location.column,
                end_line: result.location.end_line,
                end_column: result.location.end_column,
            },
            result.confidence,
        ));
    }

    pub fn add_all<'a>(&mut self, results: impl IntoIterator<Item = &'a PatternMatchResult>) {
        for result in results {
            self.add(result);
        }
    }

    pub fn total_files(&self) -> u64 {
        self.files.len() as u64
    }

    /// Sum of occurrences across all patterns.
    pub fn total_locations(&self) -> u64 {
        self.by_pattern.values().map(|a| a.count).sum()
    }

    pub fn pattern_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.by_pattern.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn stats(&self, pattern_id: &str) -> Option<PatternStats> {
        let acc = self.by_pattern.get(pattern_id)?;
        let n = acc.count.max(1) as f64;
        let mean = acc.sum / n;
        let variance = (acc.sum_sq / n - mean * mean).max(0.0);
        Some(PatternStats {
            pattern_id: pattern_id.to_string(),
            occurrences: acc.count,
            file_count: acc.files.len() as u64,
            mean_confidence: mean,
            confidence_variance: variance,
        })
    }

    /// Stats for every pattern, ordered by id.
    pub fn all_stats(&self) -> Vec<PatternStats> {
        self.pattern_ids()
            .iter()
            .filter_map(|id| self.stats(id))
            .collect()
    }

    pub fn confidence_input(&self, pattern_id: &str, days_since_first_seen: f64) -> Option<ConfidenceInput> {
        let stats = self.stats(pattern_id)?;
        Some(ConfidenceInput {
            occurrences: stats.occurrences,
            total_locations: self.total_locations(),
            variance: stats.confidence_variance,
            days_since_first_seen,
            file_count: stats.file_count,
            total_files: self.total_files(),
        })
    }

    /// Split a pattern's matches into locations and outliers. Matches with
    /// confidence below `outlier_cutoff` are outliers. Both lists are ordered
    /// by (file, line, column).
    pub fn locations(&self, pattern_id: &str, outlier_cutoff: f64) -> (Vec<PatternLocation>, Vec<PatternLocation>) {
        let Some(acc) = self.by_pattern.get(pattern_id) else {
            return (Vec::new(), Vec::new());
        };
        let mut entries: Vec<&(PatternLocation, f64)> = acc.locations.iter().collect();
        entries.sort_by(|(a, _), (b, _)| {
            (&a.file, a.line, a.column).cmp(&(&b.file, b.line, b.column))
        });

        let mut locations = Vec::new();
        let mut outliers = Vec::new();
        for (location, confidence) in entries {
            if *confidence >= outlier_cutoff {
                locations.push(location.clone());
            } else {
                outliers.push(location.clone());
            }
        }
        (locations, outliers)
    }

    /// Build a scored `Pattern` from the accumulated matches.
    pub fn build_pattern(
        &self,
        pattern_id: &str,
        name: &str,
        category: &str,
        metadata: PatternMetadata,
        scorer: &ConfidenceScorer,
        outlier_cutoff: f64,
        now: DateTime<Utc>,
    ) -> Option<Pattern> {
        let input = self.confidence_input(pattern_id, metadata.days_since_first_seen(now))?;
        let (locations, outliers) = self.locations(pattern_id, outlier_cutoff);
        Some(Pattern {
            id: pattern_id.to_string(),
            name: name.to_string(),
            category: category.to_string(),
            confidence: scorer.calculate_confidence(&input),
            locations,
            outliers,
            status: PatternStatus::Discovered,
            metadata,
        })
    }
}
