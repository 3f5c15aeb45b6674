//! Audit engine configuration.

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_AUTO_APPROVE_THRESHOLD, DEFAULT_DUPLICATE_SIMILARITY_THRESHOLD,
    DEFAULT_MAX_OUTLIER_RATIO, DEFAULT_MIN_LOCATIONS_FOR_ESTABLISHED,
    DEFAULT_OUTLIER_WARNING_RATIO, DEFAULT_REVIEW_THRESHOLD,
};

/// Configuration for the audit engine.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AuditConfig {
    /// Minimum confidence for auto-approval. Default: 0.90.
    pub auto_approve_threshold: Option<f64>,
    /// Minimum confidence for a review recommendation. Default: 0.70.
    pub review_threshold: Option<f64>,
    /// Jaccard similarity at which two patterns are grouped. Default: 0.85.
    pub duplicate_similarity_threshold: Option<f64>,
    /// Minimum locations for a pattern to count as established. Default: 3.
    pub min_locations_for_established: Option<usize>,
    /// Maximum outlier ratio for auto-approval. Default: 0.50.
    pub max_outlier_ratio: Option<f64>,
    /// Outlier ratio above which cross-validation warns. Default: 0.50.
    pub outlier_warning_ratio: Option<f64>,
    /// Restrict audits to these categories (empty = all).
    #[serde(default)]
    pub categories: Vec<String>,
}

impl AuditConfig {
    pub fn effective_auto_approve_threshold(&self) -> f64 {
        self.auto_approve_threshold
            .unwrap_or(DEFAULT_AUTO_APPROVE_THRESHOLD)
    }

    pub fn effective_review_threshold(&self) -> f64 {
        self.review_threshold.unwrap_or(DEFAULT_REVIEW_THRESHOLD)
    }

    pub fn effective_duplicate_similarity_threshold(&self) -> f64 {
        self.duplicate_similarity_threshold
            .unwrap_or(DEFAULT_DUPLICATE_SIMILARITY_THRESHOLD)
    }

    pub fn effective_min_locations_for_established(&self) -> usize {
        self.min_locations_for_established
            .unwrap_or(DEFAULT_MIN_LOCATIONS_FOR_ESTABLISHED)
    }

    pub fn effective_max_outlier_ratio(&self) -> f64 {
        self.max_outlier_ratio.unwrap_or(DEFAULT_MAX_OUTLIER_RATIO)
    }

    pub fn effective_outlier_warning_ratio(&self) -> f64 {
        self.outlier_warning_ratio
            .unwrap_or(DEFAULT_OUTLIER_WARNING_RATIO)
    }
}
