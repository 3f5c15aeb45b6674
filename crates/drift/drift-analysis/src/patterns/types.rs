//! The learned pattern model consumed by the audit engine.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use drift_core::types::collections::FxHashSet;

use super::confidence::ConfidenceScore;

/// Lifecycle status of a pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternStatus {
    Discovered,
    Approved,
    Ignored,
}

impl PatternStatus {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Discovered => "discovered",
            Self::Approved => "approved",
            Self::Ignored => "ignored",
        }
    }
}

impl fmt::Display for PatternStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A location supporting (or deviating from) a pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternLocation {
    pub file: String,
    pub line: u32,
    pub column: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_line: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_column: Option<u32>,
}

impl PatternLocation {
    pub fn new(file: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            file: file.into(),
            line,
            column,
            end_line: None,
            end_column: None,
        }
    }

    /// Identity used for overlap: (file, line).
    pub fn key(&self) -> LocationKey {
        (self.file.clone(), self.line)
    }
}

/// (file, line) identity of a location.
pub type LocationKey = (String, u32);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternMetadata {
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
    pub scan_count: u32,
}

impl PatternMetadata {
    pub fn seen_at(at: DateTime<Utc>) -> Self {
        Self {
            first_seen: at,
            last_seen: at,
            scan_count: 1,
        }
    }

    /// Fractional days between first sighting and `now`, floored at zero.
    pub fn days_since_first_seen(&self, now: DateTime<Utc>) -> f64 {
        let secs = (now - self.first_seen).num_seconds().max(0);
        secs as f64 / 86_400.0
    }
}

/// A learned pattern. Read-only within the audit engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pattern {
    pub id: String,
    pub name: String,
    pub category: String,
    pub confidence: ConfidenceScore,
    #[serde(default)]
    pub locations: Vec<PatternLocation>,
    #[serde(default)]
    pub outliers: Vec<PatternLocation>,
    pub status: PatternStatus,
    pub metadata: PatternMetadata,
}

impl Pattern {
    pub fn location_count(&self) -> usize {
        self.locations.len()
    }

    pub fn outlier_count(&self) -> usize {
        self.outliers.len()
    }

    /// outliers / (locations + outliers), with the denominator floored at 1.
    pub fn outlier_ratio(&self) -> f64 {
        let total = (self.locations.len() + self.outliers.len()).max(1);
        self.outliers.len() as f64 / total as f64
    }

    pub fn location_keys(&self) -> FxHashSet<LocationKey> {
        self.locations.iter().map(PatternLocation::key).collect()
    }

    pub fn is_approved(&self) -> bool {
        self.status == PatternStatus::Approved
    }

    /// Distinct files among the supporting locations.
    pub fn file_count(&self) -> usize {
        self.locations
            .iter()
            .map(|l| l.file.as_str())
            .collect::<FxHashSet<_>>()
            .len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern(locations: usize, outliers: usize) -> Pattern {
        Pattern {
            id: "p".into(),
            name: "p".into(),
            category: "api".into(),
            confidence: ConfidenceScore::from_value(0.8),
            locations: (0..locations).map(|i| PatternLocation::new("a.ts", i as u32 + 1, 1)).collect(),
            outliers: (0..outliers).map(|i| PatternLocation::new("b.ts", i as u32 + 1, 1)).collect(),
            status: PatternStatus::Discovered,
            metadata: PatternMetadata::seen_at(Utc::now()),
        }
    }

    #[test]
    fn test_outlier_ratio() {
        assert_eq!(pattern(3, 1).outlier_ratio(), 0.25);
        assert_eq!(pattern(0, 0).outlier_ratio(), 0.0);
    }

    #[test]
    fn test_location_keys_ignore_column() {
        let mut p = pattern(1, 0);
        p.locations.push(PatternLocation::new("a.ts", 1, 20));
        assert_eq!(p.location_keys().len(), 1);
        assert_eq!(p.file_count(), 1);
    }

    #[test]
    fn test_status_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&PatternStatus::Approved).unwrap(), "\"approved\"");
    }
}
