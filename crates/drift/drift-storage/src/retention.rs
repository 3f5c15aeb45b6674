//! Snapshot retention: keep the newest N dated snapshots.
//!
//! Pruning is best-effort. A failed delete is logged and recorded, and the
//! remaining candidates are still processed.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Serialize;

use drift_core::constants::DEFAULT_SNAPSHOT_RETENTION;
use drift_core::errors::StorageError;
use drift_core::tracing::metrics;

/// File-name date format of a snapshot (`YYYY-MM-DD.json`).
pub const SNAPSHOT_DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone)]
pub struct RetentionPolicy {
    /// Snapshots to keep (default 30).
    pub max_snapshots: usize,
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self {
            max_snapshots: DEFAULT_SNAPSHOT_RETENTION,
        }
    }
}

/// Report of what was cleaned.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RetentionReport {
    pub deleted: Vec<NaiveDate>,
    pub failed: Vec<FailedDelete>,
    pub remaining: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct FailedDelete {
    pub date: NaiveDate,
    pub message: String,
}

pub fn snapshot_path(dir: &Path, date: NaiveDate) -> PathBuf {
    dir.join(format!("{}.json", date.format(SNAPSHOT_DATE_FORMAT)))
}

/// Dates of the snapshots in `dir`, ascending. Files not named
/// `YYYY-MM-DD.json` are ignored; a missing directory has none.
pub fn list_snapshot_dates(dir: &Path) -> Result<Vec<NaiveDate>, StorageError> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(StorageError::io(dir, e)),
    };

    let mut dates: Vec<NaiveDate> = entries
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| {
            let name = entry.file_name();
            let stem = name.to_str()?.strip_suffix(".json")?.to_string();
            NaiveDate::parse_from_str(&stem, SNAPSHOT_DATE_FORMAT).ok()
        })
        .collect();
    dates.sort_unstable();
    Ok(dates)
}

/// Delete the oldest snapshots beyond `policy.max_snapshots`.
pub fn apply_retention(dir: &Path, policy: &RetentionPolicy) -> Result<RetentionReport, StorageError> {
    let dates = list_snapshot_dates(dir)?;
    let excess = dates.len().saturating_sub(policy.max_snapshots);
    let mut report = RetentionReport::default();

    for date in &dates[..excess] {
        let path = snapshot_path(dir, *date);
        match fs::remove_file(&path) {
            Ok(()) => report.deleted.push(*date),
            Err(e) if e.kind() == ErrorKind::NotFound => report.deleted.push(*date),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to delete snapshot");
                report.failed.push(FailedDelete {
                    date: *date,
                    message: e.to_string(),
                });
            }
        }
    }

    report.remaining = dates.len() - report.deleted.len();
    if !report.deleted.is_empty() {
        tracing::debug!(
            { metrics::SNAPSHOTS_PRUNED } = report.deleted.len(),
            { metrics::SNAPSHOT_COUNT } = report.remaining,
            "pruned audit snapshots"
        );
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 5, day).unwrap()
    }

    #[test]
    fn test_keeps_newest() {
        let dir = tempfile::tempdir().unwrap();
        for day in 1..=5 {
            fs::write(snapshot_path(dir.path(), date(day)), "{}").unwrap();
        }
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let report = apply_retention(dir.path(), &RetentionPolicy { max_snapshots: 3 }).unwrap();
        assert_eq!(report.deleted, vec![date(1), date(2)]);
        assert_eq!(report.remaining, 3);
        assert_eq!(list_snapshot_dates(dir.path()).unwrap(), vec![date(3), date(4), date(5)]);
        assert!(dir.path().join("notes.txt").exists());
    }

    #[test]
    fn test_missing_dir_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert!(list_snapshot_dates(&missing).unwrap().is_empty());
        assert_eq!(apply_retention(&missing, &RetentionPolicy::default()).unwrap().remaining, 0);
    }
}
