//! Audit store: latest result, dated snapshots and per-date history under
//! `<root>/.drift/audit/`.
//!
//! ```text
//! .drift/audit/
//!   latest.json
//!   degradation.json
//!   audit.lock
//!   snapshots/YYYY-MM-DD.json
//! ```

use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use drift_analysis::enforcement::audit::{
    AuditHistoryEntry, AuditResult, DegradationConfig, DegradationDetector, DegradationResult,
    DegradationTracking, TrendAnalyzer,
};
use drift_core::config::StorageConfig;
use drift_core::constants::{AUDIT_DIR, DEFAULT_SNAPSHOT_RETENTION};
use drift_core::errors::StorageError;

use crate::fs::{ensure_dir, read_json, write_json_atomic, StoreLock};
use crate::retention::{self, RetentionPolicy, RetentionReport, SNAPSHOT_DATE_FORMAT};

const LATEST_FILE: &str = "latest.json";
const DEGRADATION_FILE: &str = "degradation.json";
const SNAPSHOTS_DIR: &str = "snapshots";

/// Resolved store options.
#[derive(Debug, Clone, PartialEq)]
pub struct AuditStoreConfig {
    pub snapshot_retention: usize,
    pub degradation: DegradationConfig,
}

impl Default for AuditStoreConfig {
    fn default() -> Self {
        Self {
            snapshot_retention: DEFAULT_SNAPSHOT_RETENTION,
            degradation: DegradationConfig::default(),
        }
    }
}

impl From<&StorageConfig> for AuditStoreConfig {
    fn from(config: &StorageConfig) -> Self {
        Self {
            snapshot_retention: config.effective_snapshot_retention(),
            degradation: DegradationConfig::from(config),
        }
    }
}

/// On-disk shape of `degradation.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HistoryFile {
    history: Vec<AuditHistoryEntry>,
    last_updated: DateTime<Utc>,
}

pub struct AuditStore {
    audit_dir: PathBuf,
    snapshots_dir: PathBuf,
    config: AuditStoreConfig,
    detector: DegradationDetector,
    analyzer: TrendAnalyzer,
}

impl AuditStore {
    /// Open the store for a project root, creating the directories if missing.
    pub fn new(project_root: &Path, config: AuditStoreConfig) -> Result<Self, StorageError> {
        let audit_dir = project_root.join(AUDIT_DIR);
        let snapshots_dir = audit_dir.join(SNAPSHOTS_DIR);
        ensure_dir(&snapshots_dir)?;

        Ok(Self {
            detector: DegradationDetector::new(config.degradation.clone()),
            analyzer: TrendAnalyzer::new(config.degradation.trend_stability_band),
            audit_dir,
            snapshots_dir,
            config,
        })
    }

    pub fn from_config(project_root: &Path, config: &StorageConfig) -> Result<Self, StorageError> {
        Self::new(project_root, AuditStoreConfig::from(config))
    }

    pub fn audit_dir(&self) -> &Path {
        &self.audit_dir
    }

    pub fn snapshots_dir(&self) -> &Path {
        &self.snapshots_dir
    }

    pub fn config(&self) -> &AuditStoreConfig {
        &self.config
    }

    /// Write the snapshot for the audit's date (replacing any earlier one
    /// from that day), the history entry for that date, and `latest.json`.
    /// Then enforce snapshot retention.
    ///
    /// Waits for a concurrent writer on the same root to finish. The history
    /// is read before anything is written, so a failed read changes nothing.
    /// An unparseable history file is replaced by a fresh one.
    pub fn save_audit(&self, audit: &AuditResult) -> Result<(), StorageError> {
        let mut lock = StoreLock::open(&self.audit_dir)?;
        let _guard = lock.write()?;

        let date = audit.date();
        let mut history = self.load_history()?;
        upsert_entry(&mut history, AuditHistoryEntry::from_audit(audit));

        write_json_atomic(&retention::snapshot_path(&self.snapshots_dir, date), audit)?;
        write_json_atomic(
            &self.audit_dir.join(DEGRADATION_FILE),
            &HistoryFile {
                history,
                last_updated: Utc::now(),
            },
        )?;
        write_json_atomic(&self.audit_dir.join(LATEST_FILE), audit)?;

        tracing::debug!(
            date = %date,
            scan_hash = %audit.scan_hash,
            health_score = audit.summary.health_score,
            "audit saved"
        );

        self.prune()?;
        Ok(())
    }

    /// Attach the comparison against the current latest audit (if any),
    /// save, and return the stored result.
    pub fn record_audit(&self, mut audit: AuditResult) -> Result<AuditResult, StorageError> {
        if let Some(previous) = self.load_latest()? {
            audit.degradation = Some(self.compare_audits(&audit, &previous));
        }
        self.save_audit(&audit)?;
        Ok(audit)
    }

    pub fn load_latest(&self) -> Result<Option<AuditResult>, StorageError> {
        read_json(&self.audit_dir.join(LATEST_FILE))
    }

    pub fn load_snapshot(&self, date: NaiveDate) -> Result<Option<AuditResult>, StorageError> {
        read_json(&retention::snapshot_path(&self.snapshots_dir, date))
    }

    /// `load_snapshot` for a `YYYY-MM-DD` string.
    pub fn load_snapshot_str(&self, date: &str) -> Result<Option<AuditResult>, StorageError> {
        let parsed = NaiveDate::parse_from_str(date, SNAPSHOT_DATE_FORMAT).map_err(|_| {
            StorageError::InvalidSnapshotDate {
                value: date.to_string(),
            }
        })?;
        self.load_snapshot(parsed)
    }

    /// Snapshot dates, newest first.
    pub fn list_snapshots(&self) -> Result<Vec<NaiveDate>, StorageError> {
        let mut dates = retention::list_snapshot_dates(&self.snapshots_dir)?;
        dates.reverse();
        Ok(dates)
    }

    pub fn compare_audits(&self, current: &AuditResult, previous: &AuditResult) -> DegradationResult {
        self.detector.compare(current, previous)
    }

    /// `None` until the first audit has been saved.
    pub fn get_degradation_tracking(&self) -> Result<Option<DegradationTracking>, StorageError> {
        let Some(file) = read_json::<HistoryFile>(&self.audit_dir.join(DEGRADATION_FILE))? else {
            return Ok(None);
        };
        if file.history.is_empty() {
            return Ok(None);
        }
        Ok(Some(self.analyzer.track(file.history)))
    }

    /// Enforce retention. Returns the number of snapshots deleted.
    ///
    /// Does not wait: fails with `StorageError::Locked` while a save holds
    /// the store.
    pub fn cleanup_snapshots(&self) -> Result<usize, StorageError> {
        let mut lock = StoreLock::open(&self.audit_dir)?;
        let _guard = lock.try_write()?;
        Ok(self.prune()?.deleted.len())
    }

    fn prune(&self) -> Result<RetentionReport, StorageError> {
        let policy = RetentionPolicy {
            max_snapshots: self.config.snapshot_retention,
        };
        retention::apply_retention(&self.snapshots_dir, &policy)
    }

    fn load_history(&self) -> Result<Vec<AuditHistoryEntry>, StorageError> {
        match read_json::<HistoryFile>(&self.audit_dir.join(DEGRADATION_FILE)) {
            Ok(file) => Ok(file.map(|f| f.history).unwrap_or_default()),
            Err(StorageError::Serialization { path, message }) => {
                tracing::warn!(%path, error = %message, "unreadable audit history; starting a new one");
                Ok(Vec::new())
            }
            Err(e) => Err(e),
        }
    }
}

/// Replace the entry for the same date, or insert keeping date order.
fn upsert_entry(history: &mut Vec<AuditHistoryEntry>, entry: AuditHistoryEntry) {
    match history.iter_mut().find(|e| e.date == entry.date) {
        Some(existing) => *existing = entry,
        None => {
            history.push(entry);
            history.sort_by_key(|e| e.date);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use drift_analysis::enforcement::audit::AuditEngine;

    #[test]
    fn test_new_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        AuditStore::new(dir.path(), AuditStoreConfig::default()).unwrap();
        let store = AuditStore::new(dir.path(), AuditStoreConfig::default()).unwrap();
        assert!(store.snapshots_dir().is_dir());
        assert!(store.load_latest().unwrap().is_none());
        assert!(store.get_degradation_tracking().unwrap().is_none());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = AuditStore::new(dir.path(), AuditStoreConfig::default()).unwrap();
        let at = Utc.with_ymd_and_hms(2026, 4, 2, 9, 30, 0).unwrap();
        let audit = AuditEngine::default().run_audit_at(&[], at);

        store.save_audit(&audit).unwrap();

        assert_eq!(store.load_latest().unwrap(), Some(audit.clone()));
        assert_eq!(store.load_snapshot_str("2026-04-02").unwrap(), Some(audit));
        assert!(store.load_snapshot_str("2026-04-03").unwrap().is_none());
        assert!(matches!(
            store.load_snapshot_str("April 2"),
            Err(StorageError::InvalidSnapshotDate { .. })
        ));
    }
}
