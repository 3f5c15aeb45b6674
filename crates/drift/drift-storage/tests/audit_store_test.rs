//! Audit store integration tests against a temp project root.

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use drift_analysis::enforcement::audit::{
    AlertSeverity, AlertType, AuditEngine, AuditResult, PatternGrowth, TrendDirection,
};
use drift_analysis::patterns::confidence::ConfidenceScore;
use drift_analysis::patterns::{Pattern, PatternLocation, PatternMetadata, PatternStatus};
use drift_core::config::StorageConfig;
use drift_core::errors::StorageError;
use drift_storage::{AuditStore, AuditStoreConfig};
use tempfile::TempDir;

fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap()
}

fn patterns(count: usize, confidence: f64) -> Vec<Pattern> {
    (0..count)
        .map(|i| Pattern {
            id: format!("p{i}"),
            name: format!("pattern {i}"),
            category: format!("cat{i}"),
            confidence: ConfidenceScore::from_value(confidence),
            locations: (1..=3).map(|l| PatternLocation::new(format!("src/f{i}.ts"), l, 1)).collect(),
            outliers: Vec::new(),
            status: PatternStatus::Discovered,
            metadata: PatternMetadata::seen_at(start()),
        })
        .collect()
}

fn audit_at(at: DateTime<Utc>, count: usize, confidence: f64) -> AuditResult {
    AuditEngine::default().run_audit_at(&patterns(count, confidence), at)
}

fn store(dir: &TempDir) -> AuditStore {
    AuditStore::new(dir.path(), AuditStoreConfig::default()).unwrap()
}

#[test]
fn test_retention_keeps_the_most_recent_thirty() {
    let dir = TempDir::new().unwrap();
    let store = store(&dir);

    for day in 0..35 {
        store.save_audit(&audit_at(start() + Duration::days(day), 2, 0.9)).unwrap();
    }

    let dates = store.list_snapshots().unwrap();
    assert_eq!(dates.len(), 30);
    assert_eq!(dates[0], (start() + Duration::days(34)).date_naive());
    assert_eq!(dates[29], (start() + Duration::days(5)).date_naive());
    assert!(dates.windows(2).all(|w| w[0] > w[1]));
    assert!(store.load_snapshot(start().date_naive()).unwrap().is_none());
}

#[test]
fn test_same_day_save_replaces_snapshot_and_history_entry() {
    let dir = TempDir::new().unwrap();
    let store = store(&dir);

    let morning = audit_at(start(), 2, 0.9);
    let evening = audit_at(start() + Duration::hours(8), 5, 0.6);
    store.save_audit(&morning).unwrap();
    store.save_audit(&evening).unwrap();

    assert_eq!(store.list_snapshots().unwrap().len(), 1);
    assert_eq!(store.load_snapshot(start().date_naive()).unwrap(), Some(evening.clone()));

    let tracking = store.get_degradation_tracking().unwrap().unwrap();
    assert_eq!(tracking.history.len(), 1);
    assert_eq!(tracking.history[0].total_patterns, 5);
    assert_eq!(tracking.history[0].health_score, evening.summary.health_score);
}

#[test]
fn test_tracking_is_absent_before_first_save() {
    let dir = TempDir::new().unwrap();
    assert!(store(&dir).get_degradation_tracking().unwrap().is_none());
}

#[test]
fn test_tracking_classifies_history_trajectory() {
    let dir = TempDir::new().unwrap();
    let store = store(&dir);

    // Confidence rises day over day while the pattern count grows by two.
    for day in 0..6i64 {
        let confidence = 0.5 + 0.08 * day as f64;
        let audit = audit_at(start() + Duration::days(day), 2 + 2 * day as usize, confidence);
        store.save_audit(&audit).unwrap();
    }

    let tracking = store.get_degradation_tracking().unwrap().unwrap();
    assert_eq!(tracking.history.len(), 6);
    assert!(tracking.history.windows(2).all(|w| w[0].date < w[1].date));
    assert_eq!(tracking.trends.health_trend, TrendDirection::Improving);
    assert_eq!(tracking.trends.confidence_trend, TrendDirection::Improving);
    assert_eq!(tracking.trends.pattern_growth, PatternGrowth::Healthy);

    let prediction = tracking.prediction.unwrap();
    assert!(prediction.slope > 0.0);
    assert!(prediction.predicted_score_30d <= 100.0);
}

#[test]
fn test_record_audit_attaches_degradation() {
    let dir = TempDir::new().unwrap();
    let store = store(&dir);

    let first = store.record_audit(audit_at(start(), 3, 0.95)).unwrap();
    assert!(first.degradation.is_none());

    let second = store
        .record_audit(audit_at(start() + Duration::days(1), 3, 0.3))
        .unwrap();
    let degradation = second.degradation.as_ref().unwrap();
    assert_eq!(degradation.trend, TrendDirection::Declining);
    assert!(degradation
        .alerts
        .iter()
        .any(|a| a.alert_type == AlertType::HealthDrop && a.severity == AlertSeverity::Critical));
    assert!(degradation
        .alerts
        .iter()
        .any(|a| a.alert_type == AlertType::ConfidenceDrop));

    assert_eq!(store.load_latest().unwrap(), Some(second));
}

#[test]
fn test_compare_audits_calibration() {
    let dir = TempDir::new().unwrap();
    let store = store(&dir);

    let with_health = |score: f64| {
        let mut audit = audit_at(start(), 1, 0.9);
        audit.summary.health_score = score;
        audit
    };

    let critical = store.compare_audits(&with_health(70.0), &with_health(90.0));
    assert!(critical.alerts.iter().any(|a| a.severity == AlertSeverity::Critical));

    let warning = store.compare_audits(&with_health(82.0), &with_health(90.0));
    assert_eq!(warning.alerts.len(), 1);
    assert_eq!(warning.alerts[0].severity, AlertSeverity::Warning);

    let stable = store.compare_audits(&with_health(86.0), &with_health(85.0));
    assert_eq!(stable.trend, TrendDirection::Stable);
}

#[test]
fn test_configured_retention_and_cleanup() {
    let dir = TempDir::new().unwrap();
    let config = StorageConfig {
        snapshot_retention: Some(3),
        ..StorageConfig::default()
    };
    let store = AuditStore::from_config(dir.path(), &config).unwrap();

    for day in 0..5 {
        store.save_audit(&audit_at(start() + Duration::days(day), 1, 0.9)).unwrap();
    }
    assert_eq!(store.list_snapshots().unwrap().len(), 3);

    // A snapshot dropped in by hand is pruned on the next cleanup.
    let extra = NaiveDate::from_ymd_opt(2025, 12, 1).unwrap();
    std::fs::write(store.snapshots_dir().join(format!("{extra}.json")), "{}").unwrap();
    assert_eq!(store.cleanup_snapshots().unwrap(), 1);
    assert!(!store.list_snapshots().unwrap().contains(&extra));
}

#[test]
fn test_artifacts_are_camel_case_json() {
    let dir = TempDir::new().unwrap();
    let store = store(&dir);
    store.save_audit(&audit_at(start(), 1, 0.95)).unwrap();

    let latest: serde_json::Value =
        serde_json::from_slice(&std::fs::read(store.audit_dir().join("latest.json")).unwrap()).unwrap();
    assert!(latest["scanHash"].is_string());
    assert!(latest["summary"]["healthScore"].is_number());

    let history: serde_json::Value =
        serde_json::from_slice(&std::fs::read(store.audit_dir().join("degradation.json")).unwrap()).unwrap();
    assert_eq!(history["history"][0]["date"], "2026-01-01");
    assert!(history["lastUpdated"].is_string());
}

#[test]
fn test_corrupt_history_is_replaced_on_next_save() {
    let dir = TempDir::new().unwrap();
    let store = store(&dir);
    store.save_audit(&audit_at(start(), 2, 0.9)).unwrap();
    std::fs::write(store.audit_dir().join("degradation.json"), "{oops").unwrap();

    let next = audit_at(start() + Duration::days(1), 3, 0.9);
    store.save_audit(&next).unwrap();

    assert_eq!(store.load_latest().unwrap(), Some(next.clone()));
    let tracking = store.get_degradation_tracking().unwrap().unwrap();
    assert_eq!(tracking.history.len(), 1);
    assert_eq!(tracking.history[0].date, next.date());

    store.save_audit(&audit_at(start() + Duration::days(2), 3, 0.9)).unwrap();
    assert_eq!(store.get_degradation_tracking().unwrap().unwrap().history.len(), 2);
}

#[test]
fn test_unreadable_history_leaves_artifacts_untouched() {
    let dir = TempDir::new().unwrap();
    let store = store(&dir);
    let first = audit_at(start(), 2, 0.9);
    store.save_audit(&first).unwrap();

    // A directory where the history file belongs cannot be read.
    let history = store.audit_dir().join("degradation.json");
    std::fs::remove_file(&history).unwrap();
    std::fs::create_dir(&history).unwrap();

    let err = store.save_audit(&audit_at(start() + Duration::days(1), 3, 0.9)).unwrap_err();
    assert!(matches!(err, StorageError::Io { .. }));
    assert_eq!(store.load_latest().unwrap(), Some(first));
    assert_eq!(store.list_snapshots().unwrap(), vec![start().date_naive()]);
}

#[test]
fn test_concurrent_saves_wait_for_the_lock() {
    let dir = TempDir::new().unwrap();
    let handles: Vec<_> = (0..8)
        .map(|day| {
            let root = dir.path().to_path_buf();
            std::thread::spawn(move || {
                let store = AuditStore::new(&root, AuditStoreConfig::default()).unwrap();
                store.save_audit(&audit_at(start() + Duration::days(day), 2, 0.9))
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap().unwrap();
    }

    let store = store(&dir);
    assert_eq!(store.list_snapshots().unwrap().len(), 8);
    assert_eq!(store.get_degradation_tracking().unwrap().unwrap().history.len(), 8);
}
