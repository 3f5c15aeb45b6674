//! Tracing initialization tests.

use drift_core::tracing::init_tracing;

#[test]
fn test_init_tracing_is_idempotent() {
    init_tracing();
    init_tracing();
    tracing::info!(target: "drift", "tracing initialized twice without panic");
}

#[test]
fn test_metric_field_names_are_unique_snake_case() {
    use drift_core::tracing::metrics;
    let names = [
        metrics::MATCH_DURATION_MS,
        metrics::CACHE_HIT_RATE,
        metrics::CACHE_EVICTIONS,
        metrics::MATCH_ERRORS,
        metrics::AUDIT_DURATION_MS,
        metrics::HEALTH_SCORE,
        metrics::DUPLICATE_GROUPS,
        metrics::SNAPSHOT_COUNT,
        metrics::SNAPSHOTS_PRUNED,
    ];
    let unique: std::collections::HashSet<_> = names.iter().collect();
    assert_eq!(unique.len(), names.len());
    for name in names {
        assert!(name.chars().all(|c| c.is_ascii_lowercase() || c == '_'), "{name}");
    }
}
