//! Structured span field definitions for Drift metrics.
//!
//! These constants define the standard field names used in tracing events
//! across the matcher, scorer, audit engine and audit store.

/// Matcher: wall time of one `match_all` call in milliseconds.
pub const MATCH_DURATION_MS: &str = "match_duration_ms";

/// Matcher: cache hit rate (0.0 - 1.0).
pub const CACHE_HIT_RATE: &str = "cache_hit_rate";

/// Matcher: number of cache entries evicted at capacity.
pub const CACHE_EVICTIONS: &str = "cache_evictions";

/// Matcher: number of recoverable per-pattern errors in one call.
pub const MATCH_ERRORS: &str = "match_errors";

/// Audit: wall time of one audit run in milliseconds.
pub const AUDIT_DURATION_MS: &str = "audit_duration_ms";

/// Audit: resulting health score (0 - 100).
pub const HEALTH_SCORE: &str = "health_score";

/// Audit: number of duplicate groups detected.
pub const DUPLICATE_GROUPS: &str = "duplicate_groups";

/// Store: number of snapshots remaining after retention.
pub const SNAPSHOT_COUNT: &str = "snapshot_count";

/// Store: number of snapshots pruned in one cleanup pass.
pub const SNAPSHOTS_PRUNED: &str = "snapshots_pruned";
