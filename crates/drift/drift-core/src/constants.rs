//! Shared constants for the Drift pattern audit engine.

/// Schema version stamped on every persisted audit result.
pub const AUDIT_SCHEMA_VERSION: &str = "1.0.0";

// ---- Matcher ----

/// Default match-cache time-to-live in milliseconds.
pub const DEFAULT_CACHE_TTL_MS: u64 = 60_000;

/// Default match-cache capacity (entries).
pub const DEFAULT_CACHE_MAX_ENTRIES: usize = 1000;

// ---- Confidence ----

/// Default factor weights. Must sum to 1.0.
pub const DEFAULT_WEIGHT_FREQUENCY: f64 = 0.40;
pub const DEFAULT_WEIGHT_CONSISTENCY: f64 = 0.30;
pub const DEFAULT_WEIGHT_AGE: f64 = 0.15;
pub const DEFAULT_WEIGHT_SPREAD: f64 = 0.15;

/// Tolerance when checking that confidence weights sum to 1.0.
pub const WEIGHT_SUM_TOLERANCE: f64 = 0.001;

/// Age factor for a pattern first seen today.
pub const DEFAULT_MIN_AGE_FACTOR: f64 = 0.1;

/// Days after which the age factor saturates at 1.0.
pub const DEFAULT_MAX_AGE_DAYS: f64 = 30.0;

// ---- Audit engine ----

pub const DEFAULT_AUTO_APPROVE_THRESHOLD: f64 = 0.90;
pub const DEFAULT_REVIEW_THRESHOLD: f64 = 0.70;
pub const DEFAULT_DUPLICATE_SIMILARITY_THRESHOLD: f64 = 0.85;
pub const DEFAULT_MIN_LOCATIONS_FOR_ESTABLISHED: usize = 3;
pub const DEFAULT_MAX_OUTLIER_RATIO: f64 = 0.50;
pub const DEFAULT_OUTLIER_WARNING_RATIO: f64 = 0.50;

// ---- Audit store ----

/// Maximum dated snapshots kept on disk.
pub const DEFAULT_SNAPSHOT_RETENTION: usize = 30;

/// Health drop (points) that raises a warning alert.
pub const DEFAULT_HEALTH_WARNING_DROP: f64 = 5.0;

/// Health drop (points) that raises a critical alert.
pub const DEFAULT_HEALTH_CRITICAL_DROP: f64 = 15.0;

/// Health deltas within ±band are classified as stable.
pub const DEFAULT_TREND_STABILITY_BAND: f64 = 2.0;

pub const DEFAULT_CONFIDENCE_WARNING_DROP: f64 = 0.05;
pub const DEFAULT_CONFIDENCE_CRITICAL_DROP: f64 = 0.15;

/// Minimum absolute rise in likely false positives before alerting.
pub const DEFAULT_FALSE_POSITIVE_MIN_INCREASE: usize = 5;

/// Minimum relative rise (current / previous) in likely false positives.
pub const DEFAULT_FALSE_POSITIVE_GROWTH_RATIO: f64 = 1.5;

/// Directory (relative to the project root) holding audit artifacts.
pub const AUDIT_DIR: &str = ".drift/audit";
