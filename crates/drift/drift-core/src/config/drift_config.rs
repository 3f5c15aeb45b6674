//! Top-level Drift configuration with layered resolution.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::{AuditConfig, ConfidenceConfig, MatcherConfig, StorageConfig};
use crate::constants::WEIGHT_SUM_TOLERANCE;
use crate::errors::ConfigError;

/// Top-level configuration aggregating all sub-configs.
///
/// Resolution order (highest priority first):
/// 1. Programmatic overrides (`ConfigOverrides`)
/// 2. Environment variables (`DRIFT_*`)
/// 3. Project config (`drift.toml` in project root)
/// 4. User config (`~/.drift/config.toml`)
/// 5. Compiled defaults
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DriftConfig {
    pub matcher: MatcherConfig,
    pub confidence: ConfidenceConfig,
    pub audit: AuditConfig,
    pub storage: StorageConfig,
}

/// Overrides applied on top of every other layer.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub cache_enabled: Option<bool>,
    pub cache_ttl_ms: Option<u64>,
    pub auto_approve_threshold: Option<f64>,
    pub snapshot_retention: Option<usize>,
}

impl DriftConfig {
    /// Load configuration with layered resolution rooted at `root`.
    pub fn load(root: &Path, overrides: Option<&ConfigOverrides>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        // Lowest priority: user config
        if let Some(user_config_path) = Self::user_config_path() {
            if user_config_path.exists() {
                match Self::merge_toml_file(&mut config, &user_config_path) {
                    Ok(()) => {}
                    Err(e @ ConfigError::ParseError { .. }) => return Err(e),
                    Err(e) => {
                        tracing::warn!(
                            path = %user_config_path.display(),
                            error = %e,
                            "ignoring unreadable user config"
                        );
                    }
                }
            }
        }

        let project_config_path = root.join("drift.toml");
        if project_config_path.exists() {
            Self::merge_toml_file(&mut config, &project_config_path)?;
        }

        Self::apply_env_overrides(&mut config);

        if let Some(overrides) = overrides {
            Self::apply_overrides(&mut config, overrides);
        }

        Self::validate(&config)?;

        Ok(config)
    }

    /// Load configuration from a TOML string (for testing).
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
            path: "<string>".to_string(),
            message: e.to_string(),
        })
    }

    /// Validate the configuration values.
    pub fn validate(config: &DriftConfig) -> Result<(), ConfigError> {
        let unit_fields = [
            ("audit.auto_approve_threshold", config.audit.auto_approve_threshold),
            ("audit.review_threshold", config.audit.review_threshold),
            (
                "audit.duplicate_similarity_threshold",
                config.audit.duplicate_similarity_threshold,
            ),
            ("audit.max_outlier_ratio", config.audit.max_outlier_ratio),
            ("audit.outlier_warning_ratio", config.audit.outlier_warning_ratio),
            ("confidence.weight_frequency", config.confidence.weight_frequency),
            ("confidence.weight_consistency", config.confidence.weight_consistency),
            ("confidence.weight_age", config.confidence.weight_age),
            ("confidence.weight_spread", config.confidence.weight_spread),
            ("confidence.min_age_factor", config.confidence.min_age_factor),
        ];
        for (field, value) in unit_fields {
            if let Some(v) = value {
                if !(0.0..=1.0).contains(&v) {
                    return Err(ConfigError::ValidationFailed {
                        field: field.to_string(),
                        message: "must be between 0.0 and 1.0".to_string(),
                    });
                }
            }
        }

        let sum = config.confidence.weight_sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(ConfigError::ValidationFailed {
                field: "confidence".to_string(),
                message: format!("weights must sum to 1.0 (got {sum:.4})"),
            });
        }

        if config.confidence.effective_max_age_days() <= 0.0 {
            return Err(ConfigError::ValidationFailed {
                field: "confidence.max_age_days".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }

        if config.audit.effective_review_threshold() > config.audit.effective_auto_approve_threshold()
        {
            return Err(ConfigError::ValidationFailed {
                field: "audit.review_threshold".to_string(),
                message: "must not exceed audit.auto_approve_threshold".to_string(),
            });
        }

        if config.matcher.cache_max_entries == Some(0) {
            return Err(ConfigError::ValidationFailed {
                field: "matcher.cache_max_entries".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }
        if config.storage.snapshot_retention == Some(0) {
            return Err(ConfigError::ValidationFailed {
                field: "storage.snapshot_retention".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }
        if config.storage.effective_health_critical_drop()
            < config.storage.effective_health_warning_drop()
        {
            return Err(ConfigError::ValidationFailed {
                field: "storage.health_critical_drop".to_string(),
                message: "must not be below storage.health_warning_drop".to_string(),
            });
        }
        Ok(())
    }

    /// Returns the user config path: `~/.drift/config.toml`.
    fn user_config_path() -> Option<PathBuf> {
        dirs_path().map(|d| d.join("config.toml"))
    }

    /// Merge a TOML file into the existing config.
    /// Unknown keys are silently ignored (forward-compatible).
    fn merge_toml_file(config: &mut DriftConfig, path: &Path) -> Result<(), ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;

        let file_config: DriftConfig =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;

        Self::merge(config, &file_config);
        Ok(())
    }

    /// Merge `other` into `base`; `other` wins only where it has a `Some` value.
    fn merge(base: &mut DriftConfig, other: &DriftConfig) {
        macro_rules! take {
            ($section:ident . $field:ident) => {
                if other.$section.$field.is_some() {
                    base.$section.$field = other.$section.$field;
                }
            };
        }

        take!(matcher.cache_enabled);
        take!(matcher.cache_ttl_ms);
        take!(matcher.cache_max_entries);

        take!(confidence.weight_frequency);
        take!(confidence.weight_consistency);
        take!(confidence.weight_age);
        take!(confidence.weight_spread);
        take!(confidence.min_age_factor);
        take!(confidence.max_age_days);

        take!(audit.auto_approve_threshold);
        take!(audit.review_threshold);
        take!(audit.duplicate_similarity_threshold);
        take!(audit.min_locations_for_established);
        take!(audit.max_outlier_ratio);
        take!(audit.outlier_warning_ratio);
        if !other.audit.categories.is_empty() {
            base.audit.categories = other.audit.categories.clone();
        }

        take!(storage.snapshot_retention);
        take!(storage.health_warning_drop);
        take!(storage.health_critical_drop);
        take!(storage.trend_stability_band);
        take!(storage.confidence_warning_drop);
        take!(storage.confidence_critical_drop);
        take!(storage.false_positive_min_increase);
        take!(storage.false_positive_growth_ratio);
    }

    /// Apply environment variable overrides.
    /// Pattern: `DRIFT_MATCHER_CACHE_TTL_MS`, `DRIFT_AUDIT_AUTO_APPROVE_THRESHOLD`, etc.
    /// Unparseable values are ignored.
    fn apply_env_overrides(config: &mut DriftConfig) {
        if let Some(v) = env_parse::<bool>("DRIFT_MATCHER_CACHE_ENABLED") {
            config.matcher.cache_enabled = Some(v);
        }
        if let Some(v) = env_parse::<u64>("DRIFT_MATCHER_CACHE_TTL_MS") {
            config.matcher.cache_ttl_ms = Some(v);
        }
        if let Some(v) = env_parse::<usize>("DRIFT_MATCHER_CACHE_MAX_ENTRIES") {
            config.matcher.cache_max_entries = Some(v);
        }
        if let Some(v) = env_parse::<f64>("DRIFT_AUDIT_AUTO_APPROVE_THRESHOLD") {
            config.audit.auto_approve_threshold = Some(v);
        }
        if let Some(v) = env_parse::<f64>("DRIFT_AUDIT_REVIEW_THRESHOLD") {
            config.audit.review_threshold = Some(v);
        }
        if let Some(v) = env_parse::<f64>("DRIFT_AUDIT_DUPLICATE_SIMILARITY_THRESHOLD") {
            config.audit.duplicate_similarity_threshold = Some(v);
        }
        if let Some(v) = env_parse::<usize>("DRIFT_STORAGE_SNAPSHOT_RETENTION") {
            config.storage.snapshot_retention = Some(v);
        }
    }

    fn apply_overrides(config: &mut DriftConfig, overrides: &ConfigOverrides) {
        if let Some(v) = overrides.cache_enabled {
            config.matcher.cache_enabled = Some(v);
        }
        if let Some(v) = overrides.cache_ttl_ms {
            config.matcher.cache_ttl_ms = Some(v);
        }
        if let Some(v) = overrides.auto_approve_threshold {
            config.audit.auto_approve_threshold = Some(v);
        }
        if let Some(v) = overrides.snapshot_retention {
            config.storage.snapshot_retention = Some(v);
        }
    }

    /// Serialize the config back to TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError {
            path: "<serialization>".to_string(),
            message: e.to_string(),
        })
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

/// Returns the user-level drift config directory: `~/.drift/`.
fn dirs_path() -> Option<PathBuf> {
    home_dir().map(|h| h.join(".drift"))
}

/// Cross-platform home directory resolution.
fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
}
