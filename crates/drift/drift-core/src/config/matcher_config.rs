//! Pattern matcher configuration.

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_CACHE_MAX_ENTRIES, DEFAULT_CACHE_TTL_MS};

/// Configuration for the pattern matcher and its result cache.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct MatcherConfig {
    /// Enable the per-(file, pattern) result cache. Default: true.
    pub cache_enabled: Option<bool>,
    /// Cache entry time-to-live in milliseconds. Default: 60000.
    pub cache_ttl_ms: Option<u64>,
    /// Maximum cache entries before oldest-first eviction. Default: 1000.
    pub cache_max_entries: Option<usize>,
}

impl MatcherConfig {
    pub fn effective_cache_enabled(&self) -> bool {
        self.cache_enabled.unwrap_or(true)
    }

    pub fn effective_cache_ttl_ms(&self) -> u64 {
        self.cache_ttl_ms.unwrap_or(DEFAULT_CACHE_TTL_MS)
    }

    pub fn effective_cache_max_entries(&self) -> usize {
        self.cache_max_entries.unwrap_or(DEFAULT_CACHE_MAX_ENTRIES)
    }
}
