//! Per-(file, pattern) match result cache with TTL and content-hash invalidation.
//!
//! Eviction at capacity removes the single oldest entry by insertion time.
//! Entries hold unfiltered results so they can be reused across filter options.

use std::time::{Duration, Instant};

use serde::Serialize;
use xxhash_rust::xxh3::xxh3_64;

use drift_core::types::collections::FxHashMap;

use super::types::PatternMatchResult;

/// xxh3 hash of file content, stored with each entry.
pub fn content_hash(content: &str) -> u64 {
    xxh3_64(content.as_bytes())
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    file: String,
    pattern_id: String,
}

#[derive(Debug, Clone)]
struct CacheEntry {
    results: Vec<PatternMatchResult>,
    inserted_at: Instant,
    content_hash: u64,
}

/// Cache counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
    pub stale_invalidations: u64,
    pub hash_invalidations: u64,
    pub evictions: u64,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let lookups = self.hits + self.misses;
        if lookups == 0 {
            0.0
        } else {
            self.hits as f64 / lookups as f64
        }
    }
}

/// Single-writer cache; the matcher guards it with a mutex.
#[derive(Debug)]
pub struct MatchCache {
    entries: FxHashMap<CacheKey, CacheEntry>,
    ttl: Duration,
    max_entries: usize,
    stats: CacheStats,
}

impl MatchCache {
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            entries: FxHashMap::default(),
            ttl,
            max_entries: max_entries.max(1),
            stats: CacheStats::default(),
        }
    }

    pub fn get(&mut self, file: &str, pattern_id: &str, hash: u64) -> Option<Vec<PatternMatchResult>> {
        self.get_at(file, pattern_id, hash, Instant::now())
    }

    /// Look up an entry as of `now`. Stale or hash-mismatched entries are
    /// dropped and reported as misses.
    pub fn get_at(
        &mut self,
        file: &str,
        pattern_id: &str,
        hash: u64,
        now: Instant,
    ) -> Option<Vec<PatternMatchResult>> {
        let key = CacheKey {
            file: file.to_string(),
            pattern_id: pattern_id.to_string(),
        };

        let Some(entry) = self.entries.get(&key) else {
            self.stats.misses += 1;
            return None;
        };

        if now.saturating_duration_since(entry.inserted_at) > self.ttl {
            tracing::trace!(file, pattern_id, "match cache entry expired");
            self.entries.remove(&key);
            self.stats.stale_invalidations += 1;
            self.stats.misses += 1;
            return None;
        }

        if entry.content_hash != hash {
            tracing::trace!(file, pattern_id, "match cache entry content changed");
            self.entries.remove(&key);
            self.stats.hash_invalidations += 1;
            self.stats.misses += 1;
            return None;
        }

        self.stats.hits += 1;
        Some(entry.results.clone())
    }

    pub fn insert(&mut self, file: &str, pattern_id: &str, hash: u64, results: Vec<PatternMatchResult>) {
        self.insert_at(file, pattern_id, hash, results, Instant::now());
    }

    /// Store results for (file, pattern), replacing any previous entry.
    pub fn insert_at(
        &mut self,
        file: &str,
        pattern_id: &str,
        hash: u64,
        results: Vec<PatternMatchResult>,
        now: Instant,
    ) {
        let key = CacheKey {
            file: file.to_string(),
            pattern_id: pattern_id.to_string(),
        };

        if !self.entries.contains_key(&key) && self.entries.len() >= self.max_entries {
            self.evict_oldest();
        }

        self.entries.insert(
            key,
            CacheEntry {
                results,
                inserted_at: now,
                content_hash: hash,
            },
        );
    }

    fn evict_oldest(&mut self) {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|(_, entry)| entry.inserted_at)
            .map(|(key, _)| key.clone());
        if let Some(key) = oldest {
            self.entries.remove(&key);
            self.stats.evictions += 1;
        }
    }

    /// Drop every entry for `file`. Returns the number removed.
    pub fn invalidate_file(&mut self, file: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|key, _| key.file != file);
        before - self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.entries.len(),
            ..self.stats
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::types::{MatchLocation, MatchType};
    use chrono::Utc;

    fn result(pattern_id: &str) -> PatternMatchResult {
        PatternMatchResult {
            pattern_id: pattern_id.to_string(),
            location: MatchLocation {
                file: "a.ts".into(),
                line: 1,
                column: 1,
                end_line: None,
                end_column: None,
            },
            confidence: 1.0,
            match_type: MatchType::Regex,
            matched_text: None,
            ast_node: None,
            captures: None,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_hit_within_ttl() {
        let mut cache = MatchCache::new(Duration::from_secs(60), 10);
        let t0 = Instant::now();
        cache.insert_at("a.ts", "p", 1, vec![result("p")], t0);
        let hit = cache.get_at("a.ts", "p", 1, t0 + Duration::from_secs(30));
        assert_eq!(hit.map(|r| r.len()), Some(1));
        assert_eq!(cache.stats().hits, 1);
    }

    #[test]
    fn test_expired_entry_is_a_miss() {
        let mut cache = MatchCache::new(Duration::from_secs(60), 10);
        let t0 = Instant::now();
        cache.insert_at("a.ts", "p", 1, vec![result("p")], t0);
        assert!(cache.get_at("a.ts", "p", 1, t0 + Duration::from_secs(61)).is_none());
        assert_eq!(cache.stats().stale_invalidations, 1);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_hash_mismatch_is_a_miss() {
        let mut cache = MatchCache::new(Duration::from_secs(60), 10);
        let t0 = Instant::now();
        cache.insert_at("a.ts", "p", content_hash("old"), vec![result("p")], t0);
        assert!(cache.get_at("a.ts", "p", content_hash("new"), t0).is_none());
        assert_eq!(cache.stats().hash_invalidations, 1);
    }

    #[test]
    fn test_evicts_oldest_insertion_not_least_recently_used() {
        let mut cache = MatchCache::new(Duration::from_secs(600), 2);
        let t0 = Instant::now();
        cache.insert_at("a.ts", "p", 1, vec![], t0);
        cache.insert_at("b.ts", "p", 1, vec![], t0 + Duration::from_secs(1));
        // Touch the oldest entry; insertion order still decides.
        assert!(cache.get_at("a.ts", "p", 1, t0 + Duration::from_secs(2)).is_some());
        cache.insert_at("c.ts", "p", 1, vec![], t0 + Duration::from_secs(3));

        assert_eq!(cache.len(), 2);
        assert!(cache.get_at("a.ts", "p", 1, t0 + Duration::from_secs(4)).is_none());
        assert!(cache.get_at("b.ts", "p", 1, t0 + Duration::from_secs(4)).is_some());
        assert_eq!(cache.stats().evictions, 1);
    }

    #[test]
    fn test_replacing_existing_key_does_not_evict() {
        let mut cache = MatchCache::new(Duration::from_secs(600), 1);
        let t0 = Instant::now();
        cache.insert_at("a.ts", "p", 1, vec![], t0);
        cache.insert_at("a.ts", "p", 2, vec![result("p")], t0);
        assert_eq!(cache.stats().evictions, 0);
        assert_eq!(cache.get_at("a.ts", "p", 2, t0).map(|r| r.len()), Some(1));
    }

    #[test]
    fn test_invalidate_file() {
        let mut cache = MatchCache::new(Duration::from_secs(600), 10);
        cache.insert("a.ts", "p1", 1, vec![]);
        cache.insert("a.ts", "p2", 1, vec![]);
        cache.insert("b.ts", "p1", 1, vec![]);
        assert_eq!(cache.invalidate_file("a.ts"), 2);
        assert_eq!(cache.len(), 1);
    }
}
