//! Pattern matcher: gating, strategy dispatch, caching and per-call filtering.

use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use chrono::Utc;

use drift_core::config::MatcherConfig;
use drift_core::constants::{DEFAULT_CACHE_MAX_ENTRIES, DEFAULT_CACHE_TTL_MS};
use drift_core::errors::DetectionError;
use drift_core::tracing::metrics;

use super::cache::{content_hash, CacheStats, MatchCache};
use super::types::{
    MatchAllResult, MatchOptions, MatchStrategy, MatchType, MatcherContext, MatchingError,
    PatternDefinition, PatternMatchResult,
};
use super::regex_engine::{self, CompiledRegexes};
use super::{ast, paths, structural};

/// Resolved construction options for a `PatternMatcher`.
#[derive(Debug, Clone, Copy)]
pub struct MatcherOptions {
    pub cache_enabled: bool,
    pub cache_ttl: Duration,
    pub cache_max_entries: usize,
}

impl Default for MatcherOptions {
    fn default() -> Self {
        Self {
            cache_enabled: true,
            cache_ttl: Duration::from_millis(DEFAULT_CACHE_TTL_MS),
            cache_max_entries: DEFAULT_CACHE_MAX_ENTRIES,
        }
    }
}

impl From<&MatcherConfig> for MatcherOptions {
    fn from(config: &MatcherConfig) -> Self {
        Self {
            cache_enabled: config.effective_cache_enabled(),
            cache_ttl: Duration::from_millis(config.effective_cache_ttl_ms()),
            cache_max_entries: config.effective_cache_max_entries(),
        }
    }
}

/// Evaluates pattern definitions against files.
///
/// Safe to share across threads: the cache sits behind a mutex.
#[derive(Debug)]
pub struct PatternMatcher {
    options: MatcherOptions,
    cache: Mutex<MatchCache>,
    regexes: CompiledRegexes,
}

impl PatternMatcher {
    pub fn new(options: MatcherOptions) -> Self {
        Self {
            cache: Mutex::new(MatchCache::new(options.cache_ttl, options.cache_max_entries)),
            regexes: CompiledRegexes::new(),
            options,
        }
    }

    pub fn from_config(config: &MatcherConfig) -> Self {
        Self::new(MatcherOptions::from(config))
    }

    pub fn options(&self) -> &MatcherOptions {
        &self.options
    }

    /// Match one pattern against one file.
    ///
    /// Strategy failures are logged and yield no matches.
    pub fn match_pattern(
        &self,
        ctx: &MatcherContext,
        pattern: &PatternDefinition,
        options: &MatchOptions,
    ) -> Vec<PatternMatchResult> {
        match self.try_match(ctx, pattern, options) {
            Ok(results) => results,
            Err(e) => {
                tracing::warn!(
                    pattern_id = %pattern.id,
                    file = %ctx.file,
                    error = %e,
                    "pattern strategy failed; treating as no matches"
                );
                Vec::new()
            }
        }
    }

    /// Match one pattern against one file, surfacing strategy failures.
    ///
    /// A missing parse tree is not a failure: it yields no matches.
    pub fn try_match(
        &self,
        ctx: &MatcherContext,
        pattern: &PatternDefinition,
        options: &MatchOptions,
    ) -> Result<Vec<PatternMatchResult>, DetectionError> {
        if !self.is_applicable(ctx, pattern) {
            return Ok(Vec::new());
        }

        let use_cache = self.options.cache_enabled && options.use_cache;
        let hash = content_hash(&ctx.content);

        if use_cache {
            if let Some(cached) = self.lock_cache().get(&ctx.file, &pattern.id, hash) {
                return Ok(apply_filters(cached, options));
            }
        }

        let raw = match self.dispatch(ctx, pattern) {
            Ok(raw) => raw,
            Err(DetectionError::MissingAst { .. }) => {
                tracing::trace!(pattern_id = %pattern.id, file = %ctx.file, "no parse tree; skipping");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e),
        };

        if use_cache {
            self.lock_cache().insert(&ctx.file, &pattern.id, hash, raw.clone());
        }

        Ok(apply_filters(raw, options))
    }

    /// Match every pattern against one file. Failing patterns are recorded
    /// as recoverable errors and do not stop the rest.
    pub fn match_all(
        &self,
        ctx: &MatcherContext,
        patterns: &[PatternDefinition],
        options: &MatchOptions,
    ) -> MatchAllResult {
        let start = Instant::now();
        let mut matches = Vec::new();
        let mut errors = Vec::new();

        for pattern in patterns {
            match self.try_match(ctx, pattern, options) {
                Ok(found) => matches.extend(found),
                Err(e) => {
                    tracing::warn!(
                        pattern_id = %pattern.id,
                        file = %ctx.file,
                        error = %e,
                        "pattern strategy failed"
                    );
                    errors.push(MatchingError {
                        message: e.to_string(),
                        pattern_id: pattern.id.clone(),
                        recoverable: true,
                    });
                }
            }
        }

        let duration = start.elapsed();
        tracing::debug!(
            file = %ctx.file,
            patterns = patterns.len(),
            matches = matches.len(),
            { metrics::MATCH_ERRORS } = errors.len(),
            { metrics::MATCH_DURATION_MS } = duration.as_millis() as u64,
            "match_all complete"
        );

        MatchAllResult {
            success: errors.is_empty(),
            matches,
            errors,
            duration,
        }
    }

    /// Gating: enabled flag, language filter, then exclude globs before include globs.
    pub fn is_applicable(&self, ctx: &MatcherContext, pattern: &PatternDefinition) -> bool {
        if !pattern.enabled {
            return false;
        }

        if !pattern.languages.is_empty()
            && !pattern
                .languages
                .iter()
                .any(|lang| lang.eq_ignore_ascii_case(&ctx.language))
        {
            return false;
        }

        let path = paths::normalize(&ctx.file);

        if pattern
            .exclude_paths
            .iter()
            .any(|glob| gate_glob(&pattern.id, glob, &path))
        {
            return false;
        }

        pattern.include_paths.is_empty()
            || pattern
                .include_paths
                .iter()
                .any(|glob| gate_glob(&pattern.id, glob, &path))
    }

    pub fn cache_stats(&self) -> CacheStats {
        let stats = self.lock_cache().stats();
        tracing::trace!(
            { metrics::CACHE_HIT_RATE } = stats.hit_rate(),
            { metrics::CACHE_EVICTIONS } = stats.evictions,
            "match cache stats"
        );
        stats
    }

    pub fn clear_cache(&self) {
        self.lock_cache().clear();
    }

    /// Drop cached results for one file. Returns the number of entries removed.
    pub fn invalidate_file(&self, file: &str) -> usize {
        self.lock_cache().invalidate_file(file)
    }

    /// Distinct regex rules compiled so far.
    pub fn compiled_regex_count(&self) -> usize {
        self.regexes.len()
    }

    fn dispatch(
        &self,
        ctx: &MatcherContext,
        pattern: &PatternDefinition,
    ) -> Result<Vec<PatternMatchResult>, DetectionError> {
        let now = Utc::now();
        match &pattern.strategy {
            MatchStrategy::Ast(rule) => ast::match_ast(ctx, &pattern.id, rule, MatchType::Ast, now),
            MatchStrategy::Semantic(rule) => {
                ast::match_ast(ctx, &pattern.id, rule, MatchType::Semantic, now)
            }
            MatchStrategy::Regex(config) => {
                let re = self.regexes.get_or_compile(&pattern.id, config)?;
                regex_engine::match_regex(ctx, &pattern.id, &re, config, now)
            }
            MatchStrategy::Structural(config) => {
                structural::match_structural(ctx, &pattern.id, config, now)
            }
            MatchStrategy::Custom => Ok(Vec::new()),
        }
    }

    fn lock_cache(&self) -> MutexGuard<'_, MatchCache> {
        // A panic mid-update leaves at worst a stale entry, which TTL and hash checks catch.
        self.cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for PatternMatcher {
    fn default() -> Self {
        Self::new(MatcherOptions::default())
    }
}

/// An invalid gating glob never matches.
fn gate_glob(pattern_id: &str, glob: &str, path: &str) -> bool {
    match paths::glob_matches(glob, path) {
        Ok(matched) => matched,
        Err(e) => {
            tracing::warn!(pattern_id, error = %e, "invalid path glob ignored");
            false
        }
    }
}

fn apply_filters(mut results: Vec<PatternMatchResult>, options: &MatchOptions) -> Vec<PatternMatchResult> {
    if let Some(min) = options.min_confidence {
        results.retain(|r| r.confidence >= min);
    }
    if let Some(max) = options.max_matches {
        results.truncate(max);
    }
    results
}
