//! Regex strategy: whole-file scan with offset to line/column conversion.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use regex::{Regex, RegexBuilder};

use drift_core::errors::DetectionError;
use drift_core::types::collections::FxHashMap;

use super::types::{MatchLocation, MatchType, MatcherContext, PatternMatchResult, RegexMatchConfig};

/// Compile a regex rule, honoring its flag letters.
///
/// Matching is always global. `multiline: true` adds `m`.
pub fn compile(pattern_id: &str, config: &RegexMatchConfig) -> Result<Regex, DetectionError> {
    let mut builder = RegexBuilder::new(&config.pattern);
    builder.multi_line(config.multiline);
    for flag in config.flags.chars() {
        match flag {
            'i' => {
                builder.case_insensitive(true);
            }
            'm' => {
                builder.multi_line(true);
            }
            's' => {
                builder.dot_matches_new_line(true);
            }
            'x' => {
                builder.ignore_whitespace(true);
            }
            'g' | 'u' | 'y' => {}
            other => {
                return Err(DetectionError::InvalidPattern {
                    pattern_id: pattern_id.to_string(),
                    message: format!("unsupported regex flag '{other}'"),
                })
            }
        }
    }
    builder
        .build()
        .map_err(|e| DetectionError::RegexCompilationFailed {
            pattern_id: pattern_id.to_string(),
            message: e.to_string(),
        })
}

/// Source, flags and multiline switch of a compiled rule.
type RegexKey = (String, String, bool);

/// Compiled regex rules shared across files, so each rule compiles once.
/// Failed compilations are not stored.
#[derive(Debug, Default)]
pub struct CompiledRegexes {
    entries: Mutex<FxHashMap<RegexKey, Regex>>,
}

impl CompiledRegexes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_compile(&self, pattern_id: &str, config: &RegexMatchConfig) -> Result<Regex, DetectionError> {
        let key = (config.pattern.clone(), config.flags.clone(), config.multiline);
        if let Some(re) = self.lock().get(&key) {
            return Ok(re.clone());
        }
        let re = compile(pattern_id, config)?;
        self.lock().insert(key, re.clone());
        Ok(re)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, FxHashMap<RegexKey, Regex>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Scan the file content for every match of a compiled rule.
pub fn match_regex(
    ctx: &MatcherContext,
    pattern_id: &str,
    re: &Regex,
    config: &RegexMatchConfig,
    now: DateTime<Utc>,
) -> Result<Vec<PatternMatchResult>, DetectionError> {
    let index = LineIndex::new(&ctx.content);
    let mut results = Vec::new();

    // captures_iter steps past empty matches on its own.
    for caps in re.captures_iter(&ctx.content) {
        let Some(whole) = caps.get(0) else { continue };
        let (line, column) = index.position(&ctx.content, whole.start());
        let (end_line, end_column) = index.position(&ctx.content, whole.end());

        let captures = if config.capture_names.is_empty() {
            None
        } else {
            let named: BTreeMap<String, String> = config
                .capture_names
                .iter()
                .enumerate()
                .filter_map(|(i, name)| {
                    caps.get(i + 1)
                        .map(|m| (name.clone(), m.as_str().to_string()))
                })
                .collect();
            Some(named)
        };

        results.push(PatternMatchResult {
            pattern_id: pattern_id.to_string(),
            location: MatchLocation {
                file: ctx.file.clone(),
                line,
                column,
                end_line: Some(end_line),
                end_column: Some(end_column),
            },
            confidence: 1.0,
            match_type: MatchType::Regex,
            matched_text: Some(whole.as_str().to_string()),
            ast_node: None,
            captures,
            timestamp: now,
        });
    }

    Ok(results)
}

/// Byte offsets of every line start.
struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    fn new(text: &str) -> Self {
        let mut starts = vec![0];
        starts.extend(text.match_indices('\n').map(|(i, _)| i + 1));
        Self { starts }
    }

    /// 1-indexed (line, column) for a byte offset. Columns count characters.
    fn position(&self, text: &str, offset: usize) -> (u32, u32) {
        let line_idx = match self.starts.binary_search(&offset) {
            Ok(i) => i,
            Err(i) => i - 1,
        };
        let line_start = self.starts[line_idx];
        let column = text[line_start..offset].chars().count() + 1;
        (line_idx as u32 + 1, column as u32)
    }
}
