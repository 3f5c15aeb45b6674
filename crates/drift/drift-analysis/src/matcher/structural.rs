//! Structural strategy: file path, directory, naming convention and extension checks.

use chrono::{DateTime, Utc};
use regex::Regex;

use drift_core::errors::DetectionError;

use super::paths;
use super::types::{
    MatchLocation, MatchType, MatcherContext, PatternMatchResult, StructuralMatchConfig,
};

/// Evaluate the declared checks against the context's file path.
///
/// Any failing check voids the match. When every declared check passes,
/// exactly one file-level match is emitted at line 1, column 1.
/// A rule with no declared checks never matches.
pub fn match_structural(
    ctx: &MatcherContext,
    pattern_id: &str,
    config: &StructuralMatchConfig,
    now: DateTime<Utc>,
) -> Result<Vec<PatternMatchResult>, DetectionError> {
    let total = config.declared_checks();
    if total == 0 {
        return Ok(Vec::new());
    }

    let path = paths::normalize(&ctx.file);
    let mut passed = 0usize;

    if let Some(glob) = &config.path_pattern {
        if !paths::glob_matches(glob, &path)? {
            return Ok(Vec::new());
        }
        passed += 1;
    }

    if let Some(glob) = &config.directory_pattern {
        if !paths::glob_matches(glob, paths::parent_dir(&path))? {
            return Ok(Vec::new());
        }
        passed += 1;
    }

    if let Some(convention) = &config.naming_convention {
        if !follows_naming(pattern_id, paths::file_stem(&path), convention)? {
            return Ok(Vec::new());
        }
        passed += 1;
    }

    if let Some(expected) = &config.extension {
        let expected = expected.trim_start_matches('.');
        if paths::extension(&path) != Some(expected) {
            return Ok(Vec::new());
        }
        passed += 1;
    }

    Ok(vec![PatternMatchResult {
        pattern_id: pattern_id.to_string(),
        location: MatchLocation {
            file: ctx.file.clone(),
            line: 1,
            column: 1,
            end_line: None,
            end_column: None,
        },
        confidence: passed as f64 / total as f64,
        match_type: MatchType::Structural,
        matched_text: Some(paths::file_name(&path).to_string()),
        ast_node: None,
        captures: None,
        timestamp: now,
    }])
}

/// Check a name against a named convention, or a literal regex for anything else.
fn follows_naming(pattern_id: &str, name: &str, convention: &str) -> Result<bool, DetectionError> {
    let result = match convention {
        "PascalCase" => is_pascal_case(name),
        "camelCase" => is_camel_case(name),
        "kebab-case" => is_delimited_lower(name, '-'),
        "snake_case" => is_delimited_lower(name, '_'),
        "SCREAMING_SNAKE_CASE" => is_screaming_snake_case(name),
        literal => {
            let re = Regex::new(literal).map_err(|e| DetectionError::RegexCompilationFailed {
                pattern_id: pattern_id.to_string(),
                message: e.to_string(),
            })?;
            re.is_match(name)
        }
    };
    Ok(result)
}

fn is_pascal_case(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().is_some_and(|c| c.is_ascii_uppercase()) && chars.all(|c| c.is_ascii_alphanumeric())
}

fn is_camel_case(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().is_some_and(|c| c.is_ascii_lowercase()) && chars.all(|c| c.is_ascii_alphanumeric())
}

/// Lowercase words joined by `sep`: `user-service`, `user_service`, `user`.
fn is_delimited_lower(name: &str, sep: char) -> bool {
    name.chars().next().is_some_and(|c| c.is_ascii_lowercase())
        && name
            .split(sep)
            .all(|word| !word.is_empty() && word.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()))
}

fn is_screaming_snake_case(name: &str) -> bool {
    name.chars().next().is_some_and(|c| c.is_ascii_uppercase())
        && name
            .split('_')
            .all(|word| !word.is_empty() && word.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()))
}
