//! AST strategy: depth-first shape matching over a parsed syntax tree.

use chrono::{DateTime, Utc};
use regex::Regex;

use drift_core::errors::DetectionError;
use drift_core::types::collections::FxHashMap;

use super::types::{
    AstMatchConfig, AstNode, MatchLocation, MatchType, MatcherContext, PatternMatchResult,
    PropertyMatcher,
};

/// Compiled property regexes, keyed by source pattern.
type RegexTable<'a> = FxHashMap<&'a str, Regex>;

/// Match `rule` against every node of the context's AST.
///
/// Returns `DetectionError::MissingAst` when the file has no parse tree;
/// the matcher treats that as zero matches.
pub fn match_ast(
    ctx: &MatcherContext,
    pattern_id: &str,
    rule: &AstMatchConfig,
    match_type: MatchType,
    now: DateTime<Utc>,
) -> Result<Vec<PatternMatchResult>, DetectionError> {
    let root = ctx.ast.as_ref().ok_or_else(|| DetectionError::MissingAst {
        pattern_id: pattern_id.to_string(),
        file: ctx.file.clone(),
    })?;

    let mut regexes = RegexTable::default();
    compile_property_regexes(pattern_id, rule, &mut regexes)?;

    let min_depth = rule.min_depth.unwrap_or(0);
    let mut results = Vec::new();
    let mut stack: Vec<(&AstNode, usize)> = vec![(root, 0)];

    while let Some((node, depth)) = stack.pop() {
        if rule.max_depth.is_some_and(|max| depth > max) {
            continue;
        }
        if depth >= min_depth {
            if let Some(confidence) = evaluate(node, rule, &regexes) {
                results.push(to_result(ctx, pattern_id, node, confidence, match_type, now));
            }
        }
        // Reverse so siblings pop in source order.
        for child in node.children.iter().rev() {
            stack.push((child, depth + 1));
        }
    }

    Ok(results)
}

/// Evaluate one rule at one node. `None` means no match.
///
/// Confidence = (passed checks / declared checks) x mean child-rule confidence.
/// The type check and every property check are mandatory, so a partial ratio
/// never yields a match on its own; child rules contribute their own scores.
fn evaluate(node: &AstNode, rule: &AstMatchConfig, regexes: &RegexTable<'_>) -> Option<f64> {
    if node.node_type != rule.node_type {
        return None;
    }

    let total_checks = 1 + rule.properties.len();
    let mut passed = 1;
    for (key, matcher) in &rule.properties {
        if property_matches(node, key, matcher, regexes) {
            passed += 1;
        }
    }
    if passed < total_checks {
        return None;
    }

    let child_confidence = if rule.children.is_empty() {
        1.0
    } else {
        let mut sum = 0.0;
        for child_rule in &rule.children {
            let best = candidates(node, rule.search_descendants, child_rule)
                .into_iter()
                .filter_map(|candidate| evaluate(candidate, child_rule, regexes))
                .fold(None, |acc: Option<f64>, c| Some(acc.map_or(c, |a| a.max(c))));
            sum += best?;
        }
        sum / rule.children.len() as f64
    };

    Some(passed as f64 / total_checks as f64 * child_confidence)
}

/// Nodes a child rule may be satisfied by: immediate children, or the full
/// descendant set bounded by the child rule's relative depth limits.
fn candidates<'n>(
    node: &'n AstNode,
    search_descendants: bool,
    child_rule: &AstMatchConfig,
) -> Vec<&'n AstNode> {
    if !search_descendants {
        return node.children.iter().collect();
    }

    let min = child_rule.min_depth.unwrap_or(1).max(1);
    let max = child_rule.max_depth;
    let mut out = Vec::new();
    let mut stack: Vec<(&AstNode, usize)> = node.children.iter().map(|c| (c, 1)).collect();
    while let Some((n, depth)) = stack.pop() {
        if max.is_some_and(|m| depth > m) {
            continue;
        }
        if depth >= min {
            out.push(n);
        }
        stack.extend(n.children.iter().map(|c| (c, depth + 1)));
    }
    out
}

fn property_matches(
    node: &AstNode,
    key: &str,
    matcher: &PropertyMatcher,
    regexes: &RegexTable<'_>,
) -> bool {
    let text_value;
    let value = match node.properties.get(key) {
        Some(v) => v,
        None if key == "text" => {
            text_value = serde_json::Value::String(node.text.clone());
            &text_value
        }
        None => return false,
    };

    match matcher {
        PropertyMatcher::Equals(expected) => value == expected,
        PropertyMatcher::Regex(pattern) => match (value.as_str(), regexes.get(pattern.as_str())) {
            (Some(s), Some(re)) => re.is_match(s),
            _ => false,
        },
    }
}

fn compile_property_regexes<'a>(
    pattern_id: &str,
    rule: &'a AstMatchConfig,
    table: &mut RegexTable<'a>,
) -> Result<(), DetectionError> {
    for matcher in rule.properties.values() {
        if let PropertyMatcher::Regex(pattern) = matcher {
            if !table.contains_key(pattern.as_str()) {
                let re = Regex::new(pattern).map_err(|e| DetectionError::RegexCompilationFailed {
                    pattern_id: pattern_id.to_string(),
                    message: e.to_string(),
                })?;
                table.insert(pattern.as_str(), re);
            }
        }
    }
    for child in &rule.children {
        compile_property_regexes(pattern_id, child, table)?;
    }
    Ok(())
}

fn to_result(
    ctx: &MatcherContext,
    pattern_id: &str,
    node: &AstNode,
    confidence: f64,
    match_type: MatchType,
    now: DateTime<Utc>,
) -> PatternMatchResult {
    PatternMatchResult {
        pattern_id: pattern_id.to_string(),
        location: MatchLocation {
            file: ctx.file.clone(),
            line: node.start.row + 1,
            column: node.start.column + 1,
            end_line: Some(node.end.row + 1),
            end_column: Some(node.end.column + 1),
        },
        confidence,
        match_type,
        matched_text: Some(node.text.clone()),
        ast_node: Some(node.shallow()),
        captures: None,
        timestamp: now,
    }
}
