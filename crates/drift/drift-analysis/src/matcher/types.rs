//! Core types for the pattern matcher.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A catalog entry describing one pattern and how to match it.
///
/// Owned by the caller; the matcher never mutates it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternDefinition {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Languages this pattern applies to. Empty means all languages.
    #[serde(default)]
    pub languages: Vec<String>,
    /// Path globs; empty means include all.
    #[serde(default)]
    pub include_paths: Vec<String>,
    /// Path globs; checked before includes and always win.
    #[serde(default)]
    pub exclude_paths: Vec<String>,
    pub strategy: MatchStrategy,
}

fn default_enabled() -> bool {
    true
}

impl PatternDefinition {
    /// A definition with no gating beyond the given strategy.
    pub fn new(id: impl Into<String>, strategy: MatchStrategy) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            category: String::new(),
            enabled: true,
            languages: Vec::new(),
            include_paths: Vec::new(),
            exclude_paths: Vec::new(),
            strategy,
        }
    }

    pub fn match_type(&self) -> MatchType {
        self.strategy.match_type()
    }
}

/// Closed set of matching strategies.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "config", rename_all = "kebab-case")]
pub enum MatchStrategy {
    Ast(AstMatchConfig),
    Regex(RegexMatchConfig),
    Structural(StructuralMatchConfig),
    /// Evaluated with the AST strategy.
    Semantic(AstMatchConfig),
    /// Reserved. Always yields no matches.
    Custom,
}

impl MatchStrategy {
    pub fn match_type(&self) -> MatchType {
        match self {
            Self::Ast(_) => MatchType::Ast,
            Self::Regex(_) => MatchType::Regex,
            Self::Structural(_) => MatchType::Structural,
            Self::Semantic(_) => MatchType::Semantic,
            Self::Custom => MatchType::Custom,
        }
    }
}

/// Match-type tag carried on every result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchType {
    Ast,
    Regex,
    Structural,
    Semantic,
    Custom,
}

impl MatchType {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Ast => "ast",
            Self::Regex => "regex",
            Self::Structural => "structural",
            Self::Semantic => "semantic",
            Self::Custom => "custom",
        }
    }
}

/// An AST shape rule. Child rules nest.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AstMatchConfig {
    /// Required node type; compared exactly.
    pub node_type: String,
    /// Property checks, all of which must pass.
    #[serde(default)]
    pub properties: BTreeMap<String, PropertyMatcher>,
    /// Child rules; each must be satisfied by at least one child node.
    #[serde(default)]
    pub children: Vec<AstMatchConfig>,
    /// Satisfy child rules against the whole subtree instead of immediate children.
    #[serde(default)]
    pub search_descendants: bool,
    /// Minimum traversal depth (root = 0) at which nodes are evaluated.
    #[serde(default)]
    pub min_depth: Option<usize>,
    /// Maximum traversal depth; deeper nodes are not visited.
    #[serde(default)]
    pub max_depth: Option<usize>,
}

/// A single property check on an AST node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "kebab-case")]
pub enum PropertyMatcher {
    /// Deep equality against the node's property value.
    Equals(serde_json::Value),
    /// Regex test against a string-valued property.
    Regex(String),
}

/// Regex rule: pattern plus JS-style flag letters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegexMatchConfig {
    pub pattern: String,
    /// Flag letters: `i`, `m`, `s`, `x`. `g`, `u` and `y` are accepted and ignored.
    #[serde(default)]
    pub flags: String,
    /// Names assigned positionally to capture groups 1..=n.
    #[serde(default)]
    pub capture_names: Vec<String>,
    #[serde(default)]
    pub multiline: bool,
}

/// Path-level rule. Every declared check must pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuralMatchConfig {
    /// Glob applied to the full file path.
    #[serde(default)]
    pub path_pattern: Option<String>,
    /// Glob applied to the file's parent directory.
    #[serde(default)]
    pub directory_pattern: Option<String>,
    /// `PascalCase`, `camelCase`, `kebab-case`, `snake_case`,
    /// `SCREAMING_SNAKE_CASE`, or a literal regex.
    #[serde(default)]
    pub naming_convention: Option<String>,
    /// Expected extension, with or without the leading dot.
    #[serde(default)]
    pub extension: Option<String>,
}

impl StructuralMatchConfig {
    pub fn declared_checks(&self) -> usize {
        [
            self.path_pattern.is_some(),
            self.directory_pattern.is_some(),
            self.naming_convention.is_some(),
            self.extension.is_some(),
        ]
        .iter()
        .filter(|d| **d)
        .count()
    }
}

/// A 0-indexed source position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub row: u32,
    pub column: u32,
}

/// A parsed syntax node supplied by an external parser.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AstNode {
    pub node_type: String,
    #[serde(default)]
    pub text: String,
    pub start: Position,
    pub end: Position,
    #[serde(default)]
    pub children: Vec<AstNode>,
    #[serde(default)]
    pub properties: BTreeMap<String, serde_json::Value>,
}

impl AstNode {
    pub fn new(node_type: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            node_type: node_type.into(),
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn at(mut self, start: Position, end: Position) -> Self {
        self.start = start;
        self.end = end;
        self
    }

    pub fn with_child(mut self, child: AstNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.properties.insert(key.into(), value);
        self
    }

    /// Copy of this node without its children.
    pub fn shallow(&self) -> Self {
        Self {
            node_type: self.node_type.clone(),
            text: self.text.clone(),
            start: self.start,
            end: self.end,
            children: Vec::new(),
            properties: self.properties.clone(),
        }
    }
}

/// One file presented to the matcher.
#[derive(Debug, Clone)]
pub struct MatcherContext {
    pub file: String,
    pub language: String,
    pub content: String,
    pub ast: Option<AstNode>,
}

impl MatcherContext {
    pub fn new(
        file: impl Into<String>,
        language: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            file: file.into(),
            language: language.into(),
            content: content.into(),
            ast: None,
        }
    }

    pub fn with_ast(mut self, ast: AstNode) -> Self {
        self.ast = Some(ast);
        self
    }
}

/// 1-indexed match location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchLocation {
    pub file: String,
    pub line: u32,
    pub column: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_line: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_column: Option<u32>,
}

/// A single match of one pattern in one file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternMatchResult {
    pub pattern_id: String,
    pub location: MatchLocation,
    pub confidence: f64,
    pub match_type: MatchType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matched_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ast_node: Option<AstNode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub captures: Option<BTreeMap<String, String>>,
    pub timestamp: DateTime<Utc>,
}

/// Per-call filtering options. Applied after the cache.
#[derive(Debug, Clone, Copy)]
pub struct MatchOptions {
    pub min_confidence: Option<f64>,
    pub max_matches: Option<usize>,
    pub use_cache: bool,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            min_confidence: None,
            max_matches: None,
            use_cache: true,
        }
    }
}

/// A recoverable per-pattern failure recorded by `match_all`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchingError {
    pub message: String,
    pub pattern_id: String,
    pub recoverable: bool,
}

/// Result of matching a pattern catalog against one file.
#[derive(Debug, Clone)]
pub struct MatchAllResult {
    pub matches: Vec<PatternMatchResult>,
    pub errors: Vec<MatchingError>,
    pub duration: Duration,
    /// True when no pattern failed.
    pub success: bool,
}
