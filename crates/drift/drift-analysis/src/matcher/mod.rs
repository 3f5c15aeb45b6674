//! Multi-strategy pattern matcher.
//!
//! Evaluates one `PatternDefinition` against one file through a closed set of
//! strategies (ast, regex, structural, semantic, custom), with path and
//! language gating and a TTL plus content-hash result cache.

pub mod ast;
pub mod cache;
pub mod catalog;
pub mod engine;
pub mod paths;
pub mod regex_engine;
pub mod structural;
pub mod types;

pub use cache::{CacheStats, MatchCache};
pub use catalog::PatternCatalog;
pub use engine::{MatcherOptions, PatternMatcher};
pub use types::{
    AstMatchConfig, AstNode, MatchAllResult, MatchLocation, MatchOptions, MatchStrategy, MatchType,
    MatcherContext, MatchingError, PatternDefinition, PatternMatchResult, Position,
    PropertyMatcher, RegexMatchConfig, StructuralMatchConfig,
};
