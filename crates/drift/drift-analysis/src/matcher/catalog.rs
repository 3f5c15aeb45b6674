//! Declarative TOML pattern catalogs.
//!
//! ```toml
//! [[patterns]]
//! id = "todo-comment"
//! name = "TODO marker"
//! category = "documentation"
//! excludePaths = ["vendor/**"]
//! strategy = { type = "regex", config = { pattern = "TODO:", flags = "i" } }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use drift_core::errors::DetectionError;
use drift_core::types::collections::FxHashSet;

use super::paths;
use super::regex_engine;
use super::types::{MatchStrategy, PatternDefinition};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PatternCatalogFile {
    #[serde(default)]
    pub patterns: Vec<PatternDefinition>,
}

/// Loader for pattern catalogs. Validates up front what the matcher would
/// otherwise report per file: duplicate ids, bad regexes, bad globs.
pub struct PatternCatalog;

impl PatternCatalog {
    pub fn load_from_str(toml_str: &str) -> Result<Vec<PatternDefinition>, DetectionError> {
        let file: PatternCatalogFile =
            toml::from_str(toml_str).map_err(|e| DetectionError::InvalidPattern {
                pattern_id: "<catalog>".to_string(),
                message: format!("TOML parse error: {e}"),
            })?;

        let mut seen = FxHashSet::default();
        for def in &file.patterns {
            if !seen.insert(def.id.as_str()) {
                return Err(DetectionError::InvalidPattern {
                    pattern_id: def.id.clone(),
                    message: "duplicate pattern id".to_string(),
                });
            }
            Self::validate(def)?;
        }
        Ok(file.patterns)
    }

    pub fn load_from_file(path: &Path) -> Result<Vec<PatternDefinition>, DetectionError> {
        let content = std::fs::read_to_string(path).map_err(|e| DetectionError::InvalidPattern {
            pattern_id: "<catalog>".to_string(),
            message: format!("failed to read {}: {e}", path.display()),
        })?;
        Self::load_from_str(&content)
    }

    /// Check one definition's regex and globs compile.
    pub fn validate(def: &PatternDefinition) -> Result<(), DetectionError> {
        if def.id.trim().is_empty() {
            return Err(DetectionError::InvalidPattern {
                pattern_id: def.id.clone(),
                message: "pattern id must not be empty".to_string(),
            });
        }
        for glob in def.include_paths.iter().chain(&def.exclude_paths) {
            paths::glob_matches(glob, "")?;
        }
        match &def.strategy {
            MatchStrategy::Regex(config) => {
                regex_engine::compile(&def.id, config)?;
            }
            MatchStrategy::Structural(config) => {
                for glob in config.path_pattern.iter().chain(&config.directory_pattern) {
                    paths::glob_matches(glob, "")?;
                }
            }
            MatchStrategy::Ast(_) | MatchStrategy::Semantic(_) | MatchStrategy::Custom => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::types::MatchType;

    const CATALOG: &str = r#"
[[patterns]]
id = "todo-comment"
name = "TODO marker"
category = "documentation"
excludePaths = ["vendor/**"]
strategy = { type = "regex", config = { pattern = "TODO:", flags = "i" } }

[[patterns]]
id = "component-file"
languages = ["typescript"]
strategy = { type = "structural", config = { namingConvention = "PascalCase", extension = "tsx" } }

[[patterns]]
id = "reserved"
enabled = false
strategy = { type = "custom" }
"#;

    #[test]
    fn test_load_catalog() {
        let patterns = PatternCatalog::load_from_str(CATALOG).unwrap();
        assert_eq!(patterns.len(), 3);
        assert_eq!(patterns[0].match_type(), MatchType::Regex);
        assert_eq!(patterns[0].exclude_paths, vec!["vendor/**"]);
        assert_eq!(patterns[1].match_type(), MatchType::Structural);
        assert!(!patterns[2].enabled);
        assert!(patterns[0].enabled);
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let toml_str = r#"
[[patterns]]
id = "a"
strategy = { type = "custom" }

[[patterns]]
id = "a"
strategy = { type = "custom" }
"#;
        assert!(PatternCatalog::load_from_str(toml_str).is_err());
    }

    #[test]
    fn test_bad_regex_rejected() {
        let toml_str = r#"
[[patterns]]
id = "bad"
strategy = { type = "regex", config = { pattern = "(" } }
"#;
        assert!(matches!(
            PatternCatalog::load_from_str(toml_str),
            Err(DetectionError::RegexCompilationFailed { .. })
        ));
    }
}
