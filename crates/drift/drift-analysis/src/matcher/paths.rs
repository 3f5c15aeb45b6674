//! Path normalization and glob matching shared by gating and the structural strategy.

use glob::{MatchOptions, Pattern};

use drift_core::errors::DetectionError;

const GLOB_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Forward-slash form of a path, without a leading `./`.
pub fn normalize(path: &str) -> String {
    let p = path.replace('\\', "/");
    match p.strip_prefix("./") {
        Some(stripped) => stripped.to_string(),
        None => p,
    }
}

/// Test a normalized path against a glob.
pub fn glob_matches(glob: &str, path: &str) -> Result<bool, DetectionError> {
    let pattern = Pattern::new(glob).map_err(|e| DetectionError::InvalidGlob {
        glob: glob.to_string(),
        message: e.to_string(),
    })?;
    Ok(pattern.matches_with(path, GLOB_OPTIONS))
}

/// Parent directory of a normalized path; empty for top-level files.
pub fn parent_dir(path: &str) -> &str {
    path.rsplit_once('/').map_or("", |(dir, _)| dir)
}

/// File name of a normalized path.
pub fn file_name(path: &str) -> &str {
    path.rsplit_once('/').map_or(path, |(_, name)| name)
}

/// File name without its final extension. Dotfiles keep their name.
pub fn file_stem(path: &str) -> &str {
    let name = file_name(path);
    match name.rfind('.') {
        Some(0) | None => name,
        Some(i) => &name[..i],
    }
}

/// Final extension without the dot, if any.
pub fn extension(path: &str) -> Option<&str> {
    let name = file_name(path);
    match name.rfind('.') {
        Some(0) | None => None,
        Some(i) => Some(&name[i + 1..]),
    }
}
