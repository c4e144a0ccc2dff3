//! Path resolution: configured glob patterns to concrete source files.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use directories::BaseDirs;
use glob::MatchOptions;
use tracing::{debug, warn};

use crate::error::{IngestError, Result};

/// Characters that indicate a glob pattern.
const GLOB_CHARS: &[char] = &['*', '?', '[', ']', '{', '}'];

/// A source file produced by path resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedFile {
    /// Absolute path to a regular file.
    pub path: PathBuf,
    /// True when a configured pattern named this file literally.
    pub exact: bool,
}

/// Check if a pattern contains glob metacharacters.
pub fn is_glob_pattern(pattern: &str) -> bool {
    pattern.chars().any(|c| GLOB_CHARS.contains(&c))
}

/// Expands a leading `~` or `~/` to the current user's home directory.
///
/// When the home directory cannot be determined the pattern is returned
/// unchanged and a warning is logged.
pub fn expand_home(pattern: &str) -> PathBuf {
    if !pattern.starts_with('~') {
        return PathBuf::from(pattern);
    }
    let home = BaseDirs::new().map(|dirs| dirs.home_dir().to_path_buf());
    if home.is_none() {
        warn!(
            pattern,
            "could not determine home directory; ~ will not be expanded"
        );
    }
    expand_home_with(pattern, home.as_deref())
}

fn expand_home_with(pattern: &str, home: Option<&Path>) -> PathBuf {
    match home {
        Some(home) if pattern == "~" => home.to_path_buf(),
        Some(home) => match pattern.strip_prefix("~/") {
            Some(rest) => home.join(rest),
            // `~user` forms are left alone
            None => PathBuf::from(pattern),
        },
        None => PathBuf::from(pattern),
    }
}

/// Converts a configured pattern into an absolute glob pattern string.
fn absolute_pattern(pattern: &str) -> Result<String> {
    let expanded = expand_home(pattern);
    let absolute =
        std::path::absolute(&expanded).map_err(|e| IngestError::InvalidGlobPattern {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })?;
    absolute
        .to_str()
        .map(str::to_string)
        .ok_or_else(|| IngestError::InvalidGlobPattern {
            pattern: pattern.to_string(),
            message: "path is not valid UTF-8".to_string(),
        })
}

/// Resolves configured patterns into a deduplicated, order-preserving list of files.
///
/// `**` matches any number of directories; `*` stays within one path segment.
/// Directories are dropped silently. One invalid pattern fails the whole
/// resolution.
pub fn resolve_paths(patterns: &[String]) -> Result<Vec<ResolvedFile>> {
    if patterns.is_empty() {
        return Err(IngestError::NoPathsConfigured);
    }

    let options = MatchOptions {
        case_sensitive: true,
        require_literal_separator: true,
        require_literal_leading_dot: false,
    };

    let mut files: Vec<ResolvedFile> = Vec::new();
    let mut seen: HashMap<PathBuf, usize> = HashMap::new();

    for pattern in patterns {
        let absolute = absolute_pattern(pattern)?;
        let exact = !is_glob_pattern(pattern);

        let entries =
            glob::glob_with(&absolute, options).map_err(|e| IngestError::InvalidGlobPattern {
                pattern: pattern.clone(),
                message: e.to_string(),
            })?;

        let mut matched = 0usize;
        for entry in entries {
            let path = match entry {
                Ok(path) => path,
                Err(e) => {
                    warn!(pattern = %pattern, error = %e, "skipping unreadable glob entry");
                    continue;
                }
            };

            let metadata = match std::fs::metadata(&path) {
                Ok(metadata) => metadata,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "error getting file info");
                    continue;
                }
            };
            if metadata.is_dir() {
                continue;
            }

            matched += 1;
            if let Some(&idx) = seen.get(&path) {
                files[idx].exact |= exact;
                continue;
            }
            seen.insert(path.clone(), files.len());
            files.push(ResolvedFile { path, exact });
        }
        debug!(pattern = %pattern, absolute = %absolute, matched, "expanded path pattern");
    }

    Ok(files)
}
