//! File-system capability used by the collector
//!
//! The collector never touches the disk directly. It asks a [`FileSystem`]
//! for the paths matching the configured patterns and for file contents,
//! so tests can substitute an in-memory tree.

use std::collections::BTreeSet;
use std::io;
use std::path::{Path, PathBuf};

use glob::{MatchOptions, Pattern};

use crate::error::GlobError;

/// Options shared by include and exclude matching: `*` never crosses a
/// path separator, dotfiles are matched like any other name.
pub const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Glob matching and text reads.
pub trait FileSystem: Send + Sync {
    /// Absolute paths of regular files under `root` matching any `include`
    /// pattern and no `exclude` pattern. Excludes are matched against the
    /// root-relative path. Each path appears once.
    fn glob(
        &self,
        root: &Path,
        include: &[String],
        exclude: &[String],
    ) -> Result<Vec<PathBuf>, GlobError>;

    /// Read a whole file as UTF-8 text.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;
}

/// Compile exclude patterns, failing on the first invalid one.
pub fn compile_patterns(patterns: &[String]) -> Result<Vec<Pattern>, GlobError> {
    patterns
        .iter()
        .map(|p| {
            Pattern::new(p).map_err(|source| GlobError::Pattern {
                pattern: p.clone(),
                source,
            })
        })
        .collect()
}

/// True when `relative` matches any of `excludes`.
pub fn is_excluded(relative: &Path, excludes: &[Pattern]) -> bool {
    excludes
        .iter()
        .any(|p| p.matches_path_with(relative, MATCH_OPTIONS))
}

/// The local disk, matched with the `glob` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

impl FileSystem for LocalFs {
    fn glob(
        &self,
        root: &Path,
        include: &[String],
        exclude: &[String],
    ) -> Result<Vec<PathBuf>, GlobError> {
        let excludes = compile_patterns(exclude)?;
        let escaped_root = Pattern::escape(&root.to_string_lossy());
        let mut matched = BTreeSet::new();

        for pattern in include {
            let full = if Path::new(pattern).is_absolute() {
                pattern.clone()
            } else {
                format!("{}/{}", escaped_root.trim_end_matches('/'), pattern)
            };

            let entries =
                glob::glob_with(&full, MATCH_OPTIONS).map_err(|source| GlobError::Pattern {
                    pattern: pattern.clone(),
                    source,
                })?;

            for entry in entries {
                let path = entry.map_err(|e| GlobError::Scan {
                    path: e.path().to_path_buf(),
                    source: e.into_error(),
                })?;

                if !path.is_file() {
                    continue;
                }
                let relative = path.strip_prefix(root).unwrap_or(&path);
                if is_excluded(relative, &excludes) {
                    continue;
                }
                matched.insert(path);
            }
        }

        Ok(matched.into_iter().collect())
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }
}
