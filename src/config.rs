//! Project configuration
//!
//! The on-disk format is camelCase JSON, e.g.
//!
//! ```json
//! {
//!   "include": ["contracts/**/*.sol", "scripts/*.ts"],
//!   "root": ".",
//!   "parsing": {
//!     "commentTokens": { ".sol": "///", ".py": "#", ".html": { "start": "<!--", "end": "-->" } },
//!     "languageMap": { ".move": "rust" }
//!   }
//! }
//! ```
//!
//! Every field is optional. The scanner only reads a loaded config; it never
//! merges or rewrites it.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::language::SupportedLanguage;

/// Config file looked up in the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "sourcedocs.json";

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    /// Glob patterns for source files to scan.
    pub include: Vec<String>,
    /// Glob patterns removed from the include set, matched against the
    /// root-relative path.
    pub exclude: Vec<String>,
    /// Root directory for resolving patterns. Relative roots are resolved
    /// against the working directory by [`Config::normalize`].
    pub root: PathBuf,
    pub parsing: ParsingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            include: Vec::new(),
            exclude: default_excludes(),
            root: PathBuf::from("."),
            parsing: ParsingConfig::default(),
        }
    }
}

fn default_excludes() -> Vec<String> {
    ["**/node_modules/**", "**/.git/**", "**/dist/**"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// Rules for recognizing doc comments.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ParsingConfig {
    /// Comment token per file extension, e.g. `{ ".py": "#" }`.
    pub comment_tokens: HashMap<String, CommentToken>,
    /// Extension to language overrides, e.g. `{ ".move": "rust" }`.
    pub language_map: HashMap<String, SupportedLanguage>,
}

/// A comment token: either a bare start token or a start/end pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CommentToken {
    Start(String),
    Delimited {
        start: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        end: Option<String>,
    },
}

impl CommentToken {
    pub fn start(&self) -> &str {
        match self {
            CommentToken::Start(start) => start,
            CommentToken::Delimited { start, .. } => start,
        }
    }

    pub fn end(&self) -> Option<&str> {
        match self {
            CommentToken::Start(_) => None,
            CommentToken::Delimited { end, .. } => end.as_deref(),
        }
    }
}

impl Config {
    /// Read and deserialize a config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load `path` if given, else `sourcedocs.json` under `cwd` if present,
    /// else the defaults.
    pub fn discover(path: Option<&Path>, cwd: &Path) -> Result<Self, ConfigError> {
        match path {
            Some(p) => Self::load(p),
            None => {
                let candidate = cwd.join(DEFAULT_CONFIG_FILE);
                if candidate.is_file() {
                    log::debug!("Using config {}", candidate.display());
                    Self::load(&candidate)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Resolve `root` against `cwd` and check that it is a directory.
    pub fn normalize(mut self, cwd: &Path) -> Result<Self, ConfigError> {
        let root = if self.root.is_absolute() {
            self.root.clone()
        } else {
            cwd.join(&self.root)
        };
        if !root.is_dir() {
            return Err(ConfigError::InvalidRoot(root));
        }
        self.root = root.canonicalize().unwrap_or(root);
        Ok(self)
    }

    /// Builder-style override of the include patterns.
    pub fn with_include<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.include = patterns.into_iter().map(Into::into).collect();
        self
    }

    /// Builder-style override of the exclude patterns.
    pub fn with_exclude<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude = patterns.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    pub fn with_comment_token(mut self, ext: &str, token: CommentToken) -> Self {
        self.parsing.comment_tokens.insert(ext.to_string(), token);
        self
    }
}
