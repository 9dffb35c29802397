//! Source language detection
//!
//! Maps file extensions to the closed set of languages the scanner knows
//! about. Unknown extensions never fail; they resolve to
//! [`SupportedLanguage::Plaintext`].

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Languages recognized by the directive scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SupportedLanguage {
    Solidity,
    Rust,
    TypeScript,
    JavaScript,
    Python,
    Go,
    Markdown,
    Yaml,
    Json,
    Plaintext,
}

impl SupportedLanguage {
    /// Detect language from a file extension.
    ///
    /// The leading dot is optional and matching is case-insensitive.
    ///
    /// # Examples
    ///
    /// ```
    /// use sourcedocs::language::SupportedLanguage;
    ///
    /// assert_eq!(SupportedLanguage::from_extension(".rs"), SupportedLanguage::Rust);
    /// assert_eq!(SupportedLanguage::from_extension("TSX"), SupportedLanguage::TypeScript);
    /// assert_eq!(SupportedLanguage::from_extension(".xyz"), SupportedLanguage::Plaintext);
    /// ```
    pub fn from_extension(ext: &str) -> Self {
        match normalize_extension(ext).as_str() {
            "sol" => SupportedLanguage::Solidity,
            "rs" => SupportedLanguage::Rust,
            "ts" | "tsx" => SupportedLanguage::TypeScript,
            "js" | "jsx" => SupportedLanguage::JavaScript,
            "py" => SupportedLanguage::Python,
            "go" => SupportedLanguage::Go,
            "md" | "mdx" => SupportedLanguage::Markdown,
            "yml" | "yaml" => SupportedLanguage::Yaml,
            "json" => SupportedLanguage::Json,
            _ => SupportedLanguage::Plaintext,
        }
    }

    /// Lowercase tag used in serialized output.
    pub fn as_str(&self) -> &'static str {
        match self {
            SupportedLanguage::Solidity => "solidity",
            SupportedLanguage::Rust => "rust",
            SupportedLanguage::TypeScript => "typescript",
            SupportedLanguage::JavaScript => "javascript",
            SupportedLanguage::Python => "python",
            SupportedLanguage::Go => "go",
            SupportedLanguage::Markdown => "markdown",
            SupportedLanguage::Yaml => "yaml",
            SupportedLanguage::Json => "json",
            SupportedLanguage::Plaintext => "plaintext",
        }
    }
}

impl fmt::Display for SupportedLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Strip an optional leading dot and lowercase an extension.
pub fn normalize_extension(ext: &str) -> String {
    ext.trim().trim_start_matches('.').to_lowercase()
}

/// Return the extension of `path` in `.ext` form, or an empty string.
pub fn dotted_extension(path: &Path) -> String {
    path.extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default()
}

/// Extension classifier with user-configured overrides.
///
/// Overrides from the `languageMap` config section win over the built-in
/// table, so `.move` can be scanned as Rust.
#[derive(Debug, Clone, Default)]
pub struct LanguageClassifier {
    overrides: HashMap<String, SupportedLanguage>,
}

impl LanguageClassifier {
    pub fn new(overrides: &HashMap<String, SupportedLanguage>) -> Self {
        Self {
            overrides: overrides
                .iter()
                .map(|(ext, lang)| (normalize_extension(ext), *lang))
                .collect(),
        }
    }

    pub fn classify_extension(&self, ext: &str) -> SupportedLanguage {
        self.overrides
            .get(&normalize_extension(ext))
            .copied()
            .unwrap_or_else(|| SupportedLanguage::from_extension(ext))
    }

    pub fn classify_path(&self, path: &Path) -> SupportedLanguage {
        self.classify_extension(&dotted_extension(path))
    }
}
