//! Comment syntax stripping
//!
//! Each language has one doc-comment start token (and optionally an end
//! token). A [`Stripper`] recognizes a line as a doc comment and returns its
//! text with the markers removed.

use std::collections::HashMap;

use crate::config::ParsingConfig;
use crate::language::{LanguageClassifier, SupportedLanguage};

/// Start token used for languages without a configured entry.
pub const DEFAULT_COMMENT_START: &str = "///";

/// Comment markers for one language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentSyntax {
    pub start: String,
    pub end: Option<String>,
}

impl CommentSyntax {
    pub fn new(start: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: None,
        }
    }

    pub fn with_end(mut self, end: impl Into<String>) -> Self {
        self.end = Some(end.into());
        self
    }
}

impl Default for CommentSyntax {
    fn default() -> Self {
        Self::new(DEFAULT_COMMENT_START)
    }
}

/// Language → comment syntax table, built once at startup.
#[derive(Debug, Clone, Default)]
pub struct SyntaxTable {
    by_language: HashMap<SupportedLanguage, CommentSyntax>,
}

impl SyntaxTable {
    /// Build the table from the `parsing` config section.
    ///
    /// Extensions are classified with the configured language overrides.
    /// When two extensions of the same language carry different tokens, the
    /// lexicographically last extension wins.
    pub fn from_config(parsing: &ParsingConfig) -> Self {
        let classifier = LanguageClassifier::new(&parsing.language_map);
        let mut entries: Vec<_> = parsing.comment_tokens.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));

        let mut table = Self::default();
        for (ext, token) in entries {
            let mut syntax = CommentSyntax::new(token.start());
            if let Some(end) = token.end() {
                syntax = syntax.with_end(end);
            }
            table.insert(classifier.classify_extension(ext), syntax);
        }
        table
    }

    pub fn insert(&mut self, language: SupportedLanguage, syntax: CommentSyntax) {
        self.by_language.insert(language, syntax);
    }

    /// Syntax for `language`, falling back to `///`.
    pub fn syntax(&self, language: SupportedLanguage) -> CommentSyntax {
        self.by_language.get(&language).cloned().unwrap_or_default()
    }

    pub fn stripper(&self, language: SupportedLanguage) -> Stripper {
        Stripper {
            syntax: self.syntax(language),
        }
    }
}

/// Detects and removes comment markers from single lines.
#[derive(Debug, Clone)]
pub struct Stripper {
    syntax: CommentSyntax,
}

impl Stripper {
    pub fn new(syntax: CommentSyntax) -> Self {
        Self { syntax }
    }

    /// Return the comment text of `line`, or `None` if it is not a comment.
    pub fn strip(&self, line: &str) -> Option<String> {
        let trimmed = line.trim();
        let mut content = trimmed.strip_prefix(self.syntax.start.as_str())?;

        if let Some(end) = self.syntax.end.as_deref() {
            if !end.is_empty() {
                content = content.strip_suffix(end).unwrap_or(content);
            }
        }

        Some(content.trim().to_string())
    }
}
