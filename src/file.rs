//! Discovered source files

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::language::{LanguageClassifier, SupportedLanguage, dotted_extension};

/// A source file read from disk, ready for scanning.
///
/// Created once per discovered path and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawFile {
    /// Opaque id, unique per discovered file.
    pub id: String,
    /// Absolute path.
    pub path: PathBuf,
    /// Path relative to the project root.
    pub relative_path: PathBuf,
    /// Extension with its leading dot, empty when the file has none.
    pub extension: String,
    pub language: SupportedLanguage,
    #[serde(skip_serializing)]
    pub content: String,
}

impl RawFile {
    /// Build a record for `path` under `root`, assigning a fresh id.
    pub fn new(
        path: &Path,
        root: &Path,
        content: String,
        classifier: &LanguageClassifier,
    ) -> Self {
        let relative_path = path
            .strip_prefix(root)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| path.to_path_buf());

        Self {
            id: new_file_id(),
            path: path.to_path_buf(),
            relative_path,
            extension: dotted_extension(path),
            language: classifier.classify_path(path),
            content,
        }
    }

    /// Relative path with `/` separators, used in node ids.
    pub fn relative_path_str(&self) -> String {
        self.relative_path
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }
}

fn new_file_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}
