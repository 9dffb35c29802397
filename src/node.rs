//! Documentation nodes produced by command handlers

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::file::RawFile;
use crate::language::SupportedLanguage;

/// Unique node id, conventionally `"<relative path>:<local id>"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Id scoped to a file: `src/index.ts:intro`.
    pub fn scoped(file: &RawFile, local: &str) -> Self {
        Self(format!("{}:{}", file.relative_path_str(), local))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where a node came from. `start_line <= end_line` always holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceLocation {
    pub absolute_path: PathBuf,
    pub file_id: String,
    pub language: SupportedLanguage,
    /// 0-based index of the first line.
    pub start_line: usize,
    /// 0-based index of the last line, inclusive.
    pub end_line: usize,
}

impl SourceLocation {
    /// Span over `file`. The bounds are ordered, so a reversed pair still
    /// produces a valid location.
    pub fn span(file: &RawFile, start_line: usize, end_line: usize) -> Self {
        Self {
            absolute_path: file.path.clone(),
            file_id: file.id.clone(),
            language: file.language,
            start_line: start_line.min(end_line),
            end_line: start_line.max(end_line),
        }
    }

    pub fn line_count(&self) -> usize {
        self.end_line - self.start_line + 1
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeMetadata {
    pub content_hash: String,
    pub source: SourceLocation,
    pub plugin_data: BTreeMap<String, serde_json::Value>,
    pub ui: BTreeMap<String, serde_json::Value>,
}

impl NodeMetadata {
    pub fn new(source: SourceLocation, content: &str) -> Self {
        Self {
            content_hash: content_hash(content),
            source,
            plugin_data: BTreeMap::new(),
            ui: BTreeMap::new(),
        }
    }
}

/// A unit of extracted documentation structure (snippet, chapter, ...).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocNode {
    pub id: NodeId,
    #[serde(rename = "type")]
    pub node_type: String,
    pub attributes: BTreeMap<String, serde_json::Value>,
    pub children: Vec<NodeId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<NodeId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<NodeMetadata>,
}

impl DocNode {
    pub fn new(id: NodeId, node_type: impl Into<String>) -> Self {
        Self {
            id,
            node_type: node_type.into(),
            attributes: BTreeMap::new(),
            children: Vec::new(),
            parent_id: None,
            metadata: None,
        }
    }

    pub fn with_attribute(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.attributes.insert(key.to_string(), value.into());
        self
    }

    pub fn with_child(mut self, child: NodeId) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_parent(mut self, parent: NodeId) -> Self {
        self.parent_id = Some(parent);
        self
    }

    pub fn with_metadata(mut self, metadata: NodeMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn source(&self) -> Option<&SourceLocation> {
        self.metadata.as_ref().map(|m| &m.source)
    }
}

/// Hex-encoded SHA-256 of `content`.
pub fn content_hash(content: &str) -> String {
    format!("{:x}", Sha256::digest(content.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::LanguageClassifier;
    use std::path::Path;

    fn sample_file() -> RawFile {
        RawFile::new(
            Path::new("/p/src/a.ts"),
            Path::new("/p"),
            String::new(),
            &LanguageClassifier::default(),
        )
    }

    #[test]
    fn test_scoped_id() {
        let file = sample_file();
        assert_eq!(NodeId::scoped(&file, "intro").as_str(), "src/a.ts:intro");
    }

    #[test]
    fn test_span_orders_bounds() {
        let file = sample_file();
        let loc = SourceLocation::span(&file, 7, 3);
        assert_eq!(loc.start_line, 3);
        assert_eq!(loc.end_line, 7);
        assert_eq!(loc.line_count(), 5);
        assert_eq!(loc.file_id, file.id);
        assert_eq!(loc.language, SupportedLanguage::TypeScript);
    }

    #[test]
    fn test_content_hash_is_stable_hex() {
        let a = content_hash("hello");
        assert_eq!(a.len(), 64);
        assert_eq!(a, content_hash("hello"));
        assert_ne!(a, content_hash("hello "));
        assert_eq!(
            a,
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
    }

    #[test]
    fn test_serialize_shape() {
        let file = sample_file();
        let node = DocNode::new(NodeId::scoped(&file, "x"), "snippet")
            .with_attribute("id", "x")
            .with_metadata(NodeMetadata::new(SourceLocation::span(&file, 0, 2), "body"));
        let json = serde_json::to_value(&node).unwrap();

        assert_eq!(json["id"], "src/a.ts:x");
        assert_eq!(json["type"], "snippet");
        assert_eq!(json["attributes"]["id"], "x");
        assert_eq!(json["children"], serde_json::json!([]));
        assert!(json.get("parentId").is_none());
        assert_eq!(json["metadata"]["source"]["startLine"], 0);
        assert_eq!(json["metadata"]["source"]["endLine"], 2);
        assert_eq!(json["metadata"]["source"]["language"], "typescript");
    }
}
