//! The built-in `core` directive pack
//!
//! - `@snippet id=<id> [title=<text>] [lang=<lang>]` ... `@end` captures the
//!   lines between the two directives.
//! - `@chapter id=<id> title=<text> [order=<n>] [description=<text>]`
//!   declares a chapter.

use serde::{Deserialize, Deserializer};

use crate::cursor::LineCursor;
use crate::directive::parse_directive_line;
use crate::node::{DocNode, NodeId, NodeMetadata, SourceLocation};
use crate::syntax::Stripper;

use super::{Command, ParserContext, ParserPlugin};

pub const CORE_PLUGIN_NAME: &str = "core";

/// Directive that terminates a snippet body.
pub const END_COMMAND: &str = "end";

/// The `core` plugin with `snippet` and `chapter`.
pub fn core_plugin() -> ParserPlugin {
    ParserPlugin::new(CORE_PLUGIN_NAME, env!("CARGO_PKG_VERSION"))
        .command("snippet", SnippetCommand)
        .command("chapter", ChapterCommand)
}

/// True when `line` is a doc comment holding the `@end` directive.
pub fn is_end_directive(stripper: &Stripper, line: &str) -> bool {
    stripper
        .strip(line)
        .and_then(|text| parse_directive_line(&text))
        .is_some_and(|d| d.command == END_COMMAND)
}

/// A text argument as the grammar hands it over: numeric-looking and
/// boolean values arrive coerced even when quoted.
#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl From<Scalar> for String {
    fn from(value: Scalar) -> Self {
        match value {
            Scalar::Text(s) => s,
            Scalar::Int(n) => n.to_string(),
            Scalar::Float(n) => n.to_string(),
            Scalar::Bool(b) => b.to_string(),
        }
    }
}

fn text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Scalar::deserialize(deserializer).map(String::from)
}

fn optional_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Option::<Scalar>::deserialize(deserializer).map(|v| v.map(String::from))
}

#[derive(Debug, Deserialize)]
pub struct SnippetArgs {
    #[serde(deserialize_with = "text")]
    pub id: String,
    #[serde(default, deserialize_with = "optional_text")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    pub lang: Option<String>,
}

pub struct SnippetCommand;

impl Command for SnippetCommand {
    type Args = SnippetArgs;

    fn run(
        &self,
        cursor: &mut LineCursor,
        context: &ParserContext<'_>,
        args: SnippetArgs,
    ) -> Option<DocNode> {
        let start = context.start_line;
        cursor.next();

        let body = cursor.take_until(|line| is_end_directive(context.stripper, line));
        if cursor.peek().is_some() {
            cursor.next();
        } else {
            log::warn!(
                "Snippet '{}' in {} has no @end; captured to end of file",
                args.id,
                context.file.relative_path.display()
            );
        }
        let end = cursor.current_index().saturating_sub(1).max(start);

        let content = body.join("\n");
        let lang = args
            .lang
            .unwrap_or_else(|| context.file.language.as_str().to_string());

        let mut node = DocNode::new(NodeId::scoped(context.file, &args.id), "snippet")
            .with_attribute("id", args.id.as_str())
            .with_attribute("lang", lang)
            .with_attribute("content", content.as_str());
        if let Some(title) = args.title {
            node = node.with_attribute("title", title);
        }

        Some(node.with_metadata(NodeMetadata::new(
            SourceLocation::span(context.file, start, end),
            &content,
        )))
    }
}

#[derive(Debug, Deserialize)]
pub struct ChapterArgs {
    #[serde(deserialize_with = "text")]
    pub id: String,
    #[serde(deserialize_with = "text")]
    pub title: String,
    #[serde(default)]
    pub order: Option<f64>,
    #[serde(default, deserialize_with = "optional_text")]
    pub description: Option<String>,
}

pub struct ChapterCommand;

impl Command for ChapterCommand {
    type Args = ChapterArgs;

    fn run(
        &self,
        cursor: &mut LineCursor,
        context: &ParserContext<'_>,
        args: ChapterArgs,
    ) -> Option<DocNode> {
        cursor.next();

        let mut node = DocNode::new(NodeId::scoped(context.file, &args.id), "chapter")
            .with_attribute("id", args.id.as_str())
            .with_attribute("title", args.title.as_str());
        if let Some(order) = args.order {
            node = node.with_attribute("order", order);
        }
        if let Some(description) = args.description {
            node = node.with_attribute("description", description);
        }

        Some(node.with_metadata(NodeMetadata::new(
            SourceLocation::span(context.file, context.start_line, context.start_line),
            &args.title,
        )))
    }
}
