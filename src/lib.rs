//! sourcedocs - extract documentation nodes from directives in source comments
//!
//! Source files are discovered by glob, read concurrently, then scanned line
//! by line for doc comments such as `/// @snippet id=intro`. Each directive
//! is handed to a registered command, which turns it into a [`DocNode`].
//!
//! ```no_run
//! use std::sync::Arc;
//! use sourcedocs::{Config, LocalFs, Pipeline, PluginRegistry, core_plugin};
//!
//! let config = Config::default().with_include(["contracts/**/*.sol"]);
//! let mut registry = PluginRegistry::new();
//! registry.register(core_plugin());
//!
//! let pipeline = Pipeline::new(config, registry.into_command_map(), Arc::new(LocalFs));
//! for node in pipeline.nodes() {
//!     println!("{}", node?.id);
//! }
//! # Ok::<(), sourcedocs::PipelineError>(())
//! ```

pub mod cancel;
pub mod collector;
pub mod config;
pub mod cursor;
pub mod directive;
pub mod engine;
pub mod error;
pub mod file;
pub mod language;
pub mod node;
pub mod output;
pub mod pipeline;
pub mod plugin;
pub mod syntax;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use cancel::CancellationToken;
pub use collector::{Collector, FileStream, FileSystem, LocalFs, MAX_CONCURRENT_READS};
pub use config::{CommentToken, Config, ParsingConfig};
pub use cursor::LineCursor;
pub use directive::{ArgMap, ArgValue, DirectiveLine, parse_args, parse_directive_line};
pub use engine::{DirectiveEngine, FileNodes};
pub use error::{CollectError, ConfigError, GlobError, ParseError, PipelineError};
pub use file::RawFile;
pub use language::{LanguageClassifier, SupportedLanguage};
pub use node::{DocNode, NodeId, NodeMetadata, SourceLocation};
pub use output::{print_json, write_json};
pub use pipeline::{Pipeline, PipelineNodes};
pub use plugin::builtin::core_plugin;
pub use plugin::{
    AnyArgs, Command, CommandHandler, CommandMap, ParserContext, ParserPlugin, PluginInfo,
    PluginRegistry, define_command,
};
pub use syntax::{CommentSyntax, Stripper, SyntaxTable};
