//! Per-file directive scanning
//!
//! [`DirectiveEngine::parse_file`] walks a file line by line. Lines that are
//! doc comments holding a known directive are handed to the registered
//! command, which may consume further lines; everything else is skipped.
//! Nodes come out lazily, in directive line order.

use std::sync::Arc;

use crate::config::Config;
use crate::cursor::LineCursor;
use crate::directive::parse_directive_line;
use crate::error::ParseError;
use crate::file::RawFile;
use crate::node::DocNode;
use crate::plugin::{CommandMap, ParserContext};
use crate::syntax::{Stripper, SyntaxTable};

/// Scans files with a fixed config, syntax table and command set.
///
/// Cheap to clone; every clone shares the same command map.
#[derive(Debug, Clone)]
pub struct DirectiveEngine {
    config: Arc<Config>,
    syntax: Arc<SyntaxTable>,
    commands: CommandMap,
}

impl DirectiveEngine {
    pub fn new(config: Arc<Config>, commands: CommandMap) -> Self {
        let syntax = Arc::new(SyntaxTable::from_config(&config.parsing));
        Self {
            config,
            syntax,
            commands,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn commands(&self) -> &CommandMap {
        &self.commands
    }

    /// Start scanning `file`. Nothing is read until the iterator is polled.
    pub fn parse_file(&self, file: RawFile) -> FileNodes {
        let cursor = LineCursor::from_content(&file.content);
        let stripper = self.syntax.stripper(file.language);
        FileNodes {
            config: Arc::clone(&self.config),
            commands: self.commands.clone(),
            stripper,
            cursor,
            file,
            done: false,
        }
    }

    /// Scan `file` to completion. A file whose scan fails contributes no
    /// nodes.
    pub fn parse_all(&self, file: RawFile) -> Result<Vec<DocNode>, ParseError> {
        self.parse_file(file).collect()
    }
}

/// Lazy node sequence for one file.
///
/// Ends after the last line, or right after yielding an argument error.
pub struct FileNodes {
    config: Arc<Config>,
    commands: CommandMap,
    stripper: Stripper,
    cursor: LineCursor,
    file: RawFile,
    done: bool,
}

impl FileNodes {
    pub fn file(&self) -> &RawFile {
        &self.file
    }

    /// Run one step from the current line. `None` means the line produced
    /// no node and scanning should continue.
    fn step(&mut self) -> Option<Result<DocNode, ParseError>> {
        let start_line = self.cursor.current_index();
        let line = self.cursor.peek()?;

        let Some(comment) = self.stripper.strip(line) else {
            self.cursor.next();
            return None;
        };
        let Some(directive) = parse_directive_line(&comment) else {
            self.cursor.next();
            return None;
        };
        let Some(handler) = self.commands.get(&directive.command) else {
            log::debug!(
                "Skipping unknown directive @{} at {}:{}",
                directive.command,
                self.file.relative_path.display(),
                start_line + 1
            );
            self.cursor.next();
            return None;
        };

        let context = ParserContext {
            config: &self.config,
            file: &self.file,
            start_line,
            stripper: &self.stripper,
        };
        let result = handler.dispatch(&mut self.cursor, &context, &directive.arguments);

        let node = match result {
            Ok(node) => node,
            Err(source) => {
                self.done = true;
                return Some(Err(ParseError::ArgumentDecode {
                    command: directive.command,
                    path: self.file.path.clone(),
                    line: start_line,
                    source,
                }));
            }
        };

        if self.cursor.current_index() == start_line {
            log::warn!(
                "@{} at {}:{} did not consume its line; skipping it",
                directive.command,
                self.file.relative_path.display(),
                start_line + 1
            );
            self.cursor.next();
        }

        node.map(Ok)
    }
}

impl Iterator for FileNodes {
    type Item = Result<DocNode, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done {
            if self.cursor.is_at_end() {
                self.done = true;
                break;
            }
            if let Some(item) = self.step() {
                return Some(item);
            }
        }
        None
    }
}
