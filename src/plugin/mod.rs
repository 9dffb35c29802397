//! Directive plugins
//!
//! A plugin is a named bundle of command handlers. Each handler declares the
//! shape of its arguments as a `serde::Deserialize` type; the engine decodes
//! the parsed argument map into that shape before calling the handler.
//!
//! # Architecture
//!
//! - **[`Command`]**: typed handler trait, what plugin authors implement
//! - **[`CommandHandler`]**: object-safe form stored in the registry
//! - **[`ParserPlugin`]**: descriptor with a name, version and commands
//! - **[`PluginRegistry`]**: merges plugins, then freezes into a [`CommandMap`]

pub mod builtin;
mod registry;

use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::config::Config;
use crate::cursor::LineCursor;
use crate::directive::{ArgMap, args_to_json};
use crate::file::RawFile;
use crate::node::DocNode;
use crate::syntax::Stripper;

pub use registry::{CommandMap, PluginInfo, PluginRegistry};

/// Read-only context handed to every handler invocation.
#[derive(Debug, Clone, Copy)]
pub struct ParserContext<'a> {
    pub config: &'a Config,
    pub file: &'a RawFile,
    /// Cursor index of the directive line.
    pub start_line: usize,
    /// Comment stripper for the file's language.
    pub stripper: &'a Stripper,
}

/// Argument shape accepting any arguments.
pub type AnyArgs = serde_json::Map<String, serde_json::Value>;

/// A typed directive handler.
pub trait Command: Send + Sync {
    /// Declared argument shape.
    type Args: DeserializeOwned;

    /// Run the directive. The cursor is positioned on the directive line;
    /// the handler may consume any number of lines. Returning `None` is
    /// valid for side-effect-only directives.
    fn run(
        &self,
        cursor: &mut LineCursor,
        context: &ParserContext<'_>,
        args: Self::Args,
    ) -> Option<DocNode>;
}

/// Object-safe handler stored in the registry.
pub trait CommandHandler: Send + Sync {
    /// Decode `args` into the handler's shape and run it.
    fn dispatch(
        &self,
        cursor: &mut LineCursor,
        context: &ParserContext<'_>,
        args: &ArgMap,
    ) -> Result<Option<DocNode>, serde_json::Error>;
}

impl<C: Command> CommandHandler for C {
    fn dispatch(
        &self,
        cursor: &mut LineCursor,
        context: &ParserContext<'_>,
        args: &ArgMap,
    ) -> Result<Option<DocNode>, serde_json::Error> {
        let decoded = decode_args::<C::Args>(args)?;
        Ok(self.run(cursor, context, decoded))
    }
}

/// Decode an argument map into a typed shape.
pub fn decode_args<T: DeserializeOwned>(args: &ArgMap) -> Result<T, serde_json::Error> {
    serde_json::from_value(args_to_json(args))
}

/// Handler built from a closure by [`define_command`].
pub struct FnCommand<A, F> {
    run: F,
    _args: PhantomData<fn() -> A>,
}

impl<A, F> Command for FnCommand<A, F>
where
    A: DeserializeOwned,
    F: Fn(&mut LineCursor, &ParserContext<'_>, A) -> Option<DocNode> + Send + Sync,
{
    type Args = A;

    fn run(&self, cursor: &mut LineCursor, context: &ParserContext<'_>, args: A) -> Option<DocNode> {
        (self.run)(cursor, context, args)
    }
}

/// Lift a closure into a command handler; `A` is inferred from the closure.
pub fn define_command<A, F>(run: F) -> FnCommand<A, F>
where
    A: DeserializeOwned,
    F: Fn(&mut LineCursor, &ParserContext<'_>, A) -> Option<DocNode> + Send + Sync,
{
    FnCommand {
        run,
        _args: PhantomData,
    }
}

/// A named, versioned bundle of command handlers.
#[derive(Clone)]
pub struct ParserPlugin {
    pub name: String,
    pub version: String,
    pub commands: BTreeMap<String, Arc<dyn CommandHandler>>,
}

impl ParserPlugin {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            commands: BTreeMap::new(),
        }
    }

    /// Add a command. A later command with the same name replaces the earlier one.
    pub fn command<H>(mut self, name: impl Into<String>, handler: H) -> Self
    where
        H: CommandHandler + 'static,
    {
        self.commands.insert(name.into(), Arc::new(handler));
        self
    }
}

impl fmt::Debug for ParserPlugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParserPlugin")
            .field("name", &self.name)
            .field("version", &self.version)
            .field("commands", &self.commands.keys().collect::<Vec<_>>())
            .finish()
    }
}
