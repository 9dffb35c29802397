//! Command registry
//!
//! Plugins are merged into the registry at startup; the registry is then
//! frozen into a [`CommandMap`] that scanning threads share without locking.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::{CommandHandler, ParserPlugin};

/// Name and version of a registered plugin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginInfo {
    pub name: String,
    pub version: String,
}

/// Mutable command table, populated before any scanning starts.
#[derive(Default)]
pub struct PluginRegistry {
    commands: HashMap<String, Arc<dyn CommandHandler>>,
    plugins: Vec<PluginInfo>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge a plugin's commands into the table.
    ///
    /// On a name collision the new handler replaces the old one
    /// (last registration wins) and a warning is logged.
    pub fn register(&mut self, plugin: ParserPlugin) -> &mut Self {
        for (command, handler) in plugin.commands {
            if self.commands.insert(command.clone(), handler).is_some() {
                log::warn!(
                    "Duplicate command '@{}' from plugin '{}' replaces an earlier registration",
                    command,
                    plugin.name
                );
            }
        }
        self.plugins.push(PluginInfo {
            name: plugin.name,
            version: plugin.version,
        });
        self
    }

    /// Plugins in registration order.
    pub fn registered_plugins(&self) -> &[PluginInfo] {
        &self.plugins
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Immutable snapshot of the current table.
    pub fn command_map(&self) -> CommandMap {
        CommandMap(Arc::new(self.commands.clone()))
    }

    /// Freeze the registry without copying the table.
    pub fn into_command_map(self) -> CommandMap {
        CommandMap(Arc::new(self.commands))
    }
}

impl fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("commands", &self.command_map().names())
            .field("plugins", &self.plugins)
            .finish()
    }
}

/// Read-only command lookup table, cheap to clone and share across threads.
#[derive(Clone, Default)]
pub struct CommandMap(Arc<HashMap<String, Arc<dyn CommandHandler>>>);

impl CommandMap {
    pub fn get(&self, command: &str) -> Option<&dyn CommandHandler> {
        self.0.get(command).map(|h| h.as_ref())
    }

    pub fn contains(&self, command: &str) -> bool {
        self.0.contains_key(command)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Command names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.0.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for CommandMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CommandMap").field(&self.names()).finish()
    }
}
