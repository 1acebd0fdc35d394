//! The client-owned command/listener tables and scale registry.
//!
//! Single-threaded cooperative access is assumed: registration and shedding
//! mutate the tables without internal locking, so callers must not drive
//! them from concurrent tasks without external synchronisation.

use std::collections::HashMap;

use tracing::debug;

use crate::command::{CommandScope, InteractionCommand, Listener, MessageCommand};
use crate::scale::Scale;

/// Name-keyed command table, scope+name-keyed interaction table, listener
/// collection, and scale registry: the registration surface a client owns.
#[derive(Debug, Default)]
pub struct CommandRegistry {
    commands: HashMap<String, MessageCommand>,
    interactions: HashMap<CommandScope, HashMap<String, InteractionCommand>>,
    listeners: Vec<Listener>,
    scales: HashMap<String, Scale>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    // ------------------------------------------------------------------
    // Direct registration
    // ------------------------------------------------------------------

    /// Insert a message command, keyed by name. Last registration wins;
    /// avoiding name collisions is the caller's responsibility.
    pub fn add_message_command(&mut self, command: MessageCommand) {
        if self.commands.contains_key(&command.name) {
            debug!(command = %command.name, "overwriting existing message command");
        }
        self.commands.insert(command.name.clone(), command);
    }

    /// Insert an interaction command, keyed by scope then name. Last
    /// registration wins.
    pub fn add_interaction(&mut self, command: InteractionCommand) {
        let scoped = self.interactions.entry(command.scope).or_default();
        if scoped.contains_key(&command.name) {
            debug!(command = %command.name, "overwriting existing interaction command");
        }
        scoped.insert(command.name.clone(), command);
    }

    /// Append an event listener.
    pub fn add_listener(&mut self, listener: Listener) {
        self.listeners.push(listener);
    }

    // ------------------------------------------------------------------
    // Scales
    // ------------------------------------------------------------------

    /// Register a scale: bind its declarations to it and insert all of them
    /// into the tables.
    ///
    /// Registration is all-or-nothing relative to the scale's declarations.
    /// A scale registered under an already-used name replaces the previous
    /// scale's registry entry (its table entries are overwritten per key,
    /// last wins).
    pub fn register(&mut self, mut scale: Scale) {
        scale.bind();

        for command in &scale.message_commands {
            self.add_message_command(command.clone());
        }
        for command in &scale.interaction_commands {
            self.add_interaction(command.clone());
        }
        for listener in &scale.listeners {
            self.add_listener(listener.clone());
        }

        debug!(
            scale = scale.name(),
            commands = scale.message_commands.len() + scale.interaction_commands.len(),
            listeners = scale.listeners.len(),
            "scale registered"
        );
        self.scales.insert(scale.name().to_string(), scale);
    }

    /// Shed a scale: remove every command it registered (matching by
    /// name/scope), its listeners, and the scale itself.
    ///
    /// Entries already absent from the tables are skipped per entry, and
    /// shedding an unknown scale is a no-op. Returns whether a scale was
    /// removed.
    pub fn shed(&mut self, name: &str) -> bool {
        let Some(scale) = self.scales.remove(name) else {
            return false;
        };

        for command in &scale.message_commands {
            if self.commands.contains_key(&command.name) {
                self.commands.remove(&command.name);
            }
        }
        for command in &scale.interaction_commands {
            if let Some(scoped) = self.interactions.get_mut(&command.scope) {
                if scoped.contains_key(&command.name) {
                    scoped.remove(&command.name);
                }
                if scoped.is_empty() {
                    self.interactions.remove(&command.scope);
                }
            }
        }
        self.listeners
            .retain(|listener| listener.scale() != Some(name));

        debug!(scale = name, "scale shed");
        true
    }

    // ------------------------------------------------------------------
    // Lookup
    // ------------------------------------------------------------------

    pub fn command(&self, name: &str) -> Option<&MessageCommand> {
        self.commands.get(name)
    }

    pub fn interaction(&self, scope: CommandScope, name: &str) -> Option<&InteractionCommand> {
        self.interactions.get(&scope)?.get(name)
    }

    pub fn listeners(&self) -> &[Listener] {
        &self.listeners
    }

    /// Listeners subscribed to a given event name, in registration order.
    pub fn listeners_for<'a>(
        &'a self,
        event_name: &'a str,
    ) -> impl Iterator<Item = &'a Listener> + 'a {
        self.listeners
            .iter()
            .filter(move |listener| listener.event == event_name)
    }

    pub fn scale(&self, name: &str) -> Option<&Scale> {
        self.scales.get(name)
    }

    pub fn command_count(&self) -> usize {
        self.commands.len()
    }

    pub fn interaction_count(&self) -> usize {
        self.interactions.values().map(HashMap::len).sum()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
