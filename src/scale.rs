//! Scales, deployable groupings of commands and listeners.
//!
//! A scale is declared as plain data: commands, listeners, and ordered hook
//! lists. Nothing touches the client until the scale is explicitly handed to
//! [`CommandRegistry::register`], which binds every declared command/listener
//! to the scale and inserts them into the client tables. `shed` reverses the
//! registration.
//!
//! [`CommandRegistry::register`]: crate::registry::CommandRegistry::register

use std::future::Future;
use std::sync::Arc;

use crate::command::{CommandContext, CommandHook, InteractionCommand, Listener, MessageCommand};
use crate::error::Error;

/// A grouping of commands and listeners with shared lifecycle hooks.
///
/// ```ignore
/// let scale = Scale::new("moderation")
///     .description("Kick/ban tooling")
///     .message_command(MessageCommand::new("kick", kick))
///     .listener(Listener::new("member_add", on_member_add));
/// registry.register(scale);
/// ```
pub struct Scale {
    name: String,
    description: Option<String>,
    pub(crate) message_commands: Vec<MessageCommand>,
    pub(crate) interaction_commands: Vec<InteractionCommand>,
    pub(crate) listeners: Vec<Listener>,
    checks: Vec<CommandHook>,
    preruns: Vec<CommandHook>,
    postruns: Vec<CommandHook>,
}

impl Scale {
    /// Declare a new, unregistered scale.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            message_commands: Vec::new(),
            interaction_commands: Vec::new(),
            listeners: Vec::new(),
            checks: Vec::new(),
            preruns: Vec::new(),
            postruns: Vec::new(),
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Declare a message command on this scale.
    pub fn message_command(mut self, command: MessageCommand) -> Self {
        self.message_commands.push(command);
        self
    }

    /// Declare an interaction command on this scale.
    pub fn interaction_command(mut self, command: InteractionCommand) -> Self {
        self.interaction_commands.push(command);
        self
    }

    /// Declare an event listener on this scale.
    pub fn listener(mut self, listener: Listener) -> Self {
        self.listeners.push(listener);
        self
    }

    // ------------------------------------------------------------------
    // Hooks
    // ------------------------------------------------------------------

    /// Add an async check run before any command in this scale. A failing
    /// check vetoes the command.
    pub fn add_check<F, Fut>(&mut self, check: F)
    where
        F: Fn(CommandContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), Error>> + Send + 'static,
    {
        self.checks.push(Arc::new(move |ctx| Box::pin(check(ctx))));
    }

    /// Add an async hook run before every command in this scale. Pre-runs
    /// only run once the checks have passed.
    pub fn add_prerun<F, Fut>(&mut self, hook: F)
    where
        F: Fn(CommandContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), Error>> + Send + 'static,
    {
        self.preruns.push(Arc::new(move |ctx| Box::pin(hook(ctx))));
    }

    /// Add an async hook run after every command in this scale.
    pub fn add_postrun<F, Fut>(&mut self, hook: F)
    where
        F: Fn(CommandContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), Error>> + Send + 'static,
    {
        self.postruns.push(Arc::new(move |ctx| Box::pin(hook(ctx))));
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description_text(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// The message commands declared on this scale.
    pub fn message_commands(&self) -> &[MessageCommand] {
        &self.message_commands
    }

    /// The interaction commands declared on this scale.
    pub fn interaction_commands(&self) -> &[InteractionCommand] {
        &self.interaction_commands
    }

    /// The listeners declared on this scale.
    pub fn listeners(&self) -> &[Listener] {
        &self.listeners
    }

    /// Checks, in registration order.
    pub fn checks(&self) -> &[CommandHook] {
        &self.checks
    }

    /// Pre-run hooks, in registration order.
    pub fn preruns(&self) -> &[CommandHook] {
        &self.preruns
    }

    /// Post-run hooks, in registration order.
    pub fn postruns(&self) -> &[CommandHook] {
        &self.postruns
    }

    /// Stamp the scale's name onto every declared command and listener.
    /// Called once during registration.
    pub(crate) fn bind(&mut self) {
        for command in &mut self.message_commands {
            command.scale = Some(self.name.clone());
        }
        for command in &mut self.interaction_commands {
            command.scale = Some(self.name.clone());
        }
        for listener in &mut self.listeners {
            listener.scale = Some(self.name.clone());
        }
    }
}

impl std::fmt::Debug for Scale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scale")
            .field("name", &self.name)
            .field("message_commands", &self.message_commands.len())
            .field("interaction_commands", &self.interaction_commands.len())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
