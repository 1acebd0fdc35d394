//! Commands, listeners, and the async hook signatures they share.
//!
//! These are declaration-side types only: the dispatch framework that
//! actually invokes them against incoming gateway traffic lives outside this
//! crate. Callbacks are stored as boxed async functions behind `Arc`, so
//! commands stay cheap to clone into the client tables.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures_lite::future::Boxed;
use serde_json::Value;

use crate::error::Error;
use crate::events::Event;
use crate::snowflake::Snowflake;

/// Future type every hook/callback returns.
pub type HookFuture = Boxed<Result<(), Error>>;

/// An async callback invoked with the triggering command context.
pub type CommandHook = Arc<dyn Fn(CommandContext) -> HookFuture + Send + Sync>;

/// An async callback invoked with the triggering event.
pub type ListenerHook = Arc<dyn Fn(Event) -> HookFuture + Send + Sync>;

/// Context handed to command callbacks and scale hooks.
///
/// Carries the invocation identity plus the raw interaction/message data;
/// richer context objects are the dispatch framework's concern.
#[derive(Debug, Clone, Default)]
pub struct CommandContext {
    /// The name the command was invoked with.
    pub invoked_name: String,
    /// The scale the command belongs to, once registered.
    pub scale: Option<String>,
    /// Raw payload of the triggering interaction or message.
    pub data: Value,
}

/// Where an interaction command is available.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandScope {
    Global,
    Guild(Snowflake),
}

// ---------------------------------------------------------------------------
// Message commands
// ---------------------------------------------------------------------------

/// A prefixed text command, keyed by name in the client's command table.
#[derive(Clone)]
pub struct MessageCommand {
    pub name: String,
    pub description: Option<String>,
    pub(crate) scale: Option<String>,
    callback: CommandHook,
}

impl MessageCommand {
    pub fn new<F, Fut>(name: impl Into<String>, callback: F) -> Self
    where
        F: Fn(CommandContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), Error>> + Send + 'static,
    {
        Self {
            name: name.into(),
            description: None,
            scale: None,
            callback: Arc::new(move |ctx| Box::pin(callback(ctx))),
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// The scale this command was registered from, if any.
    pub fn scale(&self) -> Option<&str> {
        self.scale.as_deref()
    }

    pub async fn invoke(&self, ctx: CommandContext) -> Result<(), Error> {
        (self.callback)(ctx).await
    }
}

impl fmt::Debug for MessageCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageCommand")
            .field("name", &self.name)
            .field("scale", &self.scale)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Interaction commands
// ---------------------------------------------------------------------------

/// A slash/context-menu command, keyed by scope then name in the client's
/// interaction table.
#[derive(Clone)]
pub struct InteractionCommand {
    pub scope: CommandScope,
    pub name: String,
    pub description: Option<String>,
    pub(crate) scale: Option<String>,
    callback: CommandHook,
}

impl InteractionCommand {
    pub fn new<F, Fut>(scope: CommandScope, name: impl Into<String>, callback: F) -> Self
    where
        F: Fn(CommandContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), Error>> + Send + 'static,
    {
        Self {
            scope,
            name: name.into(),
            description: None,
            scale: None,
            callback: Arc::new(move |ctx| Box::pin(callback(ctx))),
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// The scale this command was registered from, if any.
    pub fn scale(&self) -> Option<&str> {
        self.scale.as_deref()
    }

    pub async fn invoke(&self, ctx: CommandContext) -> Result<(), Error> {
        (self.callback)(ctx).await
    }
}

impl fmt::Debug for InteractionCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InteractionCommand")
            .field("scope", &self.scope)
            .field("name", &self.name)
            .field("scale", &self.scale)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Listeners
// ---------------------------------------------------------------------------

/// An event listener, keyed by the snake_case event name (see
/// [`Event::name`]).
#[derive(Clone)]
pub struct Listener {
    pub event: String,
    pub(crate) scale: Option<String>,
    callback: ListenerHook,
}

impl Listener {
    pub fn new<F, Fut>(event: impl Into<String>, callback: F) -> Self
    where
        F: Fn(Event) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), Error>> + Send + 'static,
    {
        Self {
            event: event.into(),
            scale: None,
            callback: Arc::new(move |event| Box::pin(callback(event))),
        }
    }

    /// The scale this listener was registered from, if any.
    pub fn scale(&self) -> Option<&str> {
        self.scale.as_deref()
    }

    pub async fn invoke(&self, event: Event) -> Result<(), Error> {
        (self.callback)(event).await
    }
}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listener")
            .field("event", &self.event)
            .field("scale", &self.scale)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use futures_lite::future::block_on;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn message_command_invokes_callback() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);
        let command = MessageCommand::new("ping", move |ctx| {
            let seen = Arc::clone(&seen);
            async move {
                assert_eq!(ctx.invoked_name, "ping");
                seen.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        });

        let ctx = CommandContext {
            invoked_name: "ping".to_string(),
            ..Default::default()
        };
        block_on(command.invoke(ctx)).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn command_is_unbound_until_registered() {
        let command = MessageCommand::new("ping", |_| async { Ok(()) });
        assert!(command.scale().is_none());
    }

    #[test]
    fn listener_invokes_with_event() {
        let listener = Listener::new("heartbeat_ack", |event| async move {
            assert_eq!(event.name(), "heartbeat_ack");
            Ok(())
        });
        block_on(listener.invoke(Event::HeartbeatAck)).unwrap();
    }

    #[test]
    fn scopes_are_distinct_keys() {
        let global = CommandScope::Global;
        let guild = CommandScope::Guild(Snowflake::new(1));
        assert_ne!(global, guild);
        assert_ne!(CommandScope::Guild(Snowflake::new(2)), guild);
    }

    #[test]
    fn debug_omits_the_callback() {
        let command = MessageCommand::new("ping", |_| async { Ok(()) });
        let debug = format!("{command:?}");
        assert!(debug.contains("ping"));
    }
}
