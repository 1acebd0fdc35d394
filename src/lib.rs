//! Client-side object and event model for the Discord API.
//!
//! This crate covers the data half of a Discord client: typed entities
//! (applications, emojis, stickers, assets, and the lean objects they
//! reference), typed wrappers for inbound gateway events, and the "scale"
//! grouping mechanism for organising command/listener registrations.
//!
//! Entities reference each other by [`Snowflake`] only and resolve those
//! references lazily against a [`cache::Cache`]: synchronously when the
//! entity is resident, as an awaitable otherwise (see [`proxy`]). Outbound
//! mutation goes through the thin [`http::Http`] collaborator behind the
//! `http` feature; gateway transport, sharding, and dispatch live outside
//! this crate.

pub mod cache;
pub mod command;
pub mod error;
pub mod events;
pub mod models;
pub mod proxy;
pub mod registry;
pub mod scale;
pub mod snowflake;
pub mod util;

#[cfg(feature = "http")]
pub mod http;

pub use cache::{Cache, MemoryCache};
pub use command::{
    CommandContext, CommandScope, InteractionCommand, Listener, MessageCommand,
};
pub use error::Error;
pub use events::{Event, GatewayPayload};
pub use proxy::{CacheProxy, CacheView, Resolution};
pub use registry::CommandRegistry;
pub use scale::Scale;
pub use snowflake::Snowflake;

#[cfg(feature = "http")]
pub use http::Http;
