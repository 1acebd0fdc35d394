//! Events dispatched by the client itself rather than Discord.
//!
//! These mark connection lifecycle transitions and carry no payload; they
//! exist so listeners can key on them by name like any other event.

/// The bot has just logged in.
#[derive(Debug, Clone, Copy, Default)]
pub struct Login;

/// The bot is now connected to the gateway.
#[derive(Debug, Clone, Copy, Default)]
pub struct Connect;

/// The bot has resumed its gateway connection.
#[derive(Debug, Clone, Copy, Default)]
pub struct Resume;

/// The bot has just disconnected.
#[derive(Debug, Clone, Copy, Default)]
pub struct Disconnect;

/// The gateway has reported that it is ready.
#[derive(Debug, Clone, Copy, Default)]
pub struct WebsocketReady;
