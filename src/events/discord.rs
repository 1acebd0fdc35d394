//! Typed payloads for events dispatched by Discord.
//!
//! One container per gateway dispatch, shaped after the wire payload:
//! deserialising ignores unknown fields and fails when a required field is
//! missing. Update-style events carry explicit `before`/`after` state; the
//! gateway only ships the new state, so `before` is filled in by whoever
//! dispatches the event (normally from the cache) via the `pair`
//! constructors, and stays empty otherwise.
//!
//! Events that Discord ships without a full object (deletes, bulk deletes,
//! reactions) carry bare snowflakes instead, so they can be dispatched
//! without requiring the entity to be known.

use serde::Deserialize;
use serde_json::Value;

use crate::models::{
    Channel, Emoji, Guild, Member, PartialUser, Role, Sticker, ThreadMember, User,
};
use crate::snowflake::Snowflake;

// ---------------------------------------------------------------------------
// Raw / untyped
// ---------------------------------------------------------------------------

/// An event with no typed variant (or one whose payload failed to parse).
/// Holds the raw envelope data so callers can still inspect it.
#[derive(Debug, Clone)]
pub struct RawGatewayEvent {
    pub event_name: Option<String>,
    pub op: u8,
    pub data: Option<Value>,
}

// ---------------------------------------------------------------------------
// Channels
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(transparent)]
pub struct ChannelCreate {
    pub channel: Channel,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(transparent)]
pub struct ChannelUpdate {
    pub channel: Channel,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(transparent)]
pub struct ChannelDelete {
    pub channel: Channel,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChannelPinsUpdate {
    pub guild_id: Option<Snowflake>,
    pub channel_id: Snowflake,
    /// When the most recent pinned message was pinned.
    pub last_pin_timestamp: Option<String>,
}

// ---------------------------------------------------------------------------
// Threads
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(transparent)]
pub struct ThreadCreate {
    pub thread: Channel,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(transparent)]
pub struct ThreadUpdate {
    pub thread: Channel,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(transparent)]
pub struct ThreadDelete {
    pub thread: Channel,
}

/// Sent when gaining access to a channel; contains all active threads in
/// that channel.
#[derive(Debug, Clone, Deserialize)]
pub struct ThreadListSync {
    pub guild_id: Snowflake,
    /// The parent channels whose threads are being synced. Omitted when
    /// threads were synced for the whole guild.
    #[serde(default)]
    pub channel_ids: Vec<Snowflake>,
    #[serde(default)]
    pub threads: Vec<Channel>,
    /// Thread member objects for the current user, indicating which of the
    /// synced threads the current user is in.
    #[serde(default)]
    pub members: Vec<ThreadMember>,
}

/// The thread member object for the current user was updated.
#[derive(Debug, Clone, Deserialize)]
pub struct ThreadMemberUpdate {
    pub guild_id: Option<Snowflake>,
    #[serde(flatten)]
    pub member: ThreadMember,
}

/// Anyone was added to or removed from a thread.
#[derive(Debug, Clone, Deserialize)]
pub struct ThreadMembersUpdate {
    /// The thread's ID.
    pub id: Snowflake,
    pub guild_id: Option<Snowflake>,
    /// Approximate member count, capped at 50.
    #[serde(default)]
    pub member_count: u64,
    #[serde(default)]
    pub added_members: Vec<ThreadMember>,
    #[serde(default)]
    pub removed_member_ids: Vec<Snowflake>,
}

// ---------------------------------------------------------------------------
// Guilds
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(transparent)]
pub struct GuildCreate {
    pub guild: Guild,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GuildUpdate {
    /// Cached state from before this event, when available.
    #[serde(skip)]
    pub before: Option<Guild>,
    #[serde(flatten)]
    pub after: Guild,
}

impl GuildUpdate {
    pub fn pair(before: Guild, after: Guild) -> Self {
        Self {
            before: Some(before),
            after,
        }
    }
}

/// The guild became unavailable, or the user left/was removed.
#[derive(Debug, Clone, Deserialize)]
pub struct GuildDelete {
    #[serde(rename = "id")]
    pub guild_id: Snowflake,
    /// True when triggered by an outage rather than a leave/kick.
    #[serde(default)]
    pub unavailable: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GuildBanAdd {
    pub guild_id: Snowflake,
    pub user: User,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GuildBanRemove {
    pub guild_id: Snowflake,
    pub user: User,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GuildEmojisUpdate {
    pub guild_id: Snowflake,
    /// Emoji list from before this event, when cached.
    #[serde(skip)]
    pub before: Vec<Emoji>,
    #[serde(rename = "emojis")]
    pub after: Vec<Emoji>,
}

impl GuildEmojisUpdate {
    pub fn pair(guild_id: Snowflake, before: Vec<Emoji>, after: Vec<Emoji>) -> Self {
        Self {
            guild_id,
            before,
            after,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GuildStickersUpdate {
    pub guild_id: Snowflake,
    /// Sticker list from before this event, when cached.
    #[serde(skip)]
    pub before: Vec<Sticker>,
    #[serde(rename = "stickers")]
    pub after: Vec<Sticker>,
}

impl GuildStickersUpdate {
    pub fn pair(guild_id: Snowflake, before: Vec<Sticker>, after: Vec<Sticker>) -> Self {
        Self {
            guild_id,
            before,
            after,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GuildIntegrationsUpdate {
    pub guild_id: Snowflake,
}

// ---------------------------------------------------------------------------
// Members
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct MemberAdd {
    pub guild_id: Snowflake,
    #[serde(flatten)]
    pub member: Member,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MemberRemove {
    pub guild_id: Snowflake,
    pub user: User,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MemberUpdate {
    pub guild_id: Snowflake,
    /// Cached state from before this event, when available.
    #[serde(skip)]
    pub before: Option<Member>,
    #[serde(flatten)]
    pub after: Member,
}

impl MemberUpdate {
    pub fn pair(guild_id: Snowflake, before: Member, after: Member) -> Self {
        Self {
            guild_id,
            before: Some(before),
            after,
        }
    }
}

/// Sent in response to Request Guild Members. `chunk_index`/`chunk_count`
/// tell you how many chunks are left for the request.
#[derive(Debug, Clone, Deserialize)]
pub struct GuildMembersChunk {
    pub guild_id: Snowflake,
    pub chunk_index: u32,
    pub chunk_count: u32,
    #[serde(default)]
    pub members: Vec<Member>,
    #[serde(default)]
    pub presences: Vec<Value>,
    /// The nonce used in the request, if any.
    pub nonce: Option<String>,
}

// ---------------------------------------------------------------------------
// Roles
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct GuildRoleCreate {
    pub guild_id: Snowflake,
    pub role: Role,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GuildRoleUpdate {
    pub guild_id: Snowflake,
    /// Cached state from before this event, when available.
    #[serde(skip)]
    pub before: Option<Role>,
    #[serde(rename = "role")]
    pub after: Role,
}

impl GuildRoleUpdate {
    pub fn pair(guild_id: Snowflake, before: Role, after: Role) -> Self {
        Self {
            guild_id,
            before: Some(before),
            after,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GuildRoleDelete {
    pub guild_id: Snowflake,
    pub role_id: Snowflake,
}

// ---------------------------------------------------------------------------
// Integrations / invites / stage instances (untyped payloads)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct IntegrationCreate {
    pub integration: Value,
}

#[derive(Debug, Clone)]
pub struct IntegrationUpdate {
    pub before: Option<Value>,
    pub after: Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IntegrationDelete {
    /// The ID of the integration.
    pub id: Snowflake,
    pub guild_id: Snowflake,
    /// The ID of the bot/application tied to this integration.
    pub application_id: Option<Snowflake>,
}

#[derive(Debug, Clone)]
pub struct InviteCreate {
    pub invite: Value,
}

#[derive(Debug, Clone)]
pub struct StageInstanceCreate {
    pub stage_instance: Value,
}

#[derive(Debug, Clone)]
pub struct StageInstanceUpdate {
    pub before: Option<Value>,
    pub after: Value,
}

#[derive(Debug, Clone)]
pub struct StageInstanceDelete {
    pub stage_instance: Value,
}

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

use crate::models::Message;

#[derive(Debug, Clone, Deserialize)]
#[serde(transparent)]
pub struct MessageCreate {
    pub message: Message,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessageUpdate {
    /// Cached state from before this event, when available.
    #[serde(skip)]
    pub before: Option<Message>,
    #[serde(flatten)]
    pub after: Message,
}

impl MessageUpdate {
    pub fn pair(before: Message, after: Message) -> Self {
        Self {
            before: Some(before),
            after,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessageDelete {
    /// The deleted message's ID.
    pub id: Snowflake,
    pub channel_id: Snowflake,
    pub guild_id: Option<Snowflake>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessageDeleteBulk {
    pub channel_id: Snowflake,
    pub guild_id: Option<Snowflake>,
    #[serde(default)]
    pub ids: Vec<Snowflake>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessageReactionAdd {
    pub user_id: Snowflake,
    pub channel_id: Snowflake,
    pub message_id: Snowflake,
    pub guild_id: Option<Snowflake>,
    /// The member who reacted, when this happened in a guild.
    pub member: Option<Member>,
    pub emoji: Emoji,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessageReactionRemove {
    pub user_id: Snowflake,
    pub channel_id: Snowflake,
    pub message_id: Snowflake,
    pub guild_id: Option<Snowflake>,
    pub emoji: Emoji,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessageReactionRemoveAll {
    pub channel_id: Snowflake,
    pub message_id: Snowflake,
    pub guild_id: Option<Snowflake>,
}

// ---------------------------------------------------------------------------
// Presence / typing / webhooks
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct Activity {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: u8,
    pub url: Option<String>,
    pub state: Option<String>,
    pub details: Option<String>,
}

/// What platform the user is reported as being on.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientStatus {
    pub desktop: Option<String>,
    pub mobile: Option<String>,
    pub web: Option<String>,
}

/// A user's presence (online/idle/dnd/offline) changed.
#[derive(Debug, Clone, Deserialize)]
pub struct PresenceUpdate {
    pub user: PartialUser,
    pub guild_id: Option<Snowflake>,
    pub status: Option<String>,
    #[serde(default)]
    pub activities: Vec<Activity>,
    pub client_status: Option<ClientStatus>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TypingStart {
    pub channel_id: Snowflake,
    pub guild_id: Option<Snowflake>,
    pub user_id: Snowflake,
    /// Unix time (in seconds) of when the user started typing.
    pub timestamp: u64,
    /// The member who started typing, when this happened in a guild.
    pub member: Option<Member>,
}

/// A channel webhook was created, updated, or deleted. Discord doesn't send
/// the webhook object itself, just the location.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhooksUpdate {
    pub guild_id: Snowflake,
    pub channel_id: Snowflake,
}

// ---------------------------------------------------------------------------
// Interactions / READY
// ---------------------------------------------------------------------------

/// A user used an application command or component. The interaction payload
/// is left raw; the dispatch framework owns its decoding.
#[derive(Debug, Clone)]
pub struct InteractionCreate {
    pub interaction: Value,
}

/// The READY event data sent by the gateway after a successful IDENTIFY.
#[derive(Debug, Clone, Deserialize)]
pub struct ReadyEvent {
    pub v: u8,
    pub user: User,
    pub session_id: String,
    pub resume_gateway_url: Option<String>,
    #[serde(default)]
    pub guilds: Vec<crate::models::UnavailableGuild>,
    pub application: ReadyApplication,
}

/// Minimal application object embedded in [`ReadyEvent`].
#[derive(Debug, Clone, Deserialize)]
pub struct ReadyApplication {
    pub id: Snowflake,
    pub flags: Option<u64>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guild_delete_renames_wire_id() {
        let event: GuildDelete = serde_json::from_value(serde_json::json!({
            "id": "41771983423143936",
            "unavailable": true,
        }))
        .unwrap();
        assert_eq!(event.guild_id, Snowflake::new(41_771_983_423_143_936));
        assert!(event.unavailable);
    }

    #[test]
    fn member_add_flattens_member_fields() {
        let event: MemberAdd = serde_json::from_value(serde_json::json!({
            "guild_id": "1",
            "user": { "id": "5", "username": "snek" },
            "nick": null,
            "roles": ["2", "3"],
            "joined_at": "2021-01-01T00:00:00Z",
        }))
        .unwrap();
        assert_eq!(event.member.roles.len(), 2);
        assert_eq!(event.member.user.as_ref().unwrap().username, "snek");
    }

    #[test]
    fn emojis_update_parses_wire_shape() {
        let event: GuildEmojisUpdate = serde_json::from_value(serde_json::json!({
            "guild_id": "1",
            "emojis": [{ "id": "2", "name": "blob", "animated": true }],
        }))
        .unwrap();
        assert!(event.before.is_empty(), "before is not on the wire");
        assert_eq!(event.after.len(), 1);
        assert!(event.after[0].animated);
    }

    #[test]
    fn emojis_update_pair_carries_before() {
        let after = vec![Emoji::unicode("🐍")];
        let event = GuildEmojisUpdate::pair(Snowflake::new(1), Vec::new(), after);
        assert!(event.before.is_empty());
        assert_eq!(event.after.len(), 1);
    }

    #[test]
    fn reaction_add_has_typed_emoji() {
        let event: MessageReactionAdd = serde_json::from_value(serde_json::json!({
            "user_id": "1",
            "channel_id": "2",
            "message_id": "3",
            "guild_id": null,
            "member": null,
            "emoji": { "id": null, "name": "🔥" },
        }))
        .unwrap();
        assert!(!event.emoji.is_custom());
        assert_eq!(event.emoji.req_format(), "🔥");
    }

    #[test]
    fn message_delete_carries_bare_ids() {
        let event: MessageDelete = serde_json::from_value(serde_json::json!({
            "id": "10",
            "channel_id": "20",
        }))
        .unwrap();
        assert_eq!(event.id, Snowflake::new(10));
        assert!(event.guild_id.is_none());
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let event: TypingStart = serde_json::from_value(serde_json::json!({
            "channel_id": "2",
            "user_id": "1",
            "timestamp": 1_632_000_000,
            "member": null,
            "brand_new_field_from_the_future": { "nested": true },
        }))
        .unwrap();
        assert_eq!(event.timestamp, 1_632_000_000);
    }

    #[test]
    fn missing_required_field_fails() {
        let result: Result<GuildRoleCreate, _> = serde_json::from_value(serde_json::json!({
            "guild_id": "1",
        }));
        assert!(result.is_err());
    }

    #[test]
    fn ready_event_parses() {
        let ready: ReadyEvent = serde_json::from_value(serde_json::json!({
            "v": 10,
            "user": { "id": "5", "username": "snekbot", "bot": true },
            "session_id": "abc123",
            "resume_gateway_url": "wss://gateway.discord.gg",
            "guilds": [{ "id": "1", "unavailable": true }],
            "application": { "id": "9", "flags": 0 },
        }))
        .unwrap();
        assert_eq!(ready.v, 10);
        assert_eq!(ready.guilds.len(), 1);
        assert_eq!(ready.application.id, Snowflake::new(9));
    }
}
