//! Typed gateway events.
//!
//! Instead of matching on raw `(op, t, serde_json::Value)` tuples everywhere,
//! dispatch payloads are deserialised into [`Event`] so consumers can
//! pattern-match on strongly-typed data. Parsing never fails outward:
//! unrecognised or unparseable dispatches degrade to [`Event::Raw`] with a
//! warning.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

pub mod discord;
pub mod internal;

pub use discord::*;
pub use internal::{Connect, Disconnect, Login, Resume, WebsocketReady};

// ---------------------------------------------------------------------------
// Gateway payload (the envelope that wraps every WS message)
// ---------------------------------------------------------------------------

/// Raw gateway payload envelope.
///
/// Every message on the gateway socket is wrapped in this structure; the
/// transport (out of scope here) hands these over already JSON-decoded.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GatewayPayload {
    pub op: u8,
    pub d: Option<Value>,
    pub s: Option<u64>,
    pub t: Option<String>,
}

// ---------------------------------------------------------------------------
// The top-level event enum
// ---------------------------------------------------------------------------

/// A fully-parsed event coming off the Discord gateway, plus the client
/// lifecycle events dispatched locally.
#[derive(Debug, Clone)]
pub enum Event {
    // ----- Connection lifecycle (dispatched by the client) -----
    Login(Login),
    Connect(Connect),
    Resume(Resume),
    Disconnect(Disconnect),
    WebsocketReady(WebsocketReady),

    // ----- Gateway op-code events -----
    /// Heartbeat ACK from the gateway (op 11).
    HeartbeatAck,
    /// The gateway is asking us to heartbeat immediately (op 1).
    HeartbeatRequest,
    /// Gateway told us to reconnect (op 7).
    Reconnect,
    /// Session has been invalidated (op 9). The inner bool indicates whether
    /// the session is resumable (`true`) or we must re-identify (`false`).
    InvalidSession(bool),

    // ----- Dispatches -----
    Ready(ReadyEvent),
    ChannelCreate(ChannelCreate),
    ChannelUpdate(ChannelUpdate),
    ChannelDelete(ChannelDelete),
    ChannelPinsUpdate(ChannelPinsUpdate),
    ThreadCreate(ThreadCreate),
    ThreadUpdate(ThreadUpdate),
    ThreadDelete(ThreadDelete),
    ThreadListSync(ThreadListSync),
    ThreadMemberUpdate(ThreadMemberUpdate),
    ThreadMembersUpdate(ThreadMembersUpdate),
    GuildCreate(GuildCreate),
    GuildUpdate(GuildUpdate),
    GuildDelete(GuildDelete),
    GuildBanAdd(GuildBanAdd),
    GuildBanRemove(GuildBanRemove),
    GuildEmojisUpdate(GuildEmojisUpdate),
    GuildStickersUpdate(GuildStickersUpdate),
    GuildIntegrationsUpdate(GuildIntegrationsUpdate),
    MemberAdd(Box<MemberAdd>),
    MemberRemove(MemberRemove),
    MemberUpdate(Box<MemberUpdate>),
    GuildMembersChunk(GuildMembersChunk),
    GuildRoleCreate(GuildRoleCreate),
    GuildRoleUpdate(GuildRoleUpdate),
    GuildRoleDelete(GuildRoleDelete),
    IntegrationCreate(IntegrationCreate),
    IntegrationUpdate(IntegrationUpdate),
    IntegrationDelete(IntegrationDelete),
    InviteCreate(InviteCreate),
    MessageCreate(Box<MessageCreate>),
    MessageUpdate(Box<MessageUpdate>),
    MessageDelete(MessageDelete),
    MessageDeleteBulk(MessageDeleteBulk),
    MessageReactionAdd(Box<MessageReactionAdd>),
    MessageReactionRemove(MessageReactionRemove),
    MessageReactionRemoveAll(MessageReactionRemoveAll),
    PresenceUpdate(PresenceUpdate),
    StageInstanceCreate(StageInstanceCreate),
    StageInstanceUpdate(StageInstanceUpdate),
    StageInstanceDelete(StageInstanceDelete),
    TypingStart(TypingStart),
    WebhooksUpdate(WebhooksUpdate),
    InteractionCreate(InteractionCreate),

    /// An event we received but don't have a typed variant for (or whose
    /// payload failed to parse). Carries the raw envelope data.
    Raw(RawGatewayEvent),
}

// ---------------------------------------------------------------------------
// Parsing from a raw GatewayPayload
// ---------------------------------------------------------------------------

/// Deserialise a dispatch payload, logging and returning `None` on failure
/// so the caller can fall back to [`Event::Raw`].
fn decode<T: serde::de::DeserializeOwned>(name: &str, data: &Value) -> Option<T> {
    match serde_json::from_value(data.clone()) {
        Ok(value) => Some(value),
        Err(error) => {
            warn!(event = name, error = %error, "failed to parse dispatch payload");
            None
        }
    }
}

impl Event {
    /// Try to convert a raw [`GatewayPayload`] into a typed event.
    ///
    /// This never fails — unrecognised events become [`Event::Raw`].
    pub fn from_payload(payload: GatewayPayload) -> Self {
        match payload.op {
            // ----- Op 0: DISPATCH -----
            0 => match (payload.t, payload.d) {
                (Some(name), Some(data)) => Self::from_dispatch(&name, data),
                (name, data) => Event::Raw(RawGatewayEvent {
                    event_name: name,
                    op: 0,
                    data,
                }),
            },

            // ----- Op 1: Heartbeat request -----
            1 => Event::HeartbeatRequest,

            // ----- Op 7: Reconnect -----
            7 => Event::Reconnect,

            // ----- Op 9: Invalid Session -----
            9 => {
                let resumable = payload
                    .d
                    .as_ref()
                    .and_then(Value::as_bool)
                    .unwrap_or(false);
                Event::InvalidSession(resumable)
            }

            // ----- Op 11: Heartbeat ACK -----
            11 => Event::HeartbeatAck,

            // ----- Anything else -----
            op => Event::Raw(RawGatewayEvent {
                event_name: payload.t,
                op,
                data: payload.d,
            }),
        }
    }

    /// Parse an op-0 DISPATCH event by its `t` name.
    ///
    /// Update-style events come back with their `before` side empty; the
    /// dispatcher pairs them with cached state via the `pair` constructors.
    pub fn from_dispatch(name: &str, data: Value) -> Self {
        let event = match name {
            "READY" => decode(name, &data).map(Event::Ready),
            "CHANNEL_CREATE" => decode(name, &data).map(Event::ChannelCreate),
            "CHANNEL_UPDATE" => decode(name, &data).map(Event::ChannelUpdate),
            "CHANNEL_DELETE" => decode(name, &data).map(Event::ChannelDelete),
            "CHANNEL_PINS_UPDATE" => decode(name, &data).map(Event::ChannelPinsUpdate),
            "THREAD_CREATE" => decode(name, &data).map(Event::ThreadCreate),
            "THREAD_UPDATE" => decode(name, &data).map(Event::ThreadUpdate),
            "THREAD_DELETE" => decode(name, &data).map(Event::ThreadDelete),
            "THREAD_LIST_SYNC" => decode(name, &data).map(Event::ThreadListSync),
            "THREAD_MEMBER_UPDATE" => decode(name, &data).map(Event::ThreadMemberUpdate),
            "THREAD_MEMBERS_UPDATE" => decode(name, &data).map(Event::ThreadMembersUpdate),
            "GUILD_CREATE" => decode(name, &data).map(Event::GuildCreate),
            "GUILD_UPDATE" => decode(name, &data).map(Event::GuildUpdate),
            "GUILD_DELETE" => decode(name, &data).map(Event::GuildDelete),
            "GUILD_BAN_ADD" => decode(name, &data).map(Event::GuildBanAdd),
            "GUILD_BAN_REMOVE" => decode(name, &data).map(Event::GuildBanRemove),
            "GUILD_EMOJIS_UPDATE" => decode(name, &data).map(Event::GuildEmojisUpdate),
            "GUILD_STICKERS_UPDATE" => decode(name, &data).map(Event::GuildStickersUpdate),
            "GUILD_INTEGRATIONS_UPDATE" => {
                decode(name, &data).map(Event::GuildIntegrationsUpdate)
            }
            "GUILD_MEMBER_ADD" => decode(name, &data).map(|e| Event::MemberAdd(Box::new(e))),
            "GUILD_MEMBER_REMOVE" => decode(name, &data).map(Event::MemberRemove),
            "GUILD_MEMBER_UPDATE" => {
                decode(name, &data).map(|e| Event::MemberUpdate(Box::new(e)))
            }
            "GUILD_MEMBERS_CHUNK" => decode(name, &data).map(Event::GuildMembersChunk),
            "GUILD_ROLE_CREATE" => decode(name, &data).map(Event::GuildRoleCreate),
            "GUILD_ROLE_UPDATE" => decode(name, &data).map(Event::GuildRoleUpdate),
            "GUILD_ROLE_DELETE" => decode(name, &data).map(Event::GuildRoleDelete),
            "INTEGRATION_CREATE" => Some(Event::IntegrationCreate(IntegrationCreate {
                integration: data.clone(),
            })),
            "INTEGRATION_UPDATE" => Some(Event::IntegrationUpdate(IntegrationUpdate {
                before: None,
                after: data.clone(),
            })),
            "INTEGRATION_DELETE" => decode(name, &data).map(Event::IntegrationDelete),
            "INVITE_CREATE" => Some(Event::InviteCreate(InviteCreate {
                invite: data.clone(),
            })),
            "MESSAGE_CREATE" => decode(name, &data).map(|e| Event::MessageCreate(Box::new(e))),
            "MESSAGE_UPDATE" => decode(name, &data).map(|e| Event::MessageUpdate(Box::new(e))),
            "MESSAGE_DELETE" => decode(name, &data).map(Event::MessageDelete),
            "MESSAGE_DELETE_BULK" => decode(name, &data).map(Event::MessageDeleteBulk),
            "MESSAGE_REACTION_ADD" => {
                decode(name, &data).map(|e| Event::MessageReactionAdd(Box::new(e)))
            }
            "MESSAGE_REACTION_REMOVE" => decode(name, &data).map(Event::MessageReactionRemove),
            "MESSAGE_REACTION_REMOVE_ALL" => {
                decode(name, &data).map(Event::MessageReactionRemoveAll)
            }
            "PRESENCE_UPDATE" => decode(name, &data).map(Event::PresenceUpdate),
            "STAGE_INSTANCE_CREATE" => Some(Event::StageInstanceCreate(StageInstanceCreate {
                stage_instance: data.clone(),
            })),
            "STAGE_INSTANCE_UPDATE" => Some(Event::StageInstanceUpdate(StageInstanceUpdate {
                before: None,
                after: data.clone(),
            })),
            "STAGE_INSTANCE_DELETE" => Some(Event::StageInstanceDelete(StageInstanceDelete {
                stage_instance: data.clone(),
            })),
            "TYPING_START" => decode(name, &data).map(Event::TypingStart),
            "WEBHOOKS_UPDATE" => decode(name, &data).map(Event::WebhooksUpdate),
            "INTERACTION_CREATE" => Some(Event::InteractionCreate(InteractionCreate {
                interaction: data.clone(),
            })),
            _ => None,
        };

        event.unwrap_or_else(|| {
            Event::Raw(RawGatewayEvent {
                event_name: Some(name.to_string()),
                op: 0,
                data: Some(data),
            })
        })
    }

    /// The snake_case name listeners key on.
    ///
    /// Raw events resolve to `raw_gateway_event` regardless of the dispatch
    /// name they carried.
    pub fn name(&self) -> &'static str {
        match self {
            Event::Login(_) => "login",
            Event::Connect(_) => "connect",
            Event::Resume(_) => "resume",
            Event::Disconnect(_) => "disconnect",
            Event::WebsocketReady(_) => "websocket_ready",
            Event::HeartbeatAck => "heartbeat_ack",
            Event::HeartbeatRequest => "heartbeat_request",
            Event::Reconnect => "reconnect",
            Event::InvalidSession(_) => "invalid_session",
            Event::Ready(_) => "ready",
            Event::ChannelCreate(_) => "channel_create",
            Event::ChannelUpdate(_) => "channel_update",
            Event::ChannelDelete(_) => "channel_delete",
            Event::ChannelPinsUpdate(_) => "channel_pins_update",
            Event::ThreadCreate(_) => "thread_create",
            Event::ThreadUpdate(_) => "thread_update",
            Event::ThreadDelete(_) => "thread_delete",
            Event::ThreadListSync(_) => "thread_list_sync",
            Event::ThreadMemberUpdate(_) => "thread_member_update",
            Event::ThreadMembersUpdate(_) => "thread_members_update",
            Event::GuildCreate(_) => "guild_create",
            Event::GuildUpdate(_) => "guild_update",
            Event::GuildDelete(_) => "guild_delete",
            Event::GuildBanAdd(_) => "guild_ban_add",
            Event::GuildBanRemove(_) => "guild_ban_remove",
            Event::GuildEmojisUpdate(_) => "guild_emojis_update",
            Event::GuildStickersUpdate(_) => "guild_stickers_update",
            Event::GuildIntegrationsUpdate(_) => "guild_integrations_update",
            Event::MemberAdd(_) => "member_add",
            Event::MemberRemove(_) => "member_remove",
            Event::MemberUpdate(_) => "member_update",
            Event::GuildMembersChunk(_) => "guild_members_chunk",
            Event::GuildRoleCreate(_) => "guild_role_create",
            Event::GuildRoleUpdate(_) => "guild_role_update",
            Event::GuildRoleDelete(_) => "guild_role_delete",
            Event::IntegrationCreate(_) => "integration_create",
            Event::IntegrationUpdate(_) => "integration_update",
            Event::IntegrationDelete(_) => "integration_delete",
            Event::InviteCreate(_) => "invite_create",
            Event::MessageCreate(_) => "message_create",
            Event::MessageUpdate(_) => "message_update",
            Event::MessageDelete(_) => "message_delete",
            Event::MessageDeleteBulk(_) => "message_delete_bulk",
            Event::MessageReactionAdd(_) => "message_reaction_add",
            Event::MessageReactionRemove(_) => "message_reaction_remove",
            Event::MessageReactionRemoveAll(_) => "message_reaction_remove_all",
            Event::PresenceUpdate(_) => "presence_update",
            Event::StageInstanceCreate(_) => "stage_instance_create",
            Event::StageInstanceUpdate(_) => "stage_instance_update",
            Event::StageInstanceDelete(_) => "stage_instance_delete",
            Event::TypingStart(_) => "typing_start",
            Event::WebhooksUpdate(_) => "webhooks_update",
            Event::InteractionCreate(_) => "interaction_create",
            Event::Raw(_) => "raw_gateway_event",
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snowflake::Snowflake;

    fn dispatch(t: &str, d: Value) -> GatewayPayload {
        GatewayPayload {
            op: 0,
            d: Some(d),
            s: Some(1),
            t: Some(t.to_string()),
        }
    }

    // -- op codes ----------------------------------------------------------

    #[test]
    fn op_codes_map_to_control_events() {
        let payload = |op| GatewayPayload {
            op,
            d: None,
            s: None,
            t: None,
        };
        assert!(matches!(
            Event::from_payload(payload(1)),
            Event::HeartbeatRequest
        ));
        assert!(matches!(Event::from_payload(payload(7)), Event::Reconnect));
        assert!(matches!(
            Event::from_payload(payload(11)),
            Event::HeartbeatAck
        ));
    }

    #[test]
    fn invalid_session_carries_resumable_flag() {
        let payload = GatewayPayload {
            op: 9,
            d: Some(Value::Bool(true)),
            s: None,
            t: None,
        };
        assert!(matches!(
            Event::from_payload(payload),
            Event::InvalidSession(true)
        ));
    }

    #[test]
    fn unknown_op_degrades_to_raw() {
        let payload = GatewayPayload {
            op: 42,
            d: None,
            s: None,
            t: None,
        };
        assert!(matches!(
            Event::from_payload(payload),
            Event::Raw(RawGatewayEvent { op: 42, .. })
        ));
    }

    // -- dispatches --------------------------------------------------------

    #[test]
    fn guild_role_delete_dispatch() {
        let event = Event::from_payload(dispatch(
            "GUILD_ROLE_DELETE",
            serde_json::json!({ "guild_id": "1", "role_id": "2" }),
        ));
        match event {
            Event::GuildRoleDelete(e) => {
                assert_eq!(e.role_id, Snowflake::new(2));
            }
            other => panic!("wrong variant: {other:?}"),
        }
    }

    #[test]
    fn message_create_dispatch() {
        let event = Event::from_payload(dispatch(
            "MESSAGE_CREATE",
            serde_json::json!({
                "id": "334", "channel_id": "12",
                "author": { "id": "5", "username": "snek" },
                "content": "sss",
                "timestamp": "2021-10-03T12:00:00Z",
                "edited_timestamp": null,
                "message_reference": null,
                "referenced_message": null,
            }),
        ));
        assert_eq!(event.name(), "message_create");
        match event {
            Event::MessageCreate(e) => assert_eq!(e.message.content, "sss"),
            other => panic!("wrong variant: {other:?}"),
        }
    }

    #[test]
    fn unparseable_dispatch_degrades_to_raw() {
        let event = Event::from_payload(dispatch(
            "GUILD_ROLE_DELETE",
            serde_json::json!({ "guild_id": "not-a-number" }),
        ));
        match event {
            Event::Raw(raw) => {
                assert_eq!(raw.event_name.as_deref(), Some("GUILD_ROLE_DELETE"));
                assert!(raw.data.is_some(), "raw data is preserved");
            }
            other => panic!("wrong variant: {other:?}"),
        }
    }

    #[test]
    fn unknown_dispatch_name_degrades_to_raw() {
        let event = Event::from_payload(dispatch(
            "BRAND_NEW_EVENT",
            serde_json::json!({ "anything": 1 }),
        ));
        assert_eq!(event.name(), "raw_gateway_event");
    }

    #[test]
    fn interaction_create_keeps_raw_payload() {
        let event = Event::from_payload(dispatch(
            "INTERACTION_CREATE",
            serde_json::json!({ "id": "1", "type": 2, "token": "tok" }),
        ));
        match event {
            Event::InteractionCreate(e) => {
                assert_eq!(e.interaction["token"], "tok");
            }
            other => panic!("wrong variant: {other:?}"),
        }
    }

    #[test]
    fn update_dispatches_have_empty_before() {
        let event = Event::from_payload(dispatch(
            "GUILD_UPDATE",
            serde_json::json!({
                "id": "1", "name": "after", "icon": null, "banner": null,
                "owner_id": null, "approximate_member_count": null,
                "approximate_presence_count": null,
            }),
        ));
        match event {
            Event::GuildUpdate(e) => {
                assert!(e.before.is_none());
                assert_eq!(e.after.name, "after");
            }
            other => panic!("wrong variant: {other:?}"),
        }
    }

    #[test]
    fn event_names_are_snake_case() {
        let event = Event::from_payload(dispatch(
            "GUILD_ROLE_DELETE",
            serde_json::json!({ "guild_id": "1", "role_id": "2" }),
        ));
        assert_eq!(event.name(), "guild_role_delete");
        assert_eq!(Event::HeartbeatAck.name(), "heartbeat_ack");
        assert_eq!(Event::Login(Login).name(), "login");
    }
}
