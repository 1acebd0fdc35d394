//! Guild roles and permission flags.

use std::fmt;

use bitflags::bitflags;
use serde::de::{Error as DeError, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::models::snowflake_identified;
use crate::snowflake::Snowflake;

bitflags! {
    /// Guild permission bits.
    ///
    /// Serialised as a decimal string on the wire (the full bitset no longer
    /// fits in a JSON-safe integer).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Permissions: u64 {
        const CREATE_INSTANT_INVITE = 1 << 0;
        const KICK_MEMBERS = 1 << 1;
        const BAN_MEMBERS = 1 << 2;
        const ADMINISTRATOR = 1 << 3;
        const MANAGE_CHANNELS = 1 << 4;
        const MANAGE_GUILD = 1 << 5;
        const ADD_REACTIONS = 1 << 6;
        const VIEW_AUDIT_LOG = 1 << 7;
        const PRIORITY_SPEAKER = 1 << 8;
        const STREAM = 1 << 9;
        const VIEW_CHANNEL = 1 << 10;
        const SEND_MESSAGES = 1 << 11;
        const SEND_TTS_MESSAGES = 1 << 12;
        const MANAGE_MESSAGES = 1 << 13;
        const EMBED_LINKS = 1 << 14;
        const ATTACH_FILES = 1 << 15;
        const READ_MESSAGE_HISTORY = 1 << 16;
        const MENTION_EVERYONE = 1 << 17;
        const USE_EXTERNAL_EMOJIS = 1 << 18;
        const VIEW_GUILD_INSIGHTS = 1 << 19;
        const CONNECT = 1 << 20;
        const SPEAK = 1 << 21;
        const MUTE_MEMBERS = 1 << 22;
        const DEAFEN_MEMBERS = 1 << 23;
        const MOVE_MEMBERS = 1 << 24;
        const USE_VAD = 1 << 25;
        const CHANGE_NICKNAME = 1 << 26;
        const MANAGE_NICKNAMES = 1 << 27;
        const MANAGE_ROLES = 1 << 28;
        const MANAGE_WEBHOOKS = 1 << 29;
        const MANAGE_GUILD_EXPRESSIONS = 1 << 30;
    }
}

impl Default for Permissions {
    fn default() -> Self {
        Self::empty()
    }
}

impl Serialize for Permissions {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.bits())
    }
}

struct PermissionsVisitor;

impl Visitor<'_> for PermissionsVisitor {
    type Value = Permissions;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a permission bitset as a string or integer")
    }

    fn visit_u64<E: DeError>(self, value: u64) -> Result<Self::Value, E> {
        Ok(Permissions::from_bits_truncate(value))
    }

    fn visit_str<E: DeError>(self, value: &str) -> Result<Self::Value, E> {
        value
            .parse::<u64>()
            .map(Permissions::from_bits_truncate)
            .map_err(|_| E::custom(format!("invalid permission string: {value:?}")))
    }
}

impl<'de> Deserialize<'de> for Permissions {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(PermissionsVisitor)
    }
}

// ---------------------------------------------------------------------------
// Role
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Role {
    pub id: Snowflake,
    pub name: String,
    #[serde(default)]
    pub color: u32,
    #[serde(default)]
    pub hoist: bool,
    pub icon: Option<String>,
    pub unicode_emoji: Option<String>,
    #[serde(default)]
    pub position: i64,
    #[serde(default)]
    pub permissions: Permissions,
    #[serde(default)]
    pub managed: bool,
    #[serde(default)]
    pub mentionable: bool,
}

snowflake_identified!(Role);

impl Role {
    /// `<@&id>` mention form.
    pub fn mention(&self) -> String {
        format!("<@&{}>", self.id)
    }

    pub fn is_admin(&self) -> bool {
        self.permissions.contains(Permissions::ADMINISTRATOR)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permissions_deserialise_from_string() {
        let perms: Permissions = serde_json::from_str("\"2048\"").unwrap();
        assert_eq!(perms, Permissions::SEND_MESSAGES);
    }

    #[test]
    fn permissions_serialise_as_string() {
        let json = serde_json::to_string(&Permissions::SEND_MESSAGES).unwrap();
        assert_eq!(json, "\"2048\"");
    }

    #[test]
    fn unknown_permission_bits_are_dropped() {
        let perms: Permissions = serde_json::from_str("\"18446744073709551615\"").unwrap();
        assert!(perms.contains(Permissions::ADMINISTRATOR));
    }

    #[test]
    fn role_deserialises_from_wire_payload() {
        let role: Role = serde_json::from_value(serde_json::json!({
            "id": "41771983423143936",
            "name": "WE DEM BOYZZ!!!!!!",
            "color": 3447003,
            "hoist": true,
            "icon": null,
            "unicode_emoji": null,
            "position": 1,
            "permissions": "66321471",
            "managed": false,
            "mentionable": false,
        }))
        .unwrap();
        assert_eq!(role.id, Snowflake::new(41_771_983_423_143_936));
        assert!(role.is_admin());
        assert_eq!(role.mention(), "<@&41771983423143936>");
    }

    #[test]
    fn role_equality_is_by_id() {
        let base: Role = serde_json::from_value(serde_json::json!({
            "id": "1", "name": "a", "icon": null, "unicode_emoji": null,
        }))
        .unwrap();
        let mut renamed = base.clone();
        renamed.name = "b".to_string();
        assert_eq!(base, renamed);
    }
}
