//! Channels and threads.

use serde::{Deserialize, Serialize};
use serde_repr::{Deserialize_repr, Serialize_repr};

use crate::models::snowflake_identified;
use crate::snowflake::Snowflake;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize_repr, Serialize_repr)]
#[repr(u8)]
pub enum ChannelType {
    GuildText = 0,
    Dm = 1,
    GuildVoice = 2,
    GroupDm = 3,
    GuildCategory = 4,
    GuildAnnouncement = 5,
    AnnouncementThread = 10,
    PublicThread = 11,
    PrivateThread = 12,
    GuildStageVoice = 13,
    GuildDirectory = 14,
    GuildForum = 15,
    GuildMedia = 16,
}

impl ChannelType {
    pub fn is_thread(self) -> bool {
        matches!(
            self,
            Self::AnnouncementThread | Self::PublicThread | Self::PrivateThread
        )
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Channel {
    pub id: Snowflake,
    #[serde(rename = "type")]
    pub kind: ChannelType,
    pub guild_id: Option<Snowflake>,
    pub name: Option<String>,
    pub topic: Option<String>,
    pub position: Option<i32>,
    pub parent_id: Option<Snowflake>,
    pub last_message_id: Option<Snowflake>,
    pub owner_id: Option<Snowflake>,
    #[serde(default)]
    pub nsfw: bool,
}

snowflake_identified!(Channel);

impl Channel {
    /// `<#id>` mention form.
    pub fn mention(&self) -> String {
        format!("<#{}>", self.id)
    }
}

/// A user's membership in a thread.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ThreadMember {
    /// The thread's ID. Omitted inside GUILD_CREATE payloads.
    pub id: Option<Snowflake>,
    /// The member's user ID. Omitted inside GUILD_CREATE payloads.
    pub user_id: Option<Snowflake>,
    pub join_timestamp: Option<String>,
    pub flags: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_type_roundtrips_as_integer() {
        let json = serde_json::to_string(&ChannelType::PublicThread).unwrap();
        assert_eq!(json, "11");
        let parsed: ChannelType = serde_json::from_str(&json).unwrap();
        assert!(parsed.is_thread());
    }

    #[test]
    fn channel_deserialises_from_wire_payload() {
        let channel: Channel = serde_json::from_value(serde_json::json!({
            "id": "41771983423143937",
            "type": 0,
            "guild_id": "41771983423143936",
            "name": "general",
            "topic": "24/7 chat about how to gank Mike #2",
            "position": 6,
            "parent_id": null,
            "last_message_id": "155117677105512449",
            "owner_id": null,
        }))
        .unwrap();
        assert_eq!(channel.kind, ChannelType::GuildText);
        assert!(!channel.nsfw);
        assert_eq!(channel.mention(), "<#41771983423143937>");
    }
}
