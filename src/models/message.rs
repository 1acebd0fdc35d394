//! Messages and their attachments.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::cache::Cache;
use crate::models::{snowflake_identified, Channel, Guild, StickerItem, User};
use crate::proxy::CacheProxy;
use crate::snowflake::Snowflake;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Message {
    pub id: Snowflake,
    pub channel_id: Snowflake,
    pub guild_id: Option<Snowflake>,
    pub author: User,
    #[serde(default)]
    pub content: String,
    pub timestamp: Option<String>,
    pub edited_timestamp: Option<String>,
    #[serde(default)]
    pub tts: bool,
    #[serde(default)]
    pub mention_everyone: bool,
    #[serde(default)]
    pub mentions: Vec<User>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    #[serde(default)]
    pub sticker_items: Vec<StickerItem>,
    #[serde(default)]
    pub pinned: bool,
    pub message_reference: Option<MessageReference>,
    /// The message this one is replying to (if resolved).
    pub referenced_message: Option<Box<Message>>,
}

snowflake_identified!(Message);

impl Message {
    /// Whether a given user is mentioned in the message.
    pub fn mentions_user(&self, user_id: Snowflake) -> bool {
        self.mentions.iter().any(|user| user.id == user_id)
    }

    /// The channel this message was sent in, resolved lazily.
    pub fn channel(&self, cache: &Arc<dyn Cache>) -> CacheProxy<Channel> {
        let cache = Arc::clone(cache);
        CacheProxy::new(self.channel_id, move |id| cache.get_channel(id))
    }

    /// The guild this message was sent in, if any, resolved lazily.
    pub fn guild(&self, cache: &Arc<dyn Cache>) -> Option<CacheProxy<Guild>> {
        let cache = Arc::clone(cache);
        self.guild_id
            .map(|id| CacheProxy::new(id, move |id| cache.get_guild(id)))
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Attachment {
    pub id: Snowflake,
    pub filename: String,
    pub size: u64,
    pub url: String,
    pub proxy_url: String,
    pub content_type: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MessageReference {
    pub message_id: Option<Snowflake>,
    pub channel_id: Option<Snowflake>,
    pub guild_id: Option<Snowflake>,
    #[serde(default)]
    pub fail_if_not_exists: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message_json() -> serde_json::Value {
        serde_json::json!({
            "id": "334", "channel_id": "12",
            "guild_id": null,
            "author": { "id": "5", "username": "snek" },
            "content": "sss",
            "timestamp": "2021-10-03T12:00:00Z",
            "edited_timestamp": null,
            "mentions": [{ "id": "9", "username": "mouse" }],
            "message_reference": null,
            "referenced_message": null,
        })
    }

    #[test]
    fn message_deserialises_from_wire_payload() {
        let message: Message = serde_json::from_value(message_json()).unwrap();
        assert_eq!(message.author.username, "snek");
        assert!(message.attachments.is_empty());
        assert!(message.sticker_items.is_empty());
        assert!(!message.pinned);
    }

    #[test]
    fn mentions_user_checks_the_mention_list() {
        let message: Message = serde_json::from_value(message_json()).unwrap();
        assert!(message.mentions_user(Snowflake::new(9)));
        assert!(!message.mentions_user(Snowflake::new(5)));
    }

    #[test]
    fn missing_author_fails_construction() {
        let mut payload = message_json();
        payload.as_object_mut().unwrap().remove("author");
        assert!(serde_json::from_value::<Message>(payload).is_err());
    }
}
