//! Users and guild members.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::cache::Cache;
use crate::models::{snowflake_identified, Asset, Role};
use crate::proxy::CacheView;
use crate::snowflake::Snowflake;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct User {
    pub id: Snowflake,
    pub username: String,
    pub discriminator: Option<String>,
    pub avatar: Option<String>,
    #[serde(default)]
    pub bot: bool,
    #[serde(default)]
    pub system: bool,
    #[serde(default)]
    pub global_name: Option<String>,
}

snowflake_identified!(User);

impl User {
    /// `Username#Discriminator` or just `Username` for the new username system.
    pub fn tag(&self) -> String {
        match self.discriminator.as_deref() {
            Some("0") | Some("0000") | None => self.username.clone(),
            Some(disc) => format!("{}#{}", self.username, disc),
        }
    }

    /// The name shown in clients: global display name, falling back to the
    /// username.
    pub fn display_name(&self) -> &str {
        self.global_name.as_deref().unwrap_or(&self.username)
    }

    /// The user's avatar, or `None` if no avatar is set.
    pub fn avatar(&self) -> Option<Asset> {
        self.avatar
            .as_deref()
            .map(|hash| Asset::from_path_hash(&format!("avatars/{}/{{}}", self.id), hash))
    }

    /// `<@id>` mention form.
    pub fn mention(&self) -> String {
        format!("<@{}>", self.id)
    }
}

/// Partial user object received in events like PRESENCE_UPDATE.
///
/// Only the `id` is guaranteed; other fields may be absent.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PartialUser {
    pub id: Snowflake,
    pub username: Option<String>,
    pub avatar: Option<String>,
    #[serde(default)]
    pub bot: bool,
}

// ---------------------------------------------------------------------------
// Guild member
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Member {
    pub user: Option<User>,
    pub nick: Option<String>,
    #[serde(default)]
    pub roles: Vec<Snowflake>,
    pub joined_at: Option<String>,
    pub premium_since: Option<String>,
    #[serde(default)]
    pub deaf: bool,
    #[serde(default)]
    pub mute: bool,
    #[serde(default)]
    pub pending: bool,
}

impl Member {
    /// Nickname, global display name, or username, in that order.
    pub fn display_name(&self) -> Option<&str> {
        self.nick
            .as_deref()
            .or_else(|| self.user.as_ref().map(|user| user.display_name()))
    }

    /// The member's roles, resolved lazily against the cache.
    pub fn role_view(&self, cache: &Arc<dyn Cache>) -> CacheView<Role> {
        let cache = Arc::clone(cache);
        CacheView::new(self.roles.clone(), move |id| cache.get_role(id))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DiscordObject;

    fn user(id: u64, name: &str) -> User {
        User {
            id: Snowflake::new(id),
            username: name.to_string(),
            discriminator: None,
            avatar: None,
            bot: false,
            system: false,
            global_name: None,
        }
    }

    // -- tag ---------------------------------------------------------------

    #[test]
    fn tag_without_discriminator() {
        assert_eq!(user(1, "snek").tag(), "snek");
    }

    #[test]
    fn tag_with_legacy_discriminator() {
        let mut legacy = user(1, "snek");
        legacy.discriminator = Some("1234".to_string());
        assert_eq!(legacy.tag(), "snek#1234");
    }

    #[test]
    fn tag_zero_discriminator_is_new_system() {
        let mut migrated = user(1, "snek");
        migrated.discriminator = Some("0".to_string());
        assert_eq!(migrated.tag(), "snek");
    }

    // -- identity ----------------------------------------------------------

    #[test]
    fn equality_is_by_id_only() {
        let a = user(42, "old-name");
        let b = user(42, "new-name");
        assert_eq!(a, b);
        assert_ne!(a, user(43, "old-name"));
    }

    #[test]
    fn discord_object_id() {
        assert_eq!(user(42, "x").id(), Snowflake::new(42));
    }

    // -- assets / mentions ---------------------------------------------------

    #[test]
    fn avatar_url_contains_id_and_hash() {
        let mut with_avatar = user(7, "x");
        with_avatar.avatar = Some("abcd".to_string());
        let asset = with_avatar.avatar().unwrap();
        assert_eq!(asset.url, "https://cdn.discordapp.com/avatars/7/abcd");

        assert!(user(7, "x").avatar().is_none());
    }

    #[test]
    fn mention_form() {
        assert_eq!(user(7, "x").mention(), "<@7>");
    }

    // -- member --------------------------------------------------------------

    #[test]
    fn member_display_name_prefers_nick() {
        let member = Member {
            user: Some(user(1, "snek")),
            nick: Some("worm".to_string()),
            roles: Vec::new(),
            joined_at: None,
            premium_since: None,
            deaf: false,
            mute: false,
            pending: false,
        };
        assert_eq!(member.display_name(), Some("worm"));
    }

    #[test]
    fn member_deserialises_with_defaults() {
        let member: Member = serde_json::from_value(serde_json::json!({
            "user": { "id": "5", "username": "snek" },
            "nick": null,
            "joined_at": "2021-01-01T00:00:00Z",
        }))
        .unwrap();
        assert!(member.roles.is_empty());
        assert!(!member.deaf);
        assert_eq!(member.display_name(), Some("snek"));
    }
}
