//! Emoji: the unicode/basic form and full guild custom emoji.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::cache::Cache;
use crate::error::Error;
use crate::models::{snowflake_identified, Guild, Role, UpdateFromPayload, User};
use crate::proxy::{CacheProxy, CacheView};
use crate::snowflake::Snowflake;

#[cfg(feature = "http")]
use crate::http::Http;

// ---------------------------------------------------------------------------
// Emoji (basic)
// ---------------------------------------------------------------------------

/// A basic emoji as it appears inside messages and reactions.
///
/// `id` is `None` for standard unicode emoji; `name` then holds the unicode
/// character itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Emoji {
    #[serde(default)]
    pub id: Option<Snowflake>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub animated: bool,
}

impl Emoji {
    /// A standard unicode emoji.
    pub fn unicode(emoji: impl Into<String>) -> Self {
        Self {
            id: None,
            name: Some(emoji.into()),
            animated: false,
        }
    }

    pub fn is_custom(&self) -> bool {
        self.id.is_some()
    }

    /// Format used in reaction web requests: `name:id` for custom emoji,
    /// the bare unicode otherwise.
    pub fn req_format(&self) -> String {
        match (self.id, self.name.as_deref()) {
            (Some(id), Some(name)) => format!("{name}:{id}"),
            (_, name) => name.unwrap_or_default().to_string(),
        }
    }
}

impl fmt::Display for Emoji {
    /// The in-message mention form, e.g. `<:thinksmart:623335224318754826>`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.id, self.name.as_deref()) {
            (Some(id), Some(name)) => {
                let prefix = if self.animated { "a:" } else { ":" };
                write!(f, "<{prefix}{name}:{id}>")
            }
            (_, name) => f.write_str(name.unwrap_or_default()),
        }
    }
}

// ---------------------------------------------------------------------------
// CustomEmoji
// ---------------------------------------------------------------------------

/// A custom emoji in a guild, with all its properties.
///
/// Relations (creator, allowed roles, owning guild) are stored as snowflakes
/// only and resolved lazily through the accessors.
#[derive(Debug, Clone)]
pub struct CustomEmoji {
    pub id: Snowflake,
    pub name: Option<String>,
    pub animated: bool,
    /// Whether this emoji must be wrapped in colons.
    pub require_colons: bool,
    /// Whether this emoji is managed by an integration.
    pub managed: bool,
    /// Whether this emoji can be used; may be false due to loss of Server
    /// Boosts.
    pub available: bool,
    creator_id: Option<Snowflake>,
    role_ids: Vec<Snowflake>,
    guild_id: Option<Snowflake>,
}

snowflake_identified!(CustomEmoji);

/// Wire shape of a guild emoji payload.
#[derive(Deserialize)]
struct CustomEmojiData {
    id: Snowflake,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    animated: bool,
    #[serde(default)]
    require_colons: bool,
    #[serde(default)]
    managed: bool,
    #[serde(default)]
    available: bool,
    #[serde(default)]
    user: Option<Value>,
    #[serde(default)]
    roles: Vec<Snowflake>,
    #[serde(default)]
    guild_id: Option<Snowflake>,
}

impl CustomEmoji {
    /// Decode a raw guild emoji payload.
    ///
    /// The nested `user` sub-payload (the emoji's creator) is placed into the
    /// cache first and stored here as its ID only; the wire `roles` list is
    /// stored as `role_ids`. Unknown fields are ignored.
    pub fn from_payload(data: &Value, cache: &dyn Cache) -> Result<Self, Error> {
        let wire: CustomEmojiData = serde_json::from_value(data.clone())?;
        let creator_id = match &wire.user {
            Some(user) => Some(cache.place_user_data(user)?.id),
            None => None,
        };
        Ok(Self::from_wire(wire, creator_id))
    }

    fn from_wire(wire: CustomEmojiData, creator_id: Option<Snowflake>) -> Self {
        Self {
            id: wire.id,
            name: wire.name,
            animated: wire.animated,
            require_colons: wire.require_colons,
            managed: wire.managed,
            available: wire.available,
            creator_id,
            role_ids: wire.roles,
            guild_id: wire.guild_id,
        }
    }

    /// Tie this emoji to its owning guild when the payload didn't carry it
    /// (emoji payloads inside GUILD_CREATE omit `guild_id`).
    pub fn with_guild_id(mut self, guild_id: Snowflake) -> Self {
        self.guild_id = Some(guild_id);
        self
    }

    pub fn creator_id(&self) -> Option<Snowflake> {
        self.creator_id
    }

    pub fn role_ids(&self) -> &[Snowflake] {
        &self.role_ids
    }

    pub fn guild_id(&self) -> Option<Snowflake> {
        self.guild_id
    }

    /// The basic-emoji form of this custom emoji.
    pub fn as_emoji(&self) -> Emoji {
        Emoji {
            id: Some(self.id),
            name: self.name.clone(),
            animated: self.animated,
        }
    }

    /// Format used in reaction web requests.
    pub fn req_format(&self) -> String {
        self.as_emoji().req_format()
    }

    /// Whether this emoji is usable by the current user.
    pub fn is_usable(&self) -> bool {
        self.available
    }

    // ------------------------------------------------------------------
    // Lazy relations
    // ------------------------------------------------------------------

    /// The user that made this emoji, resolved lazily.
    pub fn creator(&self, cache: &Arc<dyn Cache>) -> Option<CacheProxy<User>> {
        let cache = Arc::clone(cache);
        self.creator_id
            .map(|id| CacheProxy::new(id, move |id| cache.get_user(id)))
    }

    /// The roles allowed to use this emoji, resolved lazily.
    pub fn roles(&self, cache: &Arc<dyn Cache>) -> CacheView<Role> {
        let cache = Arc::clone(cache);
        CacheView::new(self.role_ids.clone(), move |id| cache.get_role(id))
    }

    /// The guild this emoji was created in, resolved lazily.
    pub fn guild(&self, cache: &Arc<dyn Cache>) -> Option<CacheProxy<Guild>> {
        let cache = Arc::clone(cache);
        self.guild_id
            .map(|id| CacheProxy::new(id, move |id| cache.get_guild(id)))
    }

    // ------------------------------------------------------------------
    // Mutating operations
    // ------------------------------------------------------------------

    /// Modify this emoji.
    ///
    /// Only fields set on `edit` appear in the outbound payload, so omitted
    /// fields are never reset remotely. On success the returned canonical
    /// state is applied onto `self`.
    #[cfg(feature = "http")]
    pub async fn edit(
        &mut self,
        http: &Http,
        edit: &EditEmoji,
        reason: Option<&str>,
    ) -> Result<(), Error> {
        let guild_id = self.guild_id.ok_or(Error::MissingGuildId {
            operation: "edit emoji",
        })?;
        let payload = serde_json::to_value(edit)?;
        let updated = http
            .modify_guild_emoji(&payload, guild_id, self.id, reason)
            .await?;
        self.update_from_payload(&updated)
    }

    /// Delete this emoji from its guild.
    #[cfg(feature = "http")]
    pub async fn delete(&self, http: &Http, reason: Option<&str>) -> Result<(), Error> {
        let guild_id = self.guild_id.ok_or(Error::MissingGuildId {
            operation: "delete emoji",
        })?;
        http.delete_guild_emoji(guild_id, self.id, reason).await
    }
}

impl UpdateFromPayload for CustomEmoji {
    fn update_from_payload(&mut self, data: &Value) -> Result<(), Error> {
        if let Some(name) = data.get("name") {
            self.name = serde_json::from_value(name.clone())?;
        }
        if let Some(animated) = data.get("animated").and_then(Value::as_bool) {
            self.animated = animated;
        }
        if let Some(require_colons) = data.get("require_colons").and_then(Value::as_bool) {
            self.require_colons = require_colons;
        }
        if let Some(managed) = data.get("managed").and_then(Value::as_bool) {
            self.managed = managed;
        }
        if let Some(available) = data.get("available").and_then(Value::as_bool) {
            self.available = available;
        }
        if let Some(roles) = data.get("roles") {
            self.role_ids = serde_json::from_value(roles.clone())?;
        }
        if let Some(user) = data.get("user") {
            if let Some(id) = user.get("id") {
                self.creator_id = Some(serde_json::from_value(id.clone())?);
            }
        }
        Ok(())
    }
}

impl<'de> Deserialize<'de> for CustomEmoji {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let wire = CustomEmojiData::deserialize(deserializer)?;
        let creator_id = wire
            .user
            .as_ref()
            .and_then(|user| user.get("id"))
            .and_then(|id| serde_json::from_value(id.clone()).ok());
        Ok(Self::from_wire(wire, creator_id))
    }
}

impl fmt::Display for CustomEmoji {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.as_emoji(), f)
    }
}

// ---------------------------------------------------------------------------
// Partial-update payload
// ---------------------------------------------------------------------------

/// Partial-update body for modifying a guild emoji.
///
/// Unset fields are omitted from the wire entirely.
#[derive(Debug, Clone, Default, Serialize)]
pub struct EditEmoji {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roles: Option<Vec<Snowflake>>,
}

impl EditEmoji {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn roles(mut self, roles: Vec<Snowflake>) -> Self {
        self.roles = Some(roles);
        self
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;

    fn emoji_payload() -> Value {
        serde_json::json!({
            "id": "623335224318754826",
            "name": "thinksmart",
            "animated": false,
            "require_colons": true,
            "managed": false,
            "available": true,
            "user": { "id": "80351110224678912", "username": "nelly" },
            "roles": ["41771983429993000"],
            "guild_id": "41771983423143936",
            "version": 0,
        })
    }

    // -- Emoji (basic) -----------------------------------------------------

    #[test]
    fn unicode_emoji_has_no_id() {
        let emoji = Emoji::unicode("🐍");
        assert!(!emoji.is_custom());
        assert_eq!(emoji.req_format(), "🐍");
        assert_eq!(emoji.to_string(), "🐍");
    }

    #[test]
    fn custom_emoji_mention_form() {
        let emoji = Emoji {
            id: Some(Snowflake::new(623_335_224_318_754_826)),
            name: Some("thinksmart".to_string()),
            animated: false,
        };
        assert_eq!(emoji.to_string(), "<:thinksmart:623335224318754826>");
        assert_eq!(emoji.req_format(), "thinksmart:623335224318754826");
    }

    #[test]
    fn animated_mention_form() {
        let emoji = Emoji {
            id: Some(Snowflake::new(1)),
            name: Some("blob".to_string()),
            animated: true,
        };
        assert_eq!(emoji.to_string(), "<a:blob:1>");
    }

    // -- CustomEmoji decoding ----------------------------------------------

    #[test]
    fn from_payload_places_creator_into_cache() {
        let cache = MemoryCache::new();
        let emoji = CustomEmoji::from_payload(&emoji_payload(), &cache).unwrap();

        let creator_id = Snowflake::new(80_351_110_224_678_912);
        assert_eq!(emoji.creator_id(), Some(creator_id));
        // The nested user payload was inserted into the cache.
        let cached = cache.get_user(creator_id).into_ready().unwrap();
        assert_eq!(cached.username, "nelly");
    }

    #[test]
    fn from_payload_renames_roles() {
        let cache = MemoryCache::new();
        let emoji = CustomEmoji::from_payload(&emoji_payload(), &cache).unwrap();
        assert_eq!(emoji.role_ids(), &[Snowflake::new(41_771_983_429_993_000)]);
        assert_eq!(emoji.guild_id(), Some(Snowflake::new(41_771_983_423_143_936)));
    }

    #[test]
    fn from_payload_without_creator() {
        let cache = MemoryCache::new();
        let mut payload = emoji_payload();
        payload.as_object_mut().unwrap().remove("user");
        let emoji = CustomEmoji::from_payload(&payload, &cache).unwrap();
        assert_eq!(emoji.creator_id(), None);
    }

    #[test]
    fn serde_decoding_without_cache() {
        let emoji: CustomEmoji = serde_json::from_value(emoji_payload()).unwrap();
        assert_eq!(emoji.name.as_deref(), Some("thinksmart"));
        assert!(emoji.creator_id().is_some());
    }

    // -- update-from-payload ------------------------------------------------

    #[test]
    fn update_touches_only_present_fields() {
        let cache = MemoryCache::new();
        let mut emoji = CustomEmoji::from_payload(&emoji_payload(), &cache).unwrap();

        emoji
            .update_from_payload(&serde_json::json!({ "name": "thinkfast" }))
            .unwrap();
        assert_eq!(emoji.name.as_deref(), Some("thinkfast"));
        // Everything else untouched.
        assert_eq!(emoji.id, Snowflake::new(623_335_224_318_754_826));
        assert_eq!(emoji.role_ids().len(), 1);
        assert!(emoji.require_colons);
    }

    // -- lazy relations ------------------------------------------------------

    #[test]
    fn creator_resolves_through_cache() {
        use futures_lite::future::block_on;

        let memory = MemoryCache::new();
        let emoji = CustomEmoji::from_payload(&emoji_payload(), &memory).unwrap();
        let cache: Arc<dyn Cache> = Arc::new(memory);

        let proxy = emoji.creator(&cache).unwrap();
        let creator = block_on(proxy.resolve()).unwrap();
        assert_eq!(creator.username, "nelly");
    }

    #[test]
    fn missing_role_fails_individually() {
        use futures_lite::future::block_on;

        let memory = MemoryCache::new();
        let emoji = CustomEmoji::from_payload(&emoji_payload(), &memory).unwrap();
        let cache: Arc<dyn Cache> = Arc::new(memory);

        let results = block_on(emoji.roles(&cache).resolve_all());
        assert_eq!(results.len(), 1);
        assert!(matches!(results[0], Err(Error::NotFound { kind: "role", .. })));
    }

    // -- partial-update payload ----------------------------------------------

    #[test]
    fn edit_payload_omits_unset_fields() {
        let json = serde_json::to_string(&EditEmoji::new().name("blob")).unwrap();
        assert!(json.contains("\"name\":\"blob\""));
        assert!(!json.contains("roles"));
    }

    #[test]
    fn edit_payload_serialises_roles_as_strings() {
        let edit = EditEmoji::new().roles(vec![Snowflake::new(7)]);
        let json = serde_json::to_string(&edit).unwrap();
        assert!(json.contains("\"roles\":[\"7\"]"));
        assert!(!json.contains("name"));
    }
}
