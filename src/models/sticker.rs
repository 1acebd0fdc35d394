//! Stickers, sticker items, and sticker packs.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use serde_repr::{Deserialize_repr, Serialize_repr};

use crate::cache::Cache;
use crate::error::Error;
use crate::models::{snowflake_identified, Asset, Guild, UpdateFromPayload, User};
use crate::proxy::CacheProxy;
use crate::snowflake::Snowflake;

#[cfg(feature = "http")]
use crate::http::Http;

/// Application ID that owns the sticker-pack banner assets on the CDN.
const STICKER_PACK_BANNER_APP: u64 = 710_982_414_301_790_216;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize_repr, Serialize_repr)]
#[repr(u8)]
pub enum StickerType {
    /// An official sticker in a pack.
    Standard = 1,
    /// A sticker uploaded to a boosted guild for the guild's members.
    Guild = 2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize_repr, Serialize_repr)]
#[repr(u8)]
pub enum StickerFormatType {
    Png = 1,
    Apng = 2,
    Lottie = 3,
    Gif = 4,
}

/// The smallest amount of data required to render a sticker, as embedded in
/// message payloads.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StickerItem {
    pub id: Snowflake,
    pub name: String,
    pub format_type: StickerFormatType,
}

snowflake_identified!(StickerItem);

// ---------------------------------------------------------------------------
// Sticker
// ---------------------------------------------------------------------------

/// A sticker that can be sent in messages.
#[derive(Debug, Clone)]
pub struct Sticker {
    pub id: Snowflake,
    /// Name of the sticker.
    pub name: String,
    /// Type of sticker image format.
    pub format_type: StickerFormatType,
    /// For standard stickers, ID of the pack the sticker is from.
    pub pack_id: Option<Snowflake>,
    pub description: Option<String>,
    /// Autocomplete/suggestion tags for the sticker (max 200 characters).
    pub tags: String,
    pub kind: StickerType,
    /// Whether this guild sticker can be used; may be false due to loss of
    /// Server Boosts.
    pub available: bool,
    /// The standard sticker's sort order within its pack.
    pub sort_value: Option<u64>,
    user_id: Option<Snowflake>,
    guild_id: Option<Snowflake>,
}

snowflake_identified!(Sticker);

/// Wire shape of a sticker payload.
#[derive(Deserialize)]
struct StickerData {
    id: Snowflake,
    name: String,
    format_type: StickerFormatType,
    #[serde(default)]
    pack_id: Option<Snowflake>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    tags: String,
    #[serde(rename = "type")]
    kind: StickerType,
    #[serde(default = "default_true")]
    available: bool,
    #[serde(default)]
    sort_value: Option<u64>,
    #[serde(default)]
    user: Option<Value>,
    #[serde(default)]
    guild_id: Option<Snowflake>,
}

fn default_true() -> bool {
    true
}

impl Sticker {
    /// Decode a raw sticker payload.
    ///
    /// The nested `user` sub-payload (the uploader) is placed into the cache
    /// first and stored here as its ID only. Unknown fields are ignored.
    pub fn from_payload(data: &Value, cache: &dyn Cache) -> Result<Self, Error> {
        let wire: StickerData = serde_json::from_value(data.clone())?;
        let user_id = match &wire.user {
            Some(user) => Some(cache.place_user_data(user)?.id),
            None => None,
        };
        Ok(Self::from_wire(wire, user_id))
    }

    fn from_wire(wire: StickerData, user_id: Option<Snowflake>) -> Self {
        Self {
            id: wire.id,
            name: wire.name,
            format_type: wire.format_type,
            pack_id: wire.pack_id,
            description: wire.description,
            tags: wire.tags,
            kind: wire.kind,
            available: wire.available,
            sort_value: wire.sort_value,
            user_id,
            guild_id: wire.guild_id,
        }
    }

    pub fn user_id(&self) -> Option<Snowflake> {
        self.user_id
    }

    pub fn guild_id(&self) -> Option<Snowflake> {
        self.guild_id
    }

    /// The item form of this sticker, as embedded in messages.
    pub fn as_item(&self) -> StickerItem {
        StickerItem {
            id: self.id,
            name: self.name.clone(),
            format_type: self.format_type,
        }
    }

    /// The user that uploaded this sticker, resolved lazily.
    ///
    /// Not present for standard-pack stickers.
    pub fn user(&self, cache: &Arc<dyn Cache>) -> Option<CacheProxy<User>> {
        let cache = Arc::clone(cache);
        self.user_id
            .map(|id| CacheProxy::new(id, move |id| cache.get_user(id)))
    }

    /// The guild this sticker belongs to, resolved lazily.
    ///
    /// Not present for standard-pack stickers.
    pub fn guild(&self, cache: &Arc<dyn Cache>) -> Option<CacheProxy<Guild>> {
        let cache = Arc::clone(cache);
        self.guild_id
            .map(|id| CacheProxy::new(id, move |id| cache.get_guild(id)))
    }

    // ------------------------------------------------------------------
    // Mutating operations
    // ------------------------------------------------------------------

    /// Modify this sticker. Guild stickers only.
    ///
    /// Only fields set on `edit` appear in the outbound payload. On success
    /// the returned canonical state is applied onto `self`.
    #[cfg(feature = "http")]
    pub async fn edit(
        &mut self,
        http: &Http,
        edit: &EditSticker,
        reason: Option<&str>,
    ) -> Result<(), Error> {
        let guild_id = self.guild_id.ok_or(Error::MissingGuildId {
            operation: "edit sticker",
        })?;
        let payload = serde_json::to_value(edit)?;
        let updated = http
            .modify_guild_sticker(&payload, guild_id, self.id, reason)
            .await?;
        self.update_from_payload(&updated)
    }

    /// Delete this sticker from its guild. Guild stickers only.
    #[cfg(feature = "http")]
    pub async fn delete(&self, http: &Http, reason: Option<&str>) -> Result<(), Error> {
        let guild_id = self.guild_id.ok_or(Error::MissingGuildId {
            operation: "delete sticker",
        })?;
        http.delete_guild_sticker(guild_id, self.id, reason).await
    }
}

impl UpdateFromPayload for Sticker {
    fn update_from_payload(&mut self, data: &Value) -> Result<(), Error> {
        if let Some(name) = data.get("name").and_then(Value::as_str) {
            self.name = name.to_owned();
        }
        if let Some(description) = data.get("description") {
            self.description = serde_json::from_value(description.clone())?;
        }
        if let Some(tags) = data.get("tags").and_then(Value::as_str) {
            self.tags = tags.to_owned();
        }
        if let Some(format_type) = data.get("format_type") {
            self.format_type = serde_json::from_value(format_type.clone())?;
        }
        if let Some(available) = data.get("available").and_then(Value::as_bool) {
            self.available = available;
        }
        if let Some(sort_value) = data.get("sort_value").and_then(Value::as_u64) {
            self.sort_value = Some(sort_value);
        }
        if let Some(user) = data.get("user") {
            if let Some(id) = user.get("id") {
                self.user_id = Some(serde_json::from_value(id.clone())?);
            }
        }
        Ok(())
    }
}

impl<'de> Deserialize<'de> for Sticker {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let wire = StickerData::deserialize(deserializer)?;
        let user_id = wire
            .user
            .as_ref()
            .and_then(|user| user.get("id"))
            .and_then(|id| serde_json::from_value(id.clone()).ok());
        Ok(Self::from_wire(wire, user_id))
    }
}

// ---------------------------------------------------------------------------
// Partial-update payload
// ---------------------------------------------------------------------------

/// Partial-update body for modifying a guild sticker.
///
/// `description` is doubly optional: leaving it unset omits the field from
/// the wire, while `Some(None)` sends an explicit `null` to clear the
/// description remotely.
#[derive(Debug, Clone, Default, Serialize)]
pub struct EditSticker {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,
}

impl EditSticker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(Some(description.into()));
        self
    }

    /// Send an explicit `null` to clear the description.
    pub fn clear_description(mut self) -> Self {
        self.description = Some(None);
        self
    }

    pub fn tags(mut self, tags: impl Into<String>) -> Self {
        self.tags = Some(tags.into());
        self
    }
}

// ---------------------------------------------------------------------------
// Sticker packs
// ---------------------------------------------------------------------------

/// A pack of standard stickers.
#[derive(Debug, Clone, Deserialize)]
pub struct StickerPack {
    pub id: Snowflake,
    #[serde(default)]
    pub stickers: Vec<Sticker>,
    pub name: String,
    /// ID of the pack's SKU.
    pub sku_id: Snowflake,
    /// ID of a sticker in the pack shown as the pack's icon.
    pub cover_sticker_id: Option<Snowflake>,
    pub description: String,
    /// ID of the sticker pack's banner image.
    pub banner_asset_id: Option<Snowflake>,
}

snowflake_identified!(StickerPack);

impl StickerPack {
    /// The pack's banner image on the CDN.
    pub fn banner(&self) -> Option<Asset> {
        self.banner_asset_id.map(|id| {
            Asset::from_path_hash(
                &format!("app-assets/{STICKER_PACK_BANNER_APP}/store/{{}}"),
                &id.to_string(),
            )
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;

    fn sticker_payload() -> Value {
        serde_json::json!({
            "id": "749054660769218631",
            "name": "Wave",
            "format_type": 3,
            "pack_id": null,
            "description": "Wumpus waves hello",
            "tags": "wumpus, hello, sup, hi",
            "type": 2,
            "available": true,
            "sort_value": null,
            "user": { "id": "80351110224678912", "username": "nelly" },
            "guild_id": "41771983423143936",
        })
    }

    // -- decoding ------------------------------------------------------------

    #[test]
    fn from_payload_places_uploader_into_cache() {
        let cache = MemoryCache::new();
        let sticker = Sticker::from_payload(&sticker_payload(), &cache).unwrap();

        let uploader = Snowflake::new(80_351_110_224_678_912);
        assert_eq!(sticker.user_id(), Some(uploader));
        assert!(cache.get_user(uploader).is_ready());
        assert_eq!(sticker.kind, StickerType::Guild);
        assert_eq!(sticker.format_type, StickerFormatType::Lottie);
    }

    #[test]
    fn standard_sticker_has_no_guild() {
        let cache = MemoryCache::new();
        let payload = serde_json::json!({
            "id": "749054660769218631",
            "name": "Wave",
            "format_type": 1,
            "pack_id": "847199849233514549",
            "tags": "wave",
            "type": 1,
            "sort_value": 12,
        });
        let sticker = Sticker::from_payload(&payload, &cache).unwrap();
        assert_eq!(sticker.kind, StickerType::Standard);
        assert!(sticker.guild_id().is_none());
        assert!(sticker.user_id().is_none());
        assert!(sticker.available, "available defaults to true");
    }

    #[test]
    fn missing_name_fails_construction() {
        let cache = MemoryCache::new();
        let payload = serde_json::json!({ "id": "1", "format_type": 1, "type": 1 });
        assert!(Sticker::from_payload(&payload, &cache).is_err());
    }

    // -- update-from-payload --------------------------------------------------

    #[test]
    fn update_applies_canonical_state_in_place() {
        let cache = MemoryCache::new();
        let mut sticker = Sticker::from_payload(&sticker_payload(), &cache).unwrap();

        sticker
            .update_from_payload(&serde_json::json!({
                "name": "BigWave",
                "description": null,
            }))
            .unwrap();
        assert_eq!(sticker.name, "BigWave");
        assert_eq!(sticker.description, None);
        // Identifier and untouched fields survive.
        assert_eq!(sticker.id, Snowflake::new(749_054_660_769_218_631));
        assert_eq!(sticker.tags, "wumpus, hello, sup, hi");
    }

    // -- partial-update payload -----------------------------------------------

    #[test]
    fn edit_payload_contains_only_set_fields() {
        let json = serde_json::to_string(&EditSticker::new().name("Wave")).unwrap();
        assert!(json.contains("\"name\":\"Wave\""));
        assert!(!json.contains("description"));
        assert!(!json.contains("tags"));
    }

    #[test]
    fn edit_payload_distinguishes_clear_from_unset() {
        let cleared = serde_json::to_string(&EditSticker::new().clear_description()).unwrap();
        assert_eq!(cleared, "{\"description\":null}");

        let unset = serde_json::to_string(&EditSticker::new()).unwrap();
        assert_eq!(unset, "{}");
    }

    // -- packs ----------------------------------------------------------------

    #[test]
    fn pack_banner_asset() {
        let pack: StickerPack = serde_json::from_value(serde_json::json!({
            "id": "847199849233514549",
            "stickers": [],
            "name": "Wumpus Beyond",
            "sku_id": "847199849233514547",
            "cover_sticker_id": "749053689419006003",
            "description": "Say hello to Wumpus!",
            "banner_asset_id": "761773777976819712",
        }))
        .unwrap();
        let banner = pack.banner().unwrap();
        assert!(banner.url.contains("app-assets/710982414301790216/store/761773777976819712"));
    }
}
