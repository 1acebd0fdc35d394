//! Applications and teams.

use std::fmt;
use std::sync::Arc;

use bitflags::bitflags;
use serde::de::{Error as DeError, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::cache::Cache;
use crate::error::Error;
use crate::models::{snowflake_identified, Asset, Guild, User};
use crate::proxy::CacheProxy;
use crate::snowflake::Snowflake;

bitflags! {
    /// The application's public flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ApplicationFlags: u64 {
        const GATEWAY_PRESENCE = 1 << 12;
        const GATEWAY_PRESENCE_LIMITED = 1 << 13;
        const GATEWAY_GUILD_MEMBERS = 1 << 14;
        const GATEWAY_GUILD_MEMBERS_LIMITED = 1 << 15;
        const VERIFICATION_PENDING_GUILD_LIMIT = 1 << 16;
        const EMBEDDED = 1 << 17;
        const GATEWAY_MESSAGE_CONTENT = 1 << 18;
        const GATEWAY_MESSAGE_CONTENT_LIMITED = 1 << 19;
        const APPLICATION_COMMAND_BADGE = 1 << 23;
    }
}

impl Default for ApplicationFlags {
    fn default() -> Self {
        Self::empty()
    }
}

impl Serialize for ApplicationFlags {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(self.bits())
    }
}

struct FlagsVisitor;

impl Visitor<'_> for FlagsVisitor {
    type Value = ApplicationFlags;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("application flags as an integer")
    }

    fn visit_u64<E: DeError>(self, value: u64) -> Result<Self::Value, E> {
        Ok(ApplicationFlags::from_bits_truncate(value))
    }
}

impl<'de> Deserialize<'de> for ApplicationFlags {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_u64(FlagsVisitor)
    }
}

// ---------------------------------------------------------------------------
// Teams
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct Team {
    pub id: Snowflake,
    pub icon: Option<String>,
    #[serde(default)]
    pub members: Vec<TeamMember>,
    pub name: Option<String>,
    pub owner_user_id: Snowflake,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TeamMember {
    pub membership_state: u8,
    pub team_id: Option<Snowflake>,
    pub user: User,
}

// ---------------------------------------------------------------------------
// Application
// ---------------------------------------------------------------------------

/// A Discord application.
#[derive(Debug, Clone)]
pub struct Application {
    pub id: Snowflake,
    pub name: String,
    pub icon: Option<String>,
    pub description: Option<String>,
    /// RPC origin URLs, if RPC is enabled.
    pub rpc_origins: Vec<String>,
    /// When false, only the app owner can add the app's bot to guilds.
    pub bot_public: bool,
    /// When true, the bot only joins after the full OAuth2 code grant flow.
    pub bot_require_code_grant: bool,
    pub terms_of_service_url: Option<String>,
    pub privacy_policy_url: Option<String>,
    pub summary: Option<String>,
    /// Hex-encoded key for interaction verification.
    pub verify_key: Option<String>,
    pub team: Option<Team>,
    /// For games sold on Discord, the ID of the "Game SKU" that was created.
    pub primary_sku_id: Option<Snowflake>,
    /// For games sold on Discord, the URL slug that links to the store page.
    pub slug: Option<String>,
    pub cover_image: Option<String>,
    pub flags: ApplicationFlags,
    owner_id: Option<Snowflake>,
    guild_id: Option<Snowflake>,
}

snowflake_identified!(Application);

/// Wire shape of an application payload.
#[derive(Deserialize)]
struct ApplicationData {
    id: Snowflake,
    name: String,
    #[serde(default)]
    icon: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    rpc_origins: Vec<String>,
    #[serde(default = "default_true")]
    bot_public: bool,
    #[serde(default)]
    bot_require_code_grant: bool,
    #[serde(default)]
    terms_of_service_url: Option<String>,
    #[serde(default)]
    privacy_policy_url: Option<String>,
    #[serde(default)]
    owner: Option<Value>,
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    verify_key: Option<String>,
    #[serde(default)]
    team: Option<Team>,
    #[serde(default)]
    guild_id: Option<Snowflake>,
    #[serde(default)]
    primary_sku_id: Option<Snowflake>,
    #[serde(default)]
    slug: Option<String>,
    #[serde(default)]
    cover_image: Option<String>,
    #[serde(default)]
    flags: ApplicationFlags,
}

fn default_true() -> bool {
    true
}

impl Application {
    /// Decode a raw application payload.
    ///
    /// The nested `owner` sub-payload is placed into the cache first and
    /// stored here as its ID only. Unknown fields are ignored.
    pub fn from_payload(data: &Value, cache: &dyn Cache) -> Result<Self, Error> {
        let wire: ApplicationData = serde_json::from_value(data.clone())?;
        let owner_id = match &wire.owner {
            Some(owner) => Some(cache.place_user_data(owner)?.id),
            None => None,
        };
        Ok(Self::from_wire(wire, owner_id))
    }

    fn from_wire(wire: ApplicationData, owner_id: Option<Snowflake>) -> Self {
        Self {
            id: wire.id,
            name: wire.name,
            icon: wire.icon,
            description: wire.description,
            rpc_origins: wire.rpc_origins,
            bot_public: wire.bot_public,
            bot_require_code_grant: wire.bot_require_code_grant,
            terms_of_service_url: wire.terms_of_service_url,
            privacy_policy_url: wire.privacy_policy_url,
            summary: wire.summary,
            verify_key: wire.verify_key,
            team: wire.team,
            primary_sku_id: wire.primary_sku_id,
            slug: wire.slug,
            cover_image: wire.cover_image,
            flags: wire.flags,
            owner_id,
            guild_id: wire.guild_id,
        }
    }

    pub fn owner_id(&self) -> Option<Snowflake> {
        self.owner_id
    }

    pub fn guild_id(&self) -> Option<Snowflake> {
        self.guild_id
    }

    /// The application's owner, resolved lazily.
    pub fn owner(&self, cache: &Arc<dyn Cache>) -> Option<CacheProxy<User>> {
        let cache = Arc::clone(cache);
        self.owner_id
            .map(|id| CacheProxy::new(id, move |id| cache.get_user(id)))
    }

    /// For games sold on Discord, the guild the application is linked to,
    /// resolved lazily.
    pub fn guild(&self, cache: &Arc<dyn Cache>) -> Option<CacheProxy<Guild>> {
        let cache = Arc::clone(cache);
        self.guild_id
            .map(|id| CacheProxy::new(id, move |id| cache.get_guild(id)))
    }

    /// The application's icon.
    pub fn icon(&self) -> Option<Asset> {
        self.icon
            .as_deref()
            .map(|hash| Asset::from_path_hash(&format!("app-icons/{}/{{}}", self.id), hash))
    }

    /// The application's rich presence invite cover image.
    pub fn cover_image(&self) -> Option<Asset> {
        self.cover_image
            .as_deref()
            .map(|hash| Asset::from_path_hash(&format!("app-icons/{}/{{}}", self.id), hash))
    }
}

impl<'de> Deserialize<'de> for Application {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let wire = ApplicationData::deserialize(deserializer)?;
        let owner_id = wire
            .owner
            .as_ref()
            .and_then(|owner| owner.get("id"))
            .and_then(|id| serde_json::from_value(id.clone()).ok());
        Ok(Self::from_wire(wire, owner_id))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;

    fn application_payload() -> Value {
        serde_json::json!({
            "id": "172150183260323840",
            "name": "Baba O-Riley",
            "icon": "a_1234",
            "description": "Test",
            "rpc_origins": ["https://localhost:3000"],
            "bot_public": true,
            "bot_require_code_grant": false,
            "owner": { "id": "172150183260323840", "username": "i own a bot" },
            "summary": "",
            "verify_key": "1e0a356058d627ca38a5c8c9648818061d49e49bd9da9e3ab17d98ad4d6bg2u8",
            "team": {
                "id": "531992624043786253",
                "icon": "dd9b7dcfdf5351b9c3de0fe167bacbe1",
                "members": [],
                "name": "Avengers",
                "owner_user_id": "511972282709709995",
            },
            "flags": 16384,
        })
    }

    #[test]
    fn from_payload_places_owner_into_cache() {
        let cache = MemoryCache::new();
        let app = Application::from_payload(&application_payload(), &cache).unwrap();

        let owner_id = Snowflake::new(172_150_183_260_323_840);
        assert_eq!(app.owner_id(), Some(owner_id));
        assert!(cache.get_user(owner_id).is_ready());
    }

    #[test]
    fn flags_decode_from_integer() {
        let cache = MemoryCache::new();
        let app = Application::from_payload(&application_payload(), &cache).unwrap();
        assert!(app.flags.contains(ApplicationFlags::GATEWAY_GUILD_MEMBERS));
        assert!(!app.flags.contains(ApplicationFlags::EMBEDDED));
    }

    #[test]
    fn team_is_typed() {
        let cache = MemoryCache::new();
        let app = Application::from_payload(&application_payload(), &cache).unwrap();
        let team = app.team.as_ref().unwrap();
        assert_eq!(team.name.as_deref(), Some("Avengers"));
        assert_eq!(team.owner_user_id, Snowflake::new(511_972_282_709_709_995));
    }

    #[test]
    fn icon_asset_respects_animation() {
        let cache = MemoryCache::new();
        let app = Application::from_payload(&application_payload(), &cache).unwrap();
        assert!(app.icon().unwrap().animated());
        assert!(app.cover_image().is_none());
    }

    #[test]
    fn defaults_without_optional_fields() {
        let cache = MemoryCache::new();
        let app = Application::from_payload(
            &serde_json::json!({ "id": "1", "name": "bare" }),
            &cache,
        )
        .unwrap();
        assert!(app.bot_public);
        assert!(app.rpc_origins.is_empty());
        assert_eq!(app.flags, ApplicationFlags::empty());
        assert!(app.owner_id().is_none());
    }
}
