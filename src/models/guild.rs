//! Guilds.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::cache::Cache;
use crate::models::{snowflake_identified, Asset, Channel, Emoji, Member, Role, User};
use crate::proxy::CacheProxy;
use crate::snowflake::Snowflake;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Guild {
    pub id: Snowflake,
    pub name: String,
    pub icon: Option<String>,
    pub banner: Option<String>,
    pub owner_id: Option<Snowflake>,
    pub approximate_member_count: Option<u64>,
    pub approximate_presence_count: Option<u64>,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub roles: Vec<Role>,
    #[serde(default)]
    pub emojis: Vec<Emoji>,
    #[serde(default)]
    pub channels: Vec<Channel>,
    #[serde(default)]
    pub members: Vec<Member>,
    #[serde(default)]
    pub unavailable: bool,
}

snowflake_identified!(Guild);

impl Guild {
    /// The guild's owner, resolved lazily against the cache.
    pub fn owner(&self, cache: &Arc<dyn Cache>) -> Option<CacheProxy<User>> {
        let cache = Arc::clone(cache);
        self.owner_id
            .map(|id| CacheProxy::new(id, move |id| cache.get_user(id)))
    }

    /// The guild's icon, or `None` if no icon is set.
    pub fn icon(&self) -> Option<Asset> {
        self.icon
            .as_deref()
            .map(|hash| Asset::from_path_hash(&format!("icons/{}/{{}}", self.id), hash))
    }

    /// The guild's banner, or `None` if no banner is set.
    pub fn banner(&self) -> Option<Asset> {
        self.banner
            .as_deref()
            .map(|hash| Asset::from_path_hash(&format!("banners/{}/{{}}", self.id), hash))
    }
}

/// Stub guild object sent when a guild is unavailable (or not yet streamed
/// after READY).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UnavailableGuild {
    pub id: Snowflake,
    #[serde(default)]
    pub unavailable: bool,
}
