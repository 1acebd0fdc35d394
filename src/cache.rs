//! The entity-cache collaborator contract.
//!
//! Entities never hold references to each other, only snowflakes, and lean
//! on a [`Cache`] to turn those snowflakes back into entities. Each `get_*`
//! method is a resolution function in the sense of [`crate::proxy`]: it
//! answers synchronously when the entity is resident and hands back a
//! deferred [`Resolution`] otherwise. Misses surface as [`Error::NotFound`]
//! only when the deferred handle is forced.
//!
//! [`MemoryCache`] is the bundled implementation; anything that can answer
//! the same contract (a cache fronted by REST fetches, say) can stand in for
//! it.

use std::sync::Arc;

use dashmap::DashMap;
use serde_json::Value;

use crate::error::Error;
use crate::models::{Channel, CustomEmoji, Guild, Role, Sticker, User};
use crate::proxy::Resolution;
use crate::snowflake::Snowflake;

/// Resolution source for every entity kind this crate stores by reference.
pub trait Cache: Send + Sync {
    fn get_user(&self, id: Snowflake) -> Resolution<User>;
    fn get_role(&self, id: Snowflake) -> Resolution<Role>;
    fn get_guild(&self, id: Snowflake) -> Resolution<Guild>;
    fn get_channel(&self, id: Snowflake) -> Resolution<Channel>;
    fn get_emoji(&self, id: Snowflake) -> Resolution<CustomEmoji>;
    fn get_sticker(&self, id: Snowflake) -> Resolution<Sticker>;

    /// Insert or update a user from a raw nested payload, returning the
    /// stored entity.
    ///
    /// Used while decoding a creator/uploader sub-payload embedded in
    /// another entity's payload.
    fn place_user_data(&self, data: &Value) -> Result<User, Error>;
}

// ---------------------------------------------------------------------------
// MemoryCache
// ---------------------------------------------------------------------------

/// In-memory [`Cache`] backed by concurrent maps.
///
/// Cheap to clone (internals are behind `Arc`). Eviction is out of scope:
/// entries live until overwritten or removed by the embedder.
#[derive(Clone, Default)]
pub struct MemoryCache {
    users: Arc<DashMap<Snowflake, User>>,
    roles: Arc<DashMap<Snowflake, Role>>,
    guilds: Arc<DashMap<Snowflake, Guild>>,
    channels: Arc<DashMap<Snowflake, Channel>>,
    emojis: Arc<DashMap<Snowflake, CustomEmoji>>,
    stickers: Arc<DashMap<Snowflake, Sticker>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn place_user(&self, user: User) {
        self.users.insert(user.id, user);
    }

    pub fn place_role(&self, role: Role) {
        self.roles.insert(role.id, role);
    }

    pub fn place_guild(&self, guild: Guild) {
        self.guilds.insert(guild.id, guild);
    }

    pub fn place_channel(&self, channel: Channel) {
        self.channels.insert(channel.id, channel);
    }

    pub fn place_emoji(&self, emoji: CustomEmoji) {
        self.emojis.insert(emoji.id, emoji);
    }

    pub fn place_sticker(&self, sticker: Sticker) {
        self.stickers.insert(sticker.id, sticker);
    }
}

/// Answer from the map synchronously on a hit; otherwise defer, re-checking
/// once at await time so an entity placed in the meantime still resolves.
fn lookup<T>(
    map: &Arc<DashMap<Snowflake, T>>,
    id: Snowflake,
    kind: &'static str,
) -> Resolution<T>
where
    T: Clone + Send + Sync + 'static,
{
    if let Some(entry) = map.get(&id) {
        return Resolution::ready(entry.value().clone());
    }
    let map = Arc::clone(map);
    Resolution::deferred(async move {
        map.get(&id)
            .map(|entry| entry.value().clone())
            .ok_or(Error::NotFound { kind, id })
    })
}

impl Cache for MemoryCache {
    fn get_user(&self, id: Snowflake) -> Resolution<User> {
        lookup(&self.users, id, "user")
    }

    fn get_role(&self, id: Snowflake) -> Resolution<Role> {
        lookup(&self.roles, id, "role")
    }

    fn get_guild(&self, id: Snowflake) -> Resolution<Guild> {
        lookup(&self.guilds, id, "guild")
    }

    fn get_channel(&self, id: Snowflake) -> Resolution<Channel> {
        lookup(&self.channels, id, "channel")
    }

    fn get_emoji(&self, id: Snowflake) -> Resolution<CustomEmoji> {
        lookup(&self.emojis, id, "emoji")
    }

    fn get_sticker(&self, id: Snowflake) -> Resolution<Sticker> {
        lookup(&self.stickers, id, "sticker")
    }

    fn place_user_data(&self, data: &Value) -> Result<User, Error> {
        let user: User = serde_json::from_value(data.clone())?;
        self.users.insert(user.id, user.clone());
        Ok(user)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use futures_lite::future::block_on;

    fn user_payload(id: u64, name: &str) -> Value {
        serde_json::json!({ "id": id.to_string(), "username": name })
    }

    #[test]
    fn resident_entity_resolves_synchronously() {
        let cache = MemoryCache::new();
        cache.place_user_data(&user_payload(1, "snek")).unwrap();

        let resolution = cache.get_user(Snowflake::new(1));
        assert!(resolution.is_ready());
        assert_eq!(resolution.into_ready().unwrap().username, "snek");
    }

    #[test]
    fn miss_defers_then_fails_not_found() {
        let cache = MemoryCache::new();
        let resolution = cache.get_user(Snowflake::new(404));
        assert!(!resolution.is_ready());

        let err = block_on(resolution).unwrap_err();
        assert!(matches!(err, Error::NotFound { kind: "user", id } if id.get() == 404));
    }

    #[test]
    fn deferred_miss_sees_late_placement() {
        let cache = MemoryCache::new();
        let resolution = cache.get_user(Snowflake::new(2));
        assert!(!resolution.is_ready());

        // Placed between lookup and forcing: still resolves.
        cache.place_user_data(&user_payload(2, "late")).unwrap();
        assert_eq!(block_on(resolution).unwrap().username, "late");
    }

    #[test]
    fn place_user_data_overwrites_existing() {
        let cache = MemoryCache::new();
        cache.place_user_data(&user_payload(1, "old")).unwrap();
        let updated = cache.place_user_data(&user_payload(1, "new")).unwrap();

        assert_eq!(updated.username, "new");
        let stored = cache.get_user(Snowflake::new(1)).into_ready().unwrap();
        assert_eq!(stored.username, "new");
    }

    #[test]
    fn place_user_data_rejects_malformed_payload() {
        let cache = MemoryCache::new();
        let err = cache
            .place_user_data(&serde_json::json!({ "username": "no id" }))
            .unwrap_err();
        assert!(matches!(err, Error::Serde(_)));
    }

    #[tokio::test]
    async fn trait_object_lookup_awaits() {
        let memory = MemoryCache::new();
        memory.place_user_data(&user_payload(3, "boxed")).unwrap();
        let cache: Arc<dyn Cache> = Arc::new(memory);

        let user = cache.get_user(Snowflake::new(3)).await.unwrap();
        assert_eq!(user.username, "boxed");

        let err = cache.get_guild(Snowflake::new(3)).await.unwrap_err();
        assert!(matches!(err, Error::NotFound { kind: "guild", .. }));
    }

    #[test]
    fn clones_share_storage() {
        let cache = MemoryCache::new();
        let clone = cache.clone();
        cache.place_user_data(&user_payload(7, "shared")).unwrap();
        assert!(clone.get_user(Snowflake::new(7)).is_ready());
    }
}
