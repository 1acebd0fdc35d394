//! Typed representations of Discord API objects.
//!
//! These mirror the Discord API docs so payloads coming off the gateway and
//! REST responses can be handled without touching `serde_json::Value` in the
//! rest of the codebase. Entities reference each other by snowflake only;
//! the accessors that follow those references live on the entities and hand
//! out proxies from [`crate::proxy`].

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::error::Error;
use crate::snowflake::Snowflake;

pub mod application;
pub mod asset;
pub mod channel;
pub mod emoji;
pub mod guild;
pub mod message;
pub mod role;
pub mod sticker;
pub mod user;

pub use application::{Application, ApplicationFlags, Team, TeamMember};
pub use asset::Asset;
pub use channel::{Channel, ChannelType, ThreadMember};
pub use emoji::{CustomEmoji, EditEmoji, Emoji};
pub use guild::{Guild, UnavailableGuild};
pub use message::{Attachment, Message, MessageReference};
pub use role::{Permissions, Role};
pub use sticker::{EditSticker, Sticker, StickerFormatType, StickerItem, StickerPack, StickerType};
pub use user::{Member, PartialUser, User};

// ---------------------------------------------------------------------------
// Entity base
// ---------------------------------------------------------------------------

/// Common surface of every snowflake-identified entity.
///
/// The identifier is assigned at construction and never mutated afterwards;
/// update-from-payload operations leave it untouched. Entities compare equal
/// iff their identifiers are equal (concrete-type matching is enforced by the
/// type system).
pub trait DiscordObject {
    /// The entity's snowflake.
    fn id(&self) -> Snowflake;

    /// When the entity was created, derived from the snowflake.
    fn created_at(&self) -> DateTime<Utc> {
        self.id().created_at()
    }
}

/// In-place mutation from canonical state returned by the API.
///
/// Applied after an edit call succeeds: only fields present in the payload
/// are touched, the identifier never. Updates are applied only once the
/// collaborator call has fully succeeded, so a cancelled operation leaves the
/// entity unchanged.
pub trait UpdateFromPayload {
    fn update_from_payload(&mut self, data: &Value) -> Result<(), Error>;
}

/// Implement id-based `PartialEq`/`Eq`/`Hash` and [`DiscordObject`] for an
/// entity with an `id` field.
macro_rules! snowflake_identified {
    ($($entity:ty),+ $(,)?) => {
        $(
            impl $crate::models::DiscordObject for $entity {
                fn id(&self) -> $crate::snowflake::Snowflake {
                    self.id
                }
            }

            impl PartialEq for $entity {
                fn eq(&self, other: &Self) -> bool {
                    self.id == other.id
                }
            }

            impl Eq for $entity {}

            impl std::hash::Hash for $entity {
                fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
                    self.id.hash(state);
                }
            }
        )+
    };
}

pub(crate) use snowflake_identified;
