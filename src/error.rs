//! Crate-wide error type.
//!
//! Every fallible operation in the crate funnels into [`Error`]. Validation
//! failures surface at construction/call time; reference-resolution failures
//! surface only when a deferred handle is forced.

use crate::snowflake::Snowflake;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A string that should have been a numeric snowflake wasn't.
    #[error("invalid snowflake: {0:?}")]
    InvalidSnowflake(String),

    /// Malformed constructor input (bad asset size, bad field value).
    #[error("validation error: {0}")]
    Validation(String),

    /// A referenced entity could not be resolved against the cache.
    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: Snowflake },

    /// A guild-scoped operation was attempted on an entity that doesn't
    /// know its owning guild.
    #[error("{operation} requires a guild id, but none is set")]
    MissingGuildId { operation: &'static str },

    /// Non-success status from Discord.
    #[error("Discord API error {status} on {route}: {body}")]
    Api {
        status: u16,
        body: String,
        route: String,
    },

    /// Transport / network error.
    #[error("HTTP transport error: {0}")]
    Transport(String),

    /// Serialisation error.
    #[error("serialisation error: {0}")]
    Serde(String),

    /// Filesystem error while saving an asset.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serde(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_display_names_the_entity() {
        let err = Error::NotFound {
            kind: "user",
            id: Snowflake::new(123),
        };
        assert_eq!(err.to_string(), "user 123 not found");
    }

    #[test]
    fn api_error_display_includes_route() {
        let err = Error::Api {
            status: 403,
            body: "Missing Permissions".to_string(),
            route: "PATCH /guilds/1/emojis".to_string(),
        };
        let text = err.to_string();
        assert!(text.contains("403"));
        assert!(text.contains("PATCH /guilds/1/emojis"));
    }

    #[test]
    fn serde_errors_convert() {
        let bad: Result<u64, _> = serde_json::from_str("\"not a number\"");
        let err: Error = bad.unwrap_err().into();
        assert!(matches!(err, Error::Serde(_)));
    }
}
