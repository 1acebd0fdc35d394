//! The Discord snowflake ID format.
//!
//! Snowflakes are 64-bit unsigned integers that embed their creation time
//! along with internal worker/process bits. They are transmitted as strings
//! in JSON (JavaScript mangles integers above 2^53) but handled numerically
//! everywhere else, so [`Snowflake`] deserialises from either representation
//! and always serialises back to the string form.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::de::{Error as DeError, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::Error;

/// Milliseconds since the Unix epoch of the first second of 2015.
pub const DISCORD_EPOCH: u64 = 1_420_070_400_000;

/// A Discord snowflake ID.
///
/// Ordering, equality, and hashing all use the underlying numeric value, so
/// sorting a list of snowflakes sorts it chronologically.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Snowflake(u64);

impl Snowflake {
    /// Create a snowflake from its raw numeric value.
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// The raw numeric value.
    pub const fn get(self) -> u64 {
        self.0
    }

    /// When this snowflake was generated.
    pub fn created_at(self) -> DateTime<Utc> {
        let ms = (self.0 >> 22) + DISCORD_EPOCH;
        DateTime::from_timestamp_millis(ms as i64).unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    /// Unix-millis timestamp embedded in this snowflake.
    pub const fn timestamp_ms(self) -> u64 {
        (self.0 >> 22) + DISCORD_EPOCH
    }

    /// The internal worker ID (bits 17-21).
    pub const fn worker_id(self) -> u8 {
        ((self.0 & 0x3E_0000) >> 17) as u8
    }

    /// The internal process ID (bits 12-16).
    pub const fn process_id(self) -> u8 {
        ((self.0 & 0x1F_000) >> 12) as u8
    }

    /// The per-process increment (bits 0-11).
    pub const fn increment(self) -> u16 {
        (self.0 & 0xFFF) as u16
    }
}

impl From<u64> for Snowflake {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<Snowflake> for u64 {
    fn from(id: Snowflake) -> Self {
        id.0
    }
}

impl FromStr for Snowflake {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u64>()
            .map(Self)
            .map_err(|_| Error::InvalidSnowflake(s.to_owned()))
    }
}

impl TryFrom<&str> for Snowflake {
    type Error = Error;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl fmt::Display for Snowflake {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl fmt::Debug for Snowflake {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Snowflake({})", self.0)
    }
}

// ---------------------------------------------------------------------------
// Serde: string on the wire, number accepted on the way in
// ---------------------------------------------------------------------------

impl Serialize for Snowflake {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0)
    }
}

struct SnowflakeVisitor;

impl Visitor<'_> for SnowflakeVisitor {
    type Value = Snowflake;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a snowflake as a string or integer")
    }

    fn visit_u64<E: DeError>(self, value: u64) -> Result<Self::Value, E> {
        Ok(Snowflake(value))
    }

    fn visit_i64<E: DeError>(self, value: i64) -> Result<Self::Value, E> {
        u64::try_from(value)
            .map(Snowflake)
            .map_err(|_| E::custom("snowflake must be non-negative"))
    }

    fn visit_str<E: DeError>(self, value: &str) -> Result<Self::Value, E> {
        value.parse().map_err(|_| {
            E::custom(format!("invalid snowflake string: {value:?}"))
        })
    }
}

impl<'de> Deserialize<'de> for Snowflake {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(SnowflakeVisitor)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
