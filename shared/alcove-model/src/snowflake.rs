//! Entity identifiers.
//!
//! Every guild, channel, role, and member is identified by a snowflake: a
//! 64-bit integer carrying a millisecond timestamp in its upper bits. On the
//! wire snowflakes travel as base-10 strings because the raw value can exceed
//! the safe integer range of loosely-typed consumers.

use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use chrono::{DateTime, TimeZone, Utc};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Milliseconds since the Unix epoch at which the platform clock starts
/// (2015-01-01T00:00:00Z).
const EPOCH_MS: u64 = 1_420_070_400_000;

/// A 64-bit entity identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Snowflake(pub u64);

impl Snowflake {
    /// Raw integer value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    /// The creation time embedded in the identifier.
    ///
    /// The upper 42 bits of a snowflake hold milliseconds since the platform
    /// epoch.
    #[must_use]
    pub fn created_at(self) -> DateTime<Utc> {
        let ms = (self.0 >> 22) + EPOCH_MS;
        Utc.timestamp_millis_opt(ms as i64).single().unwrap_or_else(Utc::now)
    }
}

impl From<u64> for Snowflake {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for Snowflake {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Snowflake {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u64>().map(Self)
    }
}

impl Serialize for Snowflake {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Snowflake {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct SnowflakeVisitor;

        impl Visitor<'_> for SnowflakeVisitor {
            type Value = Snowflake;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a snowflake string or integer")
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
                Ok(Snowflake(v))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                v.parse().map_err(|_| E::invalid_value(de::Unexpected::Str(v), &self))
            }
        }

        deserializer.deserialize_any(SnowflakeVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_as_string() {
        let id = Snowflake(81384788765712384);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"81384788765712384\"");
    }

    #[test]
    fn test_deserializes_from_string_or_integer() {
        let from_str: Snowflake = serde_json::from_str("\"81384788765712384\"").unwrap();
        let from_int: Snowflake = serde_json::from_str("81384788765712384").unwrap();
        assert_eq!(from_str, Snowflake(81384788765712384));
        assert_eq!(from_str, from_int);
    }

    #[test]
    fn test_rejects_non_numeric_string() {
        let result: Result<Snowflake, _> = serde_json::from_str("\"not-a-number\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_created_at_extracts_timestamp() {
        // 81384788765712384 >> 22 = 19404036315ms past the epoch.
        let id = Snowflake(81384788765712384);
        let ts = id.created_at();
        assert_eq!(ts.timestamp_millis() as u64, (81384788765712384u64 >> 22) + EPOCH_MS);
    }

    #[test]
    fn test_display_and_parse_roundtrip() {
        let id = Snowflake(123456789);
        let parsed: Snowflake = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
    }
}
