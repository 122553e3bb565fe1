//! Channel kinds, sorting buckets, and positioning contracts.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::snowflake::Snowflake;

/// Wire channel type.
///
/// Unknown values are preserved so newer server-side kinds survive a cache
/// round trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub enum ChannelKind {
    Text,
    Voice,
    Category,
    Announcement,
    Stage,
    Unknown(u8),
}

impl ChannelKind {
    /// The partition this kind sorts within. Positions are only dense and
    /// comparable inside one bucket.
    #[must_use]
    pub const fn sorting_bucket(self) -> SortingBucket {
        match self {
            Self::Text | Self::Announcement | Self::Unknown(_) => SortingBucket::Text,
            Self::Voice | Self::Stage => SortingBucket::Voice,
            Self::Category => SortingBucket::Category,
        }
    }
}

impl From<u8> for ChannelKind {
    fn from(value: u8) -> Self {
        match value {
            0 => Self::Text,
            2 => Self::Voice,
            4 => Self::Category,
            5 => Self::Announcement,
            13 => Self::Stage,
            other => Self::Unknown(other),
        }
    }
}

impl From<ChannelKind> for u8 {
    fn from(kind: ChannelKind) -> Self {
        match kind {
            ChannelKind::Text => 0,
            ChannelKind::Voice => 2,
            ChannelKind::Category => 4,
            ChannelKind::Announcement => 5,
            ChannelKind::Stage => 13,
            ChannelKind::Unknown(other) => other,
        }
    }
}

/// Channel-type partition for position numbering.
///
/// Text-like, voice-like, and category channels never interleave; each
/// bucket is renumbered independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortingBucket {
    Text,
    Voice,
    Category,
}

bitflags! {
    /// Per-channel wire flags, carried opaquely through edits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
    #[serde(transparent)]
    pub struct ChannelFlags: u64 {
        /// Thread is pinned to the top of its forum channel
        const PINNED      = 1 << 1;
        /// Forum threads must carry a tag to be created
        const REQUIRE_TAG = 1 << 4;
    }
}

/// An entity that occupies a slot in a guild's channel ordering.
///
/// Implemented by concrete channel variants; the positioner works against
/// this contract instead of probing runtime types.
pub trait PositionedEntity {
    fn entity_id(&self) -> Snowflake;
    fn position(&self) -> i32;
    fn category_id(&self) -> Option<Snowflake>;
    fn sorting_bucket(&self) -> SortingBucket;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_wire_roundtrip() {
        for value in [0u8, 2, 4, 5, 13, 42] {
            assert_eq!(u8::from(ChannelKind::from(value)), value);
        }
        assert_eq!(ChannelKind::from(42), ChannelKind::Unknown(42));
    }

    #[test]
    fn test_buckets_partition_kinds() {
        assert_eq!(ChannelKind::Text.sorting_bucket(), SortingBucket::Text);
        assert_eq!(ChannelKind::Announcement.sorting_bucket(), SortingBucket::Text);
        assert_eq!(ChannelKind::Voice.sorting_bucket(), SortingBucket::Voice);
        assert_eq!(ChannelKind::Stage.sorting_bucket(), SortingBucket::Voice);
        assert_eq!(ChannelKind::Category.sorting_bucket(), SortingBucket::Category);
    }
}
