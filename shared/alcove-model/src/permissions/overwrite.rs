//! Per-target permission overwrites.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::snowflake::Snowflake;

use super::flags::Permissions;

/// What an overwrite applies to.
///
/// Encoded on the wire as an integer: `0` for roles, `1` for members.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum OverwriteKind {
    Role,
    Member,
}

/// Wire value that is neither the role kind nor the member kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("overwrite target kind must be 0 (role) or 1 (member), got {0}")]
pub struct UnknownOverwriteKind(pub u8);

impl TryFrom<u8> for OverwriteKind {
    type Error = UnknownOverwriteKind;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Role),
            1 => Ok(Self::Member),
            other => Err(UnknownOverwriteKind(other)),
        }
    }
}

impl From<OverwriteKind> for u8 {
    fn from(kind: OverwriteKind) -> Self {
        match kind {
            OverwriteKind::Role => 0,
            OverwriteKind::Member => 1,
        }
    }
}

/// A role or member an overwrite is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OverwriteTarget {
    pub id: Snowflake,
    pub kind: OverwriteKind,
}

impl OverwriteTarget {
    #[must_use]
    pub const fn role(id: Snowflake) -> Self {
        Self { id, kind: OverwriteKind::Role }
    }

    #[must_use]
    pub const fn member(id: Snowflake) -> Self {
        Self { id, kind: OverwriteKind::Member }
    }
}

/// An editable allow/deny pair.
///
/// Each permission bit is in one of three states: allowed, denied, or
/// inherited (present in neither mask). The two masks are kept disjoint by
/// construction; records coming off the wire may violate that, which the
/// resolver tolerates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PermissionOverwrite {
    allow: Permissions,
    deny: Permissions,
}

impl PermissionOverwrite {
    /// An overwrite that inherits everything.
    #[must_use]
    pub const fn new() -> Self {
        Self { allow: Permissions::empty(), deny: Permissions::empty() }
    }

    /// Build from an existing allow/deny pair.
    ///
    /// Bits present in both masks are treated as denied, so a round trip
    /// through [`Self::pair`] normalizes conflicting wire data.
    #[must_use]
    pub const fn from_pair(allow: Permissions, deny: Permissions) -> Self {
        Self { allow: allow.difference(deny), deny }
    }

    /// The (allow, deny) masks of this overwrite.
    #[must_use]
    pub const fn pair(self) -> (Permissions, Permissions) {
        (self.allow, self.deny)
    }

    /// Set the given bits to allowed (`Some(true)`), denied (`Some(false)`),
    /// or inherited (`None`).
    pub fn update(&mut self, bits: Permissions, state: Option<bool>) {
        self.allow.remove(bits);
        self.deny.remove(bits);
        match state {
            Some(true) => self.allow.insert(bits),
            Some(false) => self.deny.insert(bits),
            None => {}
        }
    }

    /// Whether every bit is inherited.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.allow.is_empty() && self.deny.is_empty()
    }
}
