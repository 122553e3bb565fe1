//! Channel overwrite records and the per-channel overwrite store.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::snowflake::Snowflake;

use super::flags::Permissions;
use super::overwrite::{OverwriteKind, OverwriteTarget, PermissionOverwrite};

/// Serde helpers for permission masks that travel as base-10 strings.
///
/// The wire uses strings because a full 64-bit mask exceeds the safe integer
/// range of loosely-typed consumers. Bare integers are still accepted on the
/// way in.
mod wire_mask {
    use std::fmt;

    use serde::de::{self, Visitor};
    use serde::{Deserializer, Serializer};

    use crate::permissions::Permissions;

    pub fn serialize<S: Serializer>(mask: &Permissions, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&mask.to_wire())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Permissions, D::Error> {
        struct MaskVisitor;

        impl Visitor<'_> for MaskVisitor {
            type Value = Permissions;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a permission mask string or integer")
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
                Ok(Permissions::from_wire(v))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                v.parse::<u64>()
                    .map(Permissions::from_wire)
                    .map_err(|_| E::invalid_value(de::Unexpected::Str(v), &self))
            }
        }

        deserializer.deserialize_any(MaskVisitor)
    }
}

/// One permission overwrite as stored on a channel.
///
/// Mirrors the wire shape `{ id, type, allow, deny }` with stringified masks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverwriteRecord {
    pub id: Snowflake,
    #[serde(rename = "type")]
    pub kind: OverwriteKind,
    #[serde(with = "wire_mask", default)]
    pub allow: Permissions,
    #[serde(with = "wire_mask", default)]
    pub deny: Permissions,
}

impl OverwriteRecord {
    #[must_use]
    pub const fn new(target: OverwriteTarget, allow: Permissions, deny: Permissions) -> Self {
        Self { id: target.id, kind: target.kind, allow, deny }
    }

    #[must_use]
    pub const fn is_role(&self) -> bool {
        matches!(self.kind, OverwriteKind::Role)
    }

    #[must_use]
    pub const fn is_member(&self) -> bool {
        matches!(self.kind, OverwriteKind::Member)
    }

    /// The editable allow/deny view of this record.
    #[must_use]
    pub const fn overwrite(&self) -> PermissionOverwrite {
        PermissionOverwrite::from_pair(self.allow, self.deny)
    }

    fn wire_value(&self) -> Value {
        json!({
            "id": self.id,
            "type": u8::from(self.kind),
            "allow": self.allow.to_wire().to_string(),
            "deny": self.deny.to_wire().to_string(),
        })
    }
}

/// Access to a channel's overwrite store.
///
/// Implemented by every concrete channel variant that carries overwrites.
pub trait OverwriteHolder {
    fn overwrite_store(&self) -> &OverwriteStore;
}

/// The ordered overwrite collection of one channel.
///
/// Records are unique by `(id, kind)`. If an overwrite for the everyone role
/// (the role whose id equals the guild id) is present it sits at index 0;
/// the resolver depends on that placement.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OverwriteStore {
    records: Vec<OverwriteRecord>,
}

impl OverwriteStore {
    /// Build a store from wire records, moving the everyone-role overwrite
    /// to the front.
    ///
    /// The server does not guarantee the everyone overwrite comes first, so
    /// it is swapped into index 0 here. No synthetic entry is created when
    /// it is absent.
    #[must_use]
    pub fn build(records: impl IntoIterator<Item = OverwriteRecord>, everyone_id: Snowflake) -> Self {
        let mut records: Vec<OverwriteRecord> = records.into_iter().collect();

        let everyone_index = records
            .iter()
            .position(|r| r.is_role() && r.id == everyone_id);
        if let Some(index) = everyone_index {
            records.swap(0, index);
        }

        Self { records }
    }

    /// Exact-match lookup by target id and kind.
    #[must_use]
    pub fn lookup(&self, target: OverwriteTarget) -> Option<&OverwriteRecord> {
        self.records
            .iter()
            .find(|r| r.id == target.id && r.kind == target.kind)
    }

    /// The records in resolution order.
    #[must_use]
    pub fn records(&self) -> &[OverwriteRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, OverwriteRecord> {
        self.records.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Full replacement list in wire form, masks as base-10 strings.
    #[must_use]
    pub fn as_wire_payload(&self) -> Vec<Value> {
        self.records.iter().map(OverwriteRecord::wire_value).collect()
    }
}

impl<'a> IntoIterator for &'a OverwriteStore {
    type Item = &'a OverwriteRecord;
    type IntoIter = std::slice::Iter<'a, OverwriteRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn role_record(id: u64, allow: Permissions, deny: Permissions) -> OverwriteRecord {
        OverwriteRecord::new(OverwriteTarget::role(Snowflake(id)), allow, deny)
    }

    #[test]
    fn test_build_swaps_everyone_to_front() {
        let everyone_id = Snowflake(100);
        let store = OverwriteStore::build(
            [
                role_record(42, Permissions::SEND_MESSAGES, Permissions::empty()),
                role_record(100, Permissions::empty(), Permissions::READ_MESSAGES),
            ],
            everyone_id,
        );

        assert_eq!(store.records()[0].id, everyone_id);
        assert_eq!(store.records()[1].id, Snowflake(42));
    }

    #[test]
    fn test_build_ignores_member_overwrite_with_everyone_id() {
        // Only a role-kind record counts as the everyone overwrite.
        let everyone_id = Snowflake(100);
        let store = OverwriteStore::build(
            [
                role_record(42, Permissions::SEND_MESSAGES, Permissions::empty()),
                OverwriteRecord::new(
                    OverwriteTarget::member(everyone_id),
                    Permissions::empty(),
                    Permissions::SEND_MESSAGES,
                ),
            ],
            everyone_id,
        );

        assert_eq!(store.records()[0].id, Snowflake(42));
    }

    #[test]
    fn test_build_without_everyone_keeps_order() {
        let store = OverwriteStore::build(
            [
                role_record(1, Permissions::SEND_MESSAGES, Permissions::empty()),
                role_record(2, Permissions::empty(), Permissions::CONNECT),
            ],
            Snowflake(999),
        );

        assert_eq!(store.records()[0].id, Snowflake(1));
        assert_eq!(store.records()[1].id, Snowflake(2));
    }

    #[test]
    fn test_lookup_matches_id_and_kind() {
        let store = OverwriteStore::build(
            [
                role_record(7, Permissions::SEND_MESSAGES, Permissions::empty()),
                OverwriteRecord::new(
                    OverwriteTarget::member(Snowflake(7)),
                    Permissions::CONNECT,
                    Permissions::empty(),
                ),
            ],
            Snowflake(999),
        );

        let as_role = store.lookup(OverwriteTarget::role(Snowflake(7))).unwrap();
        assert_eq!(as_role.allow, Permissions::SEND_MESSAGES);

        let as_member = store.lookup(OverwriteTarget::member(Snowflake(7))).unwrap();
        assert_eq!(as_member.allow, Permissions::CONNECT);

        assert!(store.lookup(OverwriteTarget::role(Snowflake(8))).is_none());
    }

    #[test]
    fn test_wire_payload_uses_string_masks() {
        let store = OverwriteStore::build(
            [role_record(7, Permissions::SEND_MESSAGES, Permissions::READ_MESSAGES)],
            Snowflake(999),
        );

        let payload = store.as_wire_payload();
        assert_eq!(payload.len(), 1);
        assert_eq!(payload[0]["id"], "7");
        assert_eq!(payload[0]["type"], 0);
        assert_eq!(payload[0]["allow"], (1u64 << 11).to_string());
        assert_eq!(payload[0]["deny"], (1u64 << 10).to_string());
    }

    #[test]
    fn test_record_deserializes_wire_shape() {
        let record: OverwriteRecord = serde_json::from_str(
            r#"{"id":"42","type":1,"allow":"2048","deny":1024}"#,
        )
        .unwrap();
        assert_eq!(record.id, Snowflake(42));
        assert!(record.is_member());
        assert_eq!(record.allow, Permissions::SEND_MESSAGES);
        assert_eq!(record.deny, Permissions::READ_MESSAGES);
    }

    #[test]
    fn test_record_missing_masks_default_to_empty() {
        let record: OverwriteRecord =
            serde_json::from_str(r#"{"id":"42","type":0}"#).unwrap();
        assert!(record.allow.is_empty());
        assert!(record.deny.is_empty());
    }
}
