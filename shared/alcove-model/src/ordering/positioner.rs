//! Channel position planning.
//!
//! Computes the new total order of a guild's channels when one channel is
//! moved, and the bulk position update to persist it. Planning is pure;
//! persistence happens elsewhere through the transport.

use serde::Serialize;

use crate::channel::{PositionedEntity, SortingBucket};
use crate::snowflake::Snowflake;
use crate::update::FieldUpdate;

use super::request::{Anchor, PlacementError, PlacementRequest};

/// Positioning snapshot of one channel.
///
/// Taken from cached channel state before planning so that a plan works
/// over one consistent view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelSlot {
    pub id: Snowflake,
    pub position: i32,
    pub category_id: Option<Snowflake>,
    pub bucket: SortingBucket,
}

impl ChannelSlot {
    #[must_use]
    pub fn of(entity: &impl PositionedEntity) -> Self {
        Self {
            id: entity.entity_id(),
            position: entity.position(),
            category_id: entity.category_id(),
            bucket: entity.sorting_bucket(),
        }
    }
}

/// One entry of a bulk channel-position update.
///
/// Positions are absolute, renumbered densely from 0. Only the moved
/// channel's entry carries a parent change and the sync flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChannelPositionUpdate {
    pub id: Snowflake,
    pub position: i32,
    #[serde(skip_serializing_if = "FieldUpdate::is_keep")]
    pub parent_id: FieldUpdate<Snowflake>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lock_permissions: Option<bool>,
}

/// Plan a relative move described by a [`PlacementRequest`].
///
/// Candidates are the guild channels sharing the subject's sorting bucket
/// and the target category (the request's category if one was given,
/// otherwise the subject's current one), ordered by `(position, id)`. The
/// subject is slotted in at the anchor plus offset, clamped to the
/// candidate range, and every candidate is renumbered densely.
pub fn plan_move(
    subject: ChannelSlot,
    guild_channels: &[ChannelSlot],
    request: &PlacementRequest,
) -> Result<Vec<ChannelPositionUpdate>, PlacementError> {
    let anchor = request.anchor()?;

    let target_category = match request.category {
        FieldUpdate::Keep => subject.category_id,
        FieldUpdate::Clear => None,
        FieldUpdate::Set(id) => Some(id),
    };

    let mut candidates = collect_candidates(guild_channels, subject, target_category);

    let index = match anchor {
        Anchor::Beginning => 0,
        Anchor::End => candidates.len(),
        Anchor::Before(id) => candidates
            .iter()
            .position(|c| c.id == id)
            .ok_or(PlacementError::UnresolvedAnchor(id))?,
        Anchor::After(id) => candidates
            .iter()
            .position(|c| c.id == id)
            .map(|i| i + 1)
            .ok_or(PlacementError::UnresolvedAnchor(id))?,
    };

    let index = clamp_index(index, request.offset, candidates.len());
    candidates.insert(index, subject);

    let (parent, lock) = if request.category.is_keep() {
        (FieldUpdate::Keep, None)
    } else {
        (request.category, Some(request.sync_permissions))
    };
    Ok(emit_updates(&candidates, subject.id, parent, lock))
}

/// Plan an absolute move to a numeric position.
///
/// Used by generic edits that set `position` directly. Candidates are
/// always the subject's bucket and current category; the insertion slot is
/// the first candidate whose position is at or past the requested one.
pub fn plan_absolute_move(
    subject: ChannelSlot,
    guild_channels: &[ChannelSlot],
    position: i32,
    parent: FieldUpdate<Snowflake>,
    lock_permissions: bool,
) -> Result<Vec<ChannelPositionUpdate>, PlacementError> {
    if position < 0 {
        return Err(PlacementError::NegativePosition);
    }

    let mut candidates = collect_candidates(guild_channels, subject, subject.category_id);

    let index = candidates
        .iter()
        .position(|c| c.position >= position)
        .unwrap_or(candidates.len());
    candidates.insert(index, subject);

    let (parent, lock) = if parent.is_keep() {
        (FieldUpdate::Keep, None)
    } else {
        (parent, Some(lock_permissions))
    };
    Ok(emit_updates(&candidates, subject.id, parent, lock))
}

/// Same-bucket, same-category channels sorted by `(position, id)`, with
/// the subject itself removed.
///
/// The id tie-break keeps the order stable when the source data reports
/// duplicate positions. A subject missing from the set (its containment
/// disagrees with the request) is tolerated and treated as not yet placed.
fn collect_candidates(
    guild_channels: &[ChannelSlot],
    subject: ChannelSlot,
    target_category: Option<Snowflake>,
) -> Vec<ChannelSlot> {
    let mut candidates: Vec<ChannelSlot> = guild_channels
        .iter()
        .filter(|c| c.bucket == subject.bucket && c.category_id == target_category)
        .copied()
        .collect();
    candidates.sort_by_key(|c| (c.position, c.id));
    candidates.retain(|c| c.id != subject.id);
    candidates
}

fn clamp_index(index: usize, offset: i32, len: usize) -> usize {
    (index as i64 + i64::from(offset)).clamp(0, len as i64) as usize
}

fn emit_updates(
    ordered: &[ChannelSlot],
    subject_id: Snowflake,
    parent: FieldUpdate<Snowflake>,
    lock_permissions: Option<bool>,
) -> Vec<ChannelPositionUpdate> {
    ordered
        .iter()
        .enumerate()
        .map(|(index, slot)| {
            let is_subject = slot.id == subject_id;
            ChannelPositionUpdate {
                id: slot.id,
                position: index as i32,
                parent_id: if is_subject { parent } else { FieldUpdate::Keep },
                lock_permissions: if is_subject { lock_permissions } else { None },
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(id: u64, position: i32) -> ChannelSlot {
        ChannelSlot {
            id: Snowflake(id),
            position,
            category_id: None,
            bucket: SortingBucket::Text,
        }
    }

    fn slot_in(id: u64, position: i32, category: u64) -> ChannelSlot {
        ChannelSlot { category_id: Some(Snowflake(category)), ..slot(id, position) }
    }

    fn positions(updates: &[ChannelPositionUpdate]) -> Vec<(u64, i32)> {
        updates.iter().map(|u| (u.id.0, u.position)).collect()
    }

    #[test]
    fn test_move_before_first() {
        // A(0) B(1) C(2); move C before A.
        let channels = [slot(1, 0), slot(2, 1), slot(3, 2)];
        let updates =
            plan_move(channels[2], &channels, &PlacementRequest::before(Snowflake(1))).unwrap();
        assert_eq!(positions(&updates), vec![(3, 0), (1, 1), (2, 2)]);
    }

    #[test]
    fn test_move_to_end() {
        // A(0) B(1); move A to the end.
        let channels = [slot(1, 0), slot(2, 1)];
        let updates = plan_move(channels[0], &channels, &PlacementRequest::at_end()).unwrap();
        assert_eq!(positions(&updates), vec![(2, 0), (1, 1)]);
    }

    #[test]
    fn test_move_after_anchor() {
        let channels = [slot(1, 0), slot(2, 1), slot(3, 2)];
        let updates =
            plan_move(channels[0], &channels, &PlacementRequest::after(Snowflake(2))).unwrap();
        assert_eq!(positions(&updates), vec![(2, 0), (1, 1), (3, 2)]);
    }

    #[test]
    fn test_unresolved_anchor_fails() {
        let channels = [slot(1, 0), slot(2, 1)];
        let err =
            plan_move(channels[0], &channels, &PlacementRequest::before(Snowflake(404))).unwrap_err();
        assert_eq!(err, PlacementError::UnresolvedAnchor(Snowflake(404)));
    }

    #[test]
    fn test_idempotent_move_renumbers_sparse_positions() {
        // B is already last; moving it to the end only densifies 3/7/9.
        let channels = [slot(1, 3), slot(2, 9), slot(3, 7)];
        let updates = plan_move(channels[1], &channels, &PlacementRequest::at_end()).unwrap();
        assert_eq!(positions(&updates), vec![(1, 0), (3, 1), (2, 2)]);
    }

    #[test]
    fn test_duplicate_positions_break_ties_by_id() {
        let channels = [slot(9, 0), slot(3, 0), slot(5, 0)];
        let updates = plan_move(channels[0], &channels, &PlacementRequest::at_end()).unwrap();
        assert_eq!(positions(&updates), vec![(3, 0), (5, 1), (9, 2)]);
    }

    #[test]
    fn test_offset_applies_after_anchor() {
        let channels = [slot(1, 0), slot(2, 1), slot(3, 2)];
        let request = PlacementRequest::at_beginning().with_offset(1);
        let updates = plan_move(channels[2], &channels, &request).unwrap();
        assert_eq!(positions(&updates), vec![(1, 0), (3, 1), (2, 2)]);
    }

    #[test]
    fn test_offset_clamps_to_candidate_range() {
        let channels = [slot(1, 0), slot(2, 1)];

        let low = PlacementRequest::at_beginning().with_offset(-5);
        let updates = plan_move(channels[1], &channels, &low).unwrap();
        assert_eq!(positions(&updates), vec![(2, 0), (1, 1)]);

        let high = PlacementRequest::at_end().with_offset(5);
        let updates = plan_move(channels[0], &channels, &high).unwrap();
        assert_eq!(positions(&updates), vec![(2, 0), (1, 1)]);
    }

    #[test]
    fn test_other_buckets_are_untouched() {
        let voice = ChannelSlot { bucket: SortingBucket::Voice, ..slot(9, 0) };
        let channels = [slot(1, 0), slot(2, 1), voice];
        let updates =
            plan_move(channels[0], &channels, &PlacementRequest::at_end()).unwrap();
        assert_eq!(positions(&updates), vec![(2, 0), (1, 1)]);
    }

    #[test]
    fn test_move_into_category_positions_among_its_members() {
        // Subject sits outside category 50; moving it in at the beginning.
        let channels = [slot(1, 0), slot_in(2, 0, 50), slot_in(3, 1, 50)];
        let request = PlacementRequest::at_beginning()
            .into_category(Snowflake(50))
            .syncing_permissions(true);
        let updates = plan_move(channels[0], &channels, &request).unwrap();

        assert_eq!(positions(&updates), vec![(1, 0), (2, 1), (3, 2)]);
        let moved = &updates[0];
        assert_eq!(moved.parent_id, FieldUpdate::Set(Snowflake(50)));
        assert_eq!(moved.lock_permissions, Some(true));
        assert_eq!(updates[1].parent_id, FieldUpdate::Keep);
        assert_eq!(updates[1].lock_permissions, None);
    }

    #[test]
    fn test_move_out_of_category_carries_null_parent() {
        let channels = [slot_in(1, 0, 50), slot(2, 0), slot(3, 1)];
        let request = PlacementRequest::at_end().without_category();
        let updates = plan_move(channels[0], &channels, &request).unwrap();

        assert_eq!(positions(&updates), vec![(2, 0), (3, 1), (1, 2)]);
        let moved = updates.iter().find(|u| u.id == Snowflake(1)).unwrap();
        assert_eq!(moved.parent_id, FieldUpdate::Clear);
        assert_eq!(moved.lock_permissions, Some(false));
    }

    #[test]
    fn test_no_category_change_emits_bare_entries() {
        let channels = [slot(1, 0), slot(2, 1)];
        let updates = plan_move(channels[0], &channels, &PlacementRequest::at_end()).unwrap();
        for update in &updates {
            assert!(update.parent_id.is_keep());
            assert_eq!(update.lock_permissions, None);
        }
    }

    #[test]
    fn test_update_wire_shape() {
        let channels = [slot_in(1, 0, 50), slot(2, 0)];
        let request = PlacementRequest::at_end().without_category();
        let updates = plan_move(channels[0], &channels, &request).unwrap();

        let wire = serde_json::to_value(&updates).unwrap();
        assert_eq!(
            wire,
            serde_json::json!([
                {"id": "2", "position": 0},
                {"id": "1", "position": 1, "parent_id": null, "lock_permissions": false},
            ])
        );
    }

    #[test]
    fn test_absolute_move_inserts_before_equal_position() {
        // A(0) B(1) C(2); move A to position 2.
        let channels = [slot(1, 0), slot(2, 1), slot(3, 2)];
        let updates = plan_absolute_move(
            channels[0],
            &channels,
            2,
            FieldUpdate::Keep,
            false,
        )
        .unwrap();
        assert_eq!(positions(&updates), vec![(2, 0), (1, 1), (3, 2)]);
    }

    #[test]
    fn test_absolute_move_to_front() {
        let channels = [slot(1, 0), slot(2, 1), slot(3, 2)];
        let updates =
            plan_absolute_move(channels[2], &channels, 0, FieldUpdate::Keep, false).unwrap();
        assert_eq!(positions(&updates), vec![(3, 0), (1, 1), (2, 2)]);
    }

    #[test]
    fn test_absolute_move_past_end_appends() {
        let channels = [slot(1, 0), slot(2, 1)];
        let updates =
            plan_absolute_move(channels[0], &channels, 99, FieldUpdate::Keep, false).unwrap();
        assert_eq!(positions(&updates), vec![(2, 0), (1, 1)]);
    }

    #[test]
    fn test_absolute_move_rejects_negative_position() {
        let channels = [slot(1, 0)];
        let err =
            plan_absolute_move(channels[0], &channels, -1, FieldUpdate::Keep, false).unwrap_err();
        assert_eq!(err, PlacementError::NegativePosition);
    }

    #[test]
    fn test_absolute_move_with_parent_marks_subject_entry() {
        let channels = [slot(1, 0), slot(2, 1)];
        let updates = plan_absolute_move(
            channels[0],
            &channels,
            1,
            FieldUpdate::Set(Snowflake(50)),
            true,
        )
        .unwrap();

        let moved = updates.iter().find(|u| u.id == Snowflake(1)).unwrap();
        assert_eq!(moved.parent_id, FieldUpdate::Set(Snowflake(50)));
        assert_eq!(moved.lock_permissions, Some(true));
    }

    #[test]
    fn test_subject_absent_from_candidates_is_tolerated() {
        // Subject's cached category disagrees with the request target; it
        // is planned as not yet placed.
        let subject = slot_in(1, 0, 77);
        let channels = [subject, slot(2, 0), slot(3, 1)];
        let request = PlacementRequest::at_beginning().without_category();
        let updates = plan_move(subject, &channels, &request).unwrap();
        assert_eq!(positions(&updates), vec![(1, 0), (2, 1), (3, 2)]);
    }
}
