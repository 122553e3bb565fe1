//! Placement requests for relative channel moves.

use thiserror::Error;

use crate::snowflake::Snowflake;
use crate::update::FieldUpdate;

/// One relative move: exactly one of beginning / end / before / after,
/// plus an offset and an optional category change.
///
/// `category` is three-state: `Keep` leaves containment alone, `Clear`
/// moves the channel out of any category, `Set` reparents it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlacementRequest {
    pub beginning: bool,
    pub end: bool,
    pub before: Option<Snowflake>,
    pub after: Option<Snowflake>,
    /// Slots to shift the resolved index by; clamped to the candidate range.
    pub offset: i32,
    pub category: FieldUpdate<Snowflake>,
    /// Copy the target category's overwrites onto the channel as part of
    /// the move.
    pub sync_permissions: bool,
}

impl PlacementRequest {
    /// Move to the top of the bucket (or category).
    #[must_use]
    pub fn at_beginning() -> Self {
        Self { beginning: true, ..Self::default() }
    }

    /// Move to the bottom of the bucket (or category).
    #[must_use]
    pub fn at_end() -> Self {
        Self { end: true, ..Self::default() }
    }

    /// Move directly above the given channel.
    #[must_use]
    pub fn before(channel_id: Snowflake) -> Self {
        Self { before: Some(channel_id), ..Self::default() }
    }

    /// Move directly below the given channel.
    #[must_use]
    pub fn after(channel_id: Snowflake) -> Self {
        Self { after: Some(channel_id), ..Self::default() }
    }

    #[must_use]
    pub const fn with_offset(mut self, offset: i32) -> Self {
        self.offset = offset;
        self
    }

    /// Reparent into the given category as part of the move.
    #[must_use]
    pub const fn into_category(mut self, category_id: Snowflake) -> Self {
        self.category = FieldUpdate::Set(category_id);
        self
    }

    /// Move out of any category as part of the move.
    #[must_use]
    pub const fn without_category(mut self) -> Self {
        self.category = FieldUpdate::Clear;
        self
    }

    #[must_use]
    pub const fn syncing_permissions(mut self, sync: bool) -> Self {
        self.sync_permissions = sync;
        self
    }

    /// Validate the anchor fields down to a single anchor.
    pub(crate) fn anchor(&self) -> Result<Anchor, PlacementError> {
        let mut anchors = Vec::with_capacity(1);
        if self.beginning {
            anchors.push(Anchor::Beginning);
        }
        if self.end {
            anchors.push(Anchor::End);
        }
        if let Some(id) = self.before {
            anchors.push(Anchor::Before(id));
        }
        if let Some(id) = self.after {
            anchors.push(Anchor::After(id));
        }

        match anchors.len() {
            1 => Ok(anchors.remove(0)),
            0 => Err(PlacementError::MissingAnchor),
            _ => Err(PlacementError::ConflictingAnchors),
        }
    }
}

/// The resolved anchor of a placement request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Anchor {
    Beginning,
    End,
    Before(Snowflake),
    After(Snowflake),
}

/// Why a placement could not be planned.
///
/// All variants are detected before any transport call is issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PlacementError {
    /// Caller misuse: an absolute position below zero.
    #[error("channel position cannot be less than 0")]
    NegativePosition,

    /// Caller misuse: more than one of beginning, end, before, after.
    #[error("only one of beginning, end, before, or after can be used")]
    ConflictingAnchors,

    /// Caller misuse: no anchor at all.
    #[error("could not resolve an anchor for the move")]
    MissingAnchor,

    /// The before/after channel is not in the candidate set. Failing beats
    /// clamping, which would silently reorder to an unintended slot.
    #[error("anchor channel {0} is not among the candidate channels")]
    UnresolvedAnchor(Snowflake),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_anchor_resolves() {
        assert_eq!(PlacementRequest::at_beginning().anchor().unwrap(), Anchor::Beginning);
        assert_eq!(PlacementRequest::at_end().anchor().unwrap(), Anchor::End);
        assert_eq!(
            PlacementRequest::before(Snowflake(5)).anchor().unwrap(),
            Anchor::Before(Snowflake(5))
        );
        assert_eq!(
            PlacementRequest::after(Snowflake(5)).anchor().unwrap(),
            Anchor::After(Snowflake(5))
        );
    }

    #[test]
    fn test_no_anchor_is_rejected() {
        let request = PlacementRequest::default();
        assert_eq!(request.anchor().unwrap_err(), PlacementError::MissingAnchor);
    }

    #[test]
    fn test_conflicting_anchors_are_rejected() {
        let request = PlacementRequest {
            beginning: true,
            after: Some(Snowflake(5)),
            ..PlacementRequest::default()
        };
        assert_eq!(request.anchor().unwrap_err(), PlacementError::ConflictingAnchors);
    }

    #[test]
    fn test_builders_compose() {
        let request = PlacementRequest::at_end()
            .with_offset(-1)
            .into_category(Snowflake(9))
            .syncing_permissions(true);
        assert!(request.end);
        assert_eq!(request.offset, -1);
        assert_eq!(request.category, FieldUpdate::Set(Snowflake(9)));
        assert!(request.sync_permissions);
    }
}
