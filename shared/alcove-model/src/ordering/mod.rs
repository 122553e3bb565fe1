//! Channel ordering.
//!
//! Positions are dense per sorting bucket and category. Moving a channel
//! means recomputing the whole bucket's order and persisting absolute
//! positions, never deltas.

pub mod positioner;
pub mod request;

pub use positioner::{plan_absolute_move, plan_move, ChannelPositionUpdate, ChannelSlot};
pub use request::{PlacementError, PlacementRequest};
