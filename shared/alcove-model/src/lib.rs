//! Alcove data model.
//!
//! Pure, synchronous core shared by the client: permission bitflags and
//! resolution, channel overwrite stores, and channel position planning.
//! Everything here computes over immutable snapshots; no I/O, no locks.

pub mod channel;
pub mod ordering;
pub mod permissions;
pub mod snowflake;
pub mod update;

pub use channel::{ChannelFlags, ChannelKind, PositionedEntity, SortingBucket};
pub use ordering::{
    plan_absolute_move, plan_move, ChannelPositionUpdate, ChannelSlot, PlacementError,
    PlacementRequest,
};
pub use permissions::{
    changed_role_permissions, resolve_channel_permissions, GuildSnapshot, OverwriteHolder,
    OverwriteKind, OverwriteRecord, OverwriteStore, OverwriteTarget, PermissionOverwrite,
    Permissions, UnknownOverwriteKind,
};
pub use snowflake::Snowflake;
pub use update::FieldUpdate;
