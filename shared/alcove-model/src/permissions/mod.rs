//! Permission model.
//!
//! Layered role-based access control:
//! - Guild roles: per-role 64-bit bitmasks, unioned per member
//! - Channel overwrites: per-target allow/deny pairs layered on top
//! - Resolution: deterministic precedence order over both

pub mod flags;
pub mod overwrite;
pub mod resolver;
pub mod store;

pub use flags::Permissions;
pub use overwrite::{OverwriteKind, OverwriteTarget, PermissionOverwrite, UnknownOverwriteKind};
pub use resolver::{changed_role_permissions, resolve_channel_permissions, GuildSnapshot};
pub use store::{OverwriteHolder, OverwriteRecord, OverwriteStore};
