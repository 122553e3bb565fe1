//! Channel edit requests.

use alcove_model::{
    ChannelFlags, ChannelKind, FieldUpdate, OverwriteTarget, PermissionOverwrite, Permissions,
    Snowflake,
};

/// A sparse channel edit. Unset fields are left untouched on the server.
///
/// Three-state fields distinguish "leave alone" from "clear": `topic`,
/// `rtc_region`, and `category` accept [`FieldUpdate::Clear`] to null the
/// field out.
#[derive(Debug, Clone, Default)]
pub struct ChannelEdit {
    pub name: Option<String>,
    pub topic: FieldUpdate<String>,
    /// Absolute position within the channel's sorting bucket and current
    /// category. Triggers a bulk renumbering of its siblings.
    pub position: Option<i32>,
    pub category: FieldUpdate<Snowflake>,
    /// Copy the category's overwrites onto the channel as part of the edit.
    /// Only meaningful together with a category change or an existing
    /// category.
    pub sync_permissions: bool,
    /// Seconds a member must wait between messages.
    pub slowmode_delay: Option<u32>,
    pub rtc_region: FieldUpdate<String>,
    pub bitrate: Option<u32>,
    pub user_limit: Option<u32>,
    pub nsfw: Option<bool>,
    /// Conversion between text-like kinds; the server rejects the rest.
    pub kind: Option<ChannelKind>,
    pub flags: Option<ChannelFlags>,
    /// Full replacement of the channel's overwrite list.
    pub overwrites: Option<Vec<(OverwriteTarget, PermissionOverwrite)>>,
}

impl ChannelEdit {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the edit changes nothing at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.topic.is_keep()
            && self.position.is_none()
            && self.category.is_keep()
            && !self.sync_permissions
            && self.slowmode_delay.is_none()
            && self.rtc_region.is_keep()
            && self.bitrate.is_none()
            && self.user_limit.is_none()
            && self.nsfw.is_none()
            && self.kind.is_none()
            && self.flags.is_none()
            && self.overwrites.is_none()
    }
}

/// One overwrite mutation for a single role or member.
///
/// Either a whole-overwrite operation (`overwrite` set to `Set` or `Clear`)
/// or a set of per-bit adjustments (`grants`), never both.
#[derive(Debug, Clone, Default)]
pub struct OverwriteEdit {
    /// `Set` replaces the target's overwrite, `Clear` deletes it, `Keep`
    /// defers to `grants`.
    pub overwrite: FieldUpdate<PermissionOverwrite>,
    /// Per-bit adjustments applied on top of the target's current
    /// overwrite: allowed (`Some(true)`), denied (`Some(false)`), or
    /// inherited (`None`).
    pub grants: Vec<(Permissions, Option<bool>)>,
}

impl OverwriteEdit {
    /// Replace the target's overwrite wholesale.
    #[must_use]
    pub const fn replace(overwrite: PermissionOverwrite) -> Self {
        Self { overwrite: FieldUpdate::Set(overwrite), grants: Vec::new() }
    }

    /// Delete the target's overwrite.
    #[must_use]
    pub const fn clear() -> Self {
        Self { overwrite: FieldUpdate::Clear, grants: Vec::new() }
    }

    /// Adjust individual bits, leaving the rest of the overwrite intact.
    #[must_use]
    pub fn adjust(grants: Vec<(Permissions, Option<bool>)>) -> Self {
        Self { overwrite: FieldUpdate::Keep, grants }
    }
}
