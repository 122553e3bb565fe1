//! Permission resolution logic.
//!
//! Computes the effective permission set a member holds inside a channel,
//! layering guild roles and channel overwrites in a fixed precedence order.

use std::collections::HashMap;

use crate::snowflake::Snowflake;

use super::flags::Permissions;
use super::store::OverwriteStore;

/// Immutable guild state consumed by the resolver.
///
/// Built copy-on-read from the cache; resolution never mutates cached role
/// state. The everyone role is the entry whose id equals the guild id.
#[derive(Debug, Clone, Default)]
pub struct GuildSnapshot {
    pub id: Snowflake,
    pub owner_id: Snowflake,
    /// Role table: role id to guild-level bitmask.
    pub roles: HashMap<Snowflake, Permissions>,
}

impl GuildSnapshot {
    /// The everyone role's guild-level bitmask, or empty if the role table
    /// has no entry for it.
    #[must_use]
    pub fn everyone_permissions(&self) -> Permissions {
        self.roles.get(&self.id).copied().unwrap_or_default()
    }

    #[must_use]
    pub fn role_permissions(&self, role_id: Snowflake) -> Option<Permissions> {
        self.roles.get(&role_id).copied()
    }
}

/// Compute the effective permissions of a member inside one channel.
///
/// Resolution order:
/// 1. Guild owner has all permissions, overwrites are never consulted
/// 2. Start with the everyone role's permissions
/// 3. OR in the bitmask of every role the member holds
/// 4. Administrator bypasses all channel overwrites
/// 5. Apply the everyone overwrite (index 0 of the store) if present
/// 6. Apply all matching role overwrites as one combined deny/allow pass
/// 7. Apply the member's own overwrite, the most specific layer
/// 8. Clear message-dependent bits without send-messages, and every
///    channel-scoped bit without read-messages
///
/// Each overwrite layer applies deny before allow, so an allow wins over a
/// deny within the same layer. Total: stale role ids and absent overwrites
/// are skipped, never errors.
#[must_use]
pub fn resolve_channel_permissions(
    guild: &GuildSnapshot,
    member_id: Snowflake,
    member_role_ids: &[Snowflake],
    overwrites: &OverwriteStore,
) -> Permissions {
    if guild.owner_id == member_id {
        return Permissions::all();
    }

    let mut base = guild.everyone_permissions();

    for role_id in member_role_ids {
        if let Some(role_perms) = guild.role_permissions(*role_id) {
            base |= role_perms;
        }
    }

    if base.has(Permissions::ADMINISTRATOR) {
        return Permissions::all();
    }

    // The everyone overwrite is kept at index 0 by the store and applies
    // before any targeted overwrite.
    let records = overwrites.records();
    let remaining = match records.first() {
        Some(first) if first.is_role() && first.id == guild.id => {
            base = base.apply_overwrite(first.allow, first.deny);
            &records[1..]
        }
        _ => records,
    };

    // Role overwrites are unioned into a single deny/allow pass, so an
    // allow from any held role beats a deny from another.
    let mut allows = Permissions::empty();
    let mut denies = Permissions::empty();
    for record in remaining {
        if record.is_role() && member_role_ids.contains(&record.id) {
            allows |= record.allow;
            denies |= record.deny;
        }
    }
    base = base.apply_overwrite(allows, denies);

    for record in remaining {
        if record.is_member() && record.id == member_id {
            base = base.apply_overwrite(record.allow, record.deny);
            break;
        }
    }

    if !base.has(Permissions::SEND_MESSAGES) {
        base.remove(Permissions::MESSAGE_DEPENDENT);
    }

    if !base.has(Permissions::READ_MESSAGES) {
        base.remove(Permissions::ALL_CHANNEL);
    }

    base
}

/// Derive per-channel role bitmasks with the channel's role overwrites
/// applied.
///
/// Returns fresh `(role id, permissions)` values; cached roles are left
/// untouched. Role overwrites pointing at unknown roles are skipped.
#[must_use]
pub fn changed_role_permissions(
    guild: &GuildSnapshot,
    overwrites: &OverwriteStore,
) -> Vec<(Snowflake, Permissions)> {
    overwrites
        .iter()
        .filter(|record| record.is_role())
        .filter_map(|record| {
            let role_perms = guild.role_permissions(record.id)?;
            Some((record.id, role_perms.apply_overwrite(record.allow, record.deny)))
        })
        .collect()
}
