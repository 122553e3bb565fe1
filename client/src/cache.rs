//! Cached guild state.
//!
//! The directory keeps one record per guild: owner, role table, member role
//! sets, and channels with their overwrite stores. Reads hand out clones;
//! permission resolution and position planning always work over a snapshot
//! and never hold a lock across a transport call.

use std::collections::HashMap;

use dashmap::DashMap;
use tracing::debug;

use alcove_model::{
    changed_role_permissions, resolve_channel_permissions, ChannelFlags, ChannelKind, ChannelSlot,
    GuildSnapshot, OverwriteHolder, OverwriteStore, OverwriteTarget, PermissionOverwrite,
    Permissions, PositionedEntity, Snowflake, SortingBucket,
};

use crate::transport::ChannelData;

/// A guild role as cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Role {
    pub id: Snowflake,
    pub name: String,
    /// Guild-level bitmask, before any channel overwrite.
    pub permissions: Permissions,
}

/// A guild member as cached. Only what resolution needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub id: Snowflake,
    pub role_ids: Vec<Snowflake>,
}

/// A cached channel.
///
/// Built from [`ChannelData`]; the overwrite store is rebuilt wholesale on
/// every snapshot, individual records are never patched in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Channel {
    pub id: Snowflake,
    pub guild_id: Snowflake,
    pub name: String,
    pub kind: ChannelKind,
    pub position: i32,
    pub category_id: Option<Snowflake>,
    pub topic: Option<String>,
    pub slowmode_delay: u32,
    pub rtc_region: Option<String>,
    pub bitrate: Option<u32>,
    pub user_limit: Option<u32>,
    pub nsfw: bool,
    pub flags: ChannelFlags,
    overwrites: OverwriteStore,
}

impl Channel {
    /// Materialize a channel from its wire snapshot.
    ///
    /// `guild_id` doubles as the everyone-role id when rebuilding the
    /// overwrite store.
    #[must_use]
    pub fn from_data(guild_id: Snowflake, data: &ChannelData) -> Self {
        Self {
            id: data.id,
            guild_id,
            name: data.name.clone(),
            kind: data.kind,
            position: data.position,
            category_id: data.parent_id,
            topic: data.topic.clone(),
            slowmode_delay: data.rate_limit_per_user,
            rtc_region: data.rtc_region.clone(),
            bitrate: data.bitrate,
            user_limit: data.user_limit,
            nsfw: data.nsfw,
            flags: ChannelFlags::from_bits_truncate(data.flags),
            overwrites: OverwriteStore::build(
                data.permission_overwrites.iter().copied(),
                guild_id,
            ),
        }
    }

    #[must_use]
    pub const fn is_category(&self) -> bool {
        matches!(self.kind, ChannelKind::Category)
    }

    /// The overwrite for one target, or an empty one if none is stored.
    #[must_use]
    pub fn overwrite_for(&self, target: OverwriteTarget) -> PermissionOverwrite {
        self.overwrites
            .lookup(target)
            .map(|record| record.overwrite())
            .unwrap_or_default()
    }

    /// All overwrites as `(target, overwrite)` pairs, in resolution order.
    #[must_use]
    pub fn overwrites(&self) -> Vec<(OverwriteTarget, PermissionOverwrite)> {
        self.overwrites
            .iter()
            .map(|record| {
                (OverwriteTarget { id: record.id, kind: record.kind }, record.overwrite())
            })
            .collect()
    }
}

impl PositionedEntity for Channel {
    fn entity_id(&self) -> Snowflake {
        self.id
    }

    fn position(&self) -> i32 {
        self.position
    }

    fn category_id(&self) -> Option<Snowflake> {
        self.category_id
    }

    fn sorting_bucket(&self) -> SortingBucket {
        self.kind.sorting_bucket()
    }
}

impl OverwriteHolder for Channel {
    fn overwrite_store(&self) -> &OverwriteStore {
        &self.overwrites
    }
}

/// One guild's cached state.
#[derive(Debug, Clone, Default)]
pub struct Guild {
    pub id: Snowflake,
    pub owner_id: Snowflake,
    pub roles: HashMap<Snowflake, Role>,
    pub members: HashMap<Snowflake, Member>,
    pub channels: HashMap<Snowflake, Channel>,
}

impl Guild {
    #[must_use]
    pub fn new(id: Snowflake, owner_id: Snowflake) -> Self {
        Self { id, owner_id, ..Self::default() }
    }

    #[must_use]
    pub fn channel(&self, channel_id: Snowflake) -> Option<&Channel> {
        self.channels.get(&channel_id)
    }

    #[must_use]
    pub fn role(&self, role_id: Snowflake) -> Option<&Role> {
        self.roles.get(&role_id)
    }

    #[must_use]
    pub fn member(&self, member_id: Snowflake) -> Option<&Member> {
        self.members.get(&member_id)
    }

    /// The role table reduced to bitmasks, copied for the resolver.
    #[must_use]
    pub fn snapshot(&self) -> GuildSnapshot {
        GuildSnapshot {
            id: self.id,
            owner_id: self.owner_id,
            roles: self
                .roles
                .values()
                .map(|role| (role.id, role.permissions))
                .collect(),
        }
    }

    /// Positioning view of every channel, for the move planner.
    #[must_use]
    pub fn channel_slots(&self) -> Vec<ChannelSlot> {
        self.channels.values().map(ChannelSlot::of).collect()
    }

    /// Effective permissions of a member inside a channel.
    ///
    /// A member absent from the cache resolves with no roles beyond
    /// everyone, matching how an uncached-but-present member behaves.
    #[must_use]
    pub fn permissions_for(&self, channel: &Channel, member_id: Snowflake) -> Permissions {
        let role_ids = self
            .members
            .get(&member_id)
            .map(|member| member.role_ids.as_slice())
            .unwrap_or_default();
        resolve_channel_permissions(&self.snapshot(), member_id, role_ids, &channel.overwrites)
    }

    /// Roles whose bitmask this channel's overwrites modify, with the
    /// overwrite applied. Fresh values; the cached roles stay untouched.
    #[must_use]
    pub fn changed_roles(&self, channel: &Channel) -> Vec<Role> {
        changed_role_permissions(&self.snapshot(), &channel.overwrites)
            .into_iter()
            .filter_map(|(role_id, permissions)| {
                let role = self.roles.get(&role_id)?;
                Some(Role { id: role_id, name: role.name.clone(), permissions })
            })
            .collect()
    }

    /// Whether a channel's overwrites match its category's exactly.
    ///
    /// A channel without a category, or whose category is not cached, is
    /// never synced; there is nothing to be synced with.
    #[must_use]
    pub fn permissions_synced(&self, channel: &Channel) -> bool {
        channel
            .category_id
            .and_then(|id| self.channels.get(&id))
            .is_some_and(|category| category.overwrites == channel.overwrites)
    }

    /// Insert or replace a channel from a wire snapshot.
    pub fn apply_channel(&mut self, data: &ChannelData) {
        let channel = Channel::from_data(self.id, data);
        self.channels.insert(channel.id, channel);
    }

    pub fn remove_channel(&mut self, channel_id: Snowflake) -> Option<Channel> {
        self.channels.remove(&channel_id)
    }
}

/// Concurrent map of every guild the client knows about.
///
/// Lookups clone the guild record, so callers operate on a consistent
/// point-in-time view even while gateway events keep mutating the cache.
#[derive(Debug, Default)]
pub struct GuildDirectory {
    guilds: DashMap<Snowflake, Guild>,
}

impl GuildDirectory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_guild(&self, guild: Guild) {
        debug!(guild_id = %guild.id, channels = guild.channels.len(), "caching guild");
        self.guilds.insert(guild.id, guild);
    }

    pub fn remove_guild(&self, guild_id: Snowflake) -> Option<Guild> {
        self.guilds.remove(&guild_id).map(|(_, guild)| guild)
    }

    /// Point-in-time clone of one guild.
    #[must_use]
    pub fn guild(&self, guild_id: Snowflake) -> Option<Guild> {
        self.guilds.get(&guild_id).map(|entry| entry.clone())
    }

    /// Point-in-time clone of one channel.
    #[must_use]
    pub fn channel(&self, guild_id: Snowflake, channel_id: Snowflake) -> Option<Channel> {
        self.guilds
            .get(&guild_id)
            .and_then(|guild| guild.channel(channel_id).cloned())
    }

    /// Apply a channel snapshot (create or update) to its guild.
    ///
    /// Snapshots for guilds the directory has never seen are dropped; a
    /// later guild sync will carry the channel anyway.
    pub fn apply_channel(&self, guild_id: Snowflake, data: &ChannelData) {
        if let Some(mut guild) = self.guilds.get_mut(&guild_id) {
            guild.apply_channel(data);
        } else {
            debug!(%guild_id, channel_id = %data.id, "dropping channel for unknown guild");
        }
    }

    pub fn remove_channel(&self, guild_id: Snowflake, channel_id: Snowflake) {
        if let Some(mut guild) = self.guilds.get_mut(&guild_id) {
            guild.remove_channel(channel_id);
        }
    }
}
