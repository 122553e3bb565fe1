//! Channel mutation against the server.
//!
//! Validates and plans every mutation locally over cached state, then issues
//! the minimal set of transport calls. Nothing here writes to the cache;
//! confirmed state flows back in through channel snapshots.

use serde_json::{json, Map, Value};
use tracing::instrument;

use alcove_model::{
    plan_absolute_move, plan_move, ChannelSlot, FieldUpdate, OverwriteHolder, OverwriteRecord,
    OverwriteTarget, PlacementRequest, Snowflake,
};

use crate::cache::{Channel, Guild};
use crate::error::ClientError;
use crate::transport::{ChannelData, Transport};

use super::edit::{ChannelEdit, OverwriteEdit};

/// Executes channel mutations through a [`Transport`].
pub struct ChannelMutator<'a, T: Transport + ?Sized> {
    transport: &'a T,
}

impl<'a, T: Transport + ?Sized> ChannelMutator<'a, T> {
    pub const fn new(transport: &'a T) -> Self {
        Self { transport }
    }

    /// Apply a sparse edit to a channel.
    ///
    /// A position change renumbers the channel's siblings through a bulk
    /// position update before the remaining fields go out as one PATCH; any
    /// category change and permission sync ride along with whichever call
    /// happens. Returns the server's channel snapshot when a PATCH was
    /// issued, `None` when the edit needed no PATCH.
    #[instrument(skip(self, guild, edit), fields(channel_id = %channel.id))]
    pub async fn edit(
        &self,
        guild: &Guild,
        channel: &Channel,
        edit: ChannelEdit,
        reason: Option<&str>,
    ) -> Result<Option<ChannelData>, ClientError> {
        let mut diff = Map::new();

        if let Some(position) = edit.position {
            let updates = plan_absolute_move(
                ChannelSlot::of(channel),
                &guild.channel_slots(),
                position,
                edit.category,
                edit.sync_permissions,
            )?;
            self.transport
                .bulk_update_positions(guild.id, &updates, reason)
                .await?;
        } else {
            match edit.category {
                FieldUpdate::Set(category_id) => {
                    if edit.sync_permissions {
                        let category = guild.channel(category_id).ok_or_else(|| {
                            ClientError::UnresolvedReference(format!(
                                "category {category_id} is not in the cache"
                            ))
                        })?;
                        diff.insert(
                            "permission_overwrites".into(),
                            Value::Array(category.overwrite_store().as_wire_payload()),
                        );
                    }
                    diff.insert("parent_id".into(), json!(category_id));
                }
                FieldUpdate::Clear => {
                    diff.insert("parent_id".into(), Value::Null);
                }
                FieldUpdate::Keep => {
                    // Re-sync against the current category.
                    if edit.sync_permissions {
                        if let Some(category) =
                            channel.category_id.and_then(|id| guild.channel(id))
                        {
                            diff.insert(
                                "permission_overwrites".into(),
                                Value::Array(category.overwrite_store().as_wire_payload()),
                            );
                        }
                    }
                }
            }
        }

        if let Some(name) = edit.name {
            diff.insert("name".into(), json!(name));
        }
        match edit.topic {
            FieldUpdate::Keep => {}
            FieldUpdate::Clear => {
                diff.insert("topic".into(), Value::Null);
            }
            FieldUpdate::Set(topic) => {
                diff.insert("topic".into(), json!(topic));
            }
        }
        if let Some(delay) = edit.slowmode_delay {
            diff.insert("rate_limit_per_user".into(), json!(delay));
        }
        match edit.rtc_region {
            FieldUpdate::Keep => {}
            FieldUpdate::Clear => {
                diff.insert("rtc_region".into(), Value::Null);
            }
            FieldUpdate::Set(region) => {
                diff.insert("rtc_region".into(), json!(region));
            }
        }
        if let Some(bitrate) = edit.bitrate {
            diff.insert("bitrate".into(), json!(bitrate));
        }
        if let Some(limit) = edit.user_limit {
            diff.insert("user_limit".into(), json!(limit));
        }
        if let Some(nsfw) = edit.nsfw {
            diff.insert("nsfw".into(), json!(nsfw));
        }
        if let Some(kind) = edit.kind {
            diff.insert("type".into(), json!(u8::from(kind)));
        }
        if let Some(flags) = edit.flags {
            diff.insert("flags".into(), json!(flags.bits()));
        }
        if let Some(overwrites) = edit.overwrites {
            let payload = overwrites
                .into_iter()
                .map(|(target, overwrite)| {
                    let (allow, deny) = overwrite.pair();
                    OverwriteRecord::new(target, allow, deny)
                })
                .collect::<Vec<_>>();
            diff.insert(
                "permission_overwrites".into(),
                serde_json::to_value(payload).map_err(|e| {
                    ClientError::InvalidRequest(format!("unserializable overwrites: {e}"))
                })?,
            );
        }

        if diff.is_empty() {
            return Ok(None);
        }
        let data = self.transport.edit_channel(channel.id, diff, reason).await?;
        Ok(Some(data))
    }

    /// Move a channel relative to its siblings.
    #[instrument(skip(self, guild, request), fields(channel_id = %channel.id))]
    pub async fn move_channel(
        &self,
        guild: &Guild,
        channel: &Channel,
        request: &PlacementRequest,
        reason: Option<&str>,
    ) -> Result<(), ClientError> {
        let updates = plan_move(ChannelSlot::of(channel), &guild.channel_slots(), request)?;
        self.transport
            .bulk_update_positions(guild.id, &updates, reason)
            .await?;
        Ok(())
    }

    /// Replace, adjust, or delete one target's overwrite on a channel.
    #[instrument(skip(self, channel, edit), fields(channel_id = %channel.id, target_id = %target.id))]
    pub async fn set_permissions(
        &self,
        channel: &Channel,
        target: OverwriteTarget,
        edit: OverwriteEdit,
        reason: Option<&str>,
    ) -> Result<(), ClientError> {
        if !edit.overwrite.is_keep() && !edit.grants.is_empty() {
            return Err(ClientError::InvalidRequest(
                "cannot mix a whole overwrite with per-bit adjustments".into(),
            ));
        }

        match edit.overwrite {
            FieldUpdate::Clear => {
                self.transport
                    .delete_channel_overwrite(channel.id, target.id, reason)
                    .await?;
            }
            FieldUpdate::Set(overwrite) => {
                let (allow, deny) = overwrite.pair();
                self.transport
                    .set_channel_overwrite(
                        channel.id,
                        OverwriteRecord::new(target, allow, deny),
                        reason,
                    )
                    .await?;
            }
            FieldUpdate::Keep => {
                if edit.grants.is_empty() {
                    return Err(ClientError::InvalidRequest(
                        "no overwrite or adjustments were given".into(),
                    ));
                }
                // Adjust on top of the cached overwrite so untouched bits
                // keep their current state.
                let mut overwrite = channel.overwrite_for(target);
                for (bits, state) in &edit.grants {
                    overwrite.update(*bits, *state);
                }
                let (allow, deny) = overwrite.pair();
                self.transport
                    .set_channel_overwrite(
                        channel.id,
                        OverwriteRecord::new(target, allow, deny),
                        reason,
                    )
                    .await?;
            }
        }
        Ok(())
    }

    /// Delete a channel.
    #[instrument(skip(self))]
    pub async fn delete(
        &self,
        channel_id: Snowflake,
        reason: Option<&str>,
    ) -> Result<(), ClientError> {
        self.transport.delete_channel(channel_id, reason).await?;
        Ok(())
    }

    /// Create a copy of a channel in the same guild.
    ///
    /// The copy carries the source's kind, category, and full overwrite
    /// list; position is left to the server, which appends it to the end of
    /// its bucket.
    #[instrument(skip(self, channel), fields(channel_id = %channel.id))]
    pub async fn clone_channel(
        &self,
        channel: &Channel,
        name: Option<String>,
        reason: Option<&str>,
    ) -> Result<ChannelData, ClientError> {
        let mut payload = Map::new();
        payload.insert(
            "name".into(),
            json!(name.unwrap_or_else(|| channel.name.clone())),
        );
        payload.insert("type".into(), json!(u8::from(channel.kind)));
        payload.insert(
            "permission_overwrites".into(),
            Value::Array(channel.overwrite_store().as_wire_payload()),
        );
        if let Some(category_id) = channel.category_id {
            payload.insert("parent_id".into(), json!(category_id));
        }

        let data = self
            .transport
            .create_channel(channel.guild_id, payload, reason)
            .await?;
        Ok(data)
    }
}
