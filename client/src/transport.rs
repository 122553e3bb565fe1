//! HTTP transport.
//!
//! Every mutation the client performs funnels through the [`Transport`]
//! trait, so the planning and cache layers can be tested against a recording
//! fake. [`HttpTransport`] is the reqwest-backed implementation used in
//! production.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

use alcove_model::{ChannelKind, ChannelPositionUpdate, OverwriteRecord, Snowflake};

use crate::config::ClientConfig;

/// Header carrying the human-readable reason recorded in the audit log.
pub const AUDIT_REASON_HEADER: &str = "X-Audit-Log-Reason";

/// A channel as the server describes it.
///
/// This is the raw wire shape; the cache turns it into a [`crate::cache::Channel`]
/// with a rebuilt overwrite store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelData {
    pub id: Snowflake,
    #[serde(default)]
    pub guild_id: Option<Snowflake>,
    #[serde(rename = "type")]
    pub kind: ChannelKind,
    pub name: String,
    #[serde(default)]
    pub position: i32,
    #[serde(default)]
    pub parent_id: Option<Snowflake>,
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub rate_limit_per_user: u32,
    #[serde(default)]
    pub rtc_region: Option<String>,
    #[serde(default)]
    pub bitrate: Option<u32>,
    #[serde(default)]
    pub user_limit: Option<u32>,
    #[serde(default)]
    pub nsfw: bool,
    #[serde(default)]
    pub flags: u64,
    #[serde(default)]
    pub permission_overwrites: Vec<OverwriteRecord>,
}

/// Why a transport call failed.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request was not authorized")]
    Unauthorized,

    #[error("missing permissions for the request")]
    Forbidden,

    #[error("resource not found")]
    NotFound,

    #[error("rate limited; retry after {retry_after:.2}s")]
    RateLimited { retry_after: f64 },

    #[error("server rejected the request ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
}

/// The server operations the channel mutator needs.
///
/// Implementations must not retry on their own; retry policy belongs to the
/// caller, which knows whether the mutation is idempotent.
#[async_trait]
pub trait Transport: Send + Sync {
    /// `PATCH /channels/{id}` with a sparse diff. Returns the updated channel.
    async fn edit_channel(
        &self,
        channel_id: Snowflake,
        diff: Map<String, Value>,
        reason: Option<&str>,
    ) -> Result<ChannelData, TransportError>;

    /// `PATCH /guilds/{id}/channels` with absolute positions for every
    /// channel whose slot changed.
    async fn bulk_update_positions(
        &self,
        guild_id: Snowflake,
        updates: &[ChannelPositionUpdate],
        reason: Option<&str>,
    ) -> Result<(), TransportError>;

    /// `PUT /channels/{id}/permissions/{target}` replacing one overwrite.
    async fn set_channel_overwrite(
        &self,
        channel_id: Snowflake,
        record: OverwriteRecord,
        reason: Option<&str>,
    ) -> Result<(), TransportError>;

    /// `DELETE /channels/{id}/permissions/{target}`.
    async fn delete_channel_overwrite(
        &self,
        channel_id: Snowflake,
        target_id: Snowflake,
        reason: Option<&str>,
    ) -> Result<(), TransportError>;

    /// `DELETE /channels/{id}`.
    async fn delete_channel(
        &self,
        channel_id: Snowflake,
        reason: Option<&str>,
    ) -> Result<(), TransportError>;

    /// `POST /guilds/{id}/channels`. Returns the created channel.
    async fn create_channel(
        &self,
        guild_id: Snowflake,
        payload: Map<String, Value>,
        reason: Option<&str>,
    ) -> Result<ChannelData, TransportError>;
}

/// Reqwest-backed [`Transport`].
pub struct HttpTransport {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl HttpTransport {
    /// Build a transport from configuration. Fails only if the underlying
    /// HTTP client cannot be constructed.
    pub fn new(config: &ClientConfig) -> Result<Self, TransportError> {
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
        })
    }

    fn request(
        &self,
        method: reqwest::Method,
        path: &str,
        reason: Option<&str>,
    ) -> reqwest::RequestBuilder {
        let mut builder = self
            .http
            .request(method, format!("{}/{path}", self.base_url))
            .bearer_auth(&self.token);
        if let Some(reason) = reason {
            builder = builder.header(AUDIT_REASON_HEADER, reason);
        }
        builder
    }

    /// Map non-success statuses onto the error taxonomy.
    async fn check(response: reqwest::Response) -> Result<reqwest::Response, TransportError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        Err(match status {
            StatusCode::UNAUTHORIZED => TransportError::Unauthorized,
            StatusCode::FORBIDDEN => TransportError::Forbidden,
            StatusCode::NOT_FOUND => TransportError::NotFound,
            StatusCode::TOO_MANY_REQUESTS => {
                let retry_after = response
                    .headers()
                    .get(reqwest::header::RETRY_AFTER)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(0.0);
                TransportError::RateLimited { retry_after }
            }
            _ => {
                let message = response.text().await.unwrap_or_default();
                TransportError::Api { status: status.as_u16(), message }
            }
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn edit_channel(
        &self,
        channel_id: Snowflake,
        diff: Map<String, Value>,
        reason: Option<&str>,
    ) -> Result<ChannelData, TransportError> {
        debug!(%channel_id, fields = diff.len(), "editing channel");
        let response = self
            .request(reqwest::Method::PATCH, &format!("channels/{channel_id}"), reason)
            .json(&diff)
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    async fn bulk_update_positions(
        &self,
        guild_id: Snowflake,
        updates: &[ChannelPositionUpdate],
        reason: Option<&str>,
    ) -> Result<(), TransportError> {
        debug!(%guild_id, channels = updates.len(), "updating channel positions");
        let response = self
            .request(reqwest::Method::PATCH, &format!("guilds/{guild_id}/channels"), reason)
            .json(updates)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn set_channel_overwrite(
        &self,
        channel_id: Snowflake,
        record: OverwriteRecord,
        reason: Option<&str>,
    ) -> Result<(), TransportError> {
        debug!(%channel_id, target = %record.id, "replacing channel overwrite");
        let response = self
            .request(
                reqwest::Method::PUT,
                &format!("channels/{channel_id}/permissions/{}", record.id),
                reason,
            )
            .json(&record)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn delete_channel_overwrite(
        &self,
        channel_id: Snowflake,
        target_id: Snowflake,
        reason: Option<&str>,
    ) -> Result<(), TransportError> {
        debug!(%channel_id, target = %target_id, "deleting channel overwrite");
        let response = self
            .request(
                reqwest::Method::DELETE,
                &format!("channels/{channel_id}/permissions/{target_id}"),
                reason,
            )
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn delete_channel(
        &self,
        channel_id: Snowflake,
        reason: Option<&str>,
    ) -> Result<(), TransportError> {
        debug!(%channel_id, "deleting channel");
        let response = self
            .request(reqwest::Method::DELETE, &format!("channels/{channel_id}"), reason)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn create_channel(
        &self,
        guild_id: Snowflake,
        payload: Map<String, Value>,
        reason: Option<&str>,
    ) -> Result<ChannelData, TransportError> {
        debug!(%guild_id, "creating channel");
        let response = self
            .request(reqwest::Method::POST, &format!("guilds/{guild_id}/channels"), reason)
            .json(&payload)
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_data_deserializes_minimal_payload() {
        let data: ChannelData = serde_json::from_str(
            r#"{"id":"42","type":0,"name":"general"}"#,
        )
        .unwrap();
        assert_eq!(data.id, Snowflake(42));
        assert_eq!(data.kind, ChannelKind::Text);
        assert_eq!(data.position, 0);
        assert!(data.parent_id.is_none());
        assert!(data.permission_overwrites.is_empty());
    }

    #[test]
    fn test_channel_data_deserializes_full_payload() {
        let data: ChannelData = serde_json::from_str(
            r#"{
                "id": "42",
                "guild_id": "7",
                "type": 2,
                "name": "lounge",
                "position": 3,
                "parent_id": "9",
                "bitrate": 64000,
                "user_limit": 10,
                "rtc_region": "eu-west",
                "permission_overwrites": [
                    {"id": "7", "type": 0, "allow": "1024", "deny": "0"}
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(data.guild_id, Some(Snowflake(7)));
        assert_eq!(data.kind, ChannelKind::Voice);
        assert_eq!(data.parent_id, Some(Snowflake(9)));
        assert_eq!(data.bitrate, Some(64000));
        assert_eq!(data.permission_overwrites.len(), 1);
    }
}
