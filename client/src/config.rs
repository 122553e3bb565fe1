//! Client configuration.
//!
//! Loads configuration from environment variables.

use anyhow::{Context, Result};
use std::env;
use std::time::Duration;

/// HTTP client configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API base URL (e.g., "https://chat.example.com/api/v1")
    pub base_url: String,

    /// Bearer token used for every request
    pub token: String,

    /// User-Agent header value
    pub user_agent: String,

    /// Per-request timeout (default: 30s)
    pub timeout: Duration,
}

impl ClientConfig {
    /// Build a configuration with defaults for everything but the endpoint
    /// and credentials.
    #[must_use]
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: token.into(),
            user_agent: default_user_agent(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            base_url: env::var("ALCOVE_API_URL").context("ALCOVE_API_URL must be set")?,
            token: env::var("ALCOVE_TOKEN").context("ALCOVE_TOKEN must be set")?,
            user_agent: env::var("ALCOVE_USER_AGENT").unwrap_or_else(|_| default_user_agent()),
            timeout: env::var("ALCOVE_HTTP_TIMEOUT")
                .ok()
                .and_then(|v| v.parse().ok())
                .map_or(Duration::from_secs(30), Duration::from_secs),
        })
    }
}

fn default_user_agent() -> String {
    format!("alcove-client/{}", env!("CARGO_PKG_VERSION"))
}
