//! Client configuration.
//!
//! Defines how the remote client reaches the upstream API.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{Error, Result};

/// Default upstream API root
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Remote client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the upstream API (default: https://api.github.com)
    pub api_url: String,

    /// Optional bearer credential for elevated rate limits
    pub token: Option<String>,

    /// User-Agent header sent with every request
    pub user_agent: String,

    /// Retries after a stats endpoint answers "pending" (default: 3)
    pub pending_retries: u32,

    /// Fixed delay before each pending retry in milliseconds (default: 1000)
    pub pending_retry_delay_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            token: None,
            user_agent: format!("folio/{}", env!("CARGO_PKG_VERSION")),
            pending_retries: 3,
            pending_retry_delay_ms: 1000,
        }
    }
}

impl ClientConfig {
    /// Set the upstream API root
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    /// Set the bearer credential. Blank values leave the client anonymous.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        let token = token.into();
        self.token = if token.trim().is_empty() {
            None
        } else {
            Some(token.trim().to_string())
        };
        self
    }

    /// Set the pending-stats retry policy
    pub fn with_pending_retry(mut self, retries: u32, delay: Duration) -> Self {
        self.pending_retries = retries;
        self.pending_retry_delay_ms = delay.as_millis() as u64;
        self
    }

    /// Delay before each pending retry
    pub fn pending_retry_delay(&self) -> Duration {
        Duration::from_millis(self.pending_retry_delay_ms)
    }

    /// Credential to send upstream. Blank values count as unset.
    pub fn bearer_token(&self) -> Option<&str> {
        self.token
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty())
    }

    /// API root without a trailing slash
    pub fn base_url(&self) -> &str {
        self.api_url.trim_end_matches('/')
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if !(self.api_url.starts_with("http://") || self.api_url.starts_with("https://")) {
            return Err(Error::Config(format!(
                "api_url must be an http(s) URL, got {:?}",
                self.api_url
            )));
        }

        if self.user_agent.trim().is_empty() {
            return Err(Error::Config("user_agent must not be empty".into()));
        }

        if self.pending_retry_delay_ms > 60_000 {
            return Err(Error::Config(
                "pending_retry_delay_ms must not exceed one minute".into(),
            ));
        }

        Ok(())
    }
}
