//! Server configuration.
//!
//! Sources, highest precedence first: environment, TOML file, defaults.
//!
//! ```toml
//! # ~/.folio/config.toml
//! [server]
//! bind = "127.0.0.1:4000"
//! default_owner = "octocat"
//!
//! [github]
//! api_url = "https://api.github.com"
//! token = "ghp_..."
//!
//! [cache]
//! sweep_interval_secs = 600
//! ```

use anyhow::Context;
use folio_core::config::ClientConfig;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default listen address
pub const DEFAULT_BIND: &str = "127.0.0.1:4000";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    /// Listen address
    pub bind: String,
    /// Owner served by the owner-less routes
    pub default_owner: Option<String>,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
            default_owner: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheSection {
    /// Period of the expired-entry sweep
    pub sweep_interval_secs: u64,
}

impl Default for CacheSection {
    fn default() -> Self {
        Self {
            sweep_interval_secs: folio_core::cache::SWEEP_INTERVAL.as_secs(),
        }
    }
}

/// Server configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerSection,
    pub github: ClientConfig,
    pub cache: CacheSection,
    /// File the configuration was read from, if any
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from the process environment and config file.
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("FOLIO_CONFIG")
            .map(PathBuf::from)
            .ok()
            .or_else(default_config_path);

        let mut config = match path {
            Some(ref path) if path.exists() => Self::from_file(path)?,
            _ => Self::default(),
        };

        config.apply_env(|key| std::env::var(key).ok());
        config.github.validate()?;
        Ok(config)
    }

    /// Parse a TOML config file
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let mut config: Self = toml::from_str(&raw)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        config.config_path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Overlay environment variables read through `lookup`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(token) = lookup("GITHUB_TOKEN") {
            // Blank means anonymous
            self.github = std::mem::take(&mut self.github).with_token(token);
        }
        if let Some(url) = lookup("FOLIO_GITHUB_API_URL") {
            self.github.api_url = url;
        }
        if let Some(bind) = lookup("FOLIO_BIND") {
            self.server.bind = bind;
        }
        if let Some(owner) = lookup("FOLIO_OWNER").filter(|o| !o.trim().is_empty()) {
            self.server.default_owner = Some(owner.trim().to_string());
        }
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.cache.sweep_interval_secs.max(1))
    }
}

fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".folio").join("config.toml"))
}
