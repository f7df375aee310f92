//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
///
/// Constructed once at startup and passed by reference into the pipeline.
/// There is deliberately no fallback-to-default load path: a missing config
/// file (and with it the bot token) is a fatal startup error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Discord credentials and destination channel
    pub discord: DiscordConfig,

    /// Scrape target, keywords, and HTTP behavior
    #[serde(default)]
    pub watcher: WatcherConfig,

    /// Persisted state locations
    #[serde(default)]
    pub storage: StorageConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| AppError::config(format!("cannot read {}: {e}", path.display())))?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.discord.token.trim().is_empty() {
            return Err(AppError::validation("discord.token is empty"));
        }
        if self.discord.channel_id == 0 {
            return Err(AppError::validation("discord.channel_id must be set"));
        }
        if self.watcher.keywords.is_empty() {
            return Err(AppError::validation("watcher.keywords must not be empty"));
        }
        if self.watcher.keywords.iter().any(|k| k.trim().is_empty()) {
            return Err(AppError::validation("watcher.keywords contains an empty entry"));
        }
        if self.watcher.interval_hours == 0 {
            return Err(AppError::validation("watcher.interval_hours must be > 0"));
        }
        if self.watcher.timeout_secs == 0 {
            return Err(AppError::validation("watcher.timeout_secs must be > 0"));
        }
        url::Url::parse(&self.watcher.page_url)
            .map_err(|e| AppError::validation(format!("watcher.page_url is invalid: {e}")))?;
        url::Url::parse(&self.watcher.origin)
            .map_err(|e| AppError::validation(format!("watcher.origin is invalid: {e}")))?;
        Ok(())
    }
}

/// Discord credentials and destination.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscordConfig {
    /// Bot token (opaque secret, never interpreted)
    pub token: String,

    /// Destination channel ID for alerts
    pub channel_id: u64,
}

/// Scrape target and HTTP client behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatcherConfig {
    /// Listings page to scrape
    #[serde(default = "defaults::page_url")]
    pub page_url: String,

    /// Site origin prefixed to relative listing hrefs
    #[serde(default = "defaults::origin")]
    pub origin: String,

    /// Keywords to alert on (matched case-insensitively, whole word)
    #[serde(default)]
    pub keywords: Vec<String>,

    /// Hours between scrape cycles
    #[serde(default = "defaults::interval_hours")]
    pub interval_hours: u64,

    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            page_url: defaults::page_url(),
            origin: defaults::origin(),
            keywords: Vec::new(),
            interval_hours: defaults::interval_hours(),
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
        }
    }
}

/// Persisted state locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Path to the seen-listing JSON file
    #[serde(default = "defaults::seen_file")]
    pub seen_file: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            seen_file: defaults::seen_file(),
        }
    }
}

mod defaults {
    pub fn page_url() -> String {
        "https://www.humblebundle.com/bundles".into()
    }
    pub fn origin() -> String {
        "https://www.humblebundle.com".into()
    }
    pub fn interval_hours() -> u64 {
        6
    }
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; bundlewatch/0.1)".into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn seen_file() -> String {
        "data/seen_bundles.json".into()
    }
}
