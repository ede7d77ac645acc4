//! Configuration management for the status monitor.
//!
//! Loads configuration from a TOML file. Every section and field is
//! optional; anything left out takes the default below.

use crate::utils::errors::{MonitorError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub feed: FeedConfig,

    #[serde(default)]
    pub log: LogConfig,

    #[serde(default)]
    pub display: DisplayConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Status port of the backup server (host:port)
    #[serde(default = "default_address")]
    pub address: String,

    /// Bytes requested per socket read
    #[serde(default = "default_read_buffer")]
    pub read_buffer: usize,

    /// First reconnect delay after the connection drops
    #[serde(default = "default_reconnect_initial_ms")]
    pub reconnect_initial_ms: u64,

    /// Ceiling for the doubling reconnect delay
    #[serde(default = "default_reconnect_max_ms")]
    pub reconnect_max_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Output format for each snapshot
    #[serde(default)]
    pub format: DisplayFormat,

    /// Newest backups listed per client in the text view
    #[serde(default = "default_max_backups")]
    pub max_backups: usize,
}

// Default values
fn default_address() -> String {
    "127.0.0.1:4972".to_string()
}

fn default_read_buffer() -> usize {
    4096
}

fn default_reconnect_initial_ms() -> u64 {
    1000
}

fn default_reconnect_max_ms() -> u64 {
    30000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_backups() -> usize {
    5
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
            read_buffer: default_read_buffer(),
            reconnect_initial_ms: default_reconnect_initial_ms(),
            reconnect_max_ms: default_reconnect_max_ms(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            format: DisplayFormat::default(),
            max_backups: default_max_backups(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the transport cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.feed.address.trim().is_empty() {
            return Err(MonitorError::Config("feed.address is empty".to_string()));
        }
        if self.feed.read_buffer == 0 {
            return Err(MonitorError::Config("feed.read_buffer must be positive".to_string()));
        }
        if self.feed.reconnect_initial_ms == 0 || self.feed.reconnect_initial_ms > self.feed.reconnect_max_ms {
            return Err(MonitorError::Config(format!(
                "feed.reconnect_initial_ms ({}) must be between 1 and reconnect_max_ms ({})",
                self.feed.reconnect_initial_ms, self.feed.reconnect_max_ms
            )));
        }
        Ok(())
    }
}
