//! Configuration types.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;

/// Default feed polled when `RSS_FEED` is unset.
pub const DEFAULT_FEED_URL: &str = "https://old.reddit.com/r/Watchexchange/new/.rss";

const DEFAULT_FEED_POLL_SECS: u64 = 60;
const DEFAULT_COMMAND_POLL_SECS: u64 = 5;
const DEFAULT_DATA_DIR: &str = "./data";

/// Relay configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Feed endpoint polled for new items.
    pub feed_url: String,
    /// Base tick: how often inbound commands are polled.
    pub command_poll_interval: Duration,
    /// Minimum elapsed time between feed polls.
    pub feed_poll_interval: Duration,
    /// Directory holding the persisted ledger and registry documents.
    pub data_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            feed_url: DEFAULT_FEED_URL.to_string(),
            command_poll_interval: Duration::from_secs(DEFAULT_COMMAND_POLL_SECS),
            feed_poll_interval: Duration::from_secs(DEFAULT_FEED_POLL_SECS),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
        }
    }
}

impl Config {
    /// Build a config from environment variables, validating every value.
    pub fn from_env() -> Result<Self, ConfigError> {
        let feed_url = non_empty(
            "RSS_FEED",
            std::env::var("RSS_FEED").unwrap_or_else(|_| DEFAULT_FEED_URL.to_string()),
        )?;
        let feed_poll_interval = positive_secs(
            "CHECK_INTERVAL",
            std::env::var("CHECK_INTERVAL").ok(),
            DEFAULT_FEED_POLL_SECS,
        )?;
        let command_poll_interval = positive_secs(
            "COMMAND_POLL_INTERVAL",
            std::env::var("COMMAND_POLL_INTERVAL").ok(),
            DEFAULT_COMMAND_POLL_SECS,
        )?;
        let data_dir = PathBuf::from(
            std::env::var("DATA_DIR").unwrap_or_else(|_| DEFAULT_DATA_DIR.to_string()),
        );

        Ok(Self {
            feed_url,
            command_poll_interval,
            feed_poll_interval,
            data_dir,
        })
    }
}

fn non_empty(key: &str, value: String) -> Result<String, ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: "must not be empty".to_string(),
        });
    }
    Ok(value)
}

fn positive_secs(key: &str, raw: Option<String>, default: u64) -> Result<Duration, ConfigError> {
    let secs = match raw {
        Some(raw) => raw.trim().parse::<u64>().map_err(|_| ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("expected a positive integer, got {raw:?}"),
        })?,
        None => default,
    };
    if secs == 0 {
        return Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: "must be positive".to_string(),
        });
    }
    Ok(Duration::from_secs(secs))
}
