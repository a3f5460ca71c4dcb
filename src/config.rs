use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::feed::FeedSource;

pub const DEFAULT_FEED_URL: &str = "http://127.0.0.1:8000/sorted_standings.csv";
pub const DEFAULT_FEED_PATH: &str = "sorted_standings.csv";
pub const DEFAULT_POLL_MS: u64 = 5000;
pub const DEFAULT_TIMEOUT_SECS: u64 = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub source: FeedSource,
    pub poll_interval: Duration,
    pub request_timeout: Duration,
    pub log_file: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup. Unparseable values
    /// fall back to their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|val| !val.trim().is_empty());

        let source = match non_empty("FEED_SOURCE")
            .unwrap_or_else(|| "http".to_string())
            .trim()
            .to_lowercase()
            .as_str()
        {
            "file" => FeedSource::File {
                path: PathBuf::from(
                    non_empty("FEED_PATH").unwrap_or_else(|| DEFAULT_FEED_PATH.to_string()),
                ),
            },
            "demo" => FeedSource::Demo,
            _ => FeedSource::Http {
                url: non_empty("FEED_URL").unwrap_or_else(|| DEFAULT_FEED_URL.to_string()),
            },
        };

        let poll_ms = non_empty("FEED_POLL_MS")
            .and_then(|val| val.trim().parse::<u64>().ok())
            .unwrap_or(DEFAULT_POLL_MS)
            .max(500);
        let timeout_secs = non_empty("FEED_TIMEOUT_SECS")
            .and_then(|val| val.trim().parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS)
            .clamp(1, 30);

        Self {
            source,
            poll_interval: Duration::from_millis(poll_ms),
            request_timeout: Duration::from_secs(timeout_secs),
            log_file: non_empty("STANDINGS_LOG_FILE").map(PathBuf::from),
        }
    }
}
