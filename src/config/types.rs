//! Configuration sections

use serde::{Deserialize, Serialize};

use crate::types::{FeedId, RemovalPolicy, TickerPolicy};

/// Six hours
pub const DEFAULT_STALE_AFTER_MS: u64 = 6 * 60 * 60 * 1000;

/// Settings read on every aggregation and changed by the operator at runtime
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleConfig {
    /// Feeds must report this ticker to take part in the median
    pub ticker_name: String,
    /// Minimum valid readings for `value()` to answer
    pub minimum_feeds_available: usize,
    /// Readings older than this are ignored
    pub stale_after_ms: u64,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            ticker_name: String::new(),
            minimum_feeds_available: 1,
            stale_after_ms: DEFAULT_STALE_AFTER_MS,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegistryConfig {
    /// Whitelist capacity
    pub max_feeds: usize,
    pub removal_policy: RemovalPolicy,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AggregationConfig {
    pub ticker_policy: TickerPolicy,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReaderConfig {
    /// Per-request HTTP timeout
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HostConfig {
    /// Seconds between two published values
    pub poll_interval_secs: u64,
    /// Emit JSON log lines
    pub log_json: bool,
    /// Where the registry snapshot is kept across restarts
    pub state_path: String,
    /// Feeds whitelisted at start-up
    #[serde(default)]
    pub feeds: Vec<FeedConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    pub id: FeedId,
    pub name: String,
}
