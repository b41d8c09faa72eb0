//! Core types used throughout the medianizer
//!
//! Feed identities, registry records and the readings feeds report.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unix timestamp in milliseconds
pub type Timestamp = i64;

/// Integer price in the feed's fixed-point base units
pub type Price = i128;

/// Opaque handle identifying a price feed provider
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeedId(String);

impl FeedId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FeedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FeedId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for FeedId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Registry record for a whitelisted feed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedEntry {
    /// Human readable label chosen by the operator
    pub name: String,
    /// Clock time at which the feed was registered
    pub registered_at: Timestamp,
}

impl FeedEntry {
    pub fn new(name: impl Into<String>, registered_at: Timestamp) -> Self {
        Self {
            name: name.into(),
            registered_at,
        }
    }
}

/// A feed's report at query time. Consumed immediately, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reading {
    pub ticker_name: String,
    pub timestamp: Timestamp,
    pub value: Price,
}

impl Reading {
    pub fn new(ticker_name: impl Into<String>, timestamp: Timestamp, value: Price) -> Self {
        Self {
            ticker_name: ticker_name.into(),
            timestamp,
            value,
        }
    }

    /// Age of the reading relative to `now`, in milliseconds.
    /// Readings stamped in the future have a negative age.
    pub fn age_ms(&self, now: Timestamp) -> i64 {
        now.saturating_sub(self.timestamp)
    }

    /// Whether the reading is older than `stale_after_ms` at `now`
    pub fn is_stale(&self, now: Timestamp, stale_after_ms: u64) -> bool {
        i128::from(self.age_ms(now)) > i128::from(stale_after_ms)
    }
}

/// How an aggregation treats a feed reporting a different ticker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TickerPolicy {
    /// Skip the feed for this round, like a transport failure
    #[default]
    Lenient,
    /// Abort the whole aggregation with `WrongTickerName`
    Strict,
}

/// How the registry fills the hole left by a removed feed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemovalPolicy {
    /// Remaining feeds keep their relative listing order
    #[default]
    PreserveOrder,
    /// The last feed moves into the removed slot
    SwapRemove,
}

impl fmt::Display for TickerPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TickerPolicy::Lenient => write!(f, "lenient"),
            TickerPolicy::Strict => write!(f, "strict"),
        }
    }
}

impl fmt::Display for RemovalPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemovalPolicy::PreserveOrder => write!(f, "preserve_order"),
            RemovalPolicy::SwapRemove => write!(f, "swap_remove"),
        }
    }
}
