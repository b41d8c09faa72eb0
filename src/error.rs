//! Error types
//!
//! `OracleError` is what callers of the public surface see. `FetchError` is a
//! per-feed fault: the aggregator logs it and moves on to the next feed.

use thiserror::Error;

use crate::types::FeedId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OracleError {
    #[error("feed {0} already exists")]
    AlreadyExists(FeedId),

    #[error("feed {0} does not exist")]
    NotFound(FeedId),

    #[error("maximum amount of feeds reached ({max})")]
    CapacityExceeded { max: usize },

    #[error("not enough feeds available: {available} online, {required} required")]
    NotEnoughFeedsAvailable { available: usize, required: usize },

    #[error("feed {feed} reports ticker {found:?}, expected {expected:?}")]
    WrongTickerName {
        feed: FeedId,
        expected: String,
        found: String,
    },
}

impl OracleError {
    /// Stable error code for hosts that surface errors as strings
    pub fn code(&self) -> &'static str {
        match self {
            OracleError::AlreadyExists(_) => "FEED_ALREADY_EXISTS",
            OracleError::NotFound(_) => "FEED_NOT_EXISTS",
            OracleError::CapacityExceeded { .. } => "MAXIMUM_AMOUNT_OF_FEEDS_REACHED",
            OracleError::NotEnoughFeedsAvailable { .. } => "NOT_ENOUGH_FEEDS_AVAILABLE",
            OracleError::WrongTickerName { .. } => "WRONG_TICKER_NAME",
        }
    }
}

pub type OracleResult<T> = std::result::Result<T, OracleError>;

/// Why a single feed could not be read this round
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("unexpected status {0}")]
    Status(u16),

    #[error("malformed reading: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            FetchError::Malformed(e.to_string())
        } else if let Some(status) = e.status() {
            FetchError::Status(status.as_u16())
        } else {
            FetchError::Transport(e.to_string())
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(e: serde_json::Error) -> Self {
        FetchError::Malformed(e.to_string())
    }
}
