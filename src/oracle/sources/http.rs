//! HTTP feed reader
//!
//! Treats each feed identity as the URL of the feed's peek endpoint, which
//! answers with `{"ticker_name": .., "timestamp": .., "value": ..}`.

use async_trait::async_trait;
use std::time::Duration;
use tracing::trace;

use crate::error::FetchError;
use crate::oracle::sources::FeedReader;
use crate::types::{FeedId, Reading};

#[derive(Debug, Clone)]
pub struct HttpFeedReader {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpFeedReader {
    pub fn new(timeout_ms: u64) -> Result<Self, FetchError> {
        let timeout = Duration::from_millis(timeout_ms);
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("medianizer/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client, timeout })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[async_trait]
impl FeedReader for HttpFeedReader {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn fetch(&self, feed: &FeedId) -> Result<Reading, FetchError> {
        let response = self.client.get(feed.as_str()).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = response.bytes().await?;
        let reading: Reading = serde_json::from_slice(&body)?;

        trace!(
            feed = %feed,
            ticker = %reading.ticker_name,
            timestamp = reading.timestamp,
            "Feed peeked"
        );
        Ok(reading)
    }
}
