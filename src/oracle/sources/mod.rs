//! Feed reader capability and its implementations

mod http;

pub use http::HttpFeedReader;

use async_trait::async_trait;

use crate::error::FetchError;
use crate::types::{FeedId, Reading};

/// Fetches the current reading of a single feed
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FeedReader: Send + Sync {
    /// Get the reader name
    fn name(&self) -> &'static str;

    /// Ask `feed` for its latest reading
    async fn fetch(&self, feed: &FeedId) -> Result<Reading, FetchError>;
}
