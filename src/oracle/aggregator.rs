//! Oracle Aggregator - Reduces feed readings to a single price
//!
//! Queries every whitelisted feed one after the other, drops the ones that
//! fail, report another ticker or are stale, and takes the median of the rest.
//! A broken feed only costs its own vote.

use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::{OracleError, OracleResult};
use crate::oracle::median::median;
use crate::oracle::sources::FeedReader;
use crate::types::{FeedId, Price, TickerPolicy, Timestamp};

/// Parameters of a single aggregation pass
#[derive(Debug, Clone, Copy)]
pub struct Round<'a> {
    pub now: Timestamp,
    pub ticker_name: &'a str,
    pub stale_after_ms: u64,
}

/// Outcome of checking one feed
enum Verdict {
    Accepted(Price),
    Skipped,
    WrongTicker(String),
}

/// Online count and median taken from the same pass over the feeds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub online: usize,
    pub value: OracleResult<Price>,
}

pub struct Aggregator {
    reader: Arc<dyn FeedReader>,
    ticker_policy: TickerPolicy,
}

impl Aggregator {
    pub fn new(reader: Arc<dyn FeedReader>, ticker_policy: TickerPolicy) -> Self {
        Self {
            reader,
            ticker_policy,
        }
    }

    pub fn ticker_policy(&self) -> TickerPolicy {
        self.ticker_policy
    }

    /// Values of every valid, fresh feed, in registry order.
    ///
    /// Only fails under `TickerPolicy::Strict`, on the first feed reporting
    /// another ticker. An empty result is not an error.
    pub async fn collect_values(&self, feeds: &[FeedId], round: Round<'_>) -> OracleResult<Vec<Price>> {
        let mut values = Vec::with_capacity(feeds.len());

        for feed in feeds {
            match self.check(feed, round).await {
                Verdict::Accepted(value) => values.push(value),
                Verdict::Skipped => {}
                Verdict::WrongTicker(found) => match self.ticker_policy {
                    TickerPolicy::Lenient => {}
                    TickerPolicy::Strict => {
                        return Err(OracleError::WrongTickerName {
                            feed: feed.clone(),
                            expected: round.ticker_name.to_string(),
                            found,
                        });
                    }
                },
            }
        }

        Ok(values)
    }

    /// Number of feeds that would contribute a value right now. Never fails.
    pub async fn online_feed_count(&self, feeds: &[FeedId], round: Round<'_>) -> usize {
        let mut count = 0;
        for feed in feeds {
            if let Verdict::Accepted(_) = self.check(feed, round).await {
                count += 1;
            }
        }
        count
    }

    /// Median of the collected values
    pub async fn value(&self, feeds: &[FeedId], round: Round<'_>, minimum_required: usize) -> OracleResult<Price> {
        let values = self.collect_values(feeds, round).await?;
        median(&values, minimum_required)
    }

    /// Query every feed once and derive both the online count and the median.
    /// Under `TickerPolicy::Strict` the first mismatch becomes the value's
    /// error, but the remaining feeds are still counted.
    pub async fn report(&self, feeds: &[FeedId], round: Round<'_>, minimum_required: usize) -> Report {
        let mut values = Vec::with_capacity(feeds.len());
        let mut mismatch = None;

        for feed in feeds {
            match self.check(feed, round).await {
                Verdict::Accepted(value) => values.push(value),
                Verdict::Skipped => {}
                Verdict::WrongTicker(found) => {
                    if self.ticker_policy == TickerPolicy::Strict && mismatch.is_none() {
                        mismatch = Some(OracleError::WrongTickerName {
                            feed: feed.clone(),
                            expected: round.ticker_name.to_string(),
                            found,
                        });
                    }
                }
            }
        }

        let value = match mismatch {
            Some(err) => Err(err),
            None => median(&values, minimum_required),
        };
        Report {
            online: values.len(),
            value,
        }
    }

    async fn check(&self, feed: &FeedId, round: Round<'_>) -> Verdict {
        let reading = match self.reader.fetch(feed).await {
            Ok(reading) => reading,
            Err(e) => {
                warn!(feed = %feed, reader = self.reader.name(), error = %e, "Feed did not answer, skipping");
                return Verdict::Skipped;
            }
        };

        if reading.ticker_name != round.ticker_name {
            warn!(
                feed = %feed,
                expected = %round.ticker_name,
                found = %reading.ticker_name,
                "Feed reports another ticker"
            );
            return Verdict::WrongTicker(reading.ticker_name);
        }

        if reading.is_stale(round.now, round.stale_after_ms) {
            debug!(
                feed = %feed,
                timestamp = reading.timestamp,
                now = round.now,
                stale_after_ms = round.stale_after_ms,
                "Stale reading excluded"
            );
            return Verdict::Skipped;
        }

        Verdict::Accepted(reading.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use crate::oracle::sources::MockFeedReader;
    use crate::types::Reading;
    use std::collections::HashMap;

    const NOW: Timestamp = 1_700_000_000_000;
    const STALE_AFTER: u64 = 60_000;

    fn round() -> Round<'static> {
        Round {
            now: NOW,
            ticker_name: "ICXUSD",
            stale_after_ms: STALE_AFTER,
        }
    }

    fn feeds(ids: &[&str]) -> Vec<FeedId> {
        ids.iter().map(|id| FeedId::from(*id)).collect()
    }

    /// Mock answering from a table; missing feeds fail with a transport error
    fn mock_reader(table: Vec<(&'static str, Reading)>) -> Arc<dyn FeedReader> {
        let table: HashMap<FeedId, Reading> = table
            .into_iter()
            .map(|(id, r)| (FeedId::from(id), r))
            .collect();

        let mut mock = MockFeedReader::new();
        mock.expect_name().return_const("mock");
        mock.expect_fetch().returning(move |feed| {
            let feed: &FeedId = feed;
            table
                .get(feed)
                .cloned()
                .ok_or_else(|| FetchError::Transport("connection refused".into()))
        });
        Arc::new(mock)
    }

    fn fresh(value: Price) -> Reading {
        Reading::new("ICXUSD", NOW - 1_000, value)
    }

    #[tokio::test]
    async fn test_all_feeds_fresh() {
        let reader = mock_reader(vec![("a", fresh(10)), ("b", fresh(20)), ("c", fresh(30))]);
        let aggregator = Aggregator::new(reader, TickerPolicy::Lenient);
        let ids = feeds(&["a", "b", "c"]);

        assert_eq!(aggregator.collect_values(&ids, round()).await.unwrap(), vec![10, 20, 30]);
        assert_eq!(aggregator.value(&ids, round(), 2).await.unwrap(), 20);
        assert_eq!(aggregator.online_feed_count(&ids, round()).await, 3);
    }

    #[tokio::test]
    async fn test_stale_feed_excluded() {
        let stale = Reading::new("ICXUSD", NOW - STALE_AFTER as i64 - 1, 20);
        let reader = mock_reader(vec![("a", fresh(10)), ("b", stale), ("c", fresh(30))]);
        let aggregator = Aggregator::new(reader, TickerPolicy::Lenient);
        let ids = feeds(&["a", "b", "c"]);

        assert_eq!(aggregator.collect_values(&ids, round()).await.unwrap(), vec![10, 30]);
        assert_eq!(aggregator.value(&ids, round(), 2).await.unwrap(), 20);
        assert_eq!(aggregator.online_feed_count(&ids, round()).await, 2);
    }

    #[tokio::test]
    async fn test_reading_exactly_at_threshold_is_fresh() {
        let edge = Reading::new("ICXUSD", NOW - STALE_AFTER as i64, 5);
        let reader = mock_reader(vec![("a", edge)]);
        let aggregator = Aggregator::new(reader, TickerPolicy::Lenient);

        assert_eq!(aggregator.online_feed_count(&feeds(&["a"]), round()).await, 1);
    }

    #[tokio::test]
    async fn test_transport_failures_are_skipped() {
        let reader = mock_reader(vec![("b", fresh(20))]);
        let aggregator = Aggregator::new(reader, TickerPolicy::Lenient);
        let ids = feeds(&["a", "b", "c"]);

        assert_eq!(aggregator.collect_values(&ids, round()).await.unwrap(), vec![20]);
        let err = aggregator.value(&ids, round(), 2).await.unwrap_err();
        assert_eq!(
            err,
            OracleError::NotEnoughFeedsAvailable {
                available: 1,
                required: 2
            }
        );
    }

    #[tokio::test]
    async fn test_wrong_ticker_lenient_skips() {
        let reader = mock_reader(vec![
            ("a", fresh(10)),
            ("b", Reading::new("BTCUSD", NOW, 99_000)),
            ("c", fresh(30)),
        ]);
        let aggregator = Aggregator::new(reader, TickerPolicy::Lenient);
        let ids = feeds(&["a", "b", "c"]);

        assert_eq!(aggregator.collect_values(&ids, round()).await.unwrap(), vec![10, 30]);
    }

    #[tokio::test]
    async fn test_wrong_ticker_strict_aborts() {
        let reader = mock_reader(vec![
            ("a", fresh(10)),
            ("b", Reading::new("BTCUSD", NOW, 99_000)),
            ("c", fresh(30)),
        ]);
        let aggregator = Aggregator::new(reader, TickerPolicy::Strict);
        let ids = feeds(&["a", "b", "c"]);

        let err = aggregator.collect_values(&ids, round()).await.unwrap_err();
        assert_eq!(
            err,
            OracleError::WrongTickerName {
                feed: FeedId::from("b"),
                expected: "ICXUSD".into(),
                found: "BTCUSD".into(),
            }
        );
        // Counting never fails, the mismatched feed just isn't online
        assert_eq!(aggregator.online_feed_count(&ids, round()).await, 2);
    }

    #[tokio::test]
    async fn test_feeds_are_queried_in_order() {
        let mut seq = mockall::Sequence::new();
        let mut mock = MockFeedReader::new();
        mock.expect_name().return_const("mock");
        for (id, value) in [("x", 1), ("y", 2), ("z", 3)] {
            mock.expect_fetch()
                .withf(move |feed| feed.as_str() == id)
                .times(1)
                .in_sequence(&mut seq)
                .returning(move |_| Ok(fresh(value)));
        }
        let aggregator = Aggregator::new(Arc::new(mock), TickerPolicy::Lenient);

        let values = aggregator.collect_values(&feeds(&["x", "y", "z"]), round()).await.unwrap();
        assert_eq!(values, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_no_feeds() {
        let aggregator = Aggregator::new(mock_reader(vec![]), TickerPolicy::Strict);

        assert!(aggregator.collect_values(&[], round()).await.unwrap().is_empty());
        assert_eq!(aggregator.online_feed_count(&[], round()).await, 0);
        assert!(aggregator.value(&[], round(), 0).await.is_err());
    }

    #[tokio::test]
    async fn test_report_queries_each_feed_once() {
        let stale = Reading::new("ICXUSD", NOW - STALE_AFTER as i64 - 1, 20);
        let mut mock = MockFeedReader::new();
        mock.expect_name().return_const("mock");
        for (id, reading) in [("a", fresh(10)), ("b", stale), ("c", fresh(30))] {
            mock.expect_fetch()
                .withf(move |feed| feed.as_str() == id)
                .times(1)
                .returning(move |_| Ok(reading.clone()));
        }
        let aggregator = Aggregator::new(Arc::new(mock), TickerPolicy::Lenient);

        let report = aggregator.report(&feeds(&["a", "b", "c"]), round(), 2).await;
        assert_eq!(
            report,
            Report {
                online: 2,
                value: Ok(20)
            }
        );
    }

    #[tokio::test]
    async fn test_report_strict_mismatch_still_counts() {
        let reader = mock_reader(vec![
            ("a", fresh(10)),
            ("b", Reading::new("BTCUSD", NOW, 99_000)),
            ("c", fresh(30)),
        ]);
        let aggregator = Aggregator::new(reader, TickerPolicy::Strict);

        let report = aggregator.report(&feeds(&["a", "b", "c"]), round(), 1).await;
        assert_eq!(report.online, 2);
        assert_eq!(report.value.unwrap_err().code(), "WRONG_TICKER_NAME");
    }
}
