//! Oracle service - Operator and read surface over registry + aggregator
//!
//! Registry and settings sit behind a single lock: mutations take it
//! exclusively and an aggregation pass holds the shared guard from the first
//! feed query to the median, so no call ever observes another half-done.

use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

use crate::config::{AppConfig, OracleConfig};
use crate::error::OracleResult;
use crate::oracle::aggregator::{Aggregator, Report, Round};
use crate::oracle::clock::Clock;
use crate::oracle::sources::FeedReader;
use crate::persistence::OracleSnapshot;
use crate::registry::Registry;
use crate::types::{FeedEntry, FeedId, Price};

struct State {
    registry: Registry,
    settings: OracleConfig,
}

pub struct Oracle {
    state: RwLock<State>,
    aggregator: Aggregator,
    clock: Arc<dyn Clock>,
}

impl Oracle {
    pub fn new(
        registry: Registry,
        settings: OracleConfig,
        aggregator: Aggregator,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            state: RwLock::new(State { registry, settings }),
            aggregator,
            clock,
        }
    }

    /// Build an oracle from application configuration
    pub fn from_config(config: &AppConfig, reader: Arc<dyn FeedReader>, clock: Arc<dyn Clock>) -> Self {
        let registry = Registry::new(config.registry.max_feeds, config.registry.removal_policy);
        let aggregator = Aggregator::new(reader, config.aggregation.ticker_policy);
        Self::new(registry, config.oracle.clone(), aggregator, clock)
    }

    // ==== Operator surface ====

    pub async fn add_feed(&self, id: FeedId, name: impl Into<String>) -> OracleResult<()> {
        let now = self.clock.now_ms();
        self.state.write().await.registry.add(id, name, now)
    }

    pub async fn remove_feed(&self, id: &FeedId) -> OracleResult<()> {
        self.state.write().await.registry.remove(id)
    }

    pub async fn set_minimum_feeds_available(&self, minimum: usize) {
        self.state.write().await.settings.minimum_feeds_available = minimum;
        info!(minimum, "Minimum feeds available updated");
    }

    pub async fn set_stale_after_ms(&self, stale_after_ms: u64) {
        self.state.write().await.settings.stale_after_ms = stale_after_ms;
        info!(stale_after_ms, "Staleness threshold updated");
    }

    pub async fn set_ticker_name(&self, ticker_name: impl Into<String>) {
        let ticker_name = ticker_name.into();
        info!(ticker = %ticker_name, "Ticker name updated");
        self.state.write().await.settings.ticker_name = ticker_name;
    }

    /// Drop every feed and forget the settings
    pub async fn uninstall(&self) {
        let mut state = self.state.write().await;
        state.registry.clear();
        state.settings = OracleConfig::default();
    }

    // ==== Read surface ====

    pub async fn feeds(&self) -> Vec<(FeedId, FeedEntry)> {
        self.state.read().await.registry.list()
    }

    pub async fn feed(&self, id: &FeedId) -> OracleResult<FeedEntry> {
        self.state.read().await.registry.get(id)
    }

    /// Median of every valid, fresh feed
    pub async fn value(&self) -> OracleResult<Price> {
        let state = self.state.read().await;
        let feeds = state.registry.ids();
        let round = self.round(&state.settings);
        self.aggregator
            .value(&feeds, round, state.settings.minimum_feeds_available)
            .await
    }

    /// Number of feeds currently passing validation
    pub async fn online_feeds(&self) -> usize {
        let state = self.state.read().await;
        let feeds = state.registry.ids();
        let round = self.round(&state.settings);
        self.aggregator.online_feed_count(&feeds, round).await
    }

    /// Median and online count from a single pass over the feeds
    pub async fn report(&self) -> Report {
        let state = self.state.read().await;
        let feeds = state.registry.ids();
        let round = self.round(&state.settings);
        self.aggregator
            .report(&feeds, round, state.settings.minimum_feeds_available)
            .await
    }

    pub async fn minimum_feeds_available(&self) -> usize {
        self.state.read().await.settings.minimum_feeds_available
    }

    pub async fn stale_after_ms(&self) -> u64 {
        self.state.read().await.settings.stale_after_ms
    }

    pub async fn ticker_name(&self) -> String {
        self.state.read().await.settings.ticker_name.clone()
    }

    pub async fn settings(&self) -> OracleConfig {
        self.state.read().await.settings.clone()
    }

    // ==== Persistence ====

    pub async fn snapshot(&self) -> OracleSnapshot {
        let state = self.state.read().await;
        OracleSnapshot::new(state.settings.clone(), state.registry.list(), self.clock.now_ms())
    }

    /// Replace registry contents and settings with a saved snapshot.
    /// Feeds keep their original registration time.
    pub async fn restore(&self, snapshot: OracleSnapshot) -> OracleResult<()> {
        let mut state = self.state.write().await;
        let mut registry = Registry::new(state.registry.max_feeds(), state.registry.removal_policy());
        for (id, entry) in snapshot.feeds {
            registry.add(id, entry.name, entry.registered_at)?;
        }

        state.registry = registry;
        state.settings = snapshot.settings;
        info!(feeds = state.registry.len(), "Oracle state restored");
        Ok(())
    }

    fn round<'a>(&self, settings: &'a OracleConfig) -> Round<'a> {
        Round {
            now: self.clock.now_ms(),
            ticker_name: &settings.ticker_name,
            stale_after_ms: settings.stale_after_ms,
        }
    }
}
