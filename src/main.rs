//! Medianizer host
//!
//! Loads the configuration, whitelists the configured feeds and logs the
//! median price every poll interval until Ctrl-C.

use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

use medianizer::config::AppConfig;
use medianizer::oracle::sources::HttpFeedReader;
use medianizer::oracle::{Report, SystemClock};
use medianizer::persistence::OracleSnapshot;
use medianizer::{telemetry, Oracle, OracleError};

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load()?;
    telemetry::init(config.host.log_json);
    info!(config = %config, "Starting medianizer");

    let reader = HttpFeedReader::new(config.reader.timeout_ms).context("Failed to build HTTP client")?;
    let oracle = Oracle::from_config(&config, Arc::new(reader), Arc::new(SystemClock));

    if let Some(snapshot) = OracleSnapshot::load(&config.host.state_path)? {
        let drift = snapshot.settings_drift(&config.oracle);
        if !drift.is_empty() {
            warn!(
                path = %config.host.state_path,
                settings = ?drift,
                "Saved oracle settings override the configured ones"
            );
        }
        oracle.restore(snapshot).await?;
    }

    for feed in &config.host.feeds {
        match oracle.add_feed(feed.id.clone(), feed.name.clone()).await {
            Ok(()) | Err(OracleError::AlreadyExists(_)) => {}
            Err(e) => warn!(feed = %feed.id, error = %e, "Could not whitelist configured feed"),
        }
    }

    let mut ticker = tokio::time::interval(Duration::from_secs(config.host.poll_interval_secs));
    loop {
        tokio::select! {
            _ = ticker.tick() => publish(&oracle).await,
            _ = tokio::signal::ctrl_c() => {
                info!("Shutting down");
                break;
            }
        }
    }

    oracle.snapshot().await.save(&config.host.state_path)?;
    Ok(())
}

async fn publish(oracle: &Oracle) {
    let Report { online, value } = oracle.report().await;
    match value {
        Ok(value) => info!(value = %value, online, "Median price"),
        Err(e) => error!(code = e.code(), error = %e, online, "No median this round"),
    }
}
