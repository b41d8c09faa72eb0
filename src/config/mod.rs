//! Configuration management for the medianizer
//!
//! Loads from YAML/TOML files + environment variables via .env

mod types;

pub use types::*;

use anyhow::{bail, Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::registry::DEFAULT_MAX_FEEDS;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub oracle: OracleConfig,
    pub registry: RegistryConfig,
    pub aggregation: AggregationConfig,
    pub reader: ReaderConfig,
    pub host: HostConfig,
}

impl AppConfig {
    /// Load configuration from file and environment
    pub fn load() -> Result<Self> {
        // Load .env file first
        dotenvy::dotenv().ok();

        let config = Self::builder()?
            // Load config file if exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // Override with environment variables (MEDIANIZER_*)
            .add_source(Environment::with_prefix("MEDIANIZER").separator("__"))
            .build()
            .context("Failed to build configuration")?;

        let app_config: AppConfig = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        app_config.validate()?;
        Ok(app_config)
    }

    /// Load a single configuration file on top of the defaults
    pub fn from_file(path: &str) -> Result<Self> {
        let app_config: AppConfig = Self::builder()?
            .add_source(File::with_name(path))
            .build()
            .with_context(|| format!("Failed to read configuration from {}", path))?
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        app_config.validate()?;
        Ok(app_config)
    }

    fn builder() -> Result<config::ConfigBuilder<config::builder::DefaultState>> {
        let builder = Config::builder()
            // Oracle defaults
            .set_default("oracle.ticker_name", "ICXUSD")?
            .set_default("oracle.minimum_feeds_available", 1)?
            .set_default("oracle.stale_after_ms", DEFAULT_STALE_AFTER_MS)?
            // Registry defaults
            .set_default("registry.max_feeds", DEFAULT_MAX_FEEDS as u64)?
            .set_default("registry.removal_policy", "preserve_order")?
            // Aggregation defaults
            .set_default("aggregation.ticker_policy", "lenient")?
            // Reader defaults
            .set_default("reader.timeout_ms", 5000)?
            // Host defaults
            .set_default("host.poll_interval_secs", 60)?
            .set_default("host.log_json", false)?
            .set_default("host.state_path", "./data/medianizer.json")?;
        Ok(builder)
    }

    /// Reject settings the oracle cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.oracle.ticker_name.trim().is_empty() {
            bail!("oracle.ticker_name must not be empty");
        }
        if self.registry.max_feeds == 0 {
            bail!("registry.max_feeds must be at least 1");
        }
        if self.reader.timeout_ms == 0 {
            bail!("reader.timeout_ms must be at least 1");
        }
        if self.host.poll_interval_secs == 0 {
            bail!("host.poll_interval_secs must be at least 1");
        }
        Ok(())
    }

    /// Generate a digest of the config for logging
    pub fn digest(&self) -> String {
        format!(
            "ticker={} min_feeds={} stale_after_ms={} max_feeds={} removal={} ticker_policy={} feeds={}",
            self.oracle.ticker_name,
            self.oracle.minimum_feeds_available,
            self.oracle.stale_after_ms,
            self.registry.max_feeds,
            self.registry.removal_policy,
            self.aggregation.ticker_policy,
            self.host.feeds.len()
        )
    }
}

impl std::fmt::Display for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.digest())
    }
}
