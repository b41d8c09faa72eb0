//! JSON persistence of the oracle state
//!
//! The whitelist (ordered ids + entries) and the scalar settings are saved
//! together so a restarted host comes back with the same feeds.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::info;

use crate::config::OracleConfig;
use crate::types::{FeedEntry, FeedId, Timestamp};

const SNAPSHOT_VERSION: &str = "1";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleSnapshot {
    pub version: String,
    pub settings: OracleConfig,
    /// Feeds in listing order
    pub feeds: Vec<(FeedId, FeedEntry)>,
    pub saved_at: Timestamp,
}

impl OracleSnapshot {
    pub fn new(settings: OracleConfig, feeds: Vec<(FeedId, FeedEntry)>, saved_at: Timestamp) -> Self {
        Self {
            version: SNAPSHOT_VERSION.to_string(),
            settings,
            feeds,
            saved_at,
        }
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
        info!(path = %path.display(), feeds = self.feeds.len(), "Oracle snapshot saved");
        Ok(())
    }

    /// Names of the settings whose saved value differs from `configured`.
    /// Restoring the snapshot keeps the saved values.
    pub fn settings_drift(&self, configured: &OracleConfig) -> Vec<&'static str> {
        let saved = &self.settings;
        let mut drift = Vec::new();
        if saved.ticker_name != configured.ticker_name {
            drift.push("ticker_name");
        }
        if saved.minimum_feeds_available != configured.minimum_feeds_available {
            drift.push("minimum_feeds_available");
        }
        if saved.stale_after_ms != configured.stale_after_ms {
            drift.push("stale_after_ms");
        }
        drift
    }

    /// `Ok(None)` when nothing has been saved yet
    pub fn load(path: impl AsRef<Path>) -> Result<Option<Self>> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(None);
        }
        let json = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let snapshot: OracleSnapshot = serde_json::from_str(&json)
            .with_context(|| format!("Corrupt snapshot at {}", path.display()))?;
        info!(path = %path.display(), feeds = snapshot.feeds.len(), "Oracle snapshot loaded");
        Ok(Some(snapshot))
    }
}
