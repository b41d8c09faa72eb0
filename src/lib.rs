//! Medianizer Library
//!
//! Whitelist-based price oracle: tracks trusted feeds and aggregates their
//! reports into a single fault-tolerant median.

pub mod config;
pub mod error;
pub mod oracle;
pub mod persistence;
pub mod registry;
pub mod telemetry;
pub mod types;

pub use error::{FetchError, OracleError, OracleResult};
pub use oracle::Oracle;
