//! Oracle module - Median price aggregation over whitelisted feeds
//!
//! Reads every registered feed, discards the ones that are unreachable,
//! stale or quoting another ticker, and reduces the rest to their median.

mod aggregator;
mod clock;
mod median;
mod service;
pub mod sources;

pub use aggregator::{Aggregator, Report, Round};
pub use clock::{Clock, ManualClock, SystemClock};
pub use median::median;
pub use service::Oracle;
