//! Steem witness price feed daemon
//!
//! Polls the configured quote sources, averages what answered and
//! publishes the result as the witness `feed_publish` exchange rate.

pub mod logging;
pub mod service;

pub use logging::{init_logging, DEFAULT_LOG_FILE, ENV_LOG_FILE};
pub use service::{CycleReport, FeedService};

/// Config file used when `PRICEFEED_CONFIG` is unset
pub const DEFAULT_CONFIG_FILE: &str = "config.json";
pub const ENV_CONFIG_FILE: &str = "PRICEFEED_CONFIG";
