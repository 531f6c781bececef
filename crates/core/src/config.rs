//! Configuration types
//!
//! The feed reads one JSON file at startup. Credentials and the account
//! name fall back to environment variables when the file leaves them empty.

use serde::Deserialize;
use std::collections::BTreeSet;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, warn};

use crate::errors::{ConfigError, ConfigResult};
use crate::retry::RetryPolicy;
use crate::Exchange;

pub const DEFAULT_RPC_NODE: &str = "https://api.steemit.com";
pub const DEFAULT_RETRY_INTERVAL_SECS: u64 = 10;
pub const DEFAULT_MAX_RETRY: u32 = 5;
pub const DEFAULT_INTERVAL_MINUTES: u64 = 120;

pub const ENV_ACCOUNT: &str = "FEED_STEEM_ACCOUNT";
pub const ENV_ACTIVE_KEY: &str = "FEED_STEEM_ACTIVE_KEY";
pub const ENV_COINMARKETCAP_API_KEY: &str = "COINMARKETCAP_API_KEY";

/// On-disk shape of the config file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawFeedConfig {
    #[serde(default)]
    pub rpc_nodes: Vec<String>,
    #[serde(default)]
    pub feed_steem_account: Option<String>,
    #[serde(default)]
    pub feed_steem_active_key: Option<String>,
    #[serde(default)]
    pub coinmarketcap_api_key: Option<String>,
    #[serde(default)]
    pub exchanges: Vec<String>,
    #[serde(default)]
    pub retry_interval: Option<u64>,
    #[serde(default)]
    pub price_feed_max_retry: Option<u32>,
    #[serde(default)]
    pub interval: Option<u64>,
    #[serde(default)]
    pub peg_multi: Option<f64>,
}

/// Resolved, read-only feed configuration
#[derive(Debug, Clone)]
pub struct FeedConfig {
    pub rpc_nodes: Vec<String>,
    pub account: String,
    pub active_key: Option<String>,
    pub coinmarketcap_api_key: Option<String>,
    pub exchanges: BTreeSet<Exchange>,
    pub retry_interval: Duration,
    pub max_retry: u32,
    pub interval: Duration,
    pub peg_multi: f64,
}

impl FeedConfig {
    /// Load from a JSON file, falling back to the process environment
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let settings = config::Config::builder()
            .add_source(config::File::from(path).format(config::FileFormat::Json))
            .build()?;
        let raw: RawFeedConfig = settings.try_deserialize()?;
        debug!(path = %path.display(), "config loaded");

        Self::resolve(raw, |name| std::env::var(name).ok())
    }

    /// Parse JSON text; used by tests and tooling
    pub fn from_json_str(
        json: &str,
        env: impl Fn(&str) -> Option<String>,
    ) -> ConfigResult<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from_str(json, config::FileFormat::Json))
            .build()?;
        let raw: RawFeedConfig = settings.try_deserialize()?;
        Self::resolve(raw, env)
    }

    /// Apply defaults and environment fallbacks
    pub fn resolve(raw: RawFeedConfig, env: impl Fn(&str) -> Option<String>) -> ConfigResult<Self> {
        let rpc_nodes: Vec<String> = raw
            .rpc_nodes
            .into_iter()
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .collect();
        let rpc_nodes = if rpc_nodes.is_empty() {
            vec![DEFAULT_RPC_NODE.to_string()]
        } else {
            rpc_nodes
        };

        let mut exchanges = BTreeSet::new();
        for name in &raw.exchanges {
            match name.parse::<Exchange>() {
                Ok(exchange) => {
                    exchanges.insert(exchange);
                }
                Err(e) => warn!(exchange = %name, "ignoring {}", e),
            }
        }

        let peg_multi = match raw.peg_multi {
            Some(p) if p.is_finite() && p != 0.0 => p,
            _ => 1.0,
        };

        let minutes = raw.interval.unwrap_or(DEFAULT_INTERVAL_MINUTES);
        let interval_secs = minutes
            .checked_mul(60)
            .ok_or(ConfigError::IntervalOutOfRange(minutes))?;

        Ok(Self {
            rpc_nodes,
            account: with_env_fallback(raw.feed_steem_account, ENV_ACCOUNT, &env)
                .unwrap_or_default(),
            active_key: with_env_fallback(raw.feed_steem_active_key, ENV_ACTIVE_KEY, &env),
            coinmarketcap_api_key: with_env_fallback(
                raw.coinmarketcap_api_key,
                ENV_COINMARKETCAP_API_KEY,
                &env,
            ),
            exchanges,
            retry_interval: Duration::from_secs(
                raw.retry_interval.unwrap_or(DEFAULT_RETRY_INTERVAL_SECS),
            ),
            max_retry: raw.price_feed_max_retry.unwrap_or(DEFAULT_MAX_RETRY),
            interval: Duration::from_secs(interval_secs),
            peg_multi,
        })
    }

    /// Enforce the startup invariants. Nothing touches the network before this passes.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.account.is_empty() {
            return Err(ConfigError::MissingAccount);
        }
        if self.exchanges.is_empty() {
            return Err(ConfigError::NoExchanges);
        }
        for exchange in &self.exchanges {
            if exchange.requires_api_key() && self.api_key_for(*exchange).is_none() {
                return Err(ConfigError::MissingApiKey(*exchange));
            }
        }
        Ok(())
    }

    pub fn api_key_for(&self, exchange: Exchange) -> Option<&str> {
        match exchange {
            Exchange::Coinmarketcap => self.coinmarketcap_api_key.as_deref(),
            _ => None,
        }
    }

    pub fn is_read_only(&self) -> bool {
        self.active_key.is_none()
    }

    /// Interval of zero means a single pass
    pub fn runs_once(&self) -> bool {
        self.interval.is_zero()
    }

    /// Shared budget for source polls and feed broadcasts
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_retry, self.retry_interval)
    }
}

// Config value wins when non-empty, then the upper-case variable, then the
// lower-case spelling older deployments exported.
fn with_env_fallback(
    value: Option<String>,
    var: &str,
    env: &impl Fn(&str) -> Option<String>,
) -> Option<String> {
    value
        .filter(|v| !v.trim().is_empty())
        .or_else(|| env(var).filter(|v| !v.trim().is_empty()))
        .or_else(|| env(&var.to_ascii_lowercase()).filter(|v| !v.trim().is_empty()))
        .map(|v| v.trim().to_string())
}
