//! Error types

use std::fmt;
use thiserror::Error;

use crate::Exchange;

/// Startup configuration errors, all fatal
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("feed_steem_account not set in config file or environment")]
    MissingAccount,

    #[error("no exchanges are specified")]
    NoExchanges,

    #[error("{} api key not set in config file or environment", .0.name())]
    MissingApiKey(Exchange),

    #[error("interval of {0} minutes is out of range")]
    IntervalOutOfRange(u64),
}

/// Step of a source fetch that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStage {
    Request,
    Status,
    Decode,
    Extract,
    Validate,
}

impl fmt::Display for FetchStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FetchStage::Request => "request",
            FetchStage::Status => "status",
            FetchStage::Decode => "decode",
            FetchStage::Extract => "extract",
            FetchStage::Validate => "validate",
        };
        f.write_str(s)
    }
}

/// A single failed price fetch
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{exchange} {stage} error: {message}")]
pub struct SourceError {
    pub exchange: Exchange,
    pub stage: FetchStage,
    pub message: String,
}

impl SourceError {
    pub fn new(exchange: Exchange, stage: FetchStage, message: impl Into<String>) -> Self {
        Self {
            exchange,
            stage,
            message: message.into(),
        }
    }

    pub fn missing_field(exchange: Exchange, field: &str) -> Self {
        Self::new(exchange, FetchStage::Extract, format!("missing field {}", field))
    }
}

/// Witness feed broadcast errors
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("no rpc nodes configured")]
    NoNodes,

    #[error("no active key configured, running read-only")]
    MissingActiveKey,

    #[error("invalid active key: {0}")]
    InvalidKey(String),

    #[error("rpc error from {node}: {message}")]
    Rpc { node: String, message: String },

    #[error("transport error talking to {node}: {message}")]
    Transport { node: String, message: String },

    #[error("signing failed: {0}")]
    Signing(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;
pub type SourceResult<T> = Result<T, SourceError>;
pub type PublishResult<T> = Result<T, PublishError>;
