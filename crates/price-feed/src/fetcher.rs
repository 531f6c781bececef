//! HTTP transport for quote APIs

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::time::Duration;
use tracing::debug;

use steemfeed_core::{Exchange, FetchStage, SourceError, SourceResult};

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Performs one GET and decodes the body as JSON
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn get_json(&self, exchange: Exchange, url: &str) -> SourceResult<Value>;
}

/// reqwest-backed fetcher with an explicit per-request timeout
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("steem-pricefeed/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn get_json(&self, exchange: Exchange, url: &str) -> SourceResult<Value> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| SourceError::new(exchange, FetchStage::Request, e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::new(
                exchange,
                FetchStage::Status,
                format!("http status {}", status),
            ));
        }

        let body = response
            .text()
            .await
            .map_err(|e| SourceError::new(exchange, FetchStage::Request, e.without_url().to_string()))?;
        debug!(exchange = %exchange, bytes = body.len(), "response received");

        serde_json::from_str(&body)
            .map_err(|e| SourceError::new(exchange, FetchStage::Decode, e.to_string()))
    }
}

/// Serves canned responses per URL, in order; the last one repeats
#[derive(Debug, Default)]
pub struct StaticFetcher {
    responses: Mutex<HashMap<String, VecDeque<SourceResult<Value>>>>,
    requests: Mutex<Vec<String>>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, url: impl Into<String>, response: SourceResult<Value>) -> &Self {
        self.responses
            .lock()
            .entry(url.into())
            .or_default()
            .push_back(response);
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().clone()
    }

    pub fn request_count(&self, url: &str) -> usize {
        self.requests.lock().iter().filter(|u| *u == url).count()
    }
}

#[async_trait]
impl Fetcher for StaticFetcher {
    async fn get_json(&self, exchange: Exchange, url: &str) -> SourceResult<Value> {
        self.requests.lock().push(url.to_string());

        let mut responses = self.responses.lock();
        let queue = responses.get_mut(url).ok_or_else(|| {
            SourceError::new(exchange, FetchStage::Request, format!("no response for {}", url))
        })?;
        let next = if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        };
        next.unwrap_or_else(|| {
            Err(SourceError::new(exchange, FetchStage::Request, "response queue empty"))
        })
    }
}
