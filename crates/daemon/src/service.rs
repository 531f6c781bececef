//! Feed service: poll, average, publish, sleep, repeat

use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use steemfeed_core::{ConfigError, ExchangeRate, FeedConfig, Sleeper, TokioSleeper};
use steemfeed_price_feed::{
    sources_for, Fetcher, HttpFetcher, PriceAggregator, PriceSample, SourcePoller,
    DEFAULT_REQUEST_TIMEOUT,
};
use steemfeed_publisher::{
    FeedSubmitter, PublishOutcome, SteemClient, WitnessClient, DEFAULT_RPC_TIMEOUT,
};

/// Everything one cycle observed and did
#[derive(Debug, Clone)]
pub struct CycleReport {
    pub samples: Vec<PriceSample>,
    pub price: Option<f64>,
    pub exchange_rate: Option<ExchangeRate>,
    pub publish: Option<PublishOutcome>,
}

impl CycleReport {
    pub fn published(&self) -> bool {
        self.publish.map(|p| p.published).unwrap_or(false)
    }
}

pub struct FeedService {
    aggregator: PriceAggregator,
    submitter: FeedSubmitter,
    sleeper: Arc<dyn Sleeper>,
    interval: Duration,
    peg_multi: f64,
}

impl FeedService {
    pub fn new(
        aggregator: PriceAggregator,
        submitter: FeedSubmitter,
        sleeper: Arc<dyn Sleeper>,
        interval: Duration,
        peg_multi: f64,
    ) -> Self {
        Self {
            aggregator,
            submitter,
            sleeper,
            interval,
            peg_multi,
        }
    }

    /// Wire the service from validated config and injected collaborators
    pub fn with_parts(
        config: &FeedConfig,
        fetcher: Arc<dyn Fetcher>,
        client: Arc<dyn WitnessClient>,
        sleeper: Arc<dyn Sleeper>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let policy = config.retry_policy();
        let poller = SourcePoller::new(fetcher, Arc::clone(&sleeper), policy);
        let aggregator = PriceAggregator::new(poller, sources_for(config)?);
        let submitter =
            FeedSubmitter::new(client, Arc::clone(&sleeper), policy, config.account.clone());

        Ok(Self::new(
            aggregator,
            submitter,
            sleeper,
            config.interval,
            config.peg_multi,
        ))
    }

    /// Production wiring: reqwest fetcher, JSON-RPC client, wall-clock sleep
    pub fn from_config(config: &FeedConfig) -> anyhow::Result<Self> {
        config.validate()?;

        let fetcher = HttpFetcher::new(DEFAULT_REQUEST_TIMEOUT)?;
        let client = SteemClient::new(
            config.rpc_nodes.clone(),
            config.active_key.as_deref(),
            DEFAULT_RPC_TIMEOUT,
        )?;
        if client.is_read_only() {
            warn!("no active key configured, feed broadcasts will fail (read-only mode)");
        }
        info!(
            account = %config.account,
            nodes = ?client.nodes(),
            exchanges = ?config.exchanges,
            "price feed configured"
        );

        let service = Self::with_parts(
            config,
            Arc::new(fetcher),
            Arc::new(client),
            Arc::new(TokioSleeper),
        )?;
        Ok(service)
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// One POLLING → aggregation → PUBLISHING pass
    pub async fn run_cycle(&self) -> CycleReport {
        let samples = self.aggregator.collect_samples().await;

        let Some(price) = PriceAggregator::aggregate(&samples) else {
            info!("no prices found.");
            return CycleReport {
                samples,
                price: None,
                exchange_rate: None,
                publish: None,
            };
        };

        let values: Vec<f64> = samples.iter().map(|s| s.price).collect();
        info!(samples = ?values, "{:?}", values);
        info!(price, "Price = {}", price);

        let rate = ExchangeRate::from_price(price, self.peg_multi);
        let outcome = self.submitter.publish(rate).await;

        CycleReport {
            samples,
            price: Some(price),
            exchange_rate: Some(rate),
            publish: Some(outcome),
        }
    }

    /// Run until the process is stopped, or once when the interval is zero
    pub async fn run(&self) {
        self.run_cycles(None).await;
    }

    /// Like `run`, but stops after `limit` cycles when given
    pub async fn run_cycles(&self, limit: Option<u64>) -> u64 {
        let mut cycles = 0u64;
        loop {
            self.run_cycle().await;
            cycles += 1;

            if self.interval.is_zero() {
                info!("interval is 0, exiting after a single pass");
                break;
            }
            if limit.is_some_and(|max| cycles >= max) {
                break;
            }

            info!(
                minutes = self.interval.as_secs() / 60,
                "next feed cycle in {} minutes",
                self.interval.as_secs() / 60
            );
            self.sleeper.sleep(self.interval).await;
        }
        cycles
    }
}
