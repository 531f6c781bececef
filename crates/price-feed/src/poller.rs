//! Retrying source poller
//!
//! Each poll is a bounded sequence of fetch attempts. Failures are logged and
//! absorbed: callers only ever see a price or no price.

use std::sync::Arc;
use tracing::{error, info, warn};

use steemfeed_core::{Exchange, RetryPolicy, Sleeper, SourceError, SourceResult};

use crate::fetcher::Fetcher;
use crate::sources::PriceSource;

/// Result of polling one source
#[derive(Debug, Clone)]
pub struct PollOutcome {
    pub exchange: Exchange,
    pub price: Option<f64>,
    pub attempts: u32,
    pub errors: Vec<SourceError>,
}

pub struct SourcePoller {
    fetcher: Arc<dyn Fetcher>,
    sleeper: Arc<dyn Sleeper>,
    policy: RetryPolicy,
}

impl SourcePoller {
    pub fn new(fetcher: Arc<dyn Fetcher>, sleeper: Arc<dyn Sleeper>, policy: RetryPolicy) -> Self {
        Self {
            fetcher,
            sleeper,
            policy,
        }
    }

    /// Fetch, decode and extract once
    pub async fn fetch_once(&self, source: &dyn PriceSource) -> SourceResult<f64> {
        let body = self.fetcher.get_json(source.exchange(), &source.url()).await?;
        source.extract_price(&body)
    }

    /// Poll with retries; never fails past this boundary
    pub async fn poll(&self, source: &dyn PriceSource) -> PollOutcome {
        let exchange = source.exchange();
        let max_attempts = self.policy.max_attempts;

        let outcome = self
            .policy
            .run(self.sleeper.as_ref(), |attempt| async move {
                let result = self.fetch_once(source).await;
                match &result {
                    Ok(price) => {
                        info!(exchange = %exchange, attempt, price, "Loaded STEEM price from {}: {}", exchange, price);
                    }
                    Err(e) => {
                        error!(
                            exchange = %exchange,
                            stage = %e.stage,
                            attempt,
                            max_attempts,
                            "Error loading STEEM price from {}: {}", exchange, e.message
                        );
                    }
                }
                result
            })
            .await;

        if outcome.value.is_none() {
            warn!(
                exchange = %exchange,
                attempts = outcome.attempts,
                "No STEEM price from {} after {} attempts", exchange, outcome.attempts
            );
        }

        PollOutcome {
            exchange,
            price: outcome.value,
            attempts: outcome.attempts,
            errors: outcome.errors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::StaticFetcher;
    use crate::sources::{BinanceSource, CoingeckoSource};
    use proptest::prelude::*;
    use serde_json::json;
    use std::time::Duration;
    use steemfeed_core::{FetchStage, RecordingSleeper};

    fn poller(fetcher: Arc<StaticFetcher>, sleeper: Arc<RecordingSleeper>, max: u32) -> SourcePoller {
        SourcePoller::new(fetcher, sleeper, RetryPolicy::new(max, Duration::from_secs(10)))
    }

    fn unavailable() -> SourceResult<serde_json::Value> {
        Err(SourceError::new(Exchange::Binance, FetchStage::Request, "connection refused"))
    }

    #[tokio::test]
    async fn test_poll_success() {
        let fetcher = Arc::new(StaticFetcher::new());
        fetcher.respond(BinanceSource.url(), Ok(json!({"price": "0.25"})));
        let sleeper = Arc::new(RecordingSleeper::new());

        let outcome = poller(fetcher.clone(), sleeper.clone(), 5).poll(&BinanceSource).await;

        assert_eq!(outcome.price, Some(0.25));
        assert_eq!(outcome.attempts, 1);
        assert_eq!(fetcher.request_count(&BinanceSource.url()), 1);
        assert!(sleeper.sleeps().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_body_is_retried() {
        let fetcher = Arc::new(StaticFetcher::new());
        let url = CoingeckoSource.url();
        fetcher
            .respond(url.clone(), Ok(json!({"unexpected": true})))
            .respond(url.clone(), Ok(json!({"steem": {"usd": 0.3}})));
        let sleeper = Arc::new(RecordingSleeper::new());

        let outcome = poller(fetcher.clone(), sleeper.clone(), 3).poll(&CoingeckoSource).await;

        assert_eq!(outcome.price, Some(0.3));
        assert_eq!(outcome.attempts, 2);
        assert_eq!(outcome.errors.len(), 1);
        assert_eq!(outcome.errors[0].stage, FetchStage::Extract);
        assert_eq!(sleeper.sleeps(), vec![Duration::from_secs(10)]);
    }

    proptest! {
        #[test]
        fn recovers_on_final_attempt(max in 1u32..8) {
            let fetcher = Arc::new(StaticFetcher::new());
            let url = BinanceSource.url();
            for _ in 1..max {
                fetcher.respond(url.clone(), unavailable());
            }
            fetcher.respond(url.clone(), Ok(json!({"price": "0.2"})));
            let sleeper = Arc::new(RecordingSleeper::new());

            let outcome = tokio_test::block_on(
                poller(fetcher.clone(), sleeper.clone(), max).poll(&BinanceSource),
            );

            prop_assert_eq!(outcome.price, Some(0.2));
            prop_assert_eq!(outcome.attempts, max);
            prop_assert_eq!(fetcher.request_count(&url), max as usize);
        }

        #[test]
        fn exhaustion_yields_no_value(max in 1u32..8) {
            let fetcher = Arc::new(StaticFetcher::new());
            fetcher.respond(BinanceSource.url(), unavailable());
            let sleeper = Arc::new(RecordingSleeper::new());

            let outcome = tokio_test::block_on(
                poller(fetcher.clone(), sleeper.clone(), max).poll(&BinanceSource),
            );

            prop_assert_eq!(outcome.price, None);
            prop_assert_eq!(outcome.attempts, max);
            prop_assert_eq!(outcome.errors.len(), max as usize);
        }
    }
}
