//! Price aggregator - polls every enabled source and averages the survivors

use tracing::info;

use steemfeed_core::Exchange;

use crate::poller::{PollOutcome, SourcePoller};
use crate::sources::PriceSource;

/// One successfully polled price
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceSample {
    pub exchange: Exchange,
    pub price: f64,
}

/// Unweighted arithmetic mean; `None` for no samples
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Main price aggregator
pub struct PriceAggregator {
    poller: SourcePoller,
    sources: Vec<Box<dyn PriceSource>>,
}

impl PriceAggregator {
    pub fn new(poller: SourcePoller, sources: Vec<Box<dyn PriceSource>>) -> Self {
        Self { poller, sources }
    }

    pub fn exchanges(&self) -> Vec<Exchange> {
        self.sources.iter().map(|s| s.exchange()).collect()
    }

    /// Poll each source in turn, waiting for each before starting the next
    pub async fn poll_all(&self) -> Vec<PollOutcome> {
        let mut outcomes = Vec::with_capacity(self.sources.len());
        for source in &self.sources {
            outcomes.push(self.poller.poll(source.as_ref()).await);
        }
        outcomes
    }

    /// Poll every source and keep the ones that produced a price
    pub async fn collect_samples(&self) -> Vec<PriceSample> {
        let samples = Self::samples(&self.poll_all().await);
        info!(
            polled = self.sources.len(),
            succeeded = samples.len(),
            "price sampling finished"
        );
        samples
    }

    pub fn samples(outcomes: &[PollOutcome]) -> Vec<PriceSample> {
        outcomes
            .iter()
            .filter_map(|o| {
                o.price.map(|price| PriceSample {
                    exchange: o.exchange,
                    price,
                })
            })
            .collect()
    }

    pub fn aggregate(samples: &[PriceSample]) -> Option<f64> {
        let values: Vec<f64> = samples.iter().map(|s| s.price).collect();
        mean(&values)
    }
}
