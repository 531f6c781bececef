//! Witness client seam

use async_trait::async_trait;
use parking_lot::Mutex;

use steemfeed_core::{ExchangeRate, PublishError, PublishResult};

/// Broadcasts a witness price feed
#[async_trait]
pub trait WitnessClient: Send + Sync {
    async fn publish_feed(&self, rate: &ExchangeRate, account: &str) -> PublishResult<()>;
}

/// Records publish calls; the first `failures` calls fail
#[derive(Debug, Default)]
pub struct RecordingWitnessClient {
    failures: Mutex<u32>,
    calls: Mutex<Vec<(ExchangeRate, String)>>,
}

impl RecordingWitnessClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(failures: u32) -> Self {
        Self {
            failures: Mutex::new(failures),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<(ExchangeRate, String)> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

#[async_trait]
impl WitnessClient for RecordingWitnessClient {
    async fn publish_feed(&self, rate: &ExchangeRate, account: &str) -> PublishResult<()> {
        self.calls.lock().push((*rate, account.to_string()));

        let mut failures = self.failures.lock();
        if *failures > 0 {
            *failures -= 1;
            return Err(PublishError::Rpc {
                node: "recording".to_string(),
                message: "scripted failure".to_string(),
            });
        }
        Ok(())
    }
}
