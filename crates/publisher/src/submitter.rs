//! Feed submission with bounded retry

use std::sync::Arc;
use tracing::{error, info};

use steemfeed_core::{ExchangeRate, RetryPolicy, Sleeper};

use crate::client::WitnessClient;

/// What a publish sequence did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublishOutcome {
    pub published: bool,
    pub attempts: u32,
}

/// Publishes the feed for one witness account
pub struct FeedSubmitter {
    client: Arc<dyn WitnessClient>,
    sleeper: Arc<dyn Sleeper>,
    policy: RetryPolicy,
    account: String,
}

impl FeedSubmitter {
    pub fn new(
        client: Arc<dyn WitnessClient>,
        sleeper: Arc<dyn Sleeper>,
        policy: RetryPolicy,
        account: impl Into<String>,
    ) -> Self {
        Self {
            client,
            sleeper,
            policy,
            account: account.into(),
        }
    }

    /// Broadcast until the first success or the budget runs out
    pub async fn publish(&self, rate: ExchangeRate) -> PublishOutcome {
        let account = self.account.as_str();

        let outcome = self
            .policy
            .run(self.sleeper.as_ref(), |attempt| async move {
                info!(account, attempt, "Broadcasting feed_publish transaction: {}", rate);
                match self.client.publish_feed(&rate, account).await {
                    Ok(()) => {
                        info!(account, attempt, "Broadcast successful!");
                        Ok(())
                    }
                    Err(e) => {
                        error!(account, attempt, error = %e, "Error broadcasting feed_publish transaction: {}", e);
                        Err(e)
                    }
                }
            })
            .await;

        if !outcome.succeeded() {
            error!(
                account,
                attempts = outcome.attempts,
                "feed_publish not broadcast after {} attempts", outcome.attempts
            );
        }

        PublishOutcome {
            published: outcome.succeeded(),
            attempts: outcome.attempts,
        }
    }
}
