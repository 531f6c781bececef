//! Bounded retry with an injectable sleep

use async_trait::async_trait;
use parking_lot::Mutex;
use std::future::Future;
use std::time::Duration;

/// Blocking-style wait between attempts and between feed cycles
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Real wall-clock sleep
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Records every requested sleep and returns immediately
#[derive(Debug, Default)]
pub struct RecordingSleeper {
    sleeps: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().clone()
    }

    pub fn total(&self) -> Duration {
        self.sleeps.lock().iter().sum()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().push(duration);
    }
}

/// Fixed-count, fixed-delay retry policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

/// What a retried operation produced
#[derive(Debug, Clone)]
pub struct RetryOutcome<T, E> {
    pub value: Option<T>,
    pub attempts: u32,
    pub errors: Vec<E>,
}

impl<T, E> RetryOutcome<T, E> {
    pub fn succeeded(&self) -> bool {
        self.value.is_some()
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self { max_attempts, delay }
    }

    /// Run `op` until it succeeds or the budget is spent.
    ///
    /// `op` receives the 1-based attempt number. The sleeper is called only
    /// between attempts, never after the last one.
    pub async fn run<T, E, F, Fut>(&self, sleeper: &dyn Sleeper, mut op: F) -> RetryOutcome<T, E>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut errors = Vec::new();
        let mut attempts = 0;

        while attempts < self.max_attempts {
            attempts += 1;
            match op(attempts).await {
                Ok(value) => {
                    return RetryOutcome {
                        value: Some(value),
                        attempts,
                        errors,
                    }
                }
                Err(e) => {
                    errors.push(e);
                    if attempts < self.max_attempts {
                        sleeper.sleep(self.delay).await;
                    }
                }
            }
        }

        RetryOutcome {
            value: None,
            attempts,
            errors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[tokio::test]
    async fn test_first_attempt_success() {
        let sleeper = RecordingSleeper::new();
        let policy = RetryPolicy::new(5, Duration::from_secs(10));

        let outcome = policy
            .run(&sleeper, |_| async { Ok::<_, String>(42) })
            .await;

        assert_eq!(outcome.value, Some(42));
        assert_eq!(outcome.attempts, 1);
        assert!(outcome.errors.is_empty());
        assert!(sleeper.sleeps().is_empty());
    }

    #[tokio::test]
    async fn test_zero_budget_never_calls() {
        let sleeper = RecordingSleeper::new();
        let policy = RetryPolicy::new(0, Duration::from_secs(1));
        let mut calls = 0;

        let outcome: RetryOutcome<u32, String> = policy
            .run(&sleeper, |_| {
                calls += 1;
                async { Ok(1) }
            })
            .await;

        assert_eq!(calls, 0);
        assert!(!outcome.succeeded());
        assert_eq!(outcome.attempts, 0);
    }

    proptest! {
        #[test]
        fn succeeds_on_last_attempt(max in 1u32..20) {
            let sleeper = RecordingSleeper::new();
            let policy = RetryPolicy::new(max, Duration::from_secs(3));

            let outcome = tokio_test::block_on(policy.run(&sleeper, |attempt| async move {
                if attempt < max { Err(format!("attempt {}", attempt)) } else { Ok(attempt) }
            }));

            prop_assert_eq!(outcome.value, Some(max));
            prop_assert_eq!(outcome.attempts, max);
            prop_assert_eq!(outcome.errors.len() as u32, max - 1);
            prop_assert_eq!(sleeper.sleeps().len() as u32, max - 1);
        }

        #[test]
        fn exhaustion_records_every_error(max in 1u32..20) {
            let sleeper = RecordingSleeper::new();
            let policy = RetryPolicy::new(max, Duration::from_secs(7));

            let outcome: RetryOutcome<(), String> = tokio_test::block_on(
                policy.run(&sleeper, |attempt| async move { Err(format!("attempt {}", attempt)) }),
            );

            prop_assert!(outcome.value.is_none());
            prop_assert_eq!(outcome.attempts, max);
            prop_assert_eq!(outcome.errors.len() as u32, max);
            prop_assert_eq!(sleeper.total(), Duration::from_secs(7) * (max - 1));
        }
    }
}
