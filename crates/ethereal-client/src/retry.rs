//! Retry policy for RPC calls.

use std::future::Future;
use std::time::Duration;

use ethereal_primitives::{Error, Result};
use rand::Rng;

const DEFAULT_MAX_ATTEMPTS: usize = 5;
const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(100);
const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(2);

/// Exponential backoff with jitter, capped, bounded attempt count.
#[derive(Debug, Clone, Copy)]
pub struct RpcRetry {
    pub max_attempts: usize,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RpcRetry {
    fn default() -> Self {
        RpcRetry {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: DEFAULT_BASE_DELAY,
            max_delay: DEFAULT_MAX_DELAY,
        }
    }
}

impl RpcRetry {
    /// Runs `attempt` up to `max_attempts` times, retrying only failures
    /// [`Error::is_retryable`] accepts. A revert or any other non-retryable
    /// error returns immediately without consuming further attempts.
    pub async fn run<T, F, Fut>(&self, mut attempt: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut causes = Vec::new();
        for attempt_index in 0..self.max_attempts {
            match attempt().await {
                Ok(value) => return Ok(value),
                Err(error) if error.is_retryable() => {
                    causes.push(error.to_string());
                    if attempt_index + 1 == self.max_attempts {
                        break;
                    }
                    let delay = self.backoff_delay(attempt_index);
                    tokio::time::sleep(delay).await;
                }
                Err(error) => return Err(error),
            }
        }
        Err(Error::RetryExhausted {
            attempts: self.max_attempts,
            causes,
        })
    }

    /// Exponential backoff with full jitter, capped at `max_delay`.
    pub fn backoff_delay(&self, attempt_index: usize) -> Duration {
        backoff_delay(self.base_delay, self.max_delay, attempt_index)
    }
}

fn backoff_delay(base: Duration, cap: Duration, attempt_index: usize) -> Duration {
    let exponent = attempt_index.min(16) as u32;
    let scaled = base.saturating_mul(1u32 << exponent).min(cap);
    let jitter_fraction: f64 = rand::thread_rng().gen_range(0.5..=1.0);
    Duration::from_secs_f64(scaled.as_secs_f64() * jitter_fraction)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethereal_primitives::error::RpcError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn succeeds_without_retry_on_first_try() {
        let retry = RpcRetry::default();
        let result = retry.run(|| async { Ok::<_, Error>(42) }).await.unwrap();
        assert_eq!(result, 42);
    }

    #[tokio::test]
    async fn retries_io_failures_then_succeeds() {
        let retry = RpcRetry {
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(5),
            ..Default::default()
        };
        let calls = AtomicUsize::new(0);
        let result = retry
            .run(|| async {
                if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(Error::ConnectionLost)
                } else {
                    Ok(7)
                }
            })
            .await
            .unwrap();
        assert_eq!(result, 7);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn does_not_retry_a_revert() {
        let retry = RpcRetry::default();
        let calls = AtomicUsize::new(0);
        let result = retry
            .run(|| async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>(Error::Transaction("nope".to_string()))
            })
            .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn exhausts_and_carries_ordered_causes() {
        let retry = RpcRetry {
            max_attempts: 3,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(2),
        };
        let result = retry
            .run(|| async { Err::<(), _>(Error::Rpc(RpcError { code: -32000, message: "boom".to_string(), data: None })) })
            .await;
        match result {
            Err(Error::RetryExhausted { attempts, causes }) => {
                assert_eq!(attempts, 3);
                assert_eq!(causes.len(), 3);
            }
            other => panic!("expected RetryExhausted, got {other:?}"),
        }
    }
}
