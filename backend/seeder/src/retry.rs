use std::{future::Future, time::Duration};

use rand::Rng;
use records::error::StoreError;
use thiserror::Error;
use tokio::time::sleep;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_jitter: Duration,
}

#[derive(Error, Debug)]
pub enum RetryError {
    #[error("Still rate limited after {attempts} attempts")]
    Exhausted { attempts: u32 },

    #[error(transparent)]
    Failed(StoreError),
}

impl RetryPolicy {
    pub const DEFAULT_MAX_RETRIES: u32 = 5;
    pub const DEFAULT_MAX_JITTER: Duration = Duration::from_millis(500);

    pub fn new(base_delay: Duration) -> Self {
        Self {
            max_retries: Self::DEFAULT_MAX_RETRIES,
            base_delay,
            max_jitter: Self::DEFAULT_MAX_JITTER,
        }
    }

    /// `base_delay * 2^attempt` plus `jitter` (clamped to `[0, 1]`) of `max_jitter`.
    pub fn delay(&self, attempt: u32, jitter: f64) -> Duration {
        let exponential = self.base_delay.saturating_mul(2u32.saturating_pow(attempt));

        exponential.saturating_add(self.max_jitter.mul_f64(jitter.clamp(0.0, 1.0)))
    }

    pub fn backoff<R: Rng + ?Sized>(&self, attempt: u32, rng: &mut R) -> Duration {
        self.delay(attempt, rng.r#gen::<f64>())
    }

    /// Runs `operation` until it succeeds, fails with anything but a rate limit, or has been rate
    /// limited `max_retries + 1` times. Every rate limit is waited out with [`RetryPolicy::backoff`],
    /// the last one included, so the caller never hits a throttled store straight away.
    pub async fn run<T, F, Fut>(&self, mut operation: F) -> Result<T, RetryError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, StoreError>>,
    {
        let mut attempt = 0;

        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(StoreError::RateLimited(message)) => {
                    let delay = self.backoff(attempt, &mut rand::thread_rng());

                    if attempt >= self.max_retries {
                        warn!(
                            "Rate limited, max retries exceeded, backing off {:.1}s before moving on: {message}",
                            delay.as_secs_f64()
                        );
                        sleep(delay).await;

                        return Err(RetryError::Exhausted {
                            attempts: attempt + 1,
                        });
                    }

                    warn!(
                        "Rate limited, retrying in {:.1}s (attempt {}/{}): {message}",
                        delay.as_secs_f64(),
                        attempt + 1,
                        self.max_retries
                    );

                    sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(RetryError::Failed(err)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use rand::{SeedableRng, rngs::StdRng};
    use tokio::time::Instant;

    use super::*;

    fn policy() -> RetryPolicy {
        RetryPolicy {
            max_retries: 3,
            base_delay: Duration::from_secs(2),
            max_jitter: Duration::from_millis(500),
        }
    }

    #[test]
    fn test_delay_doubles() {
        let policy = policy();

        assert_eq!(policy.delay(0, 0.0), Duration::from_secs(2));
        assert_eq!(policy.delay(1, 0.0), Duration::from_secs(4));
        assert_eq!(policy.delay(3, 0.0), Duration::from_secs(16));
        assert_eq!(policy.delay(2, 1.0), Duration::from_millis(8_500));
        assert_eq!(policy.delay(0, 7.0), Duration::from_millis(2_500));
    }

    #[test]
    fn test_backoff_jitter_is_bounded() {
        let policy = policy();
        let mut rng = StdRng::seed_from_u64(11);

        for attempt in 0..5 {
            let base = policy.base_delay * 2u32.pow(attempt);
            for _ in 0..50 {
                let delay = policy.backoff(attempt, &mut rng);
                assert!(delay >= base);
                assert!(delay <= base + policy.max_jitter);
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_after_rate_limits() {
        let calls = AtomicU32::new(0);
        let counter = &calls;

        let result = policy()
            .run(move || async move {
                if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(StoreError::RateLimited("429".to_string()))
                } else {
                    Ok(7)
                }
            })
            .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_after_max_retries() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let started = Instant::now();

        let result: Result<(), _> = policy()
            .run(move || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(StoreError::RateLimited("RequestRateTooLarge".to_string()))
            })
            .await;

        assert!(matches!(result, Err(RetryError::Exhausted { attempts: 4 })));
        assert_eq!(calls.load(Ordering::SeqCst), 4);

        // 2 + 4 + 8 + 16 seconds of backoff, plus at most 0.5s jitter each (and timer rounding).
        let waited = started.elapsed();
        assert!(waited >= Duration::from_secs(30));
        assert!(waited <= Duration::from_millis(32_010));
    }

    #[tokio::test(start_paused = true)]
    async fn test_other_errors_are_not_retried() {
        let calls = AtomicU32::new(0);
        let counter = &calls;

        let result: Result<(), _> = policy()
            .run(move || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(StoreError::Database("connection reset".to_string()))
            })
            .await;

        assert!(matches!(result, Err(RetryError::Failed(StoreError::Database(_)))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
