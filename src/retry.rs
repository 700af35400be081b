//! Bounded retry with exponential backoff for transient network failures.

use rand::Rng;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

use crate::fetcher::FetchError;
use crate::genai::GenerationError;

/// Errors that know whether another attempt could succeed.
pub trait Retryable {
    fn should_retry(&self) -> bool;
}

impl Retryable for FetchError {
    fn should_retry(&self) -> bool {
        FetchError::should_retry(self)
    }
}

impl Retryable for GenerationError {
    fn should_retry(&self) -> bool {
        GenerationError::should_retry(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first one.
    max_attempts: u32,
    base_delay: Duration,
    max_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            max_delay,
        }
    }

    /// One attempt, failures are returned as-is.
    pub fn single_attempt() -> Self {
        Self::new(1, Duration::ZERO, Duration::ZERO)
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delay before retry number `retry` (1-based): base * 2^(retry-1),
    /// capped at `max_delay`, with ±25% jitter.
    pub fn delay_for_retry(&self, retry: u32) -> Duration {
        if retry == 0 {
            return Duration::ZERO;
        }
        // Cap the exponent to prevent overflow
        let exponent = (retry - 1).min(16);
        let base = self.base_delay.saturating_mul(2_u32.saturating_pow(exponent));
        let capped = base.min(self.max_delay);
        if capped.is_zero() {
            return capped;
        }

        let jitter_factor = rand::thread_rng().gen_range(0.75..1.25);
        capped.mul_f64(jitter_factor)
    }

    /// Run `operation` until it succeeds, fails with a non-transient error,
    /// or the attempts are used up. The last error is returned.
    pub async fn run<T, E, F, Fut>(&self, label: &str, mut operation: F) -> Result<T, E>
    where
        E: Retryable + std::fmt::Display,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut attempt = 1;
        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(err) if attempt < self.max_attempts && err.should_retry() => {
                    let delay = self.delay_for_retry(attempt);
                    warn!(
                        operation = label,
                        attempt,
                        max_attempts = self.max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "transient failure, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::single_attempt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn policy(attempts: u32) -> RetryPolicy {
        RetryPolicy::new(attempts, Duration::from_millis(1), Duration::from_millis(5))
    }

    #[test]
    fn test_backoff_progression() {
        let policy = RetryPolicy::new(3, Duration::from_millis(400), Duration::from_secs(10));

        let first = policy.delay_for_retry(1).as_millis();
        let second = policy.delay_for_retry(2).as_millis();
        let third = policy.delay_for_retry(3).as_millis();

        assert!((300..=500).contains(&first)); // 400ms ±25%
        assert!((600..=1000).contains(&second)); // 800ms ±25%
        assert!((1200..=2000).contains(&third)); // 1600ms ±25%
        assert_eq!(policy.delay_for_retry(0), Duration::ZERO);
    }

    #[test]
    fn test_backoff_cap() {
        let policy = RetryPolicy::new(3, Duration::from_millis(400), Duration::from_secs(1));
        let delay = policy.delay_for_retry(30);
        assert!(delay.as_millis() >= 750 && delay.as_millis() <= 1250);
    }

    #[test]
    fn test_zero_attempts_means_one() {
        assert_eq!(RetryPolicy::new(0, Duration::ZERO, Duration::ZERO).max_attempts(), 1);
    }

    #[tokio::test]
    async fn retries_transient_errors_until_success() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result: Result<&str, FetchError> = policy(3)
            .run("test", move || async move {
                if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(FetchError::RequestTimeout)
                } else {
                    Ok("done")
                }
            })
            .await;
        assert_eq!(result.unwrap(), "done");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn gives_up_after_max_attempts() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result: Result<(), FetchError> = policy(2)
            .run("test", move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(FetchError::ConnectTimeout)
            })
            .await;
        assert!(matches!(result, Err(FetchError::ConnectTimeout)));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn permanent_errors_are_not_retried() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result: Result<(), GenerationError> = policy(3)
            .run("test", move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(GenerationError::InvalidJson("eof".to_string()))
            })
            .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn single_attempt_never_retries() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let _: Result<(), GenerationError> = RetryPolicy::single_attempt()
            .run("test", move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(GenerationError::Timeout)
            })
            .await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
