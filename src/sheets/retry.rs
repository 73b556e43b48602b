//! Retry policy for writes against the remote store.
//!
//! The store's script runtime sheds load with transient "System busy" /
//! quota errors; those are worth retrying with backoff. Validation
//! rejections are not, and must surface immediately.

use std::future::Future;
use std::time::Duration;

use once_cell::sync::Lazy;
use rand::Rng;
use regex::Regex;
use tracing::warn;

use crate::errors::ServiceError;

static TRANSIENT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)busy|quota|rate|timeout|429|503").expect("transient pattern is valid")
});

/// True when an error message looks like a transient store failure.
pub fn is_transient_message(message: &str) -> bool {
    TRANSIENT_RE.is_match(message)
}

/// Bounded exponential backoff with jitter.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub max_jitter: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(1500),
            max_delay: Duration::from_millis(6000),
            max_jitter: Duration::from_millis(300),
        }
    }
}

impl RetryPolicy {
    /// Backoff before retrying after the given 1-based attempt.
    fn backoff_for(&self, attempt: u32) -> Duration {
        let exp = self
            .base_delay
            .saturating_mul(2u32.saturating_pow(attempt.saturating_sub(1)));
        let capped = exp.min(self.max_delay);
        let jitter_ms = rand::thread_rng().gen_range(0..=self.max_jitter.as_millis() as u64);
        capped + Duration::from_millis(jitter_ms)
    }

    /// Runs `op` up to `max_attempts` times. Only transient errors are
    /// retried; anything else fails on the spot. The final transient error
    /// is returned once attempts are exhausted.
    pub async fn run<T, F, Fut>(&self, label: &str, mut op: F) -> Result<T, ServiceError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ServiceError>>,
    {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    let retryable = err.is_transient();
                    warn!(
                        label,
                        attempt,
                        max_attempts = self.max_attempts,
                        retryable,
                        error = %err,
                        "store write attempt failed"
                    );
                    if !retryable || attempt >= self.max_attempts {
                        return Err(err);
                    }
                    tokio::time::sleep(self.backoff_for(attempt)).await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn instant_policy() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(2),
            max_jitter: Duration::from_millis(1),
        }
    }

    #[test]
    fn transient_pattern_is_case_insensitive() {
        assert!(is_transient_message("System BUSY, try later"));
        assert!(is_transient_message("Quota exceeded"));
        assert!(is_transient_message("HTTP 503"));
        assert!(is_transient_message("rate limit"));
        assert!(!is_transient_message("Invalid field"));
    }

    #[tokio::test]
    async fn persistent_transient_failure_uses_all_attempts() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = instant_policy()
            .run("test", || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(ServiceError::Transient("System busy".into())) }
            })
            .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn permanent_failure_is_attempted_once() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = instant_policy()
            .run("test", || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(ServiceError::Store("Invalid field".into())) }
            })
            .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn recovery_stops_retrying() {
        let calls = AtomicU32::new(0);
        let result = instant_policy()
            .run("test", || {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n == 0 {
                        Err(ServiceError::Transient("busy".into()))
                    } else {
                        Ok(n)
                    }
                }
            })
            .await;
        assert_eq!(result.unwrap(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn backoff_doubles_and_caps() {
        let policy = RetryPolicy {
            max_attempts: 5,
            base_delay: Duration::from_millis(1500),
            max_delay: Duration::from_millis(6000),
            max_jitter: Duration::from_millis(0),
        };
        assert_eq!(policy.backoff_for(1), Duration::from_millis(1500));
        assert_eq!(policy.backoff_for(2), Duration::from_millis(3000));
        assert_eq!(policy.backoff_for(3), Duration::from_millis(6000));
        assert_eq!(policy.backoff_for(4), Duration::from_millis(6000));
    }
}
