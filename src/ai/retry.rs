//! Retry schedule shared by the Gemini capability clients.

use crate::error::GenerationError;
use std::future::Future;
use std::time::Duration;
use tokio_retry::strategy::ExponentialBackoff;
use tokio_retry::RetryIf;

/// Exponential-backoff retry for transient generation failures.
///
/// The first attempt runs immediately; retry `n` (1-indexed) waits
/// `base_delay * 2^(n-1)`. Only failures whose classified kind is retryable
/// (`ServiceUnavailable`, `Unknown`) are attempted again; quota, auth, and
/// parse failures surface on first occurrence.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: usize,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(1000),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: usize, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
        }
    }

    /// The delay schedule between attempts: `base_delay, 2*base_delay, ...`,
    /// one entry per allowed retry.
    pub fn delays(&self) -> impl Iterator<Item = Duration> {
        // ExponentialBackoff yields factor * 2^n for n = 1, 2, ...; scale so
        // the first retry waits exactly `base_delay`.
        let factor = self.base_delay.as_millis() as u64 / 2;
        ExponentialBackoff::from_millis(2)
            .factor(factor)
            .take(self.max_attempts.saturating_sub(1))
    }

    /// Runs `action` under this policy, re-invoking it for retryable
    /// failures until the schedule is exhausted.
    pub async fn run<A, F, T>(&self, action: A) -> Result<T, GenerationError>
    where
        A: FnMut() -> F,
        F: Future<Output = Result<T, GenerationError>>,
    {
        RetryIf::spawn(self.delays(), action, |err: &GenerationError| {
            err.is_retryable()
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{GenerationError, GenerationErrorKind};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::time::Instant;

    fn counter() -> Arc<AtomicUsize> {
        Arc::new(AtomicUsize::new(0))
    }

    #[test]
    fn test_default_delay_schedule() {
        let delays: Vec<Duration> = RetryPolicy::default().delays().collect();
        assert_eq!(
            delays,
            vec![Duration::from_millis(1000), Duration::from_millis(2000)]
        );
    }

    #[test]
    fn test_delay_schedule_doubles_from_base() {
        let policy = RetryPolicy::new(4, Duration::from_millis(500));
        let delays: Vec<Duration> = policy.delays().collect();
        assert_eq!(
            delays,
            vec![
                Duration::from_millis(500),
                Duration::from_millis(1000),
                Duration::from_millis(2000)
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_on_first_attempt_makes_one_call() {
        let calls = counter();
        let calls_probe = calls.clone();

        let result = RetryPolicy::default()
            .run(|| {
                let calls = calls.clone();
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, GenerationError>("ok")
                }
            })
            .await;

        assert_eq!(result.unwrap(), "ok");
        assert_eq!(calls_probe.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_failure_exhausts_all_attempts() {
        let calls = counter();
        let calls_probe = calls.clone();
        let started = Instant::now();

        let result: Result<(), GenerationError> = RetryPolicy::default()
            .run(|| {
                let calls = calls.clone();
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err(GenerationError::classify("connection reset"))
                }
            })
            .await;

        let err = result.unwrap_err();
        assert_eq!(err.kind, GenerationErrorKind::Unknown);
        assert_eq!(calls_probe.load(Ordering::SeqCst), 3);
        // 1000ms + 2000ms of backoff under the paused clock.
        let elapsed = started.elapsed();
        assert!(
            elapsed >= Duration::from_millis(3000) && elapsed < Duration::from_millis(3100),
            "unexpected backoff total: {:?}",
            elapsed
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_quota_exceeded_fails_without_retry() {
        let calls = counter();
        let calls_probe = calls.clone();

        let result: Result<(), GenerationError> = RetryPolicy::default()
            .run(|| {
                let calls = calls.clone();
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err(GenerationError::classify("status 429"))
                }
            })
            .await;

        assert_eq!(result.unwrap_err().kind, GenerationErrorKind::QuotaExceeded);
        assert_eq!(calls_probe.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_auth_error_fails_without_retry() {
        let calls = counter();
        let calls_probe = calls.clone();

        let result: Result<(), GenerationError> = RetryPolicy::default()
            .run(|| {
                let calls = calls.clone();
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err(GenerationError::classify("status 401"))
                }
            })
            .await;

        assert_eq!(result.unwrap_err().kind, GenerationErrorKind::AuthError);
        assert_eq!(calls_probe.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_recovers_after_transient_failure() {
        let calls = counter();
        let calls_probe = calls.clone();
        let started = Instant::now();

        let result = RetryPolicy::default()
            .run(|| {
                let calls = calls.clone();
                async move {
                    if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                        Err(GenerationError::classify("status 503"))
                    } else {
                        Ok("recovered")
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), "recovered");
        assert_eq!(calls_probe.load(Ordering::SeqCst), 2);
        // One backoff interval before the successful second attempt.
        assert!(started.elapsed() >= Duration::from_millis(1000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_parse_error_fails_without_retry() {
        let calls = counter();
        let calls_probe = calls.clone();

        let result: Result<(), GenerationError> = RetryPolicy::default()
            .run(|| {
                let calls = calls.clone();
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err(GenerationError::parse("Failed to parse question format"))
                }
            })
            .await;

        assert_eq!(result.unwrap_err().kind, GenerationErrorKind::ParseError);
        assert_eq!(calls_probe.load(Ordering::SeqCst), 1);
    }
}
