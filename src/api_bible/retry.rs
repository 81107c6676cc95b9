//! Retry-on-503 with exponential backoff.

use std::future::Future;
use std::time::Duration;

use crate::config::Config;
use crate::constants::api;
use crate::error::{Error, FetchContext, Result};

/// Pacing and retry settings applied to every upstream call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Delay before the first retry.
    pub initial_backoff: Duration,
    /// Pause before every call.
    pub delay_between_calls: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: api::DEFAULT_MAX_RETRIES,
            initial_backoff: Duration::from_millis(api::DEFAULT_INITIAL_BACKOFF_MS),
            delay_between_calls: Duration::from_millis(api::DEFAULT_DELAY_BETWEEN_CALLS_MS),
        }
    }
}

impl RetryPolicy {
    /// Build from configuration.
    pub const fn from_config(config: &Config) -> Self {
        Self {
            max_retries: config.max_retries,
            initial_backoff: Duration::from_millis(config.initial_backoff_ms),
            delay_between_calls: Duration::from_millis(config.delay_between_calls_ms),
        }
    }

    /// Backoff before retry number `attempt + 1`.
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.initial_backoff.saturating_mul(2u32.saturating_pow(attempt))
    }
}

/// Run `request` until it succeeds, fails with a non-503 error, or retries run out.
///
/// A 503 on the final attempt becomes [`Error::ServiceUnavailable`]; every other
/// error is returned as-is on first sight.
pub async fn retry_on_503<T, F, Fut>(
    policy: &RetryPolicy,
    context: &FetchContext,
    mut request: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    for attempt in 0..=policy.max_retries {
        match request().await {
            Ok(value) => return Ok(value),
            Err(e) if e.status() == Some(503) && attempt < policy.max_retries => {
                let backoff = policy.backoff(attempt);
                tracing::debug!("{context} returned 503, retrying in {backoff:?} (attempt {})", attempt + 1);
                tokio::time::sleep(backoff).await;
            }
            Err(e) if e.status() == Some(503) => {
                tracing::warn!("{context} still unavailable after {} attempts", attempt + 1);
                return Err(Error::ServiceUnavailable {
                    context: context.clone(),
                    attempts: attempt + 1,
                });
            }
            Err(e) => return Err(e),
        }
    }

    Err(Error::ServiceUnavailable {
        context: context.clone(),
        attempts: policy.max_retries + 1,
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast_policy(max_retries: u32) -> RetryPolicy {
        RetryPolicy {
            max_retries,
            initial_backoff: Duration::from_millis(1),
            delay_between_calls: Duration::ZERO,
        }
    }

    fn context() -> FetchContext {
        FetchContext::Bibles { language: Some("eng".into()) }
    }

    fn unavailable() -> Error {
        Error::api_status(context(), 503, "Service Unavailable")
    }

    #[test]
    fn test_backoff_doubles() {
        let policy = RetryPolicy {
            initial_backoff: Duration::from_millis(300),
            ..RetryPolicy::default()
        };
        assert_eq!(policy.backoff(0), Duration::from_millis(300));
        assert_eq!(policy.backoff(1), Duration::from_millis(600));
        assert_eq!(policy.backoff(2), Duration::from_millis(1200));
    }

    #[tokio::test]
    async fn test_succeeds_after_transient_503() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result = retry_on_503(&fast_policy(3), &context(), move || async move {
            if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                Err(unavailable())
            } else {
                Ok("ok")
            }
        })
        .await;
        assert_eq!(result.unwrap(), "ok");
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_exhausted_retries_become_service_unavailable() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result: Result<()> = retry_on_503(&fast_policy(2), &context(), move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(unavailable())
        })
        .await;
        match result {
            Err(Error::ServiceUnavailable { attempts, .. }) => assert_eq!(attempts, 3),
            other => panic!("expected ServiceUnavailable, got {other:?}"),
        }
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_other_errors_are_not_retried() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result: Result<()> = retry_on_503(&fast_policy(3), &context(), move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(Error::api_status(context(), 401, "Unauthorized"))
        })
        .await;
        assert!(matches!(result, Err(Error::Api { status: 401, .. })));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }
}
