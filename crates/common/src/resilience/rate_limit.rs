//! Rate-limit retry executor
//!
//! Retries a request attempt while the server answers `429 Too Many
//! Requests`. Only rate limiting is retried here: transport failures return
//! immediately and every other status, successful or not, is returned for
//! the caller to interpret.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};

use super::backoff::ExponentialBackoff;
use super::cancel::sleep_or_cancel;

/// HTTP status code for Too Many Requests
pub const TOO_MANY_REQUESTS: u16 = 429;

/// A response the executor can inspect and throw away.
#[async_trait]
pub trait RateLimitedResponse: Send + Sized {
    /// Numeric HTTP status of the response
    fn status_code(&self) -> u16;

    /// Read the remaining body and release the response.
    async fn discard(self);

    fn is_rate_limited(&self) -> bool {
        self.status_code() == TOO_MANY_REQUESTS
    }
}

/// Errors that end a rate-limited execution
#[derive(Debug, Error)]
pub enum RateLimitError<R, E> {
    /// Every attempt was answered with 429. The last response is handed
    /// back alongside the error; its body has not been read.
    #[error("exceeded max retries for 429 (Too Many Requests) status code (attempts: {attempts})")]
    Exhausted { attempts: u32, last_response: R },

    /// The attempt itself failed; never retried
    #[error("request attempt failed: {0}")]
    Transport(E),

    /// The cancellation token fired during a backoff wait
    #[error("cancelled while waiting to retry a rate-limited request")]
    Cancelled,
}

impl<R, E> RateLimitError<R, E> {
    /// Attempt count of an exhausted execution
    pub fn attempts(&self) -> Option<u32> {
        match self {
            Self::Exhausted { attempts, .. } => Some(*attempts),
            Self::Transport(_) | Self::Cancelled => None,
        }
    }
}

/// Attempt bound and initial delay for [`RateLimitRetry`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitPolicy {
    /// Total number of attempts, initial try included; at least 1
    pub attempts: u32,
    /// Wait before the second attempt; doubles for every further attempt
    pub base_delay: Duration,
}

impl Default for RateLimitPolicy {
    fn default() -> Self {
        Self { attempts: 5, base_delay: Duration::from_secs(1) }
    }
}

impl RateLimitPolicy {
    pub fn new(attempts: u32, base_delay: Duration) -> Self {
        Self { attempts: attempts.max(1), base_delay }
    }
}

/// Executes an attempt function under the rate-limit policy
#[derive(Debug, Clone, Default)]
pub struct RateLimitRetry {
    policy: RateLimitPolicy,
}

impl RateLimitRetry {
    pub fn new(policy: RateLimitPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &RateLimitPolicy {
        &self.policy
    }

    /// Run `attempt` until it yields a non-429 response, fails, or the
    /// attempt budget is spent.
    ///
    /// `attempt` is invoked at most `policy.attempts` times, strictly one
    /// after another. Between attempts the executor sleeps for the jittered
    /// backoff; if `cancel` fires during that sleep it returns
    /// [`RateLimitError::Cancelled`] without invoking `attempt` again.
    ///
    /// # Errors
    ///
    /// - [`RateLimitError::Transport`] when `attempt` fails
    /// - [`RateLimitError::Exhausted`] when every attempt was rate limited
    /// - [`RateLimitError::Cancelled`] when cancelled during a backoff wait
    #[instrument(skip_all, fields(max_attempts = self.policy.attempts))]
    pub async fn execute<F, Fut, R, E>(
        &self,
        cancel: &CancellationToken,
        mut attempt: F,
    ) -> Result<R, RateLimitError<R, E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<R, E>>,
        R: RateLimitedResponse,
        E: fmt::Display,
    {
        let attempts = self.policy.attempts.max(1);
        let mut backoff = ExponentialBackoff::new(self.policy.base_delay);
        let mut made = 0u32;

        loop {
            if made > 0 {
                let delay = backoff.next_delay();
                warn!(attempt = made + 1, max_attempts = attempts, ?delay, "rate limited, backing off");
                if sleep_or_cancel(delay, cancel).await.is_err() {
                    debug!(attempts = made, "backoff wait cancelled");
                    return Err(RateLimitError::Cancelled);
                }
            }

            let response = match attempt().await {
                Ok(response) => response,
                Err(err) => {
                    debug!(attempt = made + 1, error = %err, "request attempt failed");
                    return Err(RateLimitError::Transport(err));
                }
            };
            made += 1;

            if !response.is_rate_limited() {
                if made > 1 {
                    debug!(attempts = made, status = response.status_code(), "rate limit cleared");
                }
                return Ok(response);
            }

            if made >= attempts {
                warn!(attempts = made, "exceeded max retries for 429 (Too Many Requests)");
                return Err(RateLimitError::Exhausted { attempts: made, last_response: response });
            }

            response.discard().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::convert::Infallible;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    use super::*;

    #[derive(Debug)]
    struct FakeResponse {
        status: u16,
        discarded: Arc<AtomicU32>,
    }

    #[async_trait]
    impl RateLimitedResponse for FakeResponse {
        fn status_code(&self) -> u16 {
            self.status
        }

        async fn discard(self) {
            self.discarded.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn executor(attempts: u32) -> RateLimitRetry {
        RateLimitRetry::new(RateLimitPolicy::new(attempts, Duration::from_millis(100)))
    }

    #[test]
    fn test_policy_clamps_zero_attempts() {
        assert_eq!(RateLimitPolicy::new(0, Duration::ZERO).attempts, 1);
        assert_eq!(RateLimitPolicy::default().attempts, 5);
        assert_eq!(RateLimitPolicy::default().base_delay, Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_error_status_is_returned_without_retry() {
        let calls = Arc::new(AtomicU32::new(0));
        let discarded = Arc::new(AtomicU32::new(0));
        let start = tokio::time::Instant::now();

        let result = executor(5)
            .execute(&CancellationToken::new(), || {
                calls.fetch_add(1, Ordering::SeqCst);
                let discarded = discarded.clone();
                async move { Ok::<_, Infallible>(FakeResponse { status: 503, discarded }) }
            })
            .await;

        let response = result.unwrap();
        assert_eq!(response.status, 503);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(discarded.load(Ordering::SeqCst), 0);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transport_failure_is_not_retried() {
        let calls = Arc::new(AtomicU32::new(0));

        let result: Result<FakeResponse, _> = executor(5)
            .execute(&CancellationToken::new(), || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err("connection reset") }
            })
            .await;

        assert!(matches!(result, Err(RateLimitError::Transport("connection reset"))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_recovers_after_rate_limiting() {
        let calls = Arc::new(AtomicU32::new(0));
        let discarded = Arc::new(AtomicU32::new(0));

        let result = executor(5)
            .execute(&CancellationToken::new(), || {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                let discarded = discarded.clone();
                let status = if n < 2 { 429 } else { 200 };
                async move { Ok::<_, Infallible>(FakeResponse { status, discarded }) }
            })
            .await;

        assert_eq!(result.unwrap().status, 200);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(discarded.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhaustion_returns_last_response_with_error() {
        let calls = Arc::new(AtomicU32::new(0));
        let discarded = Arc::new(AtomicU32::new(0));

        let result = executor(3)
            .execute(&CancellationToken::new(), || {
                calls.fetch_add(1, Ordering::SeqCst);
                let discarded = discarded.clone();
                async move { Ok::<_, Infallible>(FakeResponse { status: 429, discarded }) }
            })
            .await;

        let err = result.unwrap_err();
        assert_eq!(err.attempts(), Some(3));
        assert!(err.to_string().contains("exceeded max retries for 429"));
        match err {
            RateLimitError::Exhausted { last_response, .. } => assert_eq!(last_response.status, 429),
            other => panic!("expected exhaustion, got {other:?}"),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        // the last response travels with the error instead of being drained
        assert_eq!(discarded.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_attempt_never_sleeps() {
        let discarded = Arc::new(AtomicU32::new(0));
        let start = tokio::time::Instant::now();

        let result = executor(1)
            .execute(&CancellationToken::new(), || {
                let discarded = discarded.clone();
                async move { Ok::<_, Infallible>(FakeResponse { status: 429, discarded }) }
            })
            .await;

        assert_eq!(result.unwrap_err().attempts(), Some(1));
        assert_eq!(start.elapsed(), Duration::ZERO);
    }
}
