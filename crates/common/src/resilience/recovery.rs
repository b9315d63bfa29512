//! Outer retry tier
//!
//! When the rate-limit executor gives up, the whole operation is given a
//! fixed cool-down and started again from scratch. Rounds repeat until the
//! server stops answering 429, the optional round limit is hit, or the
//! cancellation token fires.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};

use super::cancel::sleep_or_cancel;
use super::rate_limit::{RateLimitError, RateLimitPolicy, RateLimitRetry, RateLimitedResponse};

/// Cool-down and round limit of the outer tier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoveryPolicy {
    /// Fixed wait between rounds
    pub cool_down: Duration,
    /// Maximum number of rounds; `None` retries forever
    pub max_rounds: Option<u32>,
}

impl Default for RecoveryPolicy {
    fn default() -> Self {
        Self { cool_down: Duration::from_secs(1), max_rounds: None }
    }
}

/// Rate-limit executor wrapped in the recovery loop
///
/// Every round invokes the same attempt function, so the request must be
/// rebuilt inside it rather than captured pre-built.
#[derive(Debug, Clone, Default)]
pub struct TieredRetry {
    executor: RateLimitRetry,
    recovery: RecoveryPolicy,
}

impl TieredRetry {
    pub fn new(policy: RateLimitPolicy, recovery: RecoveryPolicy) -> Self {
        Self { executor: RateLimitRetry::new(policy), recovery }
    }

    pub fn executor(&self) -> &RateLimitRetry {
        &self.executor
    }

    pub fn recovery(&self) -> &RecoveryPolicy {
        &self.recovery
    }

    /// Run `attempt` through the executor, starting a new round after the
    /// cool-down whenever a round ends rate limited.
    ///
    /// Without a round limit this never returns
    /// [`RateLimitError::Exhausted`]; callers needing a latency bound cancel
    /// the token or wrap the call in a timeout.
    ///
    /// # Errors
    ///
    /// - [`RateLimitError::Transport`] from any attempt, immediately
    /// - [`RateLimitError::Cancelled`] if cancelled during any wait
    /// - [`RateLimitError::Exhausted`] when `max_rounds` rounds were all rate
    ///   limited
    #[instrument(skip_all, fields(max_rounds = ?self.recovery.max_rounds))]
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
        let mut round = 0u32;

        loop {
            round += 1;

            match self.executor.execute(cancel, &mut attempt).await {
                Err(RateLimitError::Exhausted { attempts, last_response }) => {
                    if self.recovery.max_rounds.is_some_and(|max| round >= max) {
                        warn!(round, attempts, "rate limited in every round, giving up");
                        return Err(RateLimitError::Exhausted { attempts, last_response });
                    }

                    last_response.discard().await;
                    warn!(round, cool_down = ?self.recovery.cool_down, "still rate limited, starting a new round after cool-down");

                    if sleep_or_cancel(self.recovery.cool_down, cancel).await.is_err() {
                        debug!(round, "cool-down cancelled");
                        return Err(RateLimitError::Cancelled);
                    }
                }
                other => return other,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::convert::Infallible;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;

    use super::*;

    #[derive(Debug)]
    struct Status(u16);

    #[async_trait]
    impl RateLimitedResponse for Status {
        fn status_code(&self) -> u16 {
            self.0
        }

        async fn discard(self) {}
    }

    fn tiered(attempts: u32, max_rounds: Option<u32>) -> TieredRetry {
        TieredRetry::new(
            RateLimitPolicy::new(attempts, Duration::from_millis(10)),
            RecoveryPolicy { cool_down: Duration::from_secs(1), max_rounds },
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_round_after_executor_gives_up() {
        let calls = Arc::new(AtomicU32::new(0));

        let result = tiered(2, None)
            .execute(&CancellationToken::new(), || {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move { Ok::<_, Infallible>(Status(if n < 5 { 429 } else { 200 })) }
            })
            .await;

        assert_eq!(result.unwrap().0, 200);
        // rounds of two attempts: 429 429 | 429 429 | 429 200
        assert_eq!(calls.load(Ordering::SeqCst), 6);
    }

    #[tokio::test(start_paused = true)]
    async fn test_round_limit_surfaces_exhaustion() {
        let calls = Arc::new(AtomicU32::new(0));

        let result = tiered(3, Some(2))
            .execute(&CancellationToken::new(), || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok::<_, Infallible>(Status(429)) }
            })
            .await;

        assert_eq!(result.unwrap_err().attempts(), Some(3));
        assert_eq!(calls.load(Ordering::SeqCst), 6);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cool_down_waits_the_fixed_interval() {
        let calls = Arc::new(AtomicU32::new(0));
        let start = tokio::time::Instant::now();

        let result = TieredRetry::new(
            RateLimitPolicy::new(1, Duration::ZERO),
            RecoveryPolicy { cool_down: Duration::from_secs(1), max_rounds: None },
        )
        .execute(&CancellationToken::new(), || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move { Ok::<_, Infallible>(Status(if n < 3 { 429 } else { 204 })) }
        })
        .await;

        assert_eq!(result.unwrap().0, 204);
        assert_eq!(start.elapsed(), Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_during_cool_down_stops_rounds() {
        let calls = Arc::new(AtomicU32::new(0));
        let token = CancellationToken::new();
        let canceller = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(500)).await;
            canceller.cancel();
        });

        let result = TieredRetry::new(
            RateLimitPolicy::new(1, Duration::ZERO),
            RecoveryPolicy::default(),
        )
        .execute(&token, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok::<_, Infallible>(Status(429)) }
        })
        .await;

        assert!(matches!(result, Err(RateLimitError::Cancelled)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
