//! Resilience patterns for rate-limited HTTP APIs
//!
//! Two tiers of retry, both driven only by `429 Too Many Requests`:
//! - **Rate-limit executor** ([`RateLimitRetry`]): repeats a single request
//!   attempt with exponential backoff and jitter while the server keeps
//!   answering 429. Any other response, error statuses included, is handed
//!   back untouched.
//! - **Recovery loop** ([`TieredRetry`]): when the executor runs out of
//!   attempts, waits a fixed cool-down and starts a fresh round, rebuilding
//!   the request from scratch. Unbounded unless a round limit is set.
//!
//! Both waits race a [`CancellationToken`](tokio_util::sync::CancellationToken);
//! a cancelled wait returns immediately without issuing another request.
//!
//! The executor is generic over the response type through
//! [`RateLimitedResponse`] so it can be exercised without a network.

pub mod backoff;
pub mod cancel;
#[cfg(feature = "http")]
pub mod http;
pub mod rate_limit;
pub mod recovery;

pub use backoff::{jittered, ExponentialBackoff};
pub use cancel::{sleep_or_cancel, Cancelled};
pub use rate_limit::{RateLimitError, RateLimitPolicy, RateLimitRetry, RateLimitedResponse};
pub use recovery::{RecoveryPolicy, TieredRetry};
