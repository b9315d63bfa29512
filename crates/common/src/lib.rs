//! Shared runtime utilities for the Confluence client crates.
//!
//! # Modules
//!
//! - `resilience`: the two-tier retry used for every API call. A
//!   rate-limit executor retries 429 responses with exponential backoff and
//!   jitter; a recovery loop re-runs whole rounds after a cool-down when the
//!   executor gives up.
//!
//! # Features
//!
//! - `http`: implements [`resilience::RateLimitedResponse`] for
//!   `reqwest::Response`.

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

pub mod resilience;

// Re-export commonly used types and traits for convenience
pub use resilience::{
    sleep_or_cancel, Cancelled, RateLimitError, RateLimitPolicy, RateLimitRetry,
    RateLimitedResponse, RecoveryPolicy, TieredRetry,
};
