//! [`RateLimitedResponse`] for `reqwest`

use async_trait::async_trait;

use super::rate_limit::RateLimitedResponse;

#[async_trait]
impl RateLimitedResponse for reqwest::Response {
    fn status_code(&self) -> u16 {
        self.status().as_u16()
    }

    async fn discard(self) {
        // Reading to the end lets the connection go back to the pool.
        if let Err(err) = self.bytes().await {
            tracing::debug!(error = %err, "failed to drain discarded response body");
        }
    }
}
