//! Error classification for non-success responses
//!
//! Turns a response the operation did not accept into a [`ConfluenceError`].
//! Never called for 429; rate limiting is handled by the retry tiers before a
//! response reaches an operation.

use confluence_domain::ConfluenceError;
use reqwest::{Response, StatusCode};
use tracing::debug;

/// Classify a rejected response, draining its body.
pub async fn classify(response: Response) -> ConfluenceError {
    let status = response.status();
    let body = match response.text().await {
        Ok(body) => body,
        Err(err) => {
            debug!(%status, error = %err, "failed to read error response body");
            String::new()
        }
    };

    classify_status(status, body)
}

/// Map a status and its already-read body to an error.
pub fn classify_status(status: StatusCode, body: String) -> ConfluenceError {
    match status {
        StatusCode::UNAUTHORIZED => ConfluenceError::Unauthorized,
        StatusCode::NOT_FOUND => ConfluenceError::NotFound,
        _ => ConfluenceError::Http {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("Unknown Status").to_string(),
            body,
        },
    }
}
