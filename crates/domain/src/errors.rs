//! Error types used throughout the client

use thiserror::Error;

/// Broad categories of client errors
///
/// Mirrors the variants of [`ConfluenceError`] without their payloads so
/// callers can branch on the kind of failure after context has been added.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Network-level failure, immediately fatal to the call
    Transport,
    /// Caller aborted the call during a backoff wait
    Cancelled,
    /// Retry budget exhausted while still receiving 429
    RateLimit,
    /// 401 from the service
    Unauthorized,
    /// 404 from the service
    NotFound,
    /// Response body did not match any expected schema
    Decode,
    /// Any other non-success status
    Http,
    /// Successful status whose payload is not usable
    UnexpectedResponse,
    /// Invalid configuration or arguments
    Config,
}

/// Main error type for the Confluence client
#[derive(Error, Debug)]
pub enum ConfluenceError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("exceeded max retries for 429 (Too Many Requests) status code after {attempts} attempts")]
    RateLimitExhausted { attempts: u32 },

    #[error("the Confluence API returned 401 (Unauthorized)")]
    Unauthorized,

    #[error("the Confluence API returned 404 (Not Found)")]
    NotFound,

    #[error("unable to unmarshal JSON response as {schema} response format: {message}: {body}")]
    Decode { schema: &'static str, message: String, body: String },

    #[error("the Confluence API returned {status} {reason}: {body}")]
    Http { status: u16, reason: String, body: String },

    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("{operation} {target}: {source}")]
    Operation {
        operation: &'static str,
        target: String,
        #[source]
        source: Box<ConfluenceError>,
    },
}

impl ConfluenceError {
    /// Wrap the error with the name of the operation and its target.
    pub fn in_operation(self, operation: &'static str, target: impl Into<String>) -> Self {
        Self::Operation { operation, target: target.into(), source: Box::new(self) }
    }

    /// The innermost error, with any operation context stripped.
    pub fn root(&self) -> &Self {
        let mut current = self;
        while let Self::Operation { source, .. } = current {
            current = source;
        }
        current
    }

    /// Get the error category for this error
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Transport(_) => ErrorCategory::Transport,
            Self::Cancelled => ErrorCategory::Cancelled,
            Self::RateLimitExhausted { .. } => ErrorCategory::RateLimit,
            Self::Unauthorized => ErrorCategory::Unauthorized,
            Self::NotFound => ErrorCategory::NotFound,
            Self::Decode { .. } => ErrorCategory::Decode,
            Self::Http { .. } => ErrorCategory::Http,
            Self::UnexpectedResponse(_) => ErrorCategory::UnexpectedResponse,
            Self::Config(_) | Self::InvalidInput(_) => ErrorCategory::Config,
            Self::Operation { source, .. } => source.category(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.category() == ErrorCategory::NotFound
    }

    pub fn is_unauthorized(&self) -> bool {
        self.category() == ErrorCategory::Unauthorized
    }
}

/// Result type alias for Confluence operations
pub type Result<T> = std::result::Result<T, ConfluenceError>;
