//! API authentication
//!
//! Confluence accepts either basic credentials (user plus password or API
//! token) or a bearer personal access token. The choice is made once when
//! the client is constructed.

use std::fmt;

use reqwest::RequestBuilder;

/// Credentials attached to every request
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// No `Authorization` header
    Anonymous,
    Basic { username: String, password: String },
    Bearer { token: String },
}

impl Credentials {
    /// Select the auth scheme from a username/password pair.
    ///
    /// A non-empty username selects basic auth. Otherwise a non-empty
    /// password is sent as a bearer token; with neither, requests go out
    /// unauthenticated.
    pub fn from_parts(username: &str, password: &str) -> Self {
        if !username.is_empty() {
            Self::Basic { username: username.to_string(), password: password.to_string() }
        } else if !password.is_empty() {
            Self::Bearer { token: password.to_string() }
        } else {
            Self::Anonymous
        }
    }

    /// Attach the credentials to a request.
    pub fn apply(&self, builder: RequestBuilder) -> RequestBuilder {
        match self {
            Self::Anonymous => builder,
            Self::Basic { username, password } => builder.basic_auth(username, Some(password)),
            Self::Bearer { token } => builder.bearer_auth(token),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Anonymous => f.write_str("Anonymous"),
            Self::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
            Self::Bearer { .. } => f.debug_struct("Bearer").field("token", &"<redacted>").finish(),
        }
    }
}
