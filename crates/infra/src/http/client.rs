use std::time::Duration;

use confluence_domain::constants::{DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT};
use confluence_domain::ConfluenceError;
use reqwest::{Client as ReqwestClient, Method, RequestBuilder, Response};
use tracing::debug;

use crate::errors::InfraError;

/// HTTP client performing single request attempts.
///
/// Retrying is left to the caller; see `confluence_common::resilience`.
#[derive(Clone)]
pub struct HttpClient {
    client: ReqwestClient,
}

impl HttpClient {
    /// Start building a new HTTP client.
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    /// Create a request builder using the underlying reqwest client.
    pub fn request<U>(&self, method: Method, url: U) -> RequestBuilder
    where
        U: reqwest::IntoUrl,
    {
        self.client.request(method, url)
    }

    /// Send one request. Any HTTP status is a successful send; only
    /// transport failures are errors.
    pub async fn send(&self, builder: RequestBuilder) -> Result<Response, ConfluenceError> {
        let request = builder.build().map_err(|err| ConfluenceError::from(InfraError::from(err)))?;

        let method = request.method().clone();
        let url = request.url().clone();
        debug!(%method, %url, "sending HTTP request");

        match self.client.execute(request).await {
            Ok(response) => {
                debug!(%method, %url, status = %response.status(), "received HTTP response");
                Ok(response)
            }
            Err(err) => {
                debug!(%method, %url, error = %err, "HTTP request failed");
                Err(InfraError::from(err).into())
            }
        }
    }
}

/// Builder for [`HttpClient`].
#[derive(Debug)]
pub struct HttpClientBuilder {
    timeout: Duration,
    user_agent: Option<String>,
    no_proxy: bool,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: None,
            no_proxy: false,
        }
    }
}

impl HttpClientBuilder {
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Ignore proxy settings from the environment.
    pub fn no_proxy(mut self) -> Self {
        self.no_proxy = true;
        self
    }

    pub fn build(self) -> Result<HttpClient, ConfluenceError> {
        let agent = self.user_agent.unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());
        let mut builder = ReqwestClient::builder().timeout(self.timeout).user_agent(agent);

        if self.no_proxy {
            builder = builder.no_proxy();
        }

        let client = builder.build().map_err(|err| ConfluenceError::from(InfraError::from(err)))?;

        Ok(HttpClient { client })
    }
}
