//! Confluence API client
//!
//! Holds the transport, credentials and retry tiers shared by every
//! operation. The operations themselves live in the sibling modules as
//! further `impl ConfluenceClient` blocks.

use std::sync::Arc;
use std::time::Duration;

use confluence_common::resilience::{
    RateLimitError, RateLimitPolicy, RateLimitedResponse, RecoveryPolicy, TieredRetry,
};
use confluence_domain::constants::{CLOUD_HOST_SUFFIXES, JSON_RPC_PATH, REST_API_PATH};
use confluence_domain::{ClientConfig, ConfluenceError, Result};
use reqwest::Response;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use url::Url;

use super::auth::Credentials;
use super::request::{Endpoint, RequestSpec};
use crate::http::HttpClient;

struct ClientInner {
    http: HttpClient,
    credentials: Credentials,
    base_url: String,
    rest_url: String,
    rpc_url: String,
    host: String,
    retry: TieredRetry,
}

/// Typed client for one Confluence instance
///
/// Cloning is cheap; clones share the transport and settings. Every request
/// runs through the two retry tiers and can be aborted during a retry wait
/// through the client's cancellation token.
#[derive(Clone)]
pub struct ConfluenceClient {
    inner: Arc<ClientInner>,
    cancel: CancellationToken,
}

impl std::fmt::Debug for ConfluenceClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfluenceClient")
            .field("base_url", &self.inner.base_url)
            .field("credentials", &self.inner.credentials)
            .field("retry", &self.inner.retry)
            .finish_non_exhaustive()
    }
}

impl ConfluenceClient {
    pub fn builder() -> ConfluenceClientBuilder {
        ConfluenceClientBuilder::default()
    }

    /// Build a client from loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfluenceError::Config`] when the base URL is missing or
    /// invalid.
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let mut builder = Self::builder()
            .base_url(&config.base_url)
            .credentials(Credentials::from_parts(&config.username, &config.password))
            .timeout(config.timeout())
            .rate_limit(RateLimitPolicy::new(config.retry.attempts, config.retry.base_delay()))
            .recovery(RecoveryPolicy {
                cool_down: config.retry.cool_down(),
                max_rounds: config.retry.max_rounds,
            });

        if let Some(agent) = &config.user_agent {
            builder = builder.user_agent(agent);
        }

        builder.build()
    }

    /// A clone whose requests are cancelled through `token`.
    pub fn with_cancellation(&self, token: CancellationToken) -> Self {
        Self { inner: Arc::clone(&self.inner), cancel: token }
    }

    /// Instance root without a trailing slash
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// True for Atlassian-hosted instances, which need the cloud variants of
    /// some operations.
    pub fn is_cloud(&self) -> bool {
        CLOUD_HOST_SUFFIXES.iter().any(|suffix| self.inner.host.ends_with(suffix))
    }

    /// Send a request through both retry tiers.
    ///
    /// Returns the first response that is not rate limited, whatever its
    /// status.
    pub(crate) async fn send(&self, spec: &RequestSpec) -> Result<Response> {
        let inner = &*self.inner;
        let root = match spec.endpoint() {
            Endpoint::Rest => inner.rest_url.as_str(),
            Endpoint::JsonRpc => inner.rpc_url.as_str(),
        };

        let outcome = inner
            .retry
            .execute(&self.cancel, move || async move {
                let builder = spec.to_builder(&inner.http, root, &inner.credentials)?;
                inner.http.send(builder).await
            })
            .await;

        match outcome {
            Ok(response) => Ok(response),
            Err(RateLimitError::Exhausted { attempts, last_response }) => {
                last_response.discard().await;
                warn!(method = %spec.method(), path = spec.path(), attempts, "giving up on rate-limited request");
                Err(ConfluenceError::RateLimitExhausted { attempts })
            }
            Err(RateLimitError::Transport(err)) => Err(err),
            Err(RateLimitError::Cancelled) => {
                debug!(method = %spec.method(), path = spec.path(), "request cancelled");
                Err(ConfluenceError::Cancelled)
            }
        }
    }
}

/// Builder for [`ConfluenceClient`]
#[derive(Debug)]
pub struct ConfluenceClientBuilder {
    base_url: Option<String>,
    credentials: Credentials,
    timeout: Option<Duration>,
    user_agent: Option<String>,
    rate_limit: RateLimitPolicy,
    recovery: RecoveryPolicy,
    no_proxy: bool,
    cancel: Option<CancellationToken>,
}

impl Default for ConfluenceClientBuilder {
    fn default() -> Self {
        Self {
            base_url: None,
            credentials: Credentials::Anonymous,
            timeout: None,
            user_agent: None,
            rate_limit: RateLimitPolicy::default(),
            recovery: RecoveryPolicy::default(),
            no_proxy: false,
            cancel: None,
        }
    }
}

impl ConfluenceClientBuilder {
    /// Instance root, e.g. `https://example.atlassian.net/wiki`
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = credentials;
        self
    }

    /// Per-attempt timeout of the transport
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Attempts and base delay of the inner retry tier
    pub fn rate_limit(mut self, policy: RateLimitPolicy) -> Self {
        self.rate_limit = policy;
        self
    }

    /// Cool-down and round limit of the outer retry tier
    pub fn recovery(mut self, policy: RecoveryPolicy) -> Self {
        self.recovery = policy;
        self
    }

    /// Ignore proxy settings from the environment.
    pub fn no_proxy(mut self) -> Self {
        self.no_proxy = true;
        self
    }

    pub fn cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// # Errors
    ///
    /// Returns [`ConfluenceError::Config`] when no base URL was set or it
    /// does not parse as an absolute URL with a host.
    pub fn build(self) -> Result<ConfluenceClient> {
        let raw = self
            .base_url
            .ok_or_else(|| ConfluenceError::Config("base URL is required".to_string()))?;
        let base_url = raw.trim_end_matches('/').to_string();

        let parsed = Url::parse(&base_url)
            .map_err(|err| ConfluenceError::Config(format!("invalid base URL {raw:?}: {err}")))?;
        let host = parsed
            .host_str()
            .ok_or_else(|| ConfluenceError::Config(format!("base URL {raw:?} has no host")))?
            .to_string();

        let mut http = HttpClient::builder();
        if let Some(timeout) = self.timeout {
            http = http.timeout(timeout);
        }
        if let Some(agent) = self.user_agent {
            http = http.user_agent(agent);
        }
        if self.no_proxy {
            http = http.no_proxy();
        }

        debug!(%base_url, credentials = ?self.credentials, "building Confluence client");

        Ok(ConfluenceClient {
            inner: Arc::new(ClientInner {
                http: http.build()?,
                credentials: self.credentials,
                rest_url: format!("{base_url}{REST_API_PATH}"),
                rpc_url: format!("{base_url}{JSON_RPC_PATH}"),
                base_url,
                host,
                retry: TieredRetry::new(self.rate_limit, self.recovery),
            }),
            cancel: self.cancel.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use confluence_domain::ErrorCategory;

    use super::*;

    #[test]
    fn test_build_requires_base_url() {
        let err = ConfluenceClient::builder().build().unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Config);
    }

    #[test]
    fn test_build_rejects_relative_url() {
        let err = ConfluenceClient::builder().base_url("wiki/rest").build().unwrap_err();
        assert!(matches!(err, ConfluenceError::Config(msg) if msg.contains("invalid base URL")));
    }

    #[test]
    fn test_trailing_slash_is_trimmed() {
        let client = ConfluenceClient::builder()
            .base_url("https://wiki.example.com/confluence/")
            .no_proxy()
            .build()
            .unwrap();

        assert_eq!(client.base_url(), "https://wiki.example.com/confluence");
        assert_eq!(client.inner.rest_url, "https://wiki.example.com/confluence/rest/api");
        assert_eq!(
            client.inner.rpc_url,
            "https://wiki.example.com/confluence/rpc/json-rpc/confluenceservice-v2"
        );
    }

    #[test]
    fn test_cloud_detection_by_host() {
        for (url, cloud) in [
            ("https://acme.atlassian.net/wiki", true),
            ("https://acme.jira.com", true),
            ("https://wiki.acme.com", false),
            ("https://atlassian.net.acme.com", false),
        ] {
            let client = ConfluenceClient::builder().base_url(url).no_proxy().build().unwrap();
            assert_eq!(client.is_cloud(), cloud, "{url}");
        }
    }

    #[test]
    fn test_from_config_applies_retry_settings() {
        let mut config = ClientConfig::new("https://wiki.example.com");
        config.retry.attempts = 0;
        config.retry.max_rounds = Some(2);

        let client = ConfluenceClient::from_config(&config).unwrap();
        assert_eq!(client.inner.retry.executor().policy().attempts, 1);
        assert_eq!(client.inner.retry.recovery().max_rounds, Some(2));
    }

    #[test]
    fn test_with_cancellation_shares_inner() {
        let client =
            ConfluenceClient::builder().base_url("https://wiki.example.com").no_proxy().build().unwrap();
        let token = CancellationToken::new();
        let bound = client.with_cancellation(token.clone());

        token.cancel();
        assert!(bound.cancellation_token().is_cancelled());
        assert!(!client.cancellation_token().is_cancelled());
        assert!(Arc::ptr_eq(&client.inner, &bound.inner));
    }
}
