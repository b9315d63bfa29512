use std::sync::Once;
use std::time::Duration;

use confluence_common::resilience::{RateLimitPolicy, RecoveryPolicy};
use confluence_infra::{ConfluenceClient, ConfluenceClientBuilder, Credentials};
use wiremock::MockServer;

static TRACING: Once = Once::new();

/// Install a test subscriber once per test binary; output is captured by
/// the test harness.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("confluence_infra=debug,confluence_common=debug")
            .with_test_writer()
            .try_init();
    });
}

/// Client builder pointed at the mock server with retry waits short enough
/// for real-time tests.
pub fn fast_builder(server: &MockServer) -> ConfluenceClientBuilder {
    init_tracing();
    ConfluenceClient::builder()
        .base_url(server.uri())
        .credentials(Credentials::from_parts("alice", "secret"))
        .no_proxy()
        .timeout(Duration::from_secs(5))
        .rate_limit(RateLimitPolicy::new(3, Duration::from_millis(10)))
        .recovery(RecoveryPolicy { cool_down: Duration::from_millis(20), max_rounds: None })
}

pub fn client(server: &MockServer) -> ConfluenceClient {
    fast_builder(server).build().expect("client should build")
}

/// Number of requests the mock server has seen.
pub async fn request_count(server: &MockServer) -> usize {
    server.received_requests().await.map(|requests| requests.len()).unwrap_or_default()
}
