//! Client constants
//!
//! Centralized location for endpoint paths and retry defaults used
//! throughout the workspace.

// Endpoint roots, relative to the configured base URL
pub const REST_API_PATH: &str = "/rest/api";
pub const JSON_RPC_PATH: &str = "/rpc/json-rpc/confluenceservice-v2";

// Retry executor defaults
pub const DEFAULT_RETRY_ATTEMPTS: u32 = 5;
pub const DEFAULT_RETRY_BASE_DELAY_MS: u64 = 1_000;

// Outer retry tier
pub const DEFAULT_COOL_DOWN_MS: u64 = 1_000;

// Transport
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_USER_AGENT: &str = concat!("confluence-client/", env!("CARGO_PKG_VERSION"));

// Listing limits
pub const ATTACHMENT_LIST_LIMIT: &str = "1000";

// Hosts whose instances use the cloud restriction API
pub const CLOUD_HOST_SUFFIXES: &[&str] = &["jira.com", "atlassian.net"];

// Header required by attachment uploads
pub const ATLASSIAN_TOKEN_HEADER: &str = "X-Atlassian-Token";
pub const ATLASSIAN_TOKEN_NO_CHECK: &str = "no-check";
