//! # Confluence Infrastructure
//!
//! Everything in the client that performs I/O.
//!
//! This crate contains:
//! - The HTTP transport over `reqwest`
//! - The API client and its typed operations (pages, attachments, labels,
//!   users, restrictions)
//! - Response interpretation and error classification
//! - Configuration loading from the environment or files
//!
//! ## Architecture
//! - Domain types and errors come from `confluence-domain`
//! - Every request runs through the two-tier rate-limit retry from
//!   `confluence-common`

pub mod api;
pub mod config;
pub mod errors;
pub mod http;

// Re-export commonly used items
pub use api::{ConfluenceClient, ConfluenceClientBuilder, Credentials};
pub use errors::InfraError;
pub use http::{HttpClient, HttpClientBuilder};
