//! # Confluence Domain
//!
//! Domain types and models for the Confluence client.
//!
//! This crate contains:
//! - Content types returned by the service (pages, spaces, attachments,
//!   labels, users)
//! - The client error taxonomy and Result alias
//! - Configuration structures
//! - Endpoint and retry constants
//!
//! ## Architecture
//! - No dependencies on other workspace crates
//! - No I/O; only data structures and their invariants

pub mod config;
pub mod constants;
pub mod errors;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
