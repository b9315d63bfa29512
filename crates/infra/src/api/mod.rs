//! Confluence API client
//!
//! [`ConfluenceClient`] exposes the REST and JSON-RPC operations of a
//! Confluence instance as typed async methods.
//!
//! # Request path
//!
//! 1. An operation builds an immutable [`RequestSpec`]
//! 2. [`ConfluenceClient`] sends it through the two retry tiers of
//!    `confluence_common::resilience`, rebuilding the request per attempt
//! 3. The first response that is not a 429 goes to [`interpret`], which
//!    decodes accepted statuses and hands the rest to [`errors::classify`]
//!
//! Errors leaving an operation carry its name and target, see
//! [`ConfluenceError::in_operation`](confluence_domain::ConfluenceError::in_operation).

pub mod attachments;
pub mod auth;
pub mod client;
pub mod errors;
pub mod interpret;
pub mod labels;
pub mod pages;
pub mod request;
pub mod restrictions;
pub mod users;

pub use auth::Credentials;
pub use client::{ConfluenceClient, ConfluenceClientBuilder};
pub use interpret::{AttachmentPayload, ExtendedAttachments};
pub use request::{AttachmentUpload, Endpoint, RequestBody, RequestSpec};
