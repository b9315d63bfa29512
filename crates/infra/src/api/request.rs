//! Per-call request configuration
//!
//! A [`RequestSpec`] is built once per operation call and never mutated
//! afterwards. Each attempt turns it into a fresh `reqwest` request, so a
//! retried or re-run request is identical to the first one.

use confluence_domain::constants::{ATLASSIAN_TOKEN_HEADER, ATLASSIAN_TOKEN_NO_CHECK};
use confluence_domain::{ConfluenceError, Result};
use reqwest::multipart::{Form, Part};
use reqwest::{Method, RequestBuilder};
use serde_json::Value;

use super::auth::Credentials;
use crate::errors::InfraError;
use crate::http::HttpClient;

/// API surface a request is addressed to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// `/rest/api`
    Rest,
    /// `/rpc/json-rpc/confluenceservice-v2`, only used for permissions on
    /// server instances
    JsonRpc,
}

/// File upload sent as `multipart/form-data`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentUpload {
    pub file_name: String,
    pub comment: String,
    pub content: Vec<u8>,
}

impl AttachmentUpload {
    fn to_form(&self) -> Result<Form> {
        let part = Part::bytes(self.content.clone())
            .file_name(self.file_name.clone())
            .mime_str("application/octet-stream")
            .map_err(|err| ConfluenceError::from(InfraError::from(err)))?;

        Ok(Form::new().part("file", part).text("comment", self.comment.clone()))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Empty,
    Json(Value),
    Attachment(AttachmentUpload),
}

/// Immutable description of one API request
#[derive(Debug, Clone, PartialEq)]
pub struct RequestSpec {
    method: Method,
    endpoint: Endpoint,
    path: String,
    query: Vec<(&'static str, String)>,
    body: RequestBody,
}

impl RequestSpec {
    pub fn new(method: Method, endpoint: Endpoint, path: impl Into<String>) -> Self {
        Self { method, endpoint, path: path.into(), query: Vec::new(), body: RequestBody::Empty }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, Endpoint::Rest, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, Endpoint::Rest, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, Endpoint::Rest, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, Endpoint::Rest, path)
    }

    /// POST to a JSON-RPC method
    pub fn rpc(method_name: &str) -> Self {
        Self::new(Method::POST, Endpoint::JsonRpc, method_name)
    }

    pub fn query(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.query.push((key, value.into()));
        self
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = RequestBody::Json(body);
        self
    }

    pub fn attachment(mut self, upload: AttachmentUpload) -> Self {
        self.body = RequestBody::Attachment(upload);
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn endpoint(&self) -> Endpoint {
        self.endpoint
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query_pairs(&self) -> &[(&'static str, String)] {
        &self.query
    }

    pub fn body(&self) -> &RequestBody {
        &self.body
    }

    /// Build a fresh request for one attempt.
    ///
    /// `root` is the URL of the endpoint the request addresses, without a
    /// trailing slash.
    pub fn to_builder(
        &self,
        http: &HttpClient,
        root: &str,
        credentials: &Credentials,
    ) -> Result<RequestBuilder> {
        let url = format!("{}/{}", root, self.path.trim_start_matches('/'));
        let mut builder = credentials.apply(http.request(self.method.clone(), url));

        if !self.query.is_empty() {
            builder = builder.query(&self.query);
        }

        builder = match &self.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(value),
            RequestBody::Attachment(upload) => builder
                .header(ATLASSIAN_TOKEN_HEADER, ATLASSIAN_TOKEN_NO_CHECK)
                .multipart(upload.to_form()?),
        };

        Ok(builder)
    }
}
