//! Response interpretation
//!
//! Decides, per operation, which statuses are successes and decodes their
//! bodies. Rejected responses go to the classifier in [`super::errors`].
//!
//! Attachment uploads may come back in one of two shapes:
//!
//! - *extended*: `{"results": [...], "_links": {"context": ...}}`
//! - *short*: a single attachment object
//!
//! [`AttachmentPayload::from_body`] resolves which one a body is.

use confluence_domain::{AttachmentInfo, ConfluenceError, Result};
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::errors::classify;
use crate::errors::InfraError;

pub const EXTENDED_SCHEMA: &str = "extended";
pub const SHORT_SCHEMA: &str = "short";

/// Read the full body of a response.
pub async fn read_body(response: Response) -> Result<Vec<u8>> {
    let body = response.bytes().await.map_err(|err| ConfluenceError::from(InfraError::from(err)))?;
    Ok(body.to_vec())
}

/// Decode a JSON body, keeping the raw text in the error.
pub fn decode_json<T: DeserializeOwned>(body: &[u8], schema: &'static str) -> Result<T> {
    serde_json::from_slice(body).map_err(|err| ConfluenceError::Decode {
        schema,
        message: err.to_string(),
        body: String::from_utf8_lossy(body).into_owned(),
    })
}

/// Whether a body has no content at all.
fn is_blank(body: &[u8]) -> bool {
    body.iter().all(u8::is_ascii_whitespace)
}

/// Decode a listing body; an empty body is an empty listing.
pub fn decode_list<T: DeserializeOwned + Default>(body: &[u8], schema: &'static str) -> Result<T> {
    if is_blank(body) {
        return Ok(T::default());
    }
    decode_json(body, schema)
}

/// Return the body when the status is one of `accepted`; classify otherwise.
pub async fn expect_status(response: Response, accepted: &[StatusCode]) -> Result<Vec<u8>> {
    if accepted.contains(&response.status()) {
        read_body(response).await
    } else {
        Err(classify(response).await)
    }
}

/// Decode a 200 response.
pub async fn decode_ok<T: DeserializeOwned>(response: Response, schema: &'static str) -> Result<T> {
    let body = expect_status(response, &[StatusCode::OK]).await?;
    decode_json(&body, schema)
}

/// Decode a 200 listing response.
pub async fn decode_ok_list<T: DeserializeOwned + Default>(
    response: Response,
    schema: &'static str,
) -> Result<T> {
    let body = expect_status(response, &[StatusCode::OK]).await?;
    decode_list(&body, schema)
}

/// Decode a search response: 200 decodes as a listing, 404 means nothing
/// was found.
pub async fn decode_lookup<T: DeserializeOwned + Default>(
    response: Response,
    schema: &'static str,
) -> Result<Option<T>> {
    match response.status() {
        StatusCode::OK => {
            let body = read_body(response).await?;
            decode_list(&body, schema).map(Some)
        }
        StatusCode::NOT_FOUND => {
            debug!(url = %response.url(), "lookup returned 404, treating as no result");
            read_body(response).await?;
            Ok(None)
        }
        _ => Err(classify(response).await),
    }
}

/// Check the JSON-RPC reply of a permission call, which must be `true`.
pub fn expect_rpc_true(body: &[u8]) -> Result<()> {
    let value: Value = decode_json(body, "json-rpc")?;
    match value {
        Value::Bool(true) => Ok(()),
        other => Err(ConfluenceError::UnexpectedResponse(format!(
            "'true' response expected, but '{other}' encountered"
        ))),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ContextLinks {
    pub context: String,
}

/// Attachment listing with links shared by all results
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ExtendedAttachments {
    #[serde(rename = "_links")]
    pub links: ContextLinks,
    pub results: Vec<AttachmentInfo>,
}

impl ExtendedAttachments {
    /// Results with an empty context link filled from the shared one.
    pub fn into_results(self) -> Vec<AttachmentInfo> {
        let context = self.links.context;
        self.results
            .into_iter()
            .map(|mut info| {
                info.backfill_context(&context);
                info
            })
            .collect()
    }
}

/// Decoded attachment upload response
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttachmentPayload {
    /// Always holds at least one result
    Extended(ExtendedAttachments),
    Short(AttachmentInfo),
}

impl AttachmentPayload {
    /// Resolve the schema of an upload response body.
    ///
    /// The extended schema wins when it yields at least one result.
    /// Otherwise the body is read as a short response, which must name an
    /// attachment by id or title.
    pub fn from_body(body: &[u8]) -> Result<Self> {
        let extended_err = match decode_json::<ExtendedAttachments>(body, EXTENDED_SCHEMA) {
            Ok(extended) if !extended.results.is_empty() => return Ok(Self::Extended(extended)),
            Ok(_) => None,
            Err(err) => Some(err),
        };

        match decode_json::<AttachmentInfo>(body, SHORT_SCHEMA) {
            Ok(short) if short.is_blank() => Err(ConfluenceError::Decode {
                schema: SHORT_SCHEMA,
                message: "response names no attachment".to_string(),
                body: String::from_utf8_lossy(body).into_owned(),
            }),
            Ok(short) => Ok(Self::Short(short)),
            // both failed: the extended error wins when there is one
            Err(short_err) => Err(extended_err.unwrap_or(short_err)),
        }
    }

    pub fn into_attachment(self) -> Option<AttachmentInfo> {
        match self {
            Self::Extended(extended) => extended.into_results().into_iter().next(),
            Self::Short(info) => Some(info),
        }
    }
}
