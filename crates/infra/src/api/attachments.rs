//! Attachment operations

use confluence_domain::constants::ATTACHMENT_LIST_LIMIT;
use confluence_domain::{AttachmentInfo, ConfluenceError, Result};
use reqwest::StatusCode;
use tracing::{info, instrument};

use super::client::ConfluenceClient;
use super::interpret::{decode_ok, decode_ok_list, expect_status, AttachmentPayload, ExtendedAttachments, EXTENDED_SCHEMA};
use super::request::{AttachmentUpload, RequestSpec};

impl ConfluenceClient {
    /// Upload a new attachment to a page.
    ///
    /// `comment` is stored as the attachment comment; callers typically put
    /// a content checksum there to detect changes later.
    #[instrument(skip(self, comment, content), fields(size = content.len()))]
    pub async fn create_attachment(
        &self,
        page_id: &str,
        name: &str,
        comment: &str,
        content: Vec<u8>,
    ) -> Result<AttachmentInfo> {
        let spec = RequestSpec::post(format!("content/{page_id}/child/attachment")).attachment(
            AttachmentUpload { file_name: name.to_string(), comment: comment.to_string(), content },
        );

        let created = async {
            let extended: ExtendedAttachments = decode_ok(self.send(&spec).await?, EXTENDED_SCHEMA).await?;
            extended.into_results().into_iter().next().ok_or_else(|| {
                ConfluenceError::UnexpectedResponse(
                    "the Confluence REST API for creating attachments returned 0 json objects, \
                     expected at least 1"
                        .to_string(),
                )
            })
        }
        .await
        .map_err(|err| err.in_operation("create_attachment", name))?;

        info!(attachment_id = %created.id, "attachment created");
        Ok(created)
    }

    /// Upload a new version of an existing attachment.
    ///
    /// The service answers with either the extended or the short response
    /// format; both are accepted.
    #[instrument(skip(self, comment, content), fields(size = content.len()))]
    pub async fn update_attachment(
        &self,
        page_id: &str,
        attachment_id: &str,
        name: &str,
        comment: &str,
        content: Vec<u8>,
    ) -> Result<AttachmentInfo> {
        let spec = RequestSpec::post(format!("content/{page_id}/child/attachment/{attachment_id}/data"))
            .attachment(AttachmentUpload {
                file_name: name.to_string(),
                comment: comment.to_string(),
                content,
            });

        let updated = async {
            let body = expect_status(self.send(&spec).await?, &[StatusCode::OK]).await?;
            AttachmentPayload::from_body(&body)?.into_attachment().ok_or_else(|| {
                ConfluenceError::UnexpectedResponse("attachment update returned no attachment".to_string())
            })
        }
        .await
        .map_err(|err| err.in_operation("update_attachment", attachment_id))?;

        info!(attachment_id = %updated.id, "attachment updated");
        Ok(updated)
    }

    /// All attachments of a page, up to the listing limit.
    #[instrument(skip(self))]
    pub async fn get_attachments(&self, page_id: &str) -> Result<Vec<AttachmentInfo>> {
        let spec = RequestSpec::get(format!("content/{page_id}/child/attachment"))
            .query("expand", "version,container")
            .query("limit", ATTACHMENT_LIST_LIMIT);

        let listing: ExtendedAttachments = async { decode_ok_list(self.send(&spec).await?, EXTENDED_SCHEMA).await }
            .await
            .map_err(|err| err.in_operation("get_attachments", page_id))?;

        Ok(listing.into_results())
    }
}
