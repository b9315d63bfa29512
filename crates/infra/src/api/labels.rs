//! Label operations

use confluence_domain::types::label::GLOBAL_PREFIX;
use confluence_domain::{LabelInfo, PageInfo, Result};
use reqwest::StatusCode;
use serde_json::{json, Value};
use tracing::{info, instrument};

use super::client::ConfluenceClient;
use super::interpret::{decode_list, decode_ok, decode_ok_list, expect_status};
use super::request::RequestSpec;

const LABEL_SCHEMA: &str = "label";

impl ConfluenceClient {
    /// Add global labels to a page. Empty names are skipped.
    #[instrument(skip(self, page), fields(page_id = %page.id))]
    pub async fn add_page_labels(&self, page: &PageInfo, labels: &[&str]) -> Result<LabelInfo> {
        let spec = RequestSpec::post(format!("content/{}/label", page.id)).json(labels_payload(labels));

        let info: LabelInfo = async { decode_ok(self.send(&spec).await?, LABEL_SCHEMA).await }
            .await
            .map_err(|err| err.in_operation("add_page_labels", &page.id))?;

        info!(count = info.labels.len(), "labels added");
        Ok(info)
    }

    /// Remove a label from a page.
    ///
    /// A 204 reply carries no body and yields an empty [`LabelInfo`].
    #[instrument(skip(self, page), fields(page_id = %page.id))]
    pub async fn delete_page_label(&self, page: &PageInfo, label: &str) -> Result<LabelInfo> {
        let spec = RequestSpec::delete(format!("content/{}/label", page.id)).query("name", label);

        let info = async {
            let body = expect_status(self.send(&spec).await?, &[StatusCode::OK, StatusCode::NO_CONTENT]).await?;
            decode_list(&body, LABEL_SCHEMA)
        }
        .await
        .map_err(|err| err.in_operation("delete_page_label", &page.id))?;

        info!("label deleted");
        Ok(info)
    }

    /// Labels of a page with the given prefix (e.g. `global`).
    #[instrument(skip(self, page), fields(page_id = %page.id))]
    pub async fn get_page_labels(&self, page: &PageInfo, prefix: &str) -> Result<LabelInfo> {
        let spec = RequestSpec::get(format!("content/{}/label", page.id)).query("prefix", prefix);

        async { decode_ok_list(self.send(&spec).await?, LABEL_SCHEMA).await }
            .await
            .map_err(|err| err.in_operation("get_page_labels", &page.id))
    }
}

fn labels_payload(labels: &[&str]) -> Value {
    labels
        .iter()
        .filter(|name| !name.is_empty())
        .map(|name| json!({ "prefix": GLOBAL_PREFIX, "name": name }))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_payload_skips_empty_names() {
        let payload = labels_payload(&["ops", "", "runbook"]);
        assert_eq!(
            payload,
            json!([
                { "prefix": "global", "name": "ops" },
                { "prefix": "global", "name": "runbook" },
            ])
        );
    }

    #[test]
    fn test_no_labels_is_empty_array() {
        assert_eq!(labels_payload(&[]), json!([]));
    }
}
