//! Page edit restrictions
//!
//! Cloud instances take restrictions over REST and identify users by
//! account id. Server instances only expose the operation through the
//! legacy JSON-RPC endpoint.

use confluence_domain::{PageInfo, Result};
use reqwest::StatusCode;
use serde_json::{json, Value};
use tracing::{info, instrument};

use super::client::ConfluenceClient;
use super::interpret::{expect_rpc_true, expect_status};
use super::request::RequestSpec;

impl ConfluenceClient {
    /// Restrict updates of a page to one user, picking the cloud or server
    /// variant from the instance host.
    #[instrument(skip(self, page), fields(page_id = %page.id, cloud = self.is_cloud()))]
    pub async fn restrict_page_updates(&self, page: &PageInfo, allowed_user: &str) -> Result<()> {
        if self.is_cloud() {
            self.restrict_page_updates_cloud(page, allowed_user).await
        } else {
            self.restrict_page_updates_server(page, allowed_user).await
        }
    }

    /// Cloud variant: restricts updates to the authenticated user.
    ///
    /// Cloud addresses users by account id only, so `allowed_user` is not
    /// sent; the current user is resolved and restricted instead.
    #[instrument(skip(self, page), fields(page_id = %page.id))]
    pub async fn restrict_page_updates_cloud(&self, page: &PageInfo, allowed_user: &str) -> Result<()> {
        async {
            let user = self.get_current_user().await?;
            let spec = RequestSpec::post(format!("content/{}/restriction", page.id))
                .json(cloud_payload(&user.account_id));
            expect_status(self.send(&spec).await?, &[StatusCode::OK]).await
        }
        .await
        .map_err(|err| err.in_operation("restrict_page_updates_cloud", &page.id))?;

        info!("page updates restricted");
        Ok(())
    }

    /// Server variant over JSON-RPC `setContentPermissions`.
    #[instrument(skip(self, page), fields(page_id = %page.id))]
    pub async fn restrict_page_updates_server(&self, page: &PageInfo, allowed_user: &str) -> Result<()> {
        let spec = RequestSpec::rpc("setContentPermissions").json(server_payload(&page.id, allowed_user));

        async {
            let body = expect_status(self.send(&spec).await?, &[StatusCode::OK]).await?;
            expect_rpc_true(&body)
        }
        .await
        .map_err(|err| err.in_operation("restrict_page_updates_server", &page.id))?;

        info!("page updates restricted");
        Ok(())
    }
}

fn cloud_payload(account_id: &str) -> Value {
    json!([{
        "operation": "update",
        "restrictions": {
            "user": [{ "type": "known", "accountId": account_id }],
        },
    }])
}

fn server_payload(page_id: &str, allowed_user: &str) -> Value {
    json!([page_id, "Edit", [{ "userName": allowed_user }]])
}
