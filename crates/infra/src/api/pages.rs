//! Page and space operations

use confluence_domain::types::page::PAGE_TYPE;
use confluence_domain::{ConfluenceError, PageInfo, PageUpdate, Result, SpaceInfo};
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::{info, instrument};

use super::client::ConfluenceClient;
use super::interpret::{decode_lookup, decode_ok, expect_status};
use super::request::RequestSpec;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PageSearch {
    results: Vec<PageInfo>,
}

impl ConfluenceClient {
    /// Topmost page of a space: the first ancestor of any page in it, or
    /// that page itself when it has no ancestors.
    ///
    /// Only `id` and `title` of the result are set.
    #[instrument(skip(self))]
    pub async fn find_root_page(&self, space: &str) -> Result<PageInfo> {
        let page = async {
            self.find_page(space, None, PAGE_TYPE)
                .await?
                .ok_or_else(|| ConfluenceError::UnexpectedResponse("no such space".to_string()))
        }
        .await
        .map_err(|err| err.in_operation("find_root_page", space))?;

        Ok(match page.ancestors.first() {
            Some(root) => PageInfo::reference(&root.id, &root.title),
            None => PageInfo::reference(page.id, page.title),
        })
    }

    /// Home page of a space.
    #[instrument(skip(self))]
    pub async fn find_home_page(&self, space: &str) -> Result<PageInfo> {
        let spec = RequestSpec::get(format!("space/{space}")).query("expand", "homepage");

        let info: SpaceInfo = async { decode_ok(self.send(&spec).await?, "space").await }
            .await
            .map_err(|err| err.in_operation("find_home_page", space))?;

        Ok(info.homepage)
    }

    /// First page of type `page_type` in a space, optionally filtered by
    /// title. A 404, an empty body or an empty result is `Ok(None)`.
    #[instrument(skip(self))]
    pub async fn find_page(
        &self,
        space: &str,
        title: Option<&str>,
        page_type: &str,
    ) -> Result<Option<PageInfo>> {
        let mut spec = RequestSpec::get("content/")
            .query("spaceKey", space)
            .query("expand", "ancestors,version")
            .query("type", page_type);

        if let Some(title) = title.filter(|title| !title.is_empty()) {
            spec = spec.query("title", title);
        }

        let found: Option<PageSearch> = async { decode_lookup(self.send(&spec).await?, "page search").await }
            .await
            .map_err(|err| err.in_operation("find_page", space))?;

        Ok(found.and_then(|search| search.results.into_iter().next()))
    }

    /// Fetch a page with its ancestors and version.
    ///
    /// # Errors
    ///
    /// A missing page is [`ConfluenceError::NotFound`].
    #[instrument(skip(self))]
    pub async fn get_page_by_id(&self, page_id: &str) -> Result<PageInfo> {
        let spec = RequestSpec::get(format!("content/{page_id}")).query("expand", "ancestors,version");

        async { decode_ok(self.send(&spec).await?, "page").await }
            .await
            .map_err(|err| err.in_operation("get_page_by_id", page_id))
    }

    /// Create a page or blog post with a storage-format body.
    #[instrument(skip(self, parent, body), fields(parent = parent.map(|p| p.id.as_str())))]
    pub async fn create_page(
        &self,
        space: &str,
        page_type: &str,
        parent: Option<&PageInfo>,
        title: &str,
        body: &str,
    ) -> Result<PageInfo> {
        let mut payload = json!({
            "type": page_type,
            "title": title,
            "space": { "key": space },
            "body": {
                "storage": { "representation": "storage", "value": body },
            },
            "metadata": {
                "properties": { "editor": { "value": "v2" } },
            },
        });

        if let Some(parent) = parent {
            payload["ancestors"] = json!([{ "id": parent.id }]);
        }

        let spec = RequestSpec::post("content/").json(payload);
        let page: PageInfo = async { decode_ok(self.send(&spec).await?, "page").await }
            .await
            .map_err(|err| err.in_operation("create_page", title))?;

        info!(page_id = %page.id, "page created");
        Ok(page)
    }

    /// Replace the body of a page, bumping its version.
    #[instrument(skip(self, page, update), fields(page_id = %page.id))]
    pub async fn update_page(&self, page: &PageInfo, update: &PageUpdate) -> Result<()> {
        let spec = RequestSpec::put(format!("content/{}", page.id)).json(update_payload(page, update));

        async {
            let response = self.send(&spec).await?;
            expect_status(response, &[StatusCode::OK]).await
        }
        .await
        .map_err(|err| err.in_operation("update_page", &page.id))?;

        info!(version = page.next_version(), "page updated");
        Ok(())
    }
}

fn update_payload(page: &PageInfo, update: &PageUpdate) -> Value {
    // only the direct parent may be sent back
    let ancestors = match page.parent() {
        Some(parent) if !page.is_blogpost() => json!([{ "id": parent.id }]),
        _ => json!([]),
    };

    let mut properties = Map::new();
    properties.insert(
        "content-appearance-published".to_string(),
        json!({ "value": update.appearance }),
    );
    if let Some(code_point) = update.emoji_code_point() {
        properties.insert("emoji-title-draft".to_string(), json!({ "value": code_point }));
        properties.insert("emoji-title-published".to_string(), json!({ "value": code_point }));
    }

    json!({
        "id": page.id,
        "type": page.page_type,
        "title": page.title,
        "version": {
            "number": page.next_version(),
            "minorEdit": update.minor_edit,
            "message": update.version_message,
        },
        "ancestors": ancestors,
        "body": {
            "storage": { "value": update.content, "representation": "storage" },
        },
        "metadata": { "properties": properties },
    })
}
