//! Page types

use serde::{Deserialize, Serialize};

/// Content type of a regular page
pub const PAGE_TYPE: &str = "page";

/// Content type of a blog post
pub const BLOGPOST_TYPE: &str = "blogpost";

/// A page (or blog post) as returned by `content` endpoints
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageInfo {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub page_type: String,
    pub version: PageVersion,
    pub ancestors: Vec<Ancestor>,
    #[serde(rename = "_links")]
    pub links: PageLinks,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageVersion {
    pub number: i64,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Ancestor {
    pub id: String,
    pub title: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageLinks {
    /// Web UI path of the page
    #[serde(rename = "webui")]
    pub full: String,
}

impl PageInfo {
    /// Shallow page reference carrying only an id and a title.
    pub fn reference(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self { id: id.into(), title: title.into(), ..Default::default() }
    }

    pub fn is_blogpost(&self) -> bool {
        self.page_type == BLOGPOST_TYPE
    }

    /// The direct parent, which is the last entry of the ancestor chain.
    pub fn parent(&self) -> Option<&Ancestor> {
        self.ancestors.last()
    }

    /// Version number the next update must carry.
    pub fn next_version(&self) -> i64 {
        self.version.number + 1
    }
}

/// New content and metadata for a page update
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageUpdate {
    /// Storage-format body
    pub content: String,
    pub minor_edit: bool,
    pub version_message: String,
    /// Value of the `content-appearance-published` property
    /// (e.g. `full-width` or `fixed-width`)
    pub appearance: String,
    /// Title emoji; only the first character is used
    pub emoji: Option<String>,
}

impl PageUpdate {
    pub fn new(content: impl Into<String>) -> Self {
        Self { content: content.into(), ..Default::default() }
    }

    /// Lowercase hex code point of the first emoji character, as stored in
    /// the `emoji-title-*` page properties.
    pub fn emoji_code_point(&self) -> Option<String> {
        self.emoji
            .as_deref()
            .and_then(|emoji| emoji.chars().next())
            .map(|ch| format!("{:x}", u32::from(ch)))
    }
}
