//! Space types

use serde::{Deserialize, Serialize};

use super::page::{PageInfo, PageLinks};

/// A space, optionally with its expanded home page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpaceInfo {
    pub id: i64,
    pub key: String,
    pub name: String,
    pub homepage: PageInfo,
    #[serde(rename = "_links")]
    pub links: PageLinks,
}
