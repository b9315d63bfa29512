//! Label types

use serde::{Deserialize, Serialize};

/// Prefix used for labels created by the client
pub const GLOBAL_PREFIX: &str = "global";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Label {
    pub id: String,
    pub prefix: String,
    pub name: String,
}

/// Label listing returned by the `content/{id}/label` endpoints
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelInfo {
    #[serde(rename = "results")]
    pub labels: Vec<Label>,
    #[serde(rename = "number")]
    pub size: i64,
}

impl LabelInfo {
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(|label| label.name.as_str())
    }
}
