//! Attachment types

use serde::{Deserialize, Serialize};

/// An attachment of a page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttachmentInfo {
    #[serde(rename = "title")]
    pub filename: String,
    pub id: String,
    pub metadata: AttachmentMetadata,
    #[serde(rename = "_links")]
    pub links: AttachmentLinks,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttachmentMetadata {
    pub comment: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttachmentLinks {
    pub context: String,
    pub download: String,
}

impl AttachmentInfo {
    /// Fill in the context link from the listing-level links when the
    /// attachment itself carries none.
    pub fn backfill_context(&mut self, context: &str) {
        if self.links.context.is_empty() {
            self.links.context = context.to_string();
        }
    }

    /// True when neither an id nor a title was decoded.
    pub fn is_blank(&self) -> bool {
        self.id.is_empty() && self.filename.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backfill_keeps_existing_context() {
        let mut info = AttachmentInfo::default();
        info.backfill_context("/wiki");
        assert_eq!(info.links.context, "/wiki");

        info.backfill_context("/other");
        assert_eq!(info.links.context, "/wiki");
    }

    #[test]
    fn test_title_maps_to_filename() {
        let info: AttachmentInfo = serde_json::from_str(
            r#"{"title":"diagram.png","id":"att1","metadata":{"comment":"sha"},
                "_links":{"download":"/download/diagram.png"}}"#,
        )
        .unwrap();

        assert_eq!(info.filename, "diagram.png");
        assert_eq!(info.metadata.comment, "sha");
        assert_eq!(info.links.download, "/download/diagram.png");
        assert!(info.links.context.is_empty());
        assert!(!info.is_blank());
        assert!(AttachmentInfo::default().is_blank());
    }
}
