//! Domain types returned by the Confluence API
//!
//! Every field defaults when absent from the JSON body; the service omits
//! fields freely depending on the `expand` parameters of a request.

pub mod attachment;
pub mod label;
pub mod page;
pub mod space;
pub mod user;

pub use attachment::{AttachmentInfo, AttachmentLinks, AttachmentMetadata};
pub use label::{Label, LabelInfo};
pub use page::{Ancestor, PageInfo, PageLinks, PageUpdate, PageVersion};
pub use space::SpaceInfo;
pub use user::User;
