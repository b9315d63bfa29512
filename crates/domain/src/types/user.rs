//! User types

use serde::{Deserialize, Serialize};

/// A Confluence user
///
/// Cloud instances identify users by `accountId`, server instances by
/// `userKey`; either may be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct User {
    #[serde(rename = "accountId", skip_serializing_if = "String::is_empty")]
    pub account_id: String,
    #[serde(rename = "userKey", skip_serializing_if = "String::is_empty")]
    pub user_key: String,
}
