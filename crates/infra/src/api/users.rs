//! User lookups

use confluence_domain::{ConfluenceError, Result, User};
use serde::Deserialize;
use tracing::{debug, instrument};

use super::client::ConfluenceClient;
use super::interpret::{decode_lookup, decode_ok};
use super::request::RequestSpec;

const USER_SEARCH_SCHEMA: &str = "user search";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct UserSearch {
    results: Vec<UserHit>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct UserHit {
    user: User,
}

impl ConfluenceClient {
    /// Find a user by full name.
    ///
    /// Searches `search/user` first and falls back to the generic `search`
    /// endpoint of older instances when that yields nothing.
    #[instrument(skip(self))]
    pub async fn get_user_by_name(&self, name: &str) -> Result<User> {
        let cql = format!("user.fullname~{name:?}");

        let mut hits = self
            .search_users("search/user", &cql)
            .await
            .map_err(|err| err.in_operation("get_user_by_name", name))?;

        if hits.is_empty() {
            debug!("no result from search/user, trying search");
            hits = self
                .search_users("search", &cql)
                .await
                .map_err(|err| err.in_operation("get_user_by_name", name))?;
        }

        hits.into_iter().next().map(|hit| hit.user).ok_or_else(|| {
            ConfluenceError::UnexpectedResponse(format!("user with given name is not found: {name:?}"))
                .in_operation("get_user_by_name", name)
        })
    }

    /// The user the client is authenticated as.
    #[instrument(skip(self))]
    pub async fn get_current_user(&self) -> Result<User> {
        let spec = RequestSpec::get("user/current");

        async { decode_ok(self.send(&spec).await?, "user").await }
            .await
            .map_err(|err| err.in_operation("get_current_user", "user/current"))
    }

    async fn search_users(&self, path: &str, cql: &str) -> Result<Vec<UserHit>> {
        let spec = RequestSpec::get(path).query("cql", cql);
        let found: Option<UserSearch> = decode_lookup(self.send(&spec).await?, USER_SEARCH_SCHEMA).await?;
        Ok(found.map(|search| search.results).unwrap_or_default())
    }
}
