// Search endpoint

use tracing::debug;

use crate::error::Error;
use crate::v2::client::BloodHoundClient;
use crate::v2::models::SearchResult;

impl BloodHoundClient {
    /// Free-text search across node names.
    ///
    /// `GET /api/v2/search?q=<term>[&type=<object type>][&limit=<n>]`
    ///
    /// `object_type` is an object-type literal such as `"User"` or `"OU"`
    /// (see [`EntityKind::object_type`](crate::v2::EntityKind::object_type)).
    pub async fn search(
        &self,
        term: &str,
        object_type: Option<&str>,
        limit: Option<u32>,
    ) -> Result<Vec<SearchResult>, Error> {
        if term.trim().is_empty() {
            return Err(Error::InvalidArgument("search term is empty".into()));
        }

        let mut query = vec![("q", term.to_owned())];
        if let Some(kind) = object_type.filter(|t| !t.is_empty()) {
            query.push(("type", kind.to_owned()));
        }
        if let Some(n) = limit.filter(|n| *n > 0) {
            query.push(("limit", n.to_string()));
        }

        debug!(term, ?object_type, "searching");
        let results: Vec<SearchResult> = self
            .get_data::<Option<Vec<SearchResult>>>(&["search"], &query)
            .await?
            .unwrap_or_default();
        debug!(term, hits = results.len(), "search complete");
        Ok(results)
    }
}
