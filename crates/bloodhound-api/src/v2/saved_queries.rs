// Saved Cypher query endpoints

use reqwest::Method;
use tracing::debug;

use crate::error::Error;
use crate::v2::client::{BloodHoundClient, RequestBody};
use crate::v2::envelope::MaybeEnveloped;
use crate::v2::models::{SavedQuery, SavedQueryRequest, ShareRequest};

/// Server message for a name collision on create.
const DUPLICATE_NAME_MESSAGE: &str = "duplicate name for saved query: please choose a different name";

impl BloodHoundClient {
    /// `GET /api/v2/saved-queries`
    pub async fn list_saved_queries(&self) -> Result<Vec<SavedQuery>, Error> {
        debug!("listing saved queries");
        let page = self.get_page(&["saved-queries"], &[]).await?;
        Ok(page.items)
    }

    /// Save a new Cypher query.
    ///
    /// `POST /api/v2/saved-queries`. A name collision is
    /// [`Error::DuplicateQueryName`].
    pub async fn create_saved_query(
        &self,
        name: &str,
        query: &str,
        description: &str,
        public: bool,
    ) -> Result<SavedQuery, Error> {
        debug!(name, public, "creating saved query");
        let body = RequestBody::json(&SavedQueryRequest {
            name,
            query,
            description,
            public: Some(public),
        })?;
        let resp = self
            .send(Method::POST, &["saved-queries"], &[], body)
            .await?;

        match Self::check_status(resp) {
            Ok(resp) => {
                let saved: MaybeEnveloped<SavedQuery> = Self::decode(&resp)?;
                Ok(saved.into_inner())
            }
            Err(Error::Api {
                status: 400,
                message,
                ..
            }) if message == DUPLICATE_NAME_MESSAGE => Err(Error::DuplicateQueryName),
            Err(e) => Err(e),
        }
    }

    /// `PUT /api/v2/saved-queries/{id}`
    pub async fn update_saved_query(
        &self,
        id: i64,
        name: &str,
        query: &str,
        description: &str,
    ) -> Result<(), Error> {
        let id = id.to_string();
        debug!(%id, name, "updating saved query");
        self.send_json_no_response(
            Method::PUT,
            &["saved-queries", id.as_str()],
            &SavedQueryRequest {
                name,
                query,
                description,
                public: None,
            },
        )
        .await
    }

    /// `DELETE /api/v2/saved-queries/{id}`
    pub async fn delete_saved_query(&self, id: i64) -> Result<(), Error> {
        let id = id.to_string();
        debug!(%id, "deleting saved query");
        self.execute(
            Method::DELETE,
            &["saved-queries", id.as_str()],
            &[],
            RequestBody::Empty,
        )
        .await?;
        Ok(())
    }

    /// Share a query publicly and/or with specific users.
    ///
    /// `POST /api/v2/saved-queries/{id}/shares`
    pub async fn share_saved_query(
        &self,
        id: i64,
        public: bool,
        user_ids: &[String],
    ) -> Result<(), Error> {
        let id = id.to_string();
        debug!(%id, public, users = user_ids.len(), "sharing saved query");
        self.send_json_no_response(
            Method::POST,
            &["saved-queries", id.as_str(), "shares"],
            &ShareRequest {
                public: Some(public),
                user_sids: user_ids,
            },
        )
        .await
    }

    /// Withdraw shares from specific users.
    ///
    /// `DELETE /api/v2/saved-queries/{id}/shares`
    pub async fn revoke_saved_query(&self, id: i64, user_ids: &[String]) -> Result<(), Error> {
        let id = id.to_string();
        debug!(%id, users = user_ids.len(), "revoking saved query shares");
        self.send_json_no_response(
            Method::DELETE,
            &["saved-queries", id.as_str(), "shares"],
            &ShareRequest {
                public: None,
                user_sids: user_ids,
            },
        )
        .await
    }
}
