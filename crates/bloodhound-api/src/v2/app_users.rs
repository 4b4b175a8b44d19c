// Application user management
//
// These are BloodHound login accounts, not Active Directory users. They
// share the `/api/v2/users` resource with AD user lookups; the server tells
// them apart by ID format.

use reqwest::Method;
use tracing::debug;

use crate::error::Error;
use crate::v2::client::{BloodHoundClient, RequestBody};
use crate::v2::models::{AppUser, CreateAppUser, UpdateAppUser};

fn require_id(user_id: &str) -> Result<&str, Error> {
    let user_id = user_id.trim();
    if user_id.is_empty() {
        Err(Error::InvalidArgument("user ID is empty".into()))
    } else {
        Ok(user_id)
    }
}

impl BloodHoundClient {
    /// List application users.
    ///
    /// `GET /api/v2/users`
    pub async fn list_app_users(&self) -> Result<Vec<AppUser>, Error> {
        debug!("listing application users");
        let page = self.get_page(&["users"], &[]).await?;
        Ok(page.items)
    }

    /// `GET /api/v2/users/{id}`
    pub async fn get_app_user(&self, user_id: &str) -> Result<AppUser, Error> {
        let user_id = require_id(user_id)?;
        debug!(user_id, "fetching application user");
        self.get_data(&["users", user_id], &[]).await
    }

    /// `POST /api/v2/users`
    pub async fn create_app_user(&self, user: &CreateAppUser) -> Result<AppUser, Error> {
        debug!(email = %user.email, "creating application user");
        self.send_json_for_data(Method::POST, &["users"], user)
            .await
    }

    /// Apply a partial update.
    ///
    /// `PATCH /api/v2/users/{id}`
    pub async fn update_app_user(&self, user_id: &str, update: &UpdateAppUser) -> Result<(), Error> {
        let user_id = require_id(user_id)?;
        debug!(user_id, "updating application user");
        self.send_json_no_response(Method::PATCH, &["users", user_id], update)
            .await
    }

    /// `DELETE /api/v2/users/{id}`
    pub async fn delete_app_user(&self, user_id: &str) -> Result<(), Error> {
        let user_id = require_id(user_id)?;
        debug!(user_id, "deleting application user");
        self.execute(Method::DELETE, &["users", user_id], &[], RequestBody::Empty)
            .await?;
        Ok(())
    }
}
