// Session endpoints
//
// Login exchanges a username/secret for a session token that the client then
// attaches as `Authorization: Bearer <token>` to every other request.

use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info};

use crate::auth::Credentials;
use crate::error::Error;
use crate::v2::client::{BloodHoundClient, RequestBody};
use crate::v2::envelope::DataEnvelope;
use crate::v2::models::{AppUser, LoginRequest, LoginSession, SelfData};

impl BloodHoundClient {
    /// Authenticate with username + secret and store the session token.
    ///
    /// `POST /api/v2/login`
    pub async fn login(&self, username: &str, password: &SecretString) -> Result<(), Error> {
        debug!(username, "logging in");

        let body = RequestBody::json(&LoginRequest {
            login_method: "secret",
            username,
            secret: password.expose_secret(),
        })?;
        let resp = self.send_anonymous(Method::POST, &["login"], body).await?;

        if !resp.status.is_success() {
            let message = match Self::check_status(resp) {
                Err(Error::Api { message, .. }) => message,
                Err(other) => other.to_string(),
                Ok(_) => String::from("login rejected"),
            };
            return Err(Error::Authentication { message });
        }

        let session: DataEnvelope<LoginSession> = Self::decode(&resp)?;
        if session.data.session_token.is_empty() {
            return Err(Error::Authentication {
                message: "login response carried no session token".into(),
            });
        }
        self.set_token(SecretString::from(session.data.session_token));

        info!(username, "login successful");
        Ok(())
    }

    /// Log in or install a token, depending on the credential kind.
    pub async fn authenticate(&self, credentials: &Credentials) -> Result<(), Error> {
        match credentials {
            Credentials::Password { username, password } => self.login(username, password).await,
            Credentials::SessionToken(token) => {
                self.set_token(token.clone());
                Ok(())
            }
        }
    }

    /// End the server session and forget the local token.
    ///
    /// `POST /api/v2/logout`
    pub async fn logout(&self) -> Result<(), Error> {
        debug!("logging out");
        self.execute(Method::POST, &["logout"], &[], RequestBody::Empty)
            .await?;
        self.clear_token();
        Ok(())
    }

    /// The application user behind the current session.
    ///
    /// `GET /api/v2/self`
    pub async fn get_self(&self) -> Result<AppUser, Error> {
        debug!("fetching current user");
        let data: SelfData = self.get_data(&["self"], &[]).await?;
        let mut user = data.user;
        if data.user_dn.is_some() {
            user.user_dn = data.user_dn;
        }
        Ok(user)
    }
}
