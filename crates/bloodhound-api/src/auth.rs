use std::sync::{PoisonError, RwLock};

use secrecy::{ExposeSecret, SecretString};
use tracing::trace;

/// Credentials for authenticating with a BloodHound instance.
///
/// Each variant carries the secret material needed for its auth flow.
#[derive(Debug, Clone)]
pub enum Credentials {
    /// Username + secret, exchanged for a session token via `POST /api/v2/login`.
    Password {
        username: String,
        password: SecretString,
    },

    /// A session token obtained elsewhere (browser session, previous login).
    SessionToken(SecretString),
}

impl Credentials {
    /// `true` when these credentials still need a login round-trip.
    pub fn requires_login(&self) -> bool {
        matches!(self, Self::Password { .. })
    }
}

/// Holder for the bearer token attached to every authenticated request.
///
/// The token is the only mutable state a client carries. Reads vastly
/// outnumber writes (login/logout), hence the `RwLock`.
#[derive(Debug, Default)]
pub(crate) struct SessionToken {
    inner: RwLock<Option<SecretString>>,
}

impl SessionToken {
    pub(crate) fn new(token: Option<SecretString>) -> Self {
        Self {
            inner: RwLock::new(token),
        }
    }

    pub(crate) fn set(&self, token: SecretString) {
        trace!("storing session token");
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = Some(token);
    }

    pub(crate) fn clear(&self) {
        trace!("clearing session token");
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    pub(crate) fn get(&self) -> Option<SecretString> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Render the `Authorization` header value, if a token is present.
    pub(crate) fn bearer(&self) -> Option<String> {
        let guard = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        guard
            .as_ref()
            .map(|token| format!("Bearer {}", token.expose_secret()))
    }
}
