use thiserror::Error;

/// Top-level error type for the `bloodhound-api` crate.
///
/// Covers transport failures, structured API errors, decode failures, and the
/// two expected outcomes of name resolution (`NotFound`, `AmbiguousName`),
/// which callers are meant to branch on rather than treat as fatal.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Login rejected by the server.
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// An authenticated call was attempted before a session token was set.
    #[error("Authentication token is not set -- log in or supply a token first")]
    NotAuthenticated,

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS setup or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    /// Local file I/O failed (ingest uploads).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // ── Remote API ──────────────────────────────────────────────────
    /// Non-2xx response. `message` comes from the first entry of the
    /// `errors` array when the body carries one.
    #[error("BloodHound API error (HTTP {status}): {message}")]
    Api {
        status: u16,
        message: String,
        request_id: Option<String>,
        body: String,
    },

    /// A saved query with the same name already exists.
    #[error("Duplicate name for saved query")]
    DuplicateQueryName,

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },

    /// Request payload could not be serialized.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // ── Resolution ──────────────────────────────────────────────────
    /// No entity matched the supplied name.
    #[error("{kind} not found: {name}")]
    NotFound { kind: String, name: String },

    /// Several entities matched the supplied name and none exactly.
    #[error(
        "{candidates} {kind} objects match '{name}' -- be more specific or use the object ID"
    )]
    AmbiguousName {
        kind: String,
        name: String,
        candidates: usize,
    },

    // ── Caller ──────────────────────────────────────────────────────
    /// Argument rejected before any request was sent.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The entity kind has no such relationship endpoint.
    #[error("{kind} has no '{relationship}' relationship")]
    UnsupportedRelationship {
        kind: &'static str,
        relationship: &'static str,
    },
}

impl Error {
    /// Returns `true` for "no such entity" outcomes: a resolver miss or an
    /// HTTP 404 from the server.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::Api { status: 404, .. })
    }

    /// Returns `true` if the session token is missing, expired, or rejected.
    pub fn is_auth_expired(&self) -> bool {
        matches!(
            self,
            Self::Authentication { .. } | Self::NotAuthenticated | Self::Api { status: 401, .. }
        )
    }

    /// Returns `true` if this is a transient error worth retrying.
    ///
    /// The client itself never retries; this is a hint for callers.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Api { status, .. } => matches!(status, 429 | 502 | 503 | 504),
            _ => false,
        }
    }

    /// HTTP status of an API error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
