// BloodHound v2 HTTP client
//
// Wraps `reqwest::Client` with bearer-token injection, `/api/v2/` URL
// construction, and status/envelope handling. Endpoint groups (search,
// entities, relationships, graph, ...) are implemented as inherent methods
// in sibling files to keep this module focused on transport mechanics.

use bytes::Bytes;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Method, StatusCode};
use secrecy::SecretString;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::auth::SessionToken;
use crate::error::Error;
use crate::transport::TransportConfig;
use crate::v2::envelope::{self, DataEnvelope, Page};

/// Error body returned by the API on non-2xx responses:
/// `{"http_status", "timestamp", "request_id", "errors": [{"context", "message"}]}`.
#[derive(serde::Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    request_id: Option<String>,
    #[serde(default)]
    errors: Vec<ErrorDetail>,
}

#[derive(serde::Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    message: Option<String>,
}

/// Everything needed to build a [`BloodHoundClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Instance root, e.g. `https://bloodhound.corp.local`.
    pub base_url: Url,
    pub transport: TransportConfig,
    /// Pre-issued session token. `None` means [`BloodHoundClient::login`]
    /// must run before authenticated calls.
    pub token: Option<SecretString>,
}

impl ClientConfig {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            transport: TransportConfig::default(),
            token: None,
        }
    }
}

/// Request payload handed to [`BloodHoundClient::send`].
#[derive(Debug, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    /// Pre-serialized JSON; sent with `Content-Type: application/json`.
    Json(Vec<u8>),
    Multipart(reqwest::multipart::Form),
}

impl RequestBody {
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self, Error> {
        Ok(Self::Json(serde_json::to_vec(value)?))
    }
}

/// A fully-read HTTP response, before any status or envelope handling.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl RawResponse {
    /// Body as text, lossily decoded. Used for error messages and previews.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Async client for the BloodHound `/api/v2/` REST surface.
///
/// Holds the base URL, the underlying `reqwest::Client`, and the session
/// token. Nothing is cached: every call goes to the server. Each operation
/// awaits its request(s) sequentially and never retries.
pub struct BloodHoundClient {
    http: reqwest::Client,
    base_url: Url,
    token: SessionToken,
}

impl BloodHoundClient {
    /// Build a client from a [`ClientConfig`].
    pub fn new(config: ClientConfig) -> Result<Self, Error> {
        let http = config.transport.build_client()?;
        Ok(Self {
            http,
            base_url: config.base_url,
            token: SessionToken::new(config.token),
        })
    }

    /// Wrap an existing `reqwest::Client` (tests, custom middleware).
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self {
            http,
            base_url,
            token: SessionToken::default(),
        }
    }

    /// The instance base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── Session token ────────────────────────────────────────────────

    /// Use a session token obtained outside this client.
    pub fn set_token(&self, token: SecretString) {
        self.token.set(token);
    }

    /// The session token currently in use, if any.
    pub fn token(&self) -> Option<SecretString> {
        self.token.get()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.bearer().is_some()
    }

    pub(crate) fn clear_token(&self) {
        self.token.clear();
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Build `{base}/api/v2/{segments...}`. Each segment is percent-encoded,
    /// so object IDs can be passed through verbatim.
    pub(crate) fn api_url(&self, segments: &[&str]) -> Result<Url, Error> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                Error::InvalidArgument(format!("base URL cannot carry a path: {}", self.base_url))
            })?
            .pop_if_empty()
            .extend(["api", "v2"])
            .extend(segments);
        Ok(url)
    }

    // ── Transport boundary ───────────────────────────────────────────

    /// Send an authenticated request and read the full response.
    ///
    /// Fails with [`Error::NotAuthenticated`] (no request sent) when no
    /// session token is set, and with [`Error::Transport`] on network
    /// failure. HTTP status is *not* checked here.
    pub async fn send(
        &self,
        method: Method,
        segments: &[&str],
        query: &[(&str, String)],
        body: RequestBody,
    ) -> Result<RawResponse, Error> {
        let bearer = self.token.bearer().ok_or(Error::NotAuthenticated)?;
        let mut auth = HeaderValue::from_str(&bearer).map_err(|e| Error::Authentication {
            message: format!("session token is not a valid header value: {e}"),
        })?;
        auth.set_sensitive(true);

        let url = self.api_url(segments)?;
        debug!("{method} {url}");

        let builder = self.http.request(method, url).header(AUTHORIZATION, auth);
        self.dispatch(builder, query, body).await
    }

    /// Send a request without the `Authorization` header (login).
    pub(crate) async fn send_anonymous(
        &self,
        method: Method,
        segments: &[&str],
        body: RequestBody,
    ) -> Result<RawResponse, Error> {
        let url = self.api_url(segments)?;
        debug!("{method} {url} (anonymous)");

        let builder = self.http.request(method, url);
        self.dispatch(builder, &[], body).await
    }

    async fn dispatch(
        &self,
        mut builder: reqwest::RequestBuilder,
        query: &[(&str, String)],
        body: RequestBody,
    ) -> Result<RawResponse, Error> {
        if !query.is_empty() {
            builder = builder.query(query);
        }
        builder = match body {
            RequestBody::Empty => builder,
            RequestBody::Json(bytes) => builder
                .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
                .body(bytes),
            RequestBody::Multipart(form) => builder.multipart(form),
        };

        let resp = builder.send().await?;
        let status = resp.status();
        let headers = resp.headers().clone();
        let body = resp.bytes().await?;

        Ok(RawResponse {
            status,
            headers,
            body,
        })
    }

    // ── Response handling ────────────────────────────────────────────

    /// Pass 2xx responses through; turn anything else into [`Error::Api`].
    pub(crate) fn check_status(resp: RawResponse) -> Result<RawResponse, Error> {
        if resp.status.is_success() {
            Ok(resp)
        } else {
            Err(Self::parse_error(&resp))
        }
    }

    fn parse_error(resp: &RawResponse) -> Error {
        let status = resp.status;
        let raw = resp.text();

        let parsed = serde_json::from_slice::<ErrorResponse>(&resp.body).ok();
        let message = parsed
            .as_ref()
            .and_then(|err| err.errors.first())
            .and_then(|detail| detail.message.clone())
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));

        Error::Api {
            status: status.as_u16(),
            message,
            request_id: parsed.and_then(|err| err.request_id),
            body: raw,
        }
    }

    /// Deserialize a response body, keeping a preview on failure.
    pub(crate) fn decode<T: DeserializeOwned>(resp: &RawResponse) -> Result<T, Error> {
        serde_json::from_slice(&resp.body).map_err(|e| decode_error(&e, resp.text()))
    }

    /// Send, check the status, and return the raw response.
    pub(crate) async fn execute(
        &self,
        method: Method,
        segments: &[&str],
        query: &[(&str, String)],
        body: RequestBody,
    ) -> Result<RawResponse, Error> {
        let resp = self.send(method, segments, query, body).await?;
        Self::check_status(resp)
    }

    /// `GET` a `{"data": T}` response and return `T`.
    pub(crate) async fn get_data<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &[(&str, String)],
    ) -> Result<T, Error> {
        let resp = self
            .execute(Method::GET, segments, query, RequestBody::Empty)
            .await?;
        let envelope: DataEnvelope<T> = Self::decode(&resp)?;
        Ok(envelope.data)
    }

    /// `GET` a list endpoint through the envelope normalizer.
    pub(crate) async fn get_page<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &[(&str, String)],
    ) -> Result<Page<T>, Error> {
        let resp = self
            .execute(Method::GET, segments, query, RequestBody::Empty)
            .await?;
        envelope::normalize_list(&resp.body)
    }

    /// Send a JSON body and return the `data` field of the response.
    pub(crate) async fn send_json_for_data<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        method: Method,
        segments: &[&str],
        body: &B,
    ) -> Result<T, Error> {
        let resp = self
            .execute(method, segments, &[], RequestBody::json(body)?)
            .await?;
        let envelope: DataEnvelope<T> = Self::decode(&resp)?;
        Ok(envelope.data)
    }

    /// Send a JSON body where only the status matters.
    pub(crate) async fn send_json_no_response<B: Serialize + ?Sized>(
        &self,
        method: Method,
        segments: &[&str],
        body: &B,
    ) -> Result<(), Error> {
        self.execute(method, segments, &[], RequestBody::json(body)?)
            .await?;
        Ok(())
    }
}

/// Optional `limit` query parameter; `None` and `Some(0)` mean server default.
pub(crate) fn limit_query(limit: Option<u32>) -> Vec<(&'static str, String)> {
    match limit {
        Some(n) if n > 0 => vec![("limit", n.to_string())],
        _ => Vec::new(),
    }
}

pub(crate) fn decode_error(err: &serde_json::Error, body: String) -> Error {
    let preview: String = body.chars().take(200).collect();
    Error::Deserialization {
        message: format!("{err} (body preview: {preview:?})"),
        body,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client(base: &str) -> BloodHoundClient {
        BloodHoundClient::with_client(reqwest::Client::new(), Url::parse(base).unwrap())
    }

    #[test]
    fn api_url_appends_version_prefix() {
        let c = client("https://bh.example.com");
        let url = c.api_url(&["users", "S-1-5-21-1-500", "sessions"]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://bh.example.com/api/v2/users/S-1-5-21-1-500/sessions"
        );
    }

    #[test]
    fn api_url_keeps_base_path_and_encodes_segments() {
        let c = client("https://host/bloodhound/");
        let url = c.api_url(&["search"]).unwrap();
        assert_eq!(url.as_str(), "https://host/bloodhound/api/v2/search");

        let url = c.api_url(&["groups", "A B/C"]).unwrap();
        assert_eq!(url.path(), "/bloodhound/api/v2/groups/A%20B%2FC");
    }

    #[test]
    fn limit_zero_means_server_default() {
        assert!(limit_query(None).is_empty());
        assert!(limit_query(Some(0)).is_empty());
        assert_eq!(limit_query(Some(25)), vec![("limit", "25".to_owned())]);
    }

    #[test]
    fn error_body_message_is_extracted() {
        let resp = RawResponse {
            status: StatusCode::BAD_REQUEST,
            headers: HeaderMap::new(),
            body: Bytes::from_static(
                br#"{"http_status":400,"timestamp":"2024-01-01T00:00:00Z","request_id":"req-1","errors":[{"context":"query","message":"bad cypher"}]}"#,
            ),
        };
        match BloodHoundClient::check_status(resp) {
            Err(Error::Api {
                status,
                message,
                request_id,
                ..
            }) => {
                assert_eq!(status, 400);
                assert_eq!(message, "bad cypher");
                assert_eq!(request_id.as_deref(), Some("req-1"));
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[test]
    fn error_without_body_gets_generic_message() {
        let resp = RawResponse {
            status: StatusCode::BAD_GATEWAY,
            headers: HeaderMap::new(),
            body: Bytes::new(),
        };
        let err = BloodHoundClient::check_status(resp).unwrap_err();
        assert!(err.to_string().contains("502"), "got: {err}");
    }
}
