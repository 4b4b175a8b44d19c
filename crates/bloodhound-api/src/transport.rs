// Transport configuration for building the reqwest::Client.
//
// TLS, timeout, compression, and default headers live here so the API
// client only deals with URLs, auth, and envelopes.

use std::path::PathBuf;
use std::time::Duration;

use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};

use crate::error::Error;

/// Default overall per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

const USER_AGENT: &str = concat!("bloodhound-api/", env!("CARGO_PKG_VERSION"));

/// TLS verification mode.
#[derive(Debug, Clone, Default)]
pub enum TlsMode {
    /// Use the system certificate store.
    #[default]
    System,
    /// Use a custom CA certificate from the given PEM file.
    CustomCa(PathBuf),
    /// Accept any certificate (lab instances with self-signed certs).
    DangerAcceptInvalid,
}

/// Transport settings shared by every request a client makes.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub tls: TlsMode,
    /// Single overall timeout applied to each request.
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            tls: TlsMode::System,
            timeout: DEFAULT_TIMEOUT,
            user_agent: USER_AGENT.to_owned(),
        }
    }
}

impl TransportConfig {
    /// Override the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Override the TLS mode.
    pub fn with_tls(mut self, tls: TlsMode) -> Self {
        self.tls = tls;
        self
    }

    /// Build a `reqwest::Client` from this config.
    ///
    /// Gzip response decompression is negotiated by reqwest itself
    /// (`Accept-Encoding: gzip` plus transparent decoding).
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/json, text/plain, */*"),
        );

        let mut builder = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(self.user_agent.as_str())
            .default_headers(headers)
            .gzip(true);

        match &self.tls {
            TlsMode::System => {}
            TlsMode::CustomCa(path) => {
                let cert_pem = std::fs::read(path)
                    .map_err(|e| Error::Tls(format!("failed to read CA cert: {e}")))?;
                let cert = reqwest::Certificate::from_pem(&cert_pem)
                    .map_err(|e| Error::Tls(format!("invalid CA cert: {e}")))?;
                builder = builder.add_root_certificate(cert);
            }
            TlsMode::DangerAcceptInvalid => {
                builder = builder.danger_accept_invalid_certs(true);
            }
        }

        builder
            .build()
            .map_err(|e| Error::Tls(format!("failed to build HTTP client: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_use_long_timeout_and_system_roots() {
        let config = TransportConfig::default();
        assert_eq!(config.timeout, Duration::from_secs(120));
        assert!(matches!(config.tls, TlsMode::System));
        assert!(config.user_agent.starts_with("bloodhound-api/"));
    }

    #[test]
    fn missing_ca_file_is_a_tls_error() {
        let config = TransportConfig::default()
            .with_tls(TlsMode::CustomCa(PathBuf::from("/nonexistent/ca.pem")));
        assert!(matches!(config.build_client(), Err(Error::Tls(_))));
    }
}
