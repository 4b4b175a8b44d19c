//! Configuration profiles for BloodHound API clients.
//!
//! TOML profiles, credential resolution (env + keyring + plaintext), and
//! translation to `bloodhound_api::ClientConfig`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use bloodhound_api::{BloodHoundClient, ClientConfig, Credentials, TlsMode, TransportConfig};

const KEYRING_SERVICE: &str = "bloodhound";
const ENV_PREFIX: &str = "BLOODHOUND_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no credentials configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("unknown profile '{0}'")]
    UnknownProfile(String),

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to build client: {0}")]
    Client(#[from] bloodhound_api::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when none is named.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named BloodHound instances.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

impl Config {
    /// Look up a profile by name, falling back to `default_profile`.
    pub fn profile<'a>(&'a self, name: Option<&'a str>) -> Result<(&'a str, &'a Profile), ConfigError> {
        let name = name
            .or(self.default_profile.as_deref())
            .unwrap_or("default");
        self.profiles
            .get(name)
            .map(|profile| (name, profile))
            .ok_or_else(|| ConfigError::UnknownProfile(name.into()))
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default)]
    pub insecure: bool,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            insecure: false,
            timeout: default_timeout(),
        }
    }
}

fn default_timeout() -> u64 {
    120
}

/// A named BloodHound instance.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Profile {
    /// Instance base URL (e.g., "https://bloodhound.corp.local").
    pub url: String,

    /// Login name for secret-based auth.
    pub username: Option<String>,

    /// Login secret (plaintext; prefer keyring or env var).
    pub password: Option<String>,

    /// Environment variable holding the login secret.
    pub password_env: Option<String>,

    /// Pre-issued session token (plaintext; prefer keyring or env var).
    pub token: Option<String>,

    /// Environment variable holding a session token.
    pub token_env: Option<String>,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Override insecure TLS setting.
    pub insecure: Option<bool>,

    /// Override timeout (seconds).
    pub timeout: Option<u64>,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "bloodhound", "bloodhound").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("bloodhound");
    p
}

// ── Config loading ──────────────────────────────────────────────────

fn file_figment(path: &Path) -> Figment {
    Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
}

/// Load the full Config from the canonical file + `BLOODHOUND_*` environment.
///
/// Nested keys use a double underscore: `BLOODHOUND_DEFAULT_PROFILE`,
/// `BLOODHOUND_DEFAULTS__TIMEOUT`, `BLOODHOUND_PROFILES__LAB__URL`.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_with_env(&config_path())
}

fn load_config_with_env(path: &Path) -> Result<Config, ConfigError> {
    let config: Config = file_figment(path)
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
        .extract()?;
    Ok(config)
}

/// Load config from an explicit file, without environment overrides.
/// A missing file yields the defaults.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let config: Config = file_figment(path).extract()?;
    Ok(config)
}

/// Load config, returning a default if loading fails.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Credential resolution ───────────────────────────────────────────

fn keyring_secret(profile_name: &str, item: &str) -> Option<String> {
    keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/{item}"))
        .ok()
        .and_then(|entry| entry.get_password().ok())
}

/// Resolve credentials for a profile.
///
/// Session tokens win over passwords. Each is looked up in order: the
/// profile's `*_env` variable, `BLOODHOUND_TOKEN` / `BLOODHOUND_PASSWORD`,
/// the system keyring (`bloodhound` service, `{profile}/token` or
/// `{profile}/password`), then plaintext in the profile.
pub fn resolve_credentials(profile: &Profile, profile_name: &str) -> Result<Credentials, ConfigError> {
    resolve_credentials_with(
        profile,
        profile_name,
        |name| std::env::var(name).ok(),
        |item| keyring_secret(profile_name, item),
    )
}

fn resolve_credentials_with(
    profile: &Profile,
    profile_name: &str,
    env: impl Fn(&str) -> Option<String>,
    keyring: impl Fn(&str) -> Option<String>,
) -> Result<Credentials, ConfigError> {
    let from_env_var = |var: Option<&String>| var.and_then(|name| env(name));

    // 1. Session token
    let token = from_env_var(profile.token_env.as_ref())
        .or_else(|| env("BLOODHOUND_TOKEN"))
        .or_else(|| keyring("token"))
        .or_else(|| profile.token.clone())
        .filter(|t| !t.is_empty());
    if let Some(token) = token {
        return Ok(Credentials::SessionToken(SecretString::from(token)));
    }

    // 2. Username + secret
    let no_credentials = || ConfigError::NoCredentials {
        profile: profile_name.into(),
    };
    let username = profile
        .username
        .clone()
        .or_else(|| env("BLOODHOUND_USERNAME"))
        .filter(|u| !u.is_empty())
        .ok_or_else(no_credentials)?;
    let password = from_env_var(profile.password_env.as_ref())
        .or_else(|| env("BLOODHOUND_PASSWORD"))
        .or_else(|| keyring("password"))
        .or_else(|| profile.password.clone())
        .ok_or_else(no_credentials)?;

    Ok(Credentials::Password {
        username,
        password: SecretString::from(password),
    })
}

// ── Client construction ─────────────────────────────────────────────

/// Build a `ClientConfig` from a profile. No token is attached; pair it with
/// [`resolve_credentials`] and `BloodHoundClient::authenticate`.
pub fn profile_to_client_config(
    profile: &Profile,
    defaults: &Defaults,
) -> Result<ClientConfig, ConfigError> {
    let base_url: url::Url = profile.url.parse().map_err(|_| ConfigError::Validation {
        field: "url".into(),
        reason: format!("invalid URL: {}", profile.url),
    })?;
    if !matches!(base_url.scheme(), "http" | "https") {
        return Err(ConfigError::Validation {
            field: "url".into(),
            reason: format!("expected an http(s) URL, got '{}'", profile.url),
        });
    }

    let tls = if profile.insecure.unwrap_or(defaults.insecure) {
        TlsMode::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsMode::CustomCa(ca_path.clone())
    } else {
        TlsMode::System
    };

    let timeout = Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout));

    Ok(ClientConfig {
        base_url,
        transport: TransportConfig::default()
            .with_tls(tls)
            .with_timeout(timeout),
        token: None,
    })
}

/// Build an unauthenticated client for a named profile along with the
/// credentials to authenticate it.
pub fn client_for_profile(
    config: &Config,
    profile_name: Option<&str>,
) -> Result<(BloodHoundClient, Credentials), ConfigError> {
    let (name, profile) = config.profile(profile_name)?;
    let client_config = profile_to_client_config(profile, &config.defaults)?;
    let credentials = resolve_credentials(profile, name)?;
    let client = BloodHoundClient::new(client_config)?;
    Ok((client, credentials))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use secrecy::ExposeSecret;

    use super::*;

    const SAMPLE: &str = r#"
default_profile = "lab"

[defaults]
timeout = 60

[profiles.lab]
url = "https://bloodhound.lab.local"
username = "admin"
password = "plaintext-secret"
insecure = true

[profiles.prod]
url = "https://bloodhound.corp.local"
token_env = "PROD_BH_TOKEN"
ca_cert = "/etc/ssl/corp-ca.pem"
timeout = 300
"#;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn sample_config() -> Config {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, SAMPLE).unwrap();
        load_config_from(&path).unwrap()
    }

    #[test]
    fn loads_profiles_and_defaults() {
        let config = sample_config();
        assert_eq!(config.default_profile.as_deref(), Some("lab"));
        assert_eq!(config.defaults.timeout, 60);
        assert!(!config.defaults.insecure);
        assert_eq!(config.profiles.len(), 2);

        let (name, lab) = config.profile(None).unwrap();
        assert_eq!(name, "lab");
        assert_eq!(lab.username.as_deref(), Some("admin"));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.default_profile.as_deref(), Some("default"));
        assert_eq!(config.defaults.timeout, 120);
        assert!(config.profiles.is_empty());
    }

    #[test]
    fn env_overrides_file_values() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("config.toml", SAMPLE)?;
            jail.set_env("BLOODHOUND_DEFAULT_PROFILE", "prod");
            jail.set_env("BLOODHOUND_DEFAULTS__TIMEOUT", "30");
            jail.set_env("BLOODHOUND_PROFILES__LAB__URL", "https://bh.override.local");

            let config = load_config_with_env(&jail.directory().join("config.toml")).unwrap();
            assert_eq!(config.default_profile.as_deref(), Some("prod"));
            assert_eq!(config.defaults.timeout, 30);
            assert_eq!(config.profiles["lab"].url, "https://bh.override.local");
            assert_eq!(config.profiles["lab"].username.as_deref(), Some("admin"));
            Ok(())
        });
    }

    #[test]
    fn unknown_profile_is_an_error() {
        let config = sample_config();
        assert!(matches!(
            config.profile(Some("staging")),
            Err(ConfigError::UnknownProfile(name)) if name == "staging"
        ));
    }

    #[test]
    fn saved_config_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.profiles.insert(
            "default".into(),
            Profile {
                url: "https://bh.example.com".into(),
                username: Some("analyst".into()),
                ..Profile::default()
            },
        );
        save_config_to(&config, &path).unwrap();

        let loaded = load_config_from(&path).unwrap();
        let (_, profile) = loaded.profile(None).unwrap();
        assert_eq!(profile.url, "https://bh.example.com");
        assert_eq!(profile.username.as_deref(), Some("analyst"));
    }

    #[test]
    fn client_config_applies_overrides() {
        let config = sample_config();

        let (_, lab) = config.profile(Some("lab")).unwrap();
        let lab_cfg = profile_to_client_config(lab, &config.defaults).unwrap();
        assert_eq!(lab_cfg.base_url.as_str(), "https://bloodhound.lab.local/");
        assert_eq!(lab_cfg.transport.timeout, Duration::from_secs(60));
        assert!(matches!(lab_cfg.transport.tls, TlsMode::DangerAcceptInvalid));
        assert!(lab_cfg.token.is_none());

        let (_, prod) = config.profile(Some("prod")).unwrap();
        let prod_cfg = profile_to_client_config(prod, &config.defaults).unwrap();
        assert_eq!(prod_cfg.transport.timeout, Duration::from_secs(300));
        assert!(matches!(
            prod_cfg.transport.tls,
            TlsMode::CustomCa(ref p) if p == Path::new("/etc/ssl/corp-ca.pem")
        ));
    }

    #[test]
    fn rejects_bad_urls() {
        let defaults = Defaults::default();
        for url in ["not a url", "ftp://bh.example.com"] {
            let profile = Profile {
                url: url.into(),
                ..Profile::default()
            };
            assert!(matches!(
                profile_to_client_config(&profile, &defaults),
                Err(ConfigError::Validation { .. })
            ));
        }
    }

    #[test]
    fn plaintext_password_is_last_resort() {
        let config = sample_config();
        let (name, lab) = config.profile(Some("lab")).unwrap();

        let creds = resolve_credentials_with(lab, name, no_env, |_| None).unwrap();
        match creds {
            Credentials::Password { username, password } => {
                assert_eq!(username, "admin");
                assert_eq!(password.expose_secret(), "plaintext-secret");
            }
            Credentials::SessionToken(_) => panic!("expected password credentials"),
        }

        let creds = resolve_credentials_with(lab, name, no_env, |item| {
            (item == "password").then(|| "from-keyring".to_owned())
        })
        .unwrap();
        match creds {
            Credentials::Password { password, .. } => {
                assert_eq!(password.expose_secret(), "from-keyring");
            }
            Credentials::SessionToken(_) => panic!("expected password credentials"),
        }
    }

    #[test]
    fn token_wins_over_password() {
        let config = sample_config();
        let (name, prod) = config.profile(Some("prod")).unwrap();

        let env = |var: &str| (var == "PROD_BH_TOKEN").then(|| "env-token".to_owned());
        let creds = resolve_credentials_with(prod, name, env, |_| None).unwrap();
        match creds {
            Credentials::SessionToken(token) => assert_eq!(token.expose_secret(), "env-token"),
            Credentials::Password { .. } => panic!("expected token credentials"),
        }
    }

    #[test]
    fn missing_credentials_are_reported() {
        let config = sample_config();
        let (name, prod) = config.profile(Some("prod")).unwrap();

        let err = resolve_credentials_with(prod, name, no_env, |_| None).unwrap_err();
        assert!(matches!(err, ConfigError::NoCredentials { profile } if profile == "prod"));
    }
}
