//! Betfair exchange configuration.

use std::path::PathBuf;

use serde::Deserialize;

use crate::error::ConfigError;

/// Environment variable holding the account username.
pub const USERNAME_ENV: &str = "BETFAIR_USERNAME";
/// Environment variable holding the account password.
pub const PASSWORD_ENV: &str = "BETFAIR_PASSWORD";
/// Environment variable holding the application key.
pub const APP_KEY_ENV: &str = "BETFAIR_APP_KEY";

/// Betfair endpoints and client certificate.
#[derive(Debug, Clone, Deserialize)]
pub struct BetfairConfig {
    /// Certificate login endpoint.
    #[serde(default = "default_identity_url")]
    pub identity_url: String,
    /// Betting API REST root; method names are appended to it.
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// PEM client certificate registered with the account.
    #[serde(default = "default_cert_path")]
    pub cert_path: PathBuf,
    /// PEM private key of the client certificate.
    #[serde(default = "default_key_path")]
    pub key_path: PathBuf,
    #[serde(default)]
    pub http: BetfairHttpConfig,
}

fn default_identity_url() -> String {
    "https://identitysso-cert.betfair.com/api/certlogin".into()
}

fn default_api_url() -> String {
    "https://api.betfair.com/exchange/betting/rest/v1.0/".into()
}

fn default_cert_path() -> PathBuf {
    PathBuf::from("certs/client-2048.crt")
}

fn default_key_path() -> PathBuf {
    PathBuf::from("certs/client-2048.key")
}

impl Default for BetfairConfig {
    fn default() -> Self {
        Self {
            identity_url: default_identity_url(),
            api_url: default_api_url(),
            cert_path: default_cert_path(),
            key_path: default_key_path(),
            http: BetfairHttpConfig::default(),
        }
    }
}

/// Betfair HTTP client configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct BetfairHttpConfig {
    /// Request timeout in milliseconds.
    #[serde(default = "default_http_timeout_ms")]
    pub timeout_ms: u64,
    /// Connect timeout in milliseconds.
    #[serde(default = "default_http_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
}

const fn default_http_timeout_ms() -> u64 {
    10_000
}

const fn default_http_connect_timeout_ms() -> u64 {
    3000
}

impl Default for BetfairHttpConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_http_timeout_ms(),
            connect_timeout_ms: default_http_connect_timeout_ms(),
        }
    }
}

/// Account secrets, read from the environment only.
#[derive(Clone)]
pub struct BetfairCredentials {
    pub username: String,
    pub password: String,
    pub app_key: String,
}

impl std::fmt::Debug for BetfairCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BetfairCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("app_key", &"<redacted>")
            .finish()
    }
}

impl BetfairCredentials {
    /// Read the credentials from `BETFAIR_USERNAME`, `BETFAIR_PASSWORD` and
    /// `BETFAIR_APP_KEY`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingField`] naming the first unset or empty
    /// variable.
    #[allow(clippy::result_large_err)]
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            username: require_env(USERNAME_ENV)?,
            password: require_env(PASSWORD_ENV)?,
            app_key: require_env(APP_KEY_ENV)?,
        })
    }
}

#[allow(clippy::result_large_err)]
fn require_env(name: &'static str) -> Result<String, ConfigError> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::MissingField { field: name }),
    }
}
