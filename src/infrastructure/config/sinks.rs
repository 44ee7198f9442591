//! Persistence sink configuration.

use std::path::PathBuf;

use serde::Deserialize;

use crate::adapter::outbound::search::SearchCredentials;

/// Environment variable holding the search cluster username.
pub const ELASTIC_USERNAME_ENV: &str = "ELASTIC_USERNAME";
/// Environment variable holding the search cluster password.
pub const ELASTIC_PASSWORD_ENV: &str = "ELASTIC_PASSWORD";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SinksConfig {
    #[serde(default)]
    pub csv: CsvSinkConfig,
    #[serde(default)]
    pub sqlite: SqliteSinkConfig,
    #[serde(default)]
    pub search: SearchSinkConfig,
}

impl SinksConfig {
    /// Names of the enabled sinks.
    #[must_use]
    pub fn enabled(&self) -> Vec<&'static str> {
        [
            ("csv", self.csv.enabled),
            ("sqlite", self.sqlite.enabled),
            ("search", self.search.enabled),
        ]
        .into_iter()
        .filter_map(|(name, on)| on.then_some(name))
        .collect()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CsvSinkConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Directory holding the four CSV files.
    #[serde(default = "default_csv_directory")]
    pub directory: PathBuf,
}

const fn default_true() -> bool {
    true
}

fn default_csv_directory() -> PathBuf {
    PathBuf::from("data")
}

impl Default for CsvSinkConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            directory: default_csv_directory(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SqliteSinkConfig {
    #[serde(default)]
    pub enabled: bool,
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database: String,
}

fn default_database_path() -> String {
    "livebook.db".to_string()
}

impl Default for SqliteSinkConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            database: default_database_path(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchSinkConfig {
    #[serde(default)]
    pub enabled: bool,
    /// Cluster base URL.
    #[serde(default = "default_search_url")]
    pub url: String,
    /// Indices are named `<prefix>-runner-names` and so on.
    #[serde(default = "default_index_prefix")]
    pub index_prefix: String,
    #[serde(default = "default_search_timeout_ms")]
    pub timeout_ms: u64,
    /// Loaded from `ELASTIC_USERNAME` / `ELASTIC_PASSWORD`, never from the file.
    #[serde(skip)]
    pub credentials: Option<SearchCredentials>,
}

fn default_search_url() -> String {
    "http://localhost:9200".into()
}

fn default_index_prefix() -> String {
    "data".into()
}

const fn default_search_timeout_ms() -> u64 {
    10_000
}

impl Default for SearchSinkConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            url: default_search_url(),
            index_prefix: default_index_prefix(),
            timeout_ms: default_search_timeout_ms(),
            credentials: None,
        }
    }
}

impl SearchSinkConfig {
    /// Read basic-auth credentials when both variables are set.
    pub fn load_credentials_from_env(&mut self) {
        let username = std::env::var(ELASTIC_USERNAME_ENV).ok();
        let password = std::env::var(ELASTIC_PASSWORD_ENV).ok();
        self.credentials = match (username, password) {
            (Some(username), Some(password)) if !username.is_empty() => {
                Some(SearchCredentials { username, password })
            }
            _ => None,
        };
    }
}
