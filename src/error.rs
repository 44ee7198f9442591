use thiserror::Error;

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}

/// Errors reported by the betting exchange.
#[derive(Error, Debug)]
pub enum ExchangeError {
    /// The session token was rejected; a fresh login fixes it.
    #[error("session expired: {code}")]
    SessionExpired { code: String },

    #[error("exchange API error {code}: {message}")]
    Api { code: String, message: String },

    #[error("login failed: {0}")]
    LoginFailed(String),

    #[error("malformed exchange response: {0}")]
    Malformed(String),
}

/// Persistence sink errors.
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("csv sink error: {0}")]
    Csv(#[from] csv::Error),

    #[error("database sink error: {0}")]
    Database(String),

    #[error("search index rejected {failed} of {total} documents")]
    SearchRejected { failed: usize, total: usize },

    #[error("sink {sink} did not accept the batch: {reason}")]
    Undelivered { sink: &'static str, reason: String },
}

impl From<diesel::result::Error> for SinkError {
    fn from(err: diesel::result::Error) -> Self {
        Self::Database(err.to_string())
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Exchange(#[from] ExchangeError),

    #[error(transparent)]
    Sink(#[from] SinkError),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    #[error("connection error: {0}")]
    Connection(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// How the polling loop should react to a failed cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Re-authenticate and retry immediately, keeping all tracking state.
    SessionExpired,
    /// Retry after the tiered backoff.
    Transient,
    /// Cannot be fixed by retrying.
    Fatal,
}

impl Error {
    /// Classify this error for the scheduler.
    #[must_use]
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::Exchange(ExchangeError::SessionExpired { .. }) => ErrorClass::SessionExpired,
            Self::Config(_) | Self::Exchange(ExchangeError::LoginFailed(_)) => ErrorClass::Fatal,
            _ => ErrorClass::Transient,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_expired_is_classified_for_reauth() {
        let err: Error = ExchangeError::SessionExpired {
            code: "INVALID_SESSION_INFORMATION".into(),
        }
        .into();
        assert_eq!(err.class(), ErrorClass::SessionExpired);
    }

    #[test]
    fn api_and_io_errors_are_transient() {
        let api: Error = ExchangeError::Api {
            code: "TOO_MUCH_DATA".into(),
            message: "too much data".into(),
        }
        .into();
        let io: Error = std::io::Error::other("disk full").into();
        assert_eq!(api.class(), ErrorClass::Transient);
        assert_eq!(io.class(), ErrorClass::Transient);
    }

    #[test]
    fn login_failure_is_fatal() {
        let err: Error = ExchangeError::LoginFailed("CERT_AUTH_REQUIRED".into()).into();
        assert_eq!(err.class(), ErrorClass::Fatal);
    }
}
