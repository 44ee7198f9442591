//! Certificate login against the Betfair identity endpoint.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client as HttpClient, Identity};
use tracing::{info, warn};
use url::Url;

use super::client::{BetfairClient, APPLICATION_HEADER};
use super::dto::response::LoginResponse;
use super::settings::{BetfairConfig, BetfairCredentials};
use crate::error::{ExchangeError, Result};
use crate::port::{BettingExchange, SessionConnector};

const LOGIN_SUCCESS: &str = "SUCCESS";

/// Opens betting API sessions using the account's client certificate.
pub struct BetfairConnector {
    http: HttpClient,
    identity_url: Url,
    api_url: Url,
    credentials: BetfairCredentials,
}

impl BetfairConnector {
    /// Build the connector, loading the client certificate from disk.
    ///
    /// # Errors
    ///
    /// Returns an error if a URL is invalid, the certificate or key cannot be
    /// read, or the HTTP client cannot be built.
    pub fn new(config: &BetfairConfig, credentials: BetfairCredentials) -> Result<Self> {
        let mut pem = std::fs::read(&config.cert_path)?;
        pem.push(b'\n');
        pem.extend(std::fs::read(&config.key_path)?);
        let identity = Identity::from_pem(&pem)?;

        let http = HttpClient::builder()
            .identity(identity)
            .timeout(Duration::from_millis(config.http.timeout_ms))
            .connect_timeout(Duration::from_millis(config.http.connect_timeout_ms))
            .build()?;

        Ok(Self {
            http,
            identity_url: Url::parse(&config.identity_url)?,
            api_url: Url::parse(&config.api_url)?,
            credentials,
        })
    }

    async fn login(&self) -> Result<String> {
        let response = self
            .http
            .post(self.identity_url.clone())
            .header(APPLICATION_HEADER, &self.credentials.app_key)
            .form(&[
                ("username", self.credentials.username.as_str()),
                ("password", self.credentials.password.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json::<LoginResponse>()
            .await?;

        session_token(response)
    }
}

/// Extract the session token from a login response.
///
/// # Errors
///
/// Returns [`ExchangeError::LoginFailed`] unless the login succeeded.
pub fn session_token(response: LoginResponse) -> Result<String> {
    match response.session_token {
        Some(token) if response.login_status == LOGIN_SUCCESS => Ok(token),
        _ => {
            warn!(status = %response.login_status, "Login rejected");
            Err(ExchangeError::LoginFailed(response.login_status).into())
        }
    }
}

#[async_trait]
impl SessionConnector for BetfairConnector {
    async fn connect(&self) -> Result<Box<dyn BettingExchange>> {
        let token = self.login().await?;
        info!(username = %self.credentials.username, "Logged in to Betfair");
        Ok(Box::new(BetfairClient::new(
            self.http.clone(),
            self.api_url.clone(),
            self.credentials.app_key.clone(),
            token,
        )))
    }
}
