//! Betfair betting API client.
//!
//! Every call is a JSON `POST` to `<api_url>/<method>/` carrying the
//! application key and the session token. A non-success status carries an
//! `APINGException` body whose error code decides between a session expiry
//! and a plain API error.

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;
use url::Url;

use super::dto::request::{
    projection_name, sort_name, ListEventsRequest, ListMarketBookRequest,
    ListMarketCatalogueRequest, MarketFilterDto,
};
use super::dto::response::{EventResultDto, FaultResponse, MarketBookDto, MarketCatalogueDto};
use crate::domain::{MarketBook, MarketId};
use crate::error::{ExchangeError, Result};
use crate::port::{
    BettingExchange, EventSummary, MarketCatalogue, MarketFilter, MarketProjection, MarketSort,
    PriceProjection,
};

/// Error codes that a fresh login resolves.
const SESSION_ERROR_CODES: [&str; 2] = ["INVALID_SESSION_INFORMATION", "NO_SESSION"];

/// Header carrying the application key.
pub const APPLICATION_HEADER: &str = "X-Application";
/// Header carrying the session token.
pub const AUTHENTICATION_HEADER: &str = "X-Authentication";

/// Betting API client bound to one session token.
pub struct BetfairClient {
    http: HttpClient,
    api_url: Url,
    app_key: String,
    session_token: String,
}

impl BetfairClient {
    #[must_use]
    pub fn new(
        http: HttpClient,
        api_url: Url,
        app_key: impl Into<String>,
        session_token: impl Into<String>,
    ) -> Self {
        Self {
            http,
            api_url,
            app_key: app_key.into(),
            session_token: session_token.into(),
        }
    }

    async fn call<Req, Resp>(&self, method: &str, body: &Req) -> Result<Resp>
    where
        Req: Serialize + Sync,
        Resp: DeserializeOwned,
    {
        let url = self.api_url.join(&format!("{method}/"))?;
        debug!(method, "Calling betting API");

        let response = self
            .http
            .post(url)
            .header(APPLICATION_HEADER, &self.app_key)
            .header(AUTHENTICATION_HEADER, &self.session_token)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<Resp>().await?);
        }

        let text = response.text().await.unwrap_or_default();
        Err(fault_to_error(status.as_u16(), &text).into())
    }
}

/// Map a failed response to an [`ExchangeError`].
pub fn fault_to_error(status: u16, body: &str) -> ExchangeError {
    let Ok(fault) = serde_json::from_str::<FaultResponse>(body) else {
        return ExchangeError::Api {
            code: format!("HTTP_{status}"),
            message: body.chars().take(200).collect(),
        };
    };

    match fault.error_code() {
        Some(code) if SESSION_ERROR_CODES.contains(&code) => ExchangeError::SessionExpired {
            code: code.to_string(),
        },
        Some(code) => ExchangeError::Api {
            code: code.to_string(),
            message: fault.error_details().unwrap_or_default().to_string(),
        },
        None => ExchangeError::Api {
            code: format!("HTTP_{status}"),
            message: String::new(),
        },
    }
}

#[async_trait]
impl BettingExchange for BetfairClient {
    async fn list_events(&self, filter: &MarketFilter) -> Result<Vec<EventSummary>> {
        let request = ListEventsRequest {
            filter: MarketFilterDto::from(filter),
        };
        let events: Vec<EventResultDto> = self.call("listEvents", &request).await?;
        debug!(count = events.len(), "Fetched events");
        Ok(events
            .into_iter()
            .map(|e| EventSummary::from(e.event))
            .collect())
    }

    async fn list_market_catalogues(
        &self,
        filter: &MarketFilter,
        projection: &[MarketProjection],
        max_results: usize,
        sort: MarketSort,
    ) -> Result<Vec<MarketCatalogue>> {
        let request = ListMarketCatalogueRequest {
            filter: MarketFilterDto::from(filter),
            market_projection: projection.iter().map(|p| projection_name(*p)).collect(),
            sort: sort_name(sort),
            max_results,
        };
        let catalogues: Vec<MarketCatalogueDto> =
            self.call("listMarketCatalogue", &request).await?;
        debug!(count = catalogues.len(), "Fetched market catalogues");
        Ok(catalogues.into_iter().map(MarketCatalogue::from).collect())
    }

    async fn list_market_books(
        &self,
        market_ids: &[MarketId],
        projection: &PriceProjection,
    ) -> Result<Vec<MarketBook>> {
        let request = ListMarketBookRequest::new(market_ids, projection);
        let books: Vec<MarketBookDto> = self.call("listMarketBook", &request).await?;
        Ok(books.into_iter().map(MarketBook::from).collect())
    }

    fn exchange_name(&self) -> &'static str {
        "Betfair"
    }
}
