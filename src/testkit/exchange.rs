//! Scripted exchange doubles.
//!
//! [`ScriptedExchange`] pops one pre-loaded response per call and records
//! every request. Clones share the same script and call log, so a test can
//! hand one clone to the engine and inspect another.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::domain::{MarketBook, MarketId};
use crate::error::{Error, ExchangeError, Result};
use crate::port::{
    BettingExchange, EventSummary, MarketCatalogue, MarketFilter, MarketProjection, MarketSort,
    PriceProjection, SessionConnector,
};

/// Error the exchange returns for a stale session token.
pub fn session_expired() -> Error {
    ExchangeError::SessionExpired {
        code: "INVALID_SESSION_INFORMATION".into(),
    }
    .into()
}

/// A network failure.
pub fn transient(reason: &str) -> Error {
    Error::Connection(reason.to_string())
}

#[derive(Default)]
struct Script {
    events: VecDeque<Result<Vec<EventSummary>>>,
    catalogues: VecDeque<Result<Vec<MarketCatalogue>>>,
    books: VecDeque<Result<Vec<MarketBook>>>,
    event_filters: Vec<MarketFilter>,
    catalogue_requests: Vec<(MarketFilter, usize)>,
    book_requests: Vec<Vec<MarketId>>,
}

/// Exchange double answering from per-operation queues.
///
/// Exhausted queues answer with an empty list.
#[derive(Clone, Default)]
pub struct ScriptedExchange {
    script: Arc<Mutex<Script>>,
}

impl ScriptedExchange {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_events(&self, result: Result<Vec<EventSummary>>) -> &Self {
        self.script.lock().events.push_back(result);
        self
    }

    pub fn push_catalogues(&self, result: Result<Vec<MarketCatalogue>>) -> &Self {
        self.script.lock().catalogues.push_back(result);
        self
    }

    pub fn push_books(&self, result: Result<Vec<MarketBook>>) -> &Self {
        self.script.lock().books.push_back(result);
        self
    }

    /// Filters passed to `list_events`, in call order.
    pub fn event_filters(&self) -> Vec<MarketFilter> {
        self.script.lock().event_filters.clone()
    }

    /// Filters and result caps passed to `list_market_catalogues`.
    pub fn catalogue_requests(&self) -> Vec<(MarketFilter, usize)> {
        self.script.lock().catalogue_requests.clone()
    }

    /// Market ids passed to `list_market_books`, in call order.
    pub fn book_requests(&self) -> Vec<Vec<MarketId>> {
        self.script.lock().book_requests.clone()
    }
}

#[async_trait]
impl BettingExchange for ScriptedExchange {
    async fn list_events(&self, filter: &MarketFilter) -> Result<Vec<EventSummary>> {
        let mut script = self.script.lock();
        script.event_filters.push(filter.clone());
        script.events.pop_front().unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn list_market_catalogues(
        &self,
        filter: &MarketFilter,
        _projection: &[MarketProjection],
        max_results: usize,
        _sort: MarketSort,
    ) -> Result<Vec<MarketCatalogue>> {
        let mut script = self.script.lock();
        script.catalogue_requests.push((filter.clone(), max_results));
        script.catalogues.pop_front().unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn list_market_books(
        &self,
        market_ids: &[MarketId],
        _projection: &PriceProjection,
    ) -> Result<Vec<MarketBook>> {
        let mut script = self.script.lock();
        script.book_requests.push(market_ids.to_vec());
        script.books.pop_front().unwrap_or_else(|| Ok(Vec::new()))
    }

    fn exchange_name(&self) -> &'static str {
        "scripted"
    }
}

/// Connector handing out clones of one [`ScriptedExchange`].
///
/// Queued failures are returned first, one per `connect` call.
pub struct ScriptedConnector {
    exchange: ScriptedExchange,
    failures: Mutex<VecDeque<Error>>,
    connects: AtomicU32,
}

impl ScriptedConnector {
    pub fn new(exchange: ScriptedExchange) -> Self {
        Self {
            exchange,
            failures: Mutex::new(VecDeque::new()),
            connects: AtomicU32::new(0),
        }
    }

    pub fn with_failures(self, failures: Vec<Error>) -> Self {
        *self.failures.lock() = failures.into();
        self
    }

    pub fn connect_count(&self) -> u32 {
        self.connects.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SessionConnector for ScriptedConnector {
    async fn connect(&self) -> Result<Box<dyn BettingExchange>> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = self.failures.lock().pop_front() {
            return Err(error);
        }
        Ok(Box::new(self.exchange.clone()))
    }
}
