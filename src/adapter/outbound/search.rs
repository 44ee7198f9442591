//! Elasticsearch record sink.
//!
//! Sends each batch as one `_bulk` request. Every stream has its own index
//! (`<prefix>-runner-names`, `<prefix>-market-info`, `<prefix>-results`,
//! `<prefix>-market-data`) and every document a deterministic id, so a
//! replayed batch overwrites its earlier copy instead of duplicating it.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

use crate::domain::{MarketInfo, MarketResult, RecordBatch, RunnerName, Snapshot};
use crate::error::{Error, Result, SinkError};
use crate::port::RecordSink;

/// Basic-auth credentials for the cluster.
#[derive(Debug, Clone)]
pub struct SearchCredentials {
    pub username: String,
    pub password: String,
}

/// Elasticsearch bulk writer.
#[derive(Debug)]
pub struct SearchSink {
    client: Client,
    bulk_url: Url,
    index_prefix: String,
    credentials: Option<SearchCredentials>,
}

impl SearchSink {
    /// Create a sink targeting the cluster at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid or the HTTP client cannot be
    /// built.
    pub fn new(
        base_url: &str,
        index_prefix: impl Into<String>,
        credentials: Option<SearchCredentials>,
        timeout: Duration,
    ) -> Result<Self> {
        let bulk_url = Url::parse(base_url)?.join("_bulk")?;
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            bulk_url,
            index_prefix: index_prefix.into(),
            credentials,
        })
    }

    #[must_use]
    pub fn bulk_url(&self) -> &Url {
        &self.bulk_url
    }
}

#[derive(Serialize)]
struct BulkAction<'a> {
    index: BulkTarget<'a>,
}

#[derive(Serialize)]
struct BulkTarget<'a> {
    #[serde(rename = "_index")]
    index: &'a str,
    #[serde(rename = "_id")]
    id: String,
}

#[derive(Serialize)]
struct RunnerNameDoc<'a> {
    selection_id: u64,
    runner_name: &'a str,
}

#[derive(Serialize)]
struct MarketInfoDoc<'a> {
    market_id: &'a str,
    country_code: Option<&'a str>,
    competition_name: Option<&'a str>,
    competition_id: Option<&'a str>,
}

#[derive(Serialize)]
struct ResultDoc<'a> {
    market_id: &'a str,
    winner_selection_id: u64,
}

#[derive(Serialize)]
struct MarketDataDoc<'a> {
    selection_id: u64,
    back_price_1: f64,
    back_size_1: f64,
    back_price_2: f64,
    back_size_2: f64,
    back_price_3: f64,
    back_size_3: f64,
    lay_price_1: f64,
    lay_size_1: f64,
    lay_price_2: f64,
    lay_size_2: f64,
    lay_price_3: f64,
    lay_size_3: f64,
    last_price_traded: Option<f64>,
    market_status: &'static str,
    in_play: bool,
    market_id: &'a str,
    date: String,
}

fn to_f64(d: Decimal) -> f64 {
    d.to_f64().unwrap_or(0.0)
}

impl<'a> From<&'a Snapshot> for MarketDataDoc<'a> {
    fn from(s: &'a Snapshot) -> Self {
        let [b1, b2, b3] = s.back;
        let [l1, l2, l3] = s.lay;
        Self {
            selection_id: s.selection_id.value(),
            back_price_1: to_f64(b1.price),
            back_size_1: to_f64(b1.size),
            back_price_2: to_f64(b2.price),
            back_size_2: to_f64(b2.size),
            back_price_3: to_f64(b3.price),
            back_size_3: to_f64(b3.size),
            lay_price_1: to_f64(l1.price),
            lay_size_1: to_f64(l1.size),
            lay_price_2: to_f64(l2.price),
            lay_size_2: to_f64(l2.size),
            lay_price_3: to_f64(l3.price),
            lay_size_3: to_f64(l3.size),
            last_price_traded: s.last_price_traded.map(to_f64),
            market_status: s.market_status.as_str(),
            in_play: s.inplay,
            market_id: s.market_id.as_str(),
            date: s.timestamp.to_rfc3339(),
        }
    }
}

fn runner_name_doc(r: &RunnerName) -> (String, RunnerNameDoc<'_>) {
    (
        r.selection_id.to_string(),
        RunnerNameDoc {
            selection_id: r.selection_id.value(),
            runner_name: &r.name,
        },
    )
}

fn market_info_doc(m: &MarketInfo) -> (String, MarketInfoDoc<'_>) {
    (
        m.market_id.to_string(),
        MarketInfoDoc {
            market_id: m.market_id.as_str(),
            country_code: m.country_code.as_deref(),
            competition_name: m.competition_name.as_deref(),
            competition_id: m.competition_id.as_deref(),
        },
    )
}

fn result_doc(r: &MarketResult) -> (String, ResultDoc<'_>) {
    (
        r.market_id.to_string(),
        ResultDoc {
            market_id: r.market_id.as_str(),
            winner_selection_id: r.winner.value(),
        },
    )
}

fn market_data_doc(s: &Snapshot) -> (String, MarketDataDoc<'_>) {
    (
        format!("{}-{}-{}", s.market_id, s.selection_id, s.timestamp.timestamp()),
        MarketDataDoc::from(s),
    )
}

fn push_docs<'a, T, D, F>(body: &mut String, index: &str, rows: &'a [T], to_doc: F) -> Result<()>
where
    D: Serialize,
    F: Fn(&'a T) -> (String, D),
{
    for row in rows {
        let (id, doc) = to_doc(row);
        let action = BulkAction {
            index: BulkTarget { index, id },
        };
        body.push_str(&serde_json::to_string(&action)?);
        body.push('\n');
        body.push_str(&serde_json::to_string(&doc)?);
        body.push('\n');
    }
    Ok(())
}

/// Render a batch as an NDJSON bulk body.
///
/// # Errors
///
/// Returns an error if a document fails to serialize.
pub fn bulk_body(index_prefix: &str, batch: &RecordBatch) -> Result<String> {
    let mut body = String::new();
    push_docs(
        &mut body,
        &format!("{index_prefix}-runner-names"),
        &batch.runner_names,
        runner_name_doc,
    )?;
    push_docs(
        &mut body,
        &format!("{index_prefix}-market-info"),
        &batch.market_info,
        market_info_doc,
    )?;
    push_docs(
        &mut body,
        &format!("{index_prefix}-results"),
        &batch.results,
        result_doc,
    )?;
    push_docs(
        &mut body,
        &format!("{index_prefix}-market-data"),
        &batch.snapshots,
        market_data_doc,
    )?;
    Ok(body)
}

#[derive(Deserialize)]
struct BulkResponse {
    errors: bool,
    #[serde(default)]
    items: Vec<BulkItem>,
}

#[derive(Deserialize)]
struct BulkItem {
    index: Option<BulkItemStatus>,
}

#[derive(Deserialize)]
struct BulkItemStatus {
    status: u16,
    #[serde(default)]
    error: Option<serde_json::Value>,
}

/// Count the documents the cluster refused.
fn rejected(response: &BulkResponse) -> usize {
    if !response.errors {
        return 0;
    }
    response
        .items
        .iter()
        .filter_map(|item| item.index.as_ref())
        .filter(|status| status.status >= 300 || status.error.is_some())
        .count()
}

#[async_trait]
impl RecordSink for SearchSink {
    fn name(&self) -> &'static str {
        "search"
    }

    async fn write(&self, batch: &RecordBatch) -> Result<()> {
        if batch.is_empty() {
            return Ok(());
        }

        let body = bulk_body(&self.index_prefix, batch)?;
        let mut request = self
            .client
            .post(self.bulk_url.clone())
            .header("content-type", "application/x-ndjson")
            .body(body);
        if let Some(creds) = &self.credentials {
            request = request.basic_auth(&creds.username, Some(&creds.password));
        }

        let response = request
            .send()
            .await?
            .error_for_status()
            .map_err(|e| Error::Connection(e.to_string()))?
            .json::<BulkResponse>()
            .await?;

        let failed = rejected(&response);
        if failed > 0 {
            warn!(failed, total = batch.len(), "Search index rejected documents");
            return Err(SinkError::SearchRejected {
                failed,
                total: batch.len(),
            }
            .into());
        }

        debug!(documents = batch.len(), "Bulk request indexed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    use super::*;
    use crate::domain::{MarketId, MarketStatus, PriceSize, SelectionId, EMPTY_LEVEL};

    fn batch() -> RecordBatch {
        RecordBatch {
            runner_names: vec![RunnerName::new(SelectionId::new(47972), "Arsenal")],
            market_info: Vec::new(),
            results: vec![MarketResult {
                market_id: MarketId::new("1.199"),
                winner: SelectionId::new(47972),
            }],
            snapshots: vec![Snapshot {
                selection_id: SelectionId::new(47972),
                back: [PriceSize::new(dec!(2.5), dec!(120)), EMPTY_LEVEL, EMPTY_LEVEL],
                lay: [EMPTY_LEVEL; 3],
                last_price_traded: None,
                market_status: MarketStatus::Open,
                inplay: false,
                market_id: MarketId::new("1.200"),
                timestamp: Utc.with_ymd_and_hms(2026, 3, 14, 15, 0, 0).unwrap(),
            }],
        }
    }

    #[test]
    fn bulk_body_pairs_actions_with_documents() {
        let body = bulk_body("data", &batch()).unwrap();
        let lines: Vec<serde_json::Value> = body
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();

        assert_eq!(lines.len(), 6);
        assert_eq!(lines[0]["index"]["_index"], "data-runner-names");
        assert_eq!(lines[0]["index"]["_id"], "47972");
        assert_eq!(lines[1]["runner_name"], "Arsenal");
        assert_eq!(lines[2]["index"]["_index"], "data-results");
        assert_eq!(lines[3]["winner_selection_id"], 47972);
        assert_eq!(lines[4]["index"]["_index"], "data-market-data");
        assert_eq!(lines[4]["index"]["_id"], "1.200-47972-1773500400");
        assert_eq!(lines[5]["back_price_1"], 2.5);
        assert_eq!(lines[5]["lay_size_3"], 1.0);
        assert!(lines[5]["last_price_traded"].is_null());
    }

    #[test]
    fn rejected_counts_failed_items_only() {
        let response: BulkResponse = serde_json::from_str(
            r#"{"errors":true,"items":[
                {"index":{"status":201}},
                {"index":{"status":400,"error":{"type":"mapper_parsing_exception"}}},
                {"index":{"status":200}}
            ]}"#,
        )
        .unwrap();
        assert_eq!(rejected(&response), 1);
    }

    #[test]
    fn clean_response_has_no_rejections() {
        let response: BulkResponse =
            serde_json::from_str(r#"{"errors":false,"items":[{"index":{"status":201}}]}"#).unwrap();
        assert_eq!(rejected(&response), 0);
    }

    #[test]
    fn bulk_url_is_joined_to_base() {
        let sink = SearchSink::new(
            "http://localhost:9200/",
            "data",
            None,
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(sink.bulk_url().as_str(), "http://localhost:9200/_bulk");
    }
}
