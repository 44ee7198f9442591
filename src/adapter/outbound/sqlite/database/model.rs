//! Database model types for Diesel ORM.

use diesel::prelude::*;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use super::schema::{market_data, market_info, results, runner_names};
use crate::domain::{MarketInfo, MarketResult, RunnerName, Snapshot};

/// Timestamp format of `market_data.recorded_at`.
pub const RECORDED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Convert a decimal to f64 for storage.
fn decimal_to_f64(d: Decimal) -> f64 {
    d.to_f64().unwrap_or(0.0)
}

/// Selection ids are far below `i64::MAX`; SQLite has no unsigned type.
fn selection_to_i64(id: u64) -> i64 {
    i64::try_from(id).unwrap_or(i64::MAX)
}

#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq)]
#[diesel(table_name = runner_names)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct RunnerNameRow {
    pub selection_id: i64,
    pub runner_name: String,
}

impl From<&RunnerName> for RunnerNameRow {
    fn from(name: &RunnerName) -> Self {
        Self {
            selection_id: selection_to_i64(name.selection_id.value()),
            runner_name: name.name.clone(),
        }
    }
}

#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq)]
#[diesel(table_name = market_info)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct MarketInfoRow {
    pub market_id: String,
    pub country_code: Option<String>,
    pub competition_name: Option<String>,
    pub competition_id: Option<String>,
}

impl From<&MarketInfo> for MarketInfoRow {
    fn from(info: &MarketInfo) -> Self {
        Self {
            market_id: info.market_id.as_str().to_string(),
            country_code: info.country_code.clone(),
            competition_name: info.competition_name.clone(),
            competition_id: info.competition_id.clone(),
        }
    }
}

#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq)]
#[diesel(table_name = results)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ResultRow {
    pub market_id: String,
    pub winner_selection_id: i64,
}

impl From<&MarketResult> for ResultRow {
    fn from(result: &MarketResult) -> Self {
        Self {
            market_id: result.market_id.as_str().to_string(),
            winner_selection_id: selection_to_i64(result.winner.value()),
        }
    }
}

/// One runner's prices at one poll.
#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq)]
#[diesel(table_name = market_data)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct MarketDataRow {
    pub market_id: String,
    pub selection_id: i64,
    pub recorded_at: String,
    pub back_price_1: f64,
    pub back_size_1: f64,
    pub back_price_2: f64,
    pub back_size_2: f64,
    pub back_price_3: f64,
    pub back_size_3: f64,
    pub lay_price_1: f64,
    pub lay_size_1: f64,
    pub lay_price_2: f64,
    pub lay_size_2: f64,
    pub lay_price_3: f64,
    pub lay_size_3: f64,
    pub last_price_traded: Option<f64>,
    pub market_status: String,
    pub in_play: bool,
}

impl From<&Snapshot> for MarketDataRow {
    fn from(s: &Snapshot) -> Self {
        let [b1, b2, b3] = s.back;
        let [l1, l2, l3] = s.lay;
        Self {
            market_id: s.market_id.as_str().to_string(),
            selection_id: selection_to_i64(s.selection_id.value()),
            recorded_at: s.timestamp.format(RECORDED_AT_FORMAT).to_string(),
            back_price_1: decimal_to_f64(b1.price),
            back_size_1: decimal_to_f64(b1.size),
            back_price_2: decimal_to_f64(b2.price),
            back_size_2: decimal_to_f64(b2.size),
            back_price_3: decimal_to_f64(b3.price),
            back_size_3: decimal_to_f64(b3.size),
            lay_price_1: decimal_to_f64(l1.price),
            lay_size_1: decimal_to_f64(l1.size),
            lay_price_2: decimal_to_f64(l2.price),
            lay_size_2: decimal_to_f64(l2.size),
            lay_price_3: decimal_to_f64(l3.price),
            lay_size_3: decimal_to_f64(l3.size),
            last_price_traded: s.last_price_traded.map(decimal_to_f64),
            market_status: s.market_status.as_str().to_string(),
            in_play: s.inplay,
        }
    }
}
