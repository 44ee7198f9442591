//! SQLite record sink.
//!
//! Writes all four streams of a batch in one transaction. Every table has a
//! natural primary key and rows go in with `INSERT OR IGNORE`, so replaying
//! a batch after a partial failure elsewhere never duplicates rows.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::SqliteConnection;
use tracing::debug;

use super::database::connection::{create_pool, run_migrations, DbPool};
use super::database::model::{MarketDataRow, MarketInfoRow, ResultRow, RunnerNameRow};
use super::database::schema::{market_data, market_info, results, runner_names};
use crate::domain::RecordBatch;
use crate::error::{Result, SinkError};
use crate::port::RecordSink;

/// Rows of one batch converted to table models.
#[derive(Debug, Default)]
struct Rows {
    runner_names: Vec<RunnerNameRow>,
    market_info: Vec<MarketInfoRow>,
    results: Vec<ResultRow>,
    market_data: Vec<MarketDataRow>,
}

impl From<&RecordBatch> for Rows {
    fn from(batch: &RecordBatch) -> Self {
        Self {
            runner_names: batch.runner_names.iter().map(RunnerNameRow::from).collect(),
            market_info: batch.market_info.iter().map(MarketInfoRow::from).collect(),
            results: batch.results.iter().map(ResultRow::from).collect(),
            market_data: batch.snapshots.iter().map(MarketDataRow::from).collect(),
        }
    }
}

pub struct SqliteSink {
    pool: DbPool,
}

impl SqliteSink {
    /// Open the database, creating tables and the draw row on first use.
    ///
    /// # Errors
    /// Returns an error if the pool cannot be built or migrations fail.
    pub fn open(database_url: &str) -> Result<Self> {
        let pool = create_pool(database_url)?;
        run_migrations(&pool)?;
        Ok(Self { pool })
    }

    /// Wrap an already migrated pool.
    #[must_use]
    pub fn from_pool(pool: DbPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

fn insert_rows(
    conn: &mut SqliteConnection,
    rows: &Rows,
) -> std::result::Result<usize, diesel::result::Error> {
    conn.transaction(|conn| {
        let mut inserted = 0;
        for row in &rows.runner_names {
            inserted += diesel::insert_or_ignore_into(runner_names::table)
                .values(row)
                .execute(conn)?;
        }
        for row in &rows.market_info {
            inserted += diesel::insert_or_ignore_into(market_info::table)
                .values(row)
                .execute(conn)?;
        }
        for row in &rows.results {
            inserted += diesel::insert_or_ignore_into(results::table)
                .values(row)
                .execute(conn)?;
        }
        for row in &rows.market_data {
            inserted += diesel::insert_or_ignore_into(market_data::table)
                .values(row)
                .execute(conn)?;
        }
        Ok(inserted)
    })
}

#[async_trait]
impl RecordSink for SqliteSink {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    async fn write(&self, batch: &RecordBatch) -> Result<()> {
        if batch.is_empty() {
            return Ok(());
        }

        let rows = Rows::from(batch);
        let pool = self.pool.clone();
        let inserted = tokio::task::spawn_blocking(move || -> Result<usize> {
            let mut conn = pool
                .get()
                .map_err(|e| SinkError::Database(e.to_string()))?;
            Ok(insert_rows(&mut conn, &rows).map_err(SinkError::from)?)
        })
        .await
        .map_err(|e| SinkError::Database(e.to_string()))??;

        debug!(rows = batch.len(), inserted, "SQLite batch committed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use diesel::r2d2::{ConnectionManager, Pool};
    use rust_decimal_macros::dec;

    use super::*;
    use crate::domain::{
        MarketId, MarketInfo, MarketResult, MarketStatus, PriceSize, RunnerName, SelectionId,
        Snapshot, EMPTY_LEVEL,
    };

    fn memory_sink() -> SqliteSink {
        let manager = ConnectionManager::<SqliteConnection>::new(":memory:");
        let pool = Pool::builder().max_size(1).build(manager).unwrap();
        run_migrations(&pool).unwrap();
        SqliteSink::from_pool(pool)
    }

    fn batch() -> RecordBatch {
        RecordBatch {
            runner_names: vec![RunnerName::new(SelectionId::new(47972), "Arsenal")],
            market_info: vec![MarketInfo {
                market_id: MarketId::new("1.200"),
                country_code: Some("GB".into()),
                competition_name: Some("English Premier League".into()),
                competition_id: Some("10932509".into()),
            }],
            results: vec![MarketResult {
                market_id: MarketId::new("1.199"),
                winner: SelectionId::new(47972),
            }],
            snapshots: vec![Snapshot {
                selection_id: SelectionId::new(47972),
                back: [PriceSize::new(dec!(2.5), dec!(120)), EMPTY_LEVEL, EMPTY_LEVEL],
                lay: [EMPTY_LEVEL; 3],
                last_price_traded: Some(dec!(2.52)),
                market_status: MarketStatus::Open,
                inplay: true,
                market_id: MarketId::new("1.200"),
                timestamp: Utc.with_ymd_and_hms(2026, 3, 14, 15, 0, 0).unwrap(),
            }],
        }
    }

    #[tokio::test]
    async fn write_persists_every_stream() {
        let sink = memory_sink();
        sink.write(&batch()).await.unwrap();

        let mut conn = sink.pool().get().unwrap();
        let names: Vec<RunnerNameRow> = runner_names::table
            .order(runner_names::selection_id)
            .select(RunnerNameRow::as_select())
            .load(&mut conn)
            .unwrap();
        assert_eq!(names.len(), 2);
        assert_eq!(names[0].runner_name, "Arsenal");
        assert_eq!(names[1].runner_name, "The Draw");

        let data: Vec<MarketDataRow> = market_data::table
            .select(MarketDataRow::as_select())
            .load(&mut conn)
            .unwrap();
        assert_eq!(data.len(), 1);
        assert_eq!(data[0].recorded_at, "2026-03-14 15:00:00");
        assert!((data[0].back_price_1 - 2.5).abs() < f64::EPSILON);
        assert!((data[0].back_price_2 - 1.0).abs() < f64::EPSILON);
        assert_eq!(data[0].market_status, "OPEN");
        assert!(data[0].in_play);

        let info: Vec<MarketInfoRow> = market_info::table
            .select(MarketInfoRow::as_select())
            .load(&mut conn)
            .unwrap();
        assert_eq!(info[0].competition_id.as_deref(), Some("10932509"));

        let winners: Vec<ResultRow> = results::table
            .select(ResultRow::as_select())
            .load(&mut conn)
            .unwrap();
        assert_eq!(winners[0].winner_selection_id, 47972);
    }

    #[tokio::test]
    async fn replaying_a_batch_does_not_duplicate_rows() {
        let sink = memory_sink();
        sink.write(&batch()).await.unwrap();
        sink.write(&batch()).await.unwrap();

        let mut conn = sink.pool().get().unwrap();
        let data: i64 = market_data::table.count().get_result(&mut conn).unwrap();
        let winners: i64 = results::table.count().get_result(&mut conn).unwrap();
        assert_eq!(data, 1);
        assert_eq!(winners, 1);
    }
}
