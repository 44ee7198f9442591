//! CSV record sink.
//!
//! Writes the four record streams to append-only CSV files in one directory:
//! - `runner_names.csv`
//! - `market_info.csv`
//! - `results.csv`
//! - `market_data.csv`
//!
//! Missing or empty files are created with their header row on open, and the
//! draw is seeded into `runner_names.csv`. Each stream is rendered in memory
//! and appended with a single write. A batch lands in all four files or in
//! none: when an append fails, files already written are truncated back to
//! their previous length.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::domain::{MarketInfo, MarketResult, RecordBatch, RunnerName, Snapshot};
use crate::error::{Result, SinkError};
use crate::port::RecordSink;

pub const RUNNER_NAMES_FILE: &str = "runner_names.csv";
pub const MARKET_INFO_FILE: &str = "market_info.csv";
pub const RESULTS_FILE: &str = "results.csv";
pub const MARKET_DATA_FILE: &str = "market_data.csv";

const RUNNER_NAMES_HEADER: [&str; 2] = ["Selection ID", "Runner Names"];
const MARKET_INFO_HEADER: [&str; 4] = [
    "Market ID",
    "Country Code",
    "Competition Name",
    "Competition ID",
];
const RESULTS_HEADER: [&str; 2] = ["Market ID", "Winner Selection ID"];
const MARKET_DATA_HEADER: [&str; 18] = [
    "Selection ID",
    "Back Price 1",
    "Back Size 1",
    "Back Price 2",
    "Back Size 2",
    "Back Price 3",
    "Back Size 3",
    "Lay Price 1",
    "Lay Size 1",
    "Lay Price 2",
    "Lay Size 2",
    "Lay Price 3",
    "Lay Size 3",
    "Last Price Traded",
    "Market Status",
    "In Play",
    "Market ID",
    "Date",
];

/// Format of the `Date` column.
const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Serialize)]
struct RunnerNameRecord<'a> {
    selection_id: u64,
    name: &'a str,
}

#[derive(Serialize)]
struct MarketInfoRecord<'a> {
    market_id: &'a str,
    country_code: Option<&'a str>,
    competition_name: Option<&'a str>,
    competition_id: Option<&'a str>,
}

#[derive(Serialize)]
struct ResultRecord<'a> {
    market_id: &'a str,
    winner: u64,
}

impl<'a> From<&'a RunnerName> for RunnerNameRecord<'a> {
    fn from(r: &'a RunnerName) -> Self {
        Self {
            selection_id: r.selection_id.value(),
            name: &r.name,
        }
    }
}

impl<'a> From<&'a MarketInfo> for MarketInfoRecord<'a> {
    fn from(m: &'a MarketInfo) -> Self {
        Self {
            market_id: m.market_id.as_str(),
            country_code: m.country_code.as_deref(),
            competition_name: m.competition_name.as_deref(),
            competition_id: m.competition_id.as_deref(),
        }
    }
}

impl<'a> From<&'a MarketResult> for ResultRecord<'a> {
    fn from(r: &'a MarketResult) -> Self {
        Self {
            market_id: r.market_id.as_str(),
            winner: r.winner.value(),
        }
    }
}

/// Flatten a snapshot into its `market_data.csv` fields.
fn market_data_record(s: &Snapshot) -> Vec<String> {
    let mut record = Vec::with_capacity(MARKET_DATA_HEADER.len());
    record.push(s.selection_id.to_string());
    for level in s.back.iter().chain(s.lay.iter()) {
        record.push(level.price.normalize().to_string());
        record.push(level.size.normalize().to_string());
    }
    record.push(
        s.last_price_traded
            .map(|d| d.normalize().to_string())
            .unwrap_or_default(),
    );
    record.push(s.market_status.to_string());
    record.push(if s.inplay { "True" } else { "False" }.to_string());
    record.push(s.market_id.to_string());
    record.push(s.timestamp.format(DATE_FORMAT).to_string());
    record
}

/// Append-only CSV files, one per record stream.
pub struct CsvSink {
    directory: PathBuf,
    /// Serializes appends so rows of one batch stay contiguous.
    lock: Arc<Mutex<()>>,
}

impl CsvSink {
    /// Open the output directory, bootstrapping any missing file.
    ///
    /// # Errors
    /// Returns an error if the directory or a file cannot be created.
    pub fn open(directory: impl Into<PathBuf>) -> Result<Self> {
        let directory = directory.into();
        fs::create_dir_all(&directory)?;

        let created = [
            bootstrap(&directory.join(RUNNER_NAMES_FILE), &RUNNER_NAMES_HEADER, || {
                render(&[RunnerName::the_draw()], RunnerNameRecord::from)
            })?,
            bootstrap(&directory.join(MARKET_INFO_FILE), &MARKET_INFO_HEADER, || {
                Ok(Vec::new())
            })?,
            bootstrap(&directory.join(RESULTS_FILE), &RESULTS_HEADER, || Ok(Vec::new()))?,
            bootstrap(&directory.join(MARKET_DATA_FILE), &MARKET_DATA_HEADER, || {
                Ok(Vec::new())
            })?,
        ]
        .into_iter()
        .filter(|created| *created)
        .count();

        info!(directory = %directory.display(), created, "CSV sink ready");
        Ok(Self {
            directory,
            lock: Arc::new(Mutex::new(())),
        })
    }

    #[must_use]
    pub fn directory(&self) -> &Path {
        &self.directory
    }
}

/// Append every non-empty stream, undoing earlier appends if a later one fails.
fn append_batch(directory: &Path, streams: &[(&'static str, Vec<u8>)]) -> Result<()> {
    let mut written: Vec<(PathBuf, u64)> = Vec::with_capacity(streams.len());
    for (file, bytes) in streams {
        if bytes.is_empty() {
            continue;
        }
        let path = directory.join(file);
        match append(&path, bytes) {
            Ok(previous_len) => written.push((path, previous_len)),
            Err(err) => {
                rollback(&written);
                return Err(err);
            }
        }
    }
    Ok(())
}

/// Append `bytes` to `path`, returning the file length before the write.
fn append(path: &Path, bytes: &[u8]) -> Result<u64> {
    let mut out = OpenOptions::new().create(true).append(true).open(path)?;
    let previous_len = out.metadata()?.len();
    if let Err(err) = out.write_all(bytes).and_then(|()| out.flush()) {
        if let Err(truncate) = out.set_len(previous_len) {
            warn!(file = %path.display(), error = %truncate, "CSV truncate failed");
        }
        return Err(err.into());
    }
    Ok(previous_len)
}

fn rollback(written: &[(PathBuf, u64)]) {
    for (path, len) in written.iter().rev() {
        let truncated = OpenOptions::new()
            .write(true)
            .open(path)
            .and_then(|file| file.set_len(*len));
        if let Err(err) = truncated {
            warn!(file = %path.display(), error = %err, "CSV rollback failed");
        }
    }
}

/// Write the header (and any seed rows) when the file is missing or empty.
///
/// Returns whether the file was initialised.
fn bootstrap(
    path: &Path,
    header: &[&str],
    seed: impl FnOnce() -> Result<Vec<u8>>,
) -> Result<bool> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    if file.metadata()?.len() > 0 {
        return Ok(false);
    }

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer.write_record(header).map_err(SinkError::from)?;
    let mut bytes = into_bytes(writer)?;
    bytes.extend(seed()?);

    file.write_all(&bytes)?;
    file.flush()?;
    Ok(true)
}

/// Render rows as headerless CSV.
fn render<'a, T, R, F>(rows: &'a [T], to_record: F) -> Result<Vec<u8>>
where
    R: Serialize,
    F: Fn(&'a T) -> R,
{
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    for row in rows {
        writer.serialize(to_record(row)).map_err(SinkError::from)?;
    }
    into_bytes(writer)
}

fn render_market_data(rows: &[Snapshot]) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    for row in rows {
        writer
            .write_record(market_data_record(row))
            .map_err(SinkError::from)?;
    }
    into_bytes(writer)
}

fn into_bytes(writer: csv::Writer<Vec<u8>>) -> Result<Vec<u8>> {
    writer
        .into_inner()
        .map_err(|e| SinkError::Undelivered {
            sink: "csv",
            reason: e.to_string(),
        })
        .map_err(Into::into)
}

#[async_trait]
impl RecordSink for CsvSink {
    fn name(&self) -> &'static str {
        "csv"
    }

    async fn write(&self, batch: &RecordBatch) -> Result<()> {
        let runner_names = render(&batch.runner_names, RunnerNameRecord::from)?;
        let market_info = render(&batch.market_info, MarketInfoRecord::from)?;
        let results = render(&batch.results, ResultRecord::from)?;
        let market_data = render_market_data(&batch.snapshots)?;

        let streams = [
            (RUNNER_NAMES_FILE, runner_names),
            (MARKET_INFO_FILE, market_info),
            (RESULTS_FILE, results),
            (MARKET_DATA_FILE, market_data),
        ];
        let directory = self.directory.clone();
        let lock = Arc::clone(&self.lock);
        tokio::task::spawn_blocking(move || {
            let _guard = lock.lock();
            append_batch(&directory, &streams)
        })
        .await
        .map_err(|e| SinkError::Undelivered {
            sink: "csv",
            reason: e.to_string(),
        })??;

        debug!(rows = batch.len(), "CSV batch appended");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    use super::*;
    use crate::domain::{MarketId, MarketStatus, PriceSize, SelectionId, EMPTY_LEVEL};

    fn read(dir: &Path, file: &str) -> String {
        fs::read_to_string(dir.join(file)).unwrap()
    }

    #[test]
    fn open_creates_headers_and_seeds_the_draw() {
        let dir = tempfile::tempdir().unwrap();
        CsvSink::open(dir.path()).unwrap();

        assert_eq!(
            read(dir.path(), RUNNER_NAMES_FILE),
            "Selection ID,Runner Names\n58805,The Draw\n"
        );
        assert_eq!(read(dir.path(), RESULTS_FILE), "Market ID,Winner Selection ID\n");
        assert!(read(dir.path(), MARKET_DATA_FILE).trim_end().ends_with("Market ID,Date"));
    }

    #[test]
    fn reopening_does_not_seed_twice() {
        let dir = tempfile::tempdir().unwrap();
        CsvSink::open(dir.path()).unwrap();
        CsvSink::open(dir.path()).unwrap();

        assert_eq!(read(dir.path(), RUNNER_NAMES_FILE).lines().count(), 2);
    }

    #[tokio::test]
    async fn snapshot_rows_use_column_order_and_sentinels() {
        let dir = tempfile::tempdir().unwrap();
        let sink = CsvSink::open(dir.path()).unwrap();
        let batch = RecordBatch {
            snapshots: vec![Snapshot {
                selection_id: SelectionId::new(47972),
                back: [PriceSize::new(dec!(2.50), dec!(120.5)), EMPTY_LEVEL, EMPTY_LEVEL],
                lay: [EMPTY_LEVEL; 3],
                last_price_traded: None,
                market_status: MarketStatus::Open,
                inplay: false,
                market_id: MarketId::new("1.200"),
                timestamp: Utc.with_ymd_and_hms(2026, 3, 14, 15, 0, 7).unwrap(),
            }],
            ..RecordBatch::default()
        };

        sink.write(&batch).await.unwrap();

        let content = read(dir.path(), MARKET_DATA_FILE);
        let row = content.lines().nth(1).unwrap();
        assert_eq!(
            row,
            "47972,2.5,120.5,1,1,1,1,1,1,1,1,1,1,,OPEN,False,1.200,2026-03-14 15:00:07"
        );
    }

    #[tokio::test]
    async fn failed_append_rolls_back_earlier_streams() {
        let dir = tempfile::tempdir().unwrap();
        let sink = CsvSink::open(dir.path()).unwrap();
        let batch = RecordBatch {
            runner_names: vec![RunnerName::new(SelectionId::new(47972), "Arsenal")],
            results: vec![MarketResult {
                market_id: MarketId::new("1.199"),
                winner: SelectionId::new(47972),
            }],
            snapshots: vec![Snapshot {
                selection_id: SelectionId::new(47972),
                back: [EMPTY_LEVEL; 3],
                lay: [EMPTY_LEVEL; 3],
                last_price_traded: None,
                market_status: MarketStatus::Open,
                inplay: false,
                market_id: MarketId::new("1.200"),
                timestamp: Utc.with_ymd_and_hms(2026, 3, 14, 15, 0, 7).unwrap(),
            }],
            ..RecordBatch::default()
        };

        let market_data = dir.path().join(MARKET_DATA_FILE);
        fs::remove_file(&market_data).unwrap();
        fs::create_dir(&market_data).unwrap();
        assert!(sink.write(&batch).await.is_err());
        assert_eq!(read(dir.path(), RUNNER_NAMES_FILE).lines().count(), 2);
        assert_eq!(read(dir.path(), RESULTS_FILE).lines().count(), 1);

        fs::remove_dir(&market_data).unwrap();
        sink.write(&batch).await.unwrap();
        assert_eq!(
            read(dir.path(), RUNNER_NAMES_FILE),
            "Selection ID,Runner Names\n58805,The Draw\n47972,Arsenal\n"
        );
        assert_eq!(read(dir.path(), RESULTS_FILE).lines().count(), 2);
        assert_eq!(read(dir.path(), MARKET_DATA_FILE).lines().count(), 1);
    }

    #[tokio::test]
    async fn empty_optional_fields_are_blank() {
        let dir = tempfile::tempdir().unwrap();
        let sink = CsvSink::open(dir.path()).unwrap();
        let batch = RecordBatch {
            market_info: vec![MarketInfo {
                market_id: MarketId::new("1.9"),
                country_code: None,
                competition_name: None,
                competition_id: None,
            }],
            ..RecordBatch::default()
        };

        sink.write(&batch).await.unwrap();

        assert_eq!(read(dir.path(), MARKET_INFO_FILE).lines().nth(1), Some("1.9,,,"));
    }
}
