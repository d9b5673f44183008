//! Monthly candle CSV loading.
//!
//! Candle history is stored one file per (symbol, timeframe, month) as
//! `SYMBOL-TF-YYYY-MM.csv` with the columns
//! `Open time, Open, High, Low, Close, Volume` and second-resolution
//! timestamps. Files may be written out of order; loading sorts the
//! candles chronologically and drops exact-duplicate timestamps. Missing
//! and empty files are explicit errors rather than silent empty streams,
//! so a misconfigured month surfaces immediately.

use chrono::NaiveDateTime;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use swingbot_core::domain::{Candle, Timeframe};
use thiserror::Error;
use tracing::warn;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Errors from the candle data layer.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("candle file not found: {}", path.display())]
    Missing { path: PathBuf },

    #[error("candle file has a header but no rows: {}", path.display())]
    Empty { path: PathBuf },

    #[error("bad open time {value:?} at row {row} of {}", path.display())]
    BadTime {
        path: PathBuf,
        row: usize,
        value: String,
    },

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

/// One row of a monthly candle file. Column names match the exported
/// header exactly.
#[derive(Debug, Deserialize)]
struct CandleRow {
    #[serde(rename = "Open time")]
    open_time: String,
    #[serde(rename = "Open")]
    open: f64,
    #[serde(rename = "High")]
    high: f64,
    #[serde(rename = "Low")]
    low: f64,
    #[serde(rename = "Close")]
    close: f64,
    #[serde(rename = "Volume")]
    volume: f64,
}

/// File name for one month of a stream, e.g. `EURUSD-1h-2024-03.csv`.
pub fn monthly_file_name(symbol: &str, tf: Timeframe, year: i32, month: u32) -> String {
    format!("{symbol}-{tf}-{year:04}-{month:02}.csv")
}

/// Load one month of candles, sorted by open time.
pub fn load_month(
    dir: &Path,
    symbol: &str,
    tf: Timeframe,
    year: i32,
    month: u32,
) -> Result<Vec<Candle>, DataError> {
    let path = dir.join(monthly_file_name(symbol, tf, year, month));
    if !path.is_file() {
        return Err(DataError::Missing { path });
    }

    let mut reader = csv::Reader::from_path(&path)?;
    let mut candles = Vec::new();
    for (row, record) in reader.deserialize::<CandleRow>().enumerate() {
        let record = record?;
        let time = NaiveDateTime::parse_from_str(&record.open_time, TIME_FORMAT).map_err(|_| {
            DataError::BadTime {
                path: path.clone(),
                row: row + 1,
                value: record.open_time.clone(),
            }
        })?;
        candles.push(Candle {
            open: record.open,
            high: record.high,
            low: record.low,
            close: record.close,
            volume: record.volume,
            time,
        });
    }
    if candles.is_empty() {
        return Err(DataError::Empty { path });
    }

    candles.sort_by_key(|c| c.time);
    Ok(candles)
}

/// Load and concatenate several months of one stream, chronologically
/// sorted with duplicate timestamps removed (first occurrence wins).
pub fn load_months(
    dir: &Path,
    symbol: &str,
    tf: Timeframe,
    year: i32,
    months: &[u32],
) -> Result<Vec<Candle>, DataError> {
    let mut candles = Vec::new();
    for &month in months {
        candles.extend(load_month(dir, symbol, tf, year, month)?);
    }
    candles.sort_by_key(|c| c.time);
    let before = candles.len();
    candles.dedup_by_key(|c| c.time);
    if candles.len() < before {
        warn!(
            symbol,
            %tf,
            dropped = before - candles.len(),
            "duplicate candle timestamps dropped"
        );
    }
    Ok(candles)
}
