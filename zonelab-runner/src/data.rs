//! Candle loading — the adapter at the external candle-feed boundary.
//!
//! The feed itself lives outside this system; all we accept is a CSV of
//! `timestamp,open,high,low,close,volume` rows, ascending by timestamp.
//! Anything else is a typed load error, caught before a run ever starts.

use std::path::Path;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

use zonelab_core::Candle;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("row {row}: unparseable timestamp '{value}'")]
    Timestamp { row: usize, value: String },
    #[error("row {row}: candles are not in ascending timestamp order")]
    OutOfOrder { row: usize },
    #[error("row {row}: OHLC values fail the sanity check")]
    InsaneCandle { row: usize },
}

#[derive(Debug, Deserialize)]
struct RawRow {
    timestamp: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}

/// Load a candle history from a CSV file.
pub fn load_candles_csv(path: &Path) -> Result<Vec<Candle>, LoadError> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut candles: Vec<Candle> = Vec::new();
    for (row, record) in reader.deserialize::<RawRow>().enumerate() {
        let record = record?;
        let timestamp = parse_timestamp(&record.timestamp).ok_or_else(|| LoadError::Timestamp {
            row,
            value: record.timestamp.clone(),
        })?;
        let candle = Candle {
            timestamp,
            open: record.open,
            high: record.high,
            low: record.low,
            close: record.close,
            volume: record.volume,
        };
        if !candle.is_sane() {
            return Err(LoadError::InsaneCandle { row });
        }
        if let Some(prev) = candles.last() {
            if candle.timestamp <= prev.timestamp {
                return Err(LoadError::OutOfOrder { row });
            }
        }
        candles.push(candle);
    }
    info!(bars = candles.len(), path = %path.display(), "candles loaded");
    Ok(candles)
}

/// RFC 3339 first, then the broker export format `YYYY-MM-DD HH:MM:SS`
/// interpreted as UTC.
fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
}
