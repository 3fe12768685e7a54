use crate::data::series::PriceSeries;
use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDateTime, Utc};
use csv::ReaderBuilder;
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, warn};

#[derive(Debug, Deserialize)]
struct CsvRecord {
    #[serde(default, alias = "Timestamp")]
    timestamp: Option<String>,
    #[serde(default, alias = "Close", deserialize_with = "csv::invalid_option")]
    close: Option<f64>,
}

//closing prices loaded from a file, with the timestamp of each step when present
#[derive(Debug, Clone)]
pub struct PriceData {
    pub timestamps: Vec<Option<DateTime<Utc>>>,
    pub series: PriceSeries,
}

impl PriceData {
    //wraps a bare series (no timestamps)
    pub fn from_series(series: PriceSeries) -> Self {
        PriceData {
            timestamps: vec![None; series.len()],
            series,
        }
    }

    pub fn timestamp(&self, step: usize) -> Option<DateTime<Utc>> {
        self.timestamps.get(step).copied().flatten()
    }
}

//parses rfc3339 or the "YYYY-MM-DD HH:MM:SS" form written by pandas
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
}

//loads closing prices from a csv file
//rows whose close is missing or unparsable are dropped, never interpolated
pub fn load_csv<P: AsRef<Path>>(path: P) -> Result<PriceData> {
    let path = path.as_ref();
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .context(format!("Failed to open CSV file: {:?}", path))?;

    let headers = reader
        .headers()
        .context(format!("Failed to read CSV header: {:?}", path))?;
    if !headers.iter().any(|h| h == "close" || h == "Close") {
        anyhow::bail!("CSV file {:?} has no close column", path);
    }

    let mut timestamps = Vec::new();
    let mut prices = Vec::new();
    let mut dropped = 0usize;

    for (index, result) in reader.deserialize().enumerate() {
        let record: CsvRecord =
            result.context(format!("Failed to parse CSV record at line {}", index + 2))?;

        let close = match record.close {
            Some(close) if close.is_finite() => close,
            _ => {
                dropped += 1;
                continue;
            }
        };

        let timestamp = match record.timestamp.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(parse_timestamp(raw).ok_or_else(|| {
                anyhow::anyhow!(
                    "Failed to parse timestamp '{}' at line {}",
                    raw,
                    index + 2
                )
            })?),
        };

        timestamps.push(timestamp);
        prices.push(close);
    }

    if dropped > 0 {
        warn!(dropped, path = ?path, "dropped rows with missing close prices");
    }
    debug!(rows = prices.len(), path = ?path, "loaded price series");

    let series = PriceSeries::new(prices)
        .context(format!("CSV file {:?} does not hold a usable price series", path))?;

    Ok(PriceData { timestamps, series })
}
