//! CSV file data adapter.
//!
//! Files are named `{SYMBOL}_{timeframe}.csv` with `/` in the symbol written
//! as `-` (so `BTC/USD` at `1h` is `BTC-USD_1h.csv`). Provider-specific
//! headers are mapped onto the canonical OHLCV columns.

use crate::domain::error::WicktraderError;
use crate::domain::ohlcv::Bar;
use crate::ports::data_port::DataPort;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use log::warn;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Timestamp = 0,
    Open,
    High,
    Low,
    Close,
    Volume,
}

const COLUMNS: [Column; 6] = [
    Column::Timestamp,
    Column::Open,
    Column::High,
    Column::Low,
    Column::Close,
    Column::Volume,
];

impl Column {
    fn name(&self) -> &'static str {
        match self {
            Column::Timestamp => "timestamp",
            Column::Open => "open",
            Column::High => "high",
            Column::Low => "low",
            Column::Close => "close",
            Column::Volume => "volume",
        }
    }
}

/// Maps a provider header onto its canonical column, case-insensitively.
pub fn normalize_column(header: &str) -> Option<Column> {
    match header.trim().to_lowercase().as_str() {
        "t" | "time" | "timestamp" | "date" | "datetime" => Some(Column::Timestamp),
        "o" | "open" => Some(Column::Open),
        "h" | "high" => Some(Column::High),
        "l" | "low" => Some(Column::Low),
        "c" | "close" => Some(Column::Close),
        "v" | "vol" | "volume" => Some(Column::Volume),
        _ => None,
    }
}

/// Accepts RFC 3339, `%Y-%m-%d %H:%M:%S`, `%Y-%m-%d`, or Unix epoch
/// milliseconds.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(t) = DateTime::parse_from_rfc3339(value) {
        return Some(t.with_timezone(&Utc));
    }
    if let Ok(t) = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S") {
        return Some(t.and_utc());
    }
    if let Ok(d) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return d.and_hms_opt(0, 0, 0).map(|t| t.and_utc());
    }
    value
        .parse::<i64>()
        .ok()
        .and_then(DateTime::<Utc>::from_timestamp_millis)
}

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str, timeframe: &str) -> PathBuf {
        self.base_path
            .join(format!("{}_{}.csv", symbol.replace('/', "-"), timeframe))
    }

    /// Parses bars from CSV text with any supported header naming.
    pub fn parse_bars(content: &str) -> Result<Vec<Bar>, WicktraderError> {
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(content.as_bytes());

        let headers = rdr.headers().map_err(|e| WicktraderError::DataSource {
            reason: format!("CSV header error: {}", e),
        })?;

        let mut index = [usize::MAX; 6];
        for (i, header) in headers.iter().enumerate() {
            if let Some(col) = normalize_column(header) {
                let slot = col as usize;
                if index[slot] == usize::MAX {
                    index[slot] = i;
                }
            }
        }
        if let Some(missing) = COLUMNS.iter().zip(index).find(|(_, i)| *i == usize::MAX) {
            return Err(WicktraderError::DataSource {
                reason: format!("missing {} column", missing.0.name()),
            });
        }

        let mut bars: Vec<Bar> = Vec::new();
        for (row, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| WicktraderError::DataSource {
                reason: format!("CSV parse error: {}", e),
            })?;
            let field = |col: usize| record.get(index[col]).unwrap_or("");

            let timestamp =
                parse_timestamp(field(0)).ok_or_else(|| WicktraderError::DataSource {
                    reason: format!("row {}: invalid timestamp '{}'", row + 1, field(0)),
                })?;

            let mut prices = [0.0; 5];
            for (slot, price) in prices.iter_mut().enumerate() {
                let raw = field(slot + 1);
                *price = raw.parse().map_err(|_| WicktraderError::DataSource {
                    reason: format!(
                        "row {}: invalid {} value '{}'",
                        row + 1,
                        COLUMNS[slot + 1].name(),
                        raw
                    ),
                })?;
            }
            let [open, high, low, close, volume] = prices;

            bars.push(Bar {
                timestamp,
                open,
                high,
                low,
                close,
                volume,
            });
        }

        bars.sort_by_key(|b| b.timestamp);
        let before = bars.len();
        bars.dedup_by_key(|b| b.timestamp);
        if bars.len() < before {
            warn!("dropped {} rows with duplicate timestamps", before - bars.len());
        }
        Ok(bars)
    }
}

impl DataPort for CsvAdapter {
    fn fetch_bars(&self, symbol: &str, timeframe: &str) -> Result<Vec<Bar>, WicktraderError> {
        let path = self.csv_path(symbol, timeframe);
        let content = fs::read_to_string(&path).map_err(|e| WicktraderError::DataSource {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;
        Self::parse_bars(&content)
    }

    fn list_symbols(&self, timeframe: &str) -> Result<Vec<String>, WicktraderError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| WicktraderError::DataSource {
            reason: format!(
                "failed to read directory {}: {}",
                self.base_path.display(),
                e
            ),
        })?;

        let suffix = format!("_{}.csv", timeframe);
        let mut symbols = Vec::new();

        for entry in entries {
            let entry = entry.map_err(|e| WicktraderError::DataSource {
                reason: format!("directory entry error: {}", e),
            })?;

            let name = entry.file_name();
            let name_str = name.to_string_lossy();

            if let Some(symbol) = name_str.strip_suffix(&suffix) {
                symbols.push(symbol.to_string());
            }
        }

        symbols.sort();
        Ok(symbols)
    }
}
