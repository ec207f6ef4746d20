#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use wicktrader::domain::clock::FixedClock;
use wicktrader::domain::error::WicktraderError;
pub use wicktrader::domain::ohlcv::Bar;
use wicktrader::domain::order_intent::RawCandle;
use wicktrader::domain::strategy::{StrategyParams, WickMasterPro};
use wicktrader::ports::data_port::DataPort;

pub const START_MS: i64 = 1_700_000_000_000;
pub const HOUR_MS: i64 = 3_600_000;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<Bar>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, symbol: &str, bars: Vec<Bar>) -> Self {
        self.data.insert(symbol.to_string(), bars);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_bars(&self, symbol: &str, _timeframe: &str) -> Result<Vec<Bar>, WicktraderError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(WicktraderError::DataSource {
                reason: reason.clone(),
            });
        }
        Ok(self.data.get(symbol).cloned().unwrap_or_default())
    }

    fn list_symbols(&self, _timeframe: &str) -> Result<Vec<String>, WicktraderError> {
        let mut symbols: Vec<String> = self.data.keys().cloned().collect();
        symbols.sort();
        Ok(symbols)
    }
}

pub fn fixed_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
}

pub fn fixed_engine(params: StrategyParams) -> WickMasterPro {
    WickMasterPro::with_clock(params, Arc::new(FixedClock(fixed_time())))
}

pub fn candle_to_bar(c: RawCandle) -> Bar {
    Bar {
        timestamp: Utc.timestamp_millis_opt(c.0).unwrap(),
        open: c.1,
        high: c.2,
        low: c.3,
        close: c.4,
        volume: c.5,
    }
}

/// 24 bars alternating between closes of 100 and 101 (neutral RSI), then a
/// high-volume hammer closing at 101: scores 40 + 20 + 10 = 70.
pub fn reversal_candles() -> Vec<RawCandle> {
    let mut candles: Vec<RawCandle> = (0..24)
        .map(|i| {
            let close = 100.0 + (i % 2) as f64;
            (
                START_MS + i * HOUR_MS,
                close,
                close + 0.5,
                close - 0.5,
                close,
                1000.0,
            )
        })
        .collect();
    candles.push((START_MS + 24 * HOUR_MS, 100.5, 101.1, 99.0, 101.0, 3000.0));
    candles
}

/// The reversal followed by `tail` body-less bars closing at `tail_close`.
pub fn reversal_bars(tail: usize, tail_close: f64) -> Vec<Bar> {
    let mut bars: Vec<Bar> = reversal_candles().into_iter().map(candle_to_bar).collect();
    for i in 0..tail {
        let c = tail_close;
        bars.push(candle_to_bar((
            START_MS + (25 + i as i64) * HOUR_MS,
            c,
            c + 0.5,
            c - 0.5,
            c,
            1000.0,
        )));
    }
    bars
}

/// Bars with identical OHLCV values; never scores.
pub fn flat_bars(count: usize) -> Vec<Bar> {
    (0..count as i64)
        .map(|i| candle_to_bar((START_MS + i * HOUR_MS, 100.0, 101.0, 99.0, 100.0, 1000.0)))
        .collect()
}

pub fn bars_to_csv(bars: &[Bar]) -> String {
    let mut out = String::from("timestamp,open,high,low,close,volume\n");
    for b in bars {
        out.push_str(&format!(
            "{},{},{},{},{},{}\n",
            b.timestamp.timestamp_millis(),
            b.open,
            b.high,
            b.low,
            b.close,
            b.volume
        ));
    }
    out
}
