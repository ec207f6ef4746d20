//! Adapter mode: raw candle tuples in, order-intent records out.
//!
//! Hold decisions produce no record at all.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use log::warn;
use serde::{Deserialize, Serialize};

use crate::domain::history::PriceHistory;
use crate::domain::ohlcv::Bar;
use crate::domain::signal::{SignalKind, TradingSignal};
use crate::domain::strategy::ScoringEngine;
use crate::domain::strategy::wick_master::MIN_BARS;

/// (timestamp in Unix epoch milliseconds, open, high, low, close, volume)
pub type RawCandle = (i64, f64, f64, f64, f64, f64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,
    Sell,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderIntent {
    pub side: Side,
    pub symbol: String,
    pub price: f64,
    pub confidence: f64,
    pub reason: String,
    pub stop_loss: f64,
    pub take_profit: f64,
    /// ISO-8601 / RFC 3339.
    pub timestamp: String,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

impl OrderIntent {
    /// `None` for hold signals.
    pub fn from_signal(signal: &TradingSignal) -> Option<Self> {
        let side = match signal.kind {
            SignalKind::Hold => return None,
            SignalKind::Buy => Side::Buy,
            SignalKind::Sell => Side::Sell,
        };
        Some(OrderIntent {
            side,
            symbol: signal.symbol.clone(),
            price: signal.entry_price,
            confidence: signal.confidence,
            reason: signal.reason.clone(),
            stop_loss: signal.stop_loss,
            take_profit: signal.take_profit,
            timestamp: signal.timestamp.to_rfc3339(),
            metadata: signal.metadata.clone(),
        })
    }

    pub fn parsed_timestamp(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.timestamp)
            .ok()
            .map(|t| t.with_timezone(&Utc))
    }
}

/// Converts raw tuples into bars ordered by timestamp. Tuples whose
/// timestamp cannot be represented, or that repeat an earlier timestamp,
/// are dropped.
pub fn normalize_candles(candles: &[RawCandle]) -> Vec<Bar> {
    let mut bars: Vec<Bar> = Vec::with_capacity(candles.len());
    for &(t, open, high, low, close, volume) in candles {
        let Some(timestamp) = DateTime::<Utc>::from_timestamp_millis(t) else {
            warn!("dropping candle with out-of-range timestamp {}", t);
            continue;
        };
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
    bars.dedup_by_key(|b| b.timestamp);
    bars
}

/// Runs `engine` over raw candles and returns at most one order intent for
/// the latest candle. `timeframe` is recorded in the intent metadata.
pub fn generate_order_intents(
    engine: &dyn ScoringEngine,
    candles: &[RawCandle],
    symbol: &str,
    timeframe: &str,
) -> Vec<OrderIntent> {
    if candles.len() < MIN_BARS {
        return Vec::new();
    }

    let history = PriceHistory::enriched(normalize_candles(candles));
    let signal = engine.evaluate(symbol, &history);

    OrderIntent::from_signal(&signal)
        .map(|mut intent| {
            intent
                .metadata
                .insert("timeframe".to_string(), timeframe.to_string());
            intent
        })
        .into_iter()
        .collect()
}
