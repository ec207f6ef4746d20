//! Trading signal emitted for the most recent bar of a history.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::fmt;

pub const HOLD_REASON: &str = "No valid pattern detected";

/// `Sell` exists for symmetry; the wick strategy only emits `Hold` or `Buy`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalKind {
    Hold,
    Buy,
    Sell,
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalKind::Hold => write!(f, "HOLD"),
            SignalKind::Buy => write!(f, "BUY"),
            SignalKind::Sell => write!(f, "SELL"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TradingSignal {
    pub kind: SignalKind,
    pub symbol: String,
    /// Always within [0.0, 0.95].
    pub confidence: f64,
    pub entry_price: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
    pub position_size: f64,
    pub timestamp: DateTime<Utc>,
    pub reason: String,
    /// Named values that fed the score (wick_ratio, score, rsi, volume_ratio).
    pub indicators: BTreeMap<String, f64>,
    pub metadata: BTreeMap<String, String>,
}

impl TradingSignal {
    /// Zero-confidence hold pinned at `last_price` for entry, stop and target.
    pub fn hold(symbol: &str, last_price: f64, timestamp: DateTime<Utc>) -> Self {
        TradingSignal {
            kind: SignalKind::Hold,
            symbol: symbol.to_string(),
            confidence: 0.0,
            entry_price: last_price,
            stop_loss: last_price,
            take_profit: last_price,
            position_size: 0.0,
            timestamp,
            reason: HOLD_REASON.to_string(),
            indicators: BTreeMap::new(),
            metadata: BTreeMap::new(),
        }
    }

    pub fn is_hold(&self) -> bool {
        self.kind == SignalKind::Hold
    }
}
