//! Technical indicator implementations.
//!
//! - `IndicatorType`: indicator identity + parameters (serves as HashMap key)
//! - `IndicatorSeries`: values aligned one-to-one with the input bars
//!
//! Warm-up entries are `None`, so a not-yet-available value can never be
//! confused with a computed `0.0`.

pub mod atr;
pub mod ema;
pub mod rsi;
pub mod sma;

use crate::domain::ohlcv::Bar;
use std::collections::HashMap;
use std::fmt;

pub const DEFAULT_RSI_PERIOD: usize = 14;
pub const DEFAULT_ATR_PERIOD: usize = 14;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Sma(usize),
    Ema(usize),
    Rsi(usize),
    Atr(usize),
}

impl IndicatorType {
    /// Canonical column name, e.g. `sma_20`. RSI and ATR at their default
    /// period are plain `rsi` / `atr`.
    pub fn key(&self) -> String {
        match self {
            IndicatorType::Sma(period) => format!("sma_{}", period),
            IndicatorType::Ema(period) => format!("ema_{}", period),
            IndicatorType::Rsi(DEFAULT_RSI_PERIOD) => "rsi".to_string(),
            IndicatorType::Rsi(period) => format!("rsi_{}", period),
            IndicatorType::Atr(DEFAULT_ATR_PERIOD) => "atr".to_string(),
            IndicatorType::Atr(period) => format!("atr_{}", period),
        }
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Sma(period) => write!(f, "SMA({})", period),
            IndicatorType::Ema(period) => write!(f, "EMA({})", period),
            IndicatorType::Rsi(period) => write!(f, "RSI({})", period),
            IndicatorType::Atr(period) => write!(f, "ATR({})", period),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSeries {
    pub indicator_type: IndicatorType,
    pub values: Vec<Option<f64>>,
}

impl IndicatorSeries {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied().flatten()
    }

    pub fn last(&self) -> Option<f64> {
        self.values.last().copied().flatten()
    }

    /// Number of leading `None` entries.
    pub fn warmup_len(&self) -> usize {
        self.values.iter().take_while(|v| v.is_none()).count()
    }
}

/// Rolling arithmetic mean over `period` values, `None` until the window
/// is full. Shared by SMA, RSI and ATR.
pub(crate) fn rolling_mean(values: &[f64], period: usize) -> Vec<Option<f64>> {
    if period == 0 {
        return vec![None; values.len()];
    }

    // Window sums are taken fresh each step so a window of non-negative
    // inputs never drifts below zero.
    (0..values.len())
        .map(|i| {
            if i + 1 < period {
                None
            } else {
                let window = &values[i + 1 - period..=i];
                Some(window.iter().sum::<f64>() / period as f64)
            }
        })
        .collect()
}

pub fn calculate(bars: &[Bar], indicator_type: IndicatorType) -> IndicatorSeries {
    match indicator_type {
        IndicatorType::Sma(period) => sma::calculate_sma(bars, period),
        IndicatorType::Ema(period) => ema::calculate_ema(bars, period),
        IndicatorType::Rsi(period) => rsi::calculate_rsi(bars, period),
        IndicatorType::Atr(period) => atr::calculate_atr(bars, period),
    }
}

pub fn compute_indicators(
    bars: &[Bar],
    indicator_types: &[IndicatorType],
) -> HashMap<IndicatorType, IndicatorSeries> {
    indicator_types
        .iter()
        .map(|&t| (t, calculate(bars, t)))
        .collect()
}
