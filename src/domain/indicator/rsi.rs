//! RSI (Relative Strength Index) momentum oscillator.
//!
//! Close-to-close deltas are split into gains and losses. Both sides are
//! averaged with a plain rolling mean over n deltas (not Wilder smoothing).
//!
//! Formula: RSI = 100 - (100 / (1 + avg_gain / avg_loss))
//! - avg_loss == 0 and avg_gain > 0: RSI = 100
//! - avg_loss == 0 and avg_gain == 0 (flat): RSI = 50
//!
//! Warmup: first n bars are `None`; bar 0 has no delta at all.

use crate::domain::indicator::{IndicatorSeries, IndicatorType, rolling_mean};
use crate::domain::ohlcv::Bar;

pub const OVERSOLD: f64 = 30.0;
pub const OVERBOUGHT: f64 = 70.0;

pub fn calculate_rsi(bars: &[Bar], period: usize) -> IndicatorSeries {
    if bars.is_empty() {
        return IndicatorSeries {
            indicator_type: IndicatorType::Rsi(period),
            values: Vec::new(),
        };
    }

    let (gains, losses): (Vec<f64>, Vec<f64>) = bars
        .windows(2)
        .map(|w| {
            let change = w[1].close - w[0].close;
            (change.max(0.0), (-change).max(0.0))
        })
        .unzip();

    let avg_gains = rolling_mean(&gains, period);
    let avg_losses = rolling_mean(&losses, period);

    // deltas[i] belongs to bar i + 1
    let mut values = Vec::with_capacity(bars.len());
    values.push(None);
    values.extend(avg_gains.into_iter().zip(avg_losses).map(|(g, l)| match (g, l) {
        (Some(g), Some(l)) => Some(rsi_from_averages(g, l)),
        _ => None,
    }));

    IndicatorSeries {
        indicator_type: IndicatorType::Rsi(period),
        values,
    }
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        if avg_gain == 0.0 { 50.0 } else { 100.0 }
    } else {
        100.0 - (100.0 / (1.0 + avg_gain / avg_loss))
    }
}
