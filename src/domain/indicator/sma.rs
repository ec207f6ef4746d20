//! Simple Moving Average of closes.
//!
//! Warmup: first (n-1) bars are `None`.

use crate::domain::indicator::{IndicatorSeries, IndicatorType, rolling_mean};
use crate::domain::ohlcv::Bar;

pub fn calculate_sma(bars: &[Bar], period: usize) -> IndicatorSeries {
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    IndicatorSeries {
        indicator_type: IndicatorType::Sma(period),
        values: rolling_mean(&closes, period),
    }
}
