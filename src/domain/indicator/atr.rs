//! Average True Range.
//!
//! TR[0] = high - low (no previous close), TR[i] = max(high-low,
//! |high-prev_close|, |low-prev_close|). ATR is the plain rolling mean of TR.
//! Warmup: first (n-1) bars are `None`.

use crate::domain::indicator::{IndicatorSeries, IndicatorType, rolling_mean};
use crate::domain::ohlcv::Bar;

pub fn true_ranges(bars: &[Bar]) -> Vec<f64> {
    bars.iter()
        .enumerate()
        .map(|(i, bar)| {
            if i == 0 {
                bar.range()
            } else {
                bar.true_range(bars[i - 1].close)
            }
        })
        .collect()
}

pub fn calculate_atr(bars: &[Bar], period: usize) -> IndicatorSeries {
    IndicatorSeries {
        indicator_type: IndicatorType::Atr(period),
        values: rolling_mean(&true_ranges(bars), period),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::{TimeZone, Utc};
    use proptest::prelude::*;

    fn make_bar(i: i64, high: f64, low: f64, close: f64) -> Bar {
        Bar {
            timestamp: Utc.timestamp_opt(1_700_000_000 + i * 3600, 0).unwrap(),
            open: close,
            high,
            low,
            close,
            volume: 1000.0,
        }
    }

    #[test]
    fn atr_warmup() {
        let bars: Vec<Bar> = (0..5).map(|i| make_bar(i, 110.0, 90.0, 100.0)).collect();
        let series = calculate_atr(&bars, 3);
        assert_eq!(series.values.len(), 5);
        assert_eq!(series.warmup_len(), 2);
        assert_relative_eq!(series.values[2].unwrap(), 20.0);
    }

    #[test]
    fn first_true_range_is_high_low() {
        let bars = vec![make_bar(0, 110.0, 100.0, 105.0)];
        assert_eq!(true_ranges(&bars), vec![10.0]);
    }

    #[test]
    fn atr_handles_gaps() {
        let bars = vec![
            make_bar(0, 110.0, 100.0, 105.0),
            make_bar(1, 130.0, 120.0, 125.0),
            make_bar(2, 120.0, 110.0, 115.0),
        ];
        // TR: 10, |130-105|=25, |110-125|=15
        assert_eq!(true_ranges(&bars), vec![10.0, 25.0, 15.0]);

        let series = calculate_atr(&bars, 2);
        assert_eq!(series.values[0], None);
        assert_relative_eq!(series.values[1].unwrap(), 17.5);
        assert_relative_eq!(series.values[2].unwrap(), 20.0);
    }

    #[test]
    fn atr_insufficient_bars() {
        let bars: Vec<Bar> = (0..2).map(|i| make_bar(i, 110.0, 90.0, 100.0)).collect();
        let series = calculate_atr(&bars, 5);
        assert_eq!(series.values, vec![None, None]);
    }

    proptest! {
        #[test]
        fn atr_never_negative(
            raw in prop::collection::vec((1.0f64..1000.0, 0.0f64..50.0, 0.0f64..1.0), 1..80)
        ) {
            let bars: Vec<Bar> = raw
                .iter()
                .enumerate()
                .map(|(i, &(low, spread, pos))| {
                    let high = low + spread;
                    make_bar(i as i64, high, low, low + spread * pos)
                })
                .collect();
            let series = calculate_atr(&bars, 14);
            prop_assert_eq!(series.len(), bars.len());
            for v in series.values.iter().flatten() {
                prop_assert!(*v >= 0.0);
            }
        }
    }
}
