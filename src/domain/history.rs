//! Bars together with their computed indicator series.

use crate::domain::indicator::{
    DEFAULT_ATR_PERIOD, DEFAULT_RSI_PERIOD, IndicatorSeries, IndicatorType, compute_indicators,
};
use crate::domain::ohlcv::Bar;
use std::collections::HashMap;

/// Indicators attached by [`PriceHistory::enriched`].
pub const STANDARD_INDICATORS: [IndicatorType; 4] = [
    IndicatorType::Sma(20),
    IndicatorType::Sma(50),
    IndicatorType::Rsi(DEFAULT_RSI_PERIOD),
    IndicatorType::Atr(DEFAULT_ATR_PERIOD),
];

#[derive(Debug, Clone, Default)]
pub struct PriceHistory {
    pub bars: Vec<Bar>,
    pub indicators: HashMap<IndicatorType, IndicatorSeries>,
}

impl PriceHistory {
    /// Bars only, no indicators attached.
    pub fn new(bars: Vec<Bar>) -> Self {
        Self {
            bars,
            indicators: HashMap::new(),
        }
    }

    pub fn enriched(bars: Vec<Bar>) -> Self {
        let mut history = Self::new(bars);
        history.add_indicators(&STANDARD_INDICATORS);
        history
    }

    pub fn add_indicators(&mut self, indicator_types: &[IndicatorType]) {
        let computed = compute_indicators(&self.bars, indicator_types);
        self.indicators.extend(computed);
    }

    pub fn bar_count(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn last_bar(&self) -> Option<&Bar> {
        self.bars.last()
    }

    pub fn has_indicator(&self, indicator_type: IndicatorType) -> bool {
        self.indicators.contains_key(&indicator_type)
    }

    /// Value of an indicator on the most recent bar. `None` if the indicator
    /// was never computed, is still warming up, or has no entry for that bar.
    pub fn latest(&self, indicator_type: IndicatorType) -> Option<f64> {
        let index = self.bars.len().checked_sub(1)?;
        self.indicators
            .get(&indicator_type)
            .and_then(|s| s.get(index))
    }

    /// Prefix of the first `len` bars with its indicators sliced to match.
    /// Rolling indicators only look backwards, so a sliced series equals one
    /// recomputed on the prefix.
    pub fn prefix(&self, len: usize) -> PriceHistory {
        let len = len.min(self.bars.len());
        let indicators = self
            .indicators
            .iter()
            .map(|(t, s)| {
                (
                    *t,
                    IndicatorSeries {
                        indicator_type: s.indicator_type,
                        values: s.values[..len.min(s.values.len())].to_vec(),
                    },
                )
            })
            .collect();
        PriceHistory {
            bars: self.bars[..len].to_vec(),
            indicators,
        }
    }

    /// Appends the bar of `source` that follows this history's last bar,
    /// along with its value in each series this history carries. Returns
    /// `false` once `source` has no further bar.
    ///
    /// `self` must be a prefix of `source`.
    pub fn advance_from(&mut self, source: &PriceHistory) -> bool {
        let index = self.bars.len();
        let Some(bar) = source.bars.get(index) else {
            return false;
        };
        self.bars.push(bar.clone());
        for (t, series) in self.indicators.iter_mut() {
            let value = source.indicators.get(t).and_then(|s| s.get(index));
            series.values.push(value);
        }
        true
    }
}
