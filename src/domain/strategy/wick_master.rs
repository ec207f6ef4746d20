//! Wick reversal pattern strategy.
//!
//! Scores the most recent bar:
//! - +40 if max(lower wick, upper wick) / body >= wick_threshold
//! - +20 if RSI < 30, -20 if RSI > 70
//! - +20 if volume > mean(previous 19 volumes) * volume_threshold
//! - +10 if close > SMA(20), else -10
//!
//! A buy is emitted when the score reaches `pattern_min_score` and the lower
//! wick dominates. There is no bearish branch: a dominant upper wick never
//! produces a sell. Indicator-gated checks are skipped while the indicator is
//! unavailable.

use std::collections::BTreeMap;
use std::sync::Arc;

use log::debug;

use crate::domain::clock::{Clock, SystemClock};
use crate::domain::history::PriceHistory;
use crate::domain::indicator::{DEFAULT_ATR_PERIOD, DEFAULT_RSI_PERIOD, IndicatorType};
use crate::domain::indicator::rsi::{OVERBOUGHT, OVERSOLD};
use crate::domain::ohlcv::Bar;
use crate::domain::signal::{SignalKind, TradingSignal};
use crate::domain::strategy::{ScoringEngine, StrategyParams};

pub const NAME: &str = "wick_master_pro";

/// Bars required before the pattern is scored at all.
pub const MIN_BARS: usize = 25;
/// Bars preceding the last one that form the volume baseline.
pub const VOLUME_LOOKBACK: usize = 19;
pub const TREND_SMA: IndicatorType = IndicatorType::Sma(20);
pub const MOMENTUM: IndicatorType = IndicatorType::Rsi(DEFAULT_RSI_PERIOD);
pub const VOLATILITY: IndicatorType = IndicatorType::Atr(DEFAULT_ATR_PERIOD);

pub const WICK_POINTS: i32 = 40;
pub const MOMENTUM_POINTS: i32 = 20;
pub const VOLUME_POINTS: i32 = 20;
pub const TREND_POINTS: i32 = 10;

pub const ATR_STOP_MULTIPLE: f64 = 2.5;
pub const REWARD_MULTIPLE: f64 = 3.0;
pub const MAX_CONFIDENCE: f64 = 0.95;
pub const BUY_POSITION_SIZE: f64 = 0.001;
pub const PATTERN: &str = "hammer";

/// Breakdown of the score for one bar.
#[derive(Debug, Clone, PartialEq)]
pub struct PatternScore {
    pub body_size: f64,
    pub lower_wick: f64,
    pub upper_wick: f64,
    /// 0.0 when the body is empty.
    pub wick_ratio: f64,
    pub rsi: Option<f64>,
    pub volume_ratio: Option<f64>,
    pub score: i32,
}

impl PatternScore {
    pub fn bullish_wick_dominant(&self) -> bool {
        self.lower_wick > self.upper_wick
    }
}

pub struct WickMasterPro {
    params: StrategyParams,
    clock: Arc<dyn Clock>,
}

impl WickMasterPro {
    pub fn new(params: StrategyParams) -> Self {
        Self::with_clock(params, Arc::new(SystemClock))
    }

    pub fn with_clock(params: StrategyParams, clock: Arc<dyn Clock>) -> Self {
        Self { params, clock }
    }

    pub fn params(&self) -> &StrategyParams {
        &self.params
    }

    /// Scores the last bar. `None` when there are fewer than [`MIN_BARS`] bars.
    pub fn score(&self, history: &PriceHistory) -> Option<PatternScore> {
        if history.bar_count() < MIN_BARS {
            return None;
        }
        let bars = &history.bars;
        let last = bars.last()?;

        let body_size = last.body_size();
        let lower_wick = last.lower_wick();
        let upper_wick = last.upper_wick();

        let mut score = 0;
        let mut wick_ratio = 0.0;

        if body_size > 0.0 {
            wick_ratio = lower_wick.max(upper_wick) / body_size;
            if wick_ratio >= self.params.wick_threshold {
                score += WICK_POINTS;
            }
        }

        let rsi = history.latest(MOMENTUM);
        if let Some(rsi) = rsi {
            if rsi < OVERSOLD {
                score += MOMENTUM_POINTS;
            } else if rsi > OVERBOUGHT {
                score -= MOMENTUM_POINTS;
            }
        }

        let avg_volume = trailing_volume_mean(bars);
        if last.volume > avg_volume * self.params.volume_threshold {
            score += VOLUME_POINTS;
        }
        let volume_ratio = (avg_volume > 0.0).then(|| last.volume / avg_volume);

        if let Some(sma) = history.latest(TREND_SMA) {
            if last.close > sma {
                score += TREND_POINTS;
            } else {
                score -= TREND_POINTS;
            }
        }

        Some(PatternScore {
            body_size,
            lower_wick,
            upper_wick,
            wick_ratio,
            rsi,
            volume_ratio,
            score,
        })
    }

    fn buy_signal(
        &self,
        symbol: &str,
        history: &PriceHistory,
        last: &Bar,
        pattern: &PatternScore,
    ) -> TradingSignal {
        let entry = last.close;
        let atr = history.latest(VOLATILITY).unwrap_or_else(|| last.range());
        let stop_loss = entry - ATR_STOP_MULTIPLE * atr;
        let take_profit = entry + REWARD_MULTIPLE * (entry - stop_loss);
        let confidence = (pattern.score as f64 / 100.0).clamp(0.0, MAX_CONFIDENCE);

        let mut indicators = BTreeMap::new();
        indicators.insert("wick_ratio".to_string(), pattern.wick_ratio);
        indicators.insert("score".to_string(), pattern.score as f64);
        if let Some(rsi) = pattern.rsi {
            indicators.insert("rsi".to_string(), rsi);
        }
        if let Some(ratio) = pattern.volume_ratio {
            indicators.insert("volume_ratio".to_string(), ratio);
        }

        let mut metadata = BTreeMap::new();
        metadata.insert("timeframe".to_string(), self.params.timeframe.clone());
        metadata.insert("pattern".to_string(), PATTERN.to_string());

        TradingSignal {
            kind: SignalKind::Buy,
            symbol: symbol.to_string(),
            confidence,
            entry_price: entry,
            stop_loss,
            take_profit,
            position_size: BUY_POSITION_SIZE,
            timestamp: self.clock.now(),
            reason: format!(
                "Bullish wick reversal (ratio={:.2}, score={})",
                pattern.wick_ratio, pattern.score
            ),
            indicators,
            metadata,
        }
    }
}

impl ScoringEngine for WickMasterPro {
    fn name(&self) -> &str {
        NAME
    }

    fn evaluate(&self, symbol: &str, history: &PriceHistory) -> TradingSignal {
        let Some(last) = history.last_bar() else {
            return TradingSignal::hold(symbol, 0.0, self.clock.now());
        };

        // Callers normally pass enriched histories; fill in whatever is missing.
        let required = [TREND_SMA, MOMENTUM, VOLATILITY];
        let filled;
        let history = if required.iter().all(|t| history.has_indicator(*t)) {
            history
        } else {
            let mut h = history.clone();
            let missing: Vec<IndicatorType> = required
                .into_iter()
                .filter(|t| !h.has_indicator(*t))
                .collect();
            h.add_indicators(&missing);
            filled = h;
            &filled
        };

        let Some(pattern) = self.score(history) else {
            debug!(
                "{}: {} bars, need {} - holding",
                symbol,
                history.bar_count(),
                MIN_BARS
            );
            return TradingSignal::hold(symbol, last.close, self.clock.now());
        };

        debug!(
            "{}: score={} wick_ratio={:.2} rsi={:?} volume_ratio={:?} lower={} upper={}",
            symbol,
            pattern.score,
            pattern.wick_ratio,
            pattern.rsi,
            pattern.volume_ratio,
            pattern.lower_wick,
            pattern.upper_wick
        );

        if pattern.score >= self.params.pattern_min_score && pattern.bullish_wick_dominant() {
            self.buy_signal(symbol, history, last, &pattern)
        } else {
            TradingSignal::hold(symbol, last.close, self.clock.now())
        }
    }
}

/// Mean volume of the [`VOLUME_LOOKBACK`] bars before the last one.
fn trailing_volume_mean(bars: &[Bar]) -> f64 {
    if bars.len() < 2 {
        return 0.0;
    }
    let end = bars.len() - 1;
    let start = end.saturating_sub(VOLUME_LOOKBACK);
    let window = &bars[start..end];
    window.iter().map(|b| b.volume).sum::<f64>() / window.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::clock::FixedClock;
    use crate::domain::indicator::IndicatorSeries;
    use approx::assert_relative_eq;
    use chrono::{DateTime, TimeZone, Utc};

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn engine() -> WickMasterPro {
        WickMasterPro::with_clock(StrategyParams::default(), Arc::new(FixedClock(fixed_time())))
    }

    fn flat_bar(i: usize) -> Bar {
        Bar {
            timestamp: Utc.timestamp_opt(1_700_000_000 + i as i64 * 3600, 0).unwrap(),
            open: 100.0,
            high: 101.0,
            low: 99.0,
            close: 100.0,
            volume: 1000.0,
        }
    }

    /// 24 flat bars followed by a hammer: body 1, lower wick 3, upper wick 0.5,
    /// double volume, close above the 20-bar mean.
    fn hammer_bars() -> Vec<Bar> {
        let mut bars: Vec<Bar> = (0..24).map(flat_bar).collect();
        bars.push(Bar {
            timestamp: Utc.timestamp_opt(1_700_000_000 + 24 * 3600, 0).unwrap(),
            open: 100.0,
            high: 101.5,
            low: 97.0,
            close: 101.0,
            volume: 2000.0,
        });
        bars
    }

    fn with_rsi(mut history: PriceHistory, rsi: f64) -> PriceHistory {
        let n = history.bar_count();
        history.indicators.insert(
            MOMENTUM,
            IndicatorSeries {
                indicator_type: MOMENTUM,
                values: vec![Some(rsi); n],
            },
        );
        history
    }

    #[test]
    fn empty_history_holds_at_zero() {
        let sig = engine().evaluate("BTC/USD", &PriceHistory::default());
        assert_eq!(sig.kind, SignalKind::Hold);
        assert_eq!(sig.confidence, 0.0);
        assert_eq!(sig.entry_price, 0.0);
        assert_eq!(sig.stop_loss, 0.0);
        assert_eq!(sig.take_profit, 0.0);
    }

    #[test]
    fn short_history_holds_at_last_close() {
        let mut bars = hammer_bars();
        bars.remove(0);
        let sig = engine().evaluate("BTC/USD", &PriceHistory::enriched(bars));
        assert_eq!(sig.kind, SignalKind::Hold);
        assert_eq!(sig.confidence, 0.0);
        assert_eq!(sig.entry_price, 101.0);
        assert_eq!(sig.stop_loss, 101.0);
        assert_eq!(sig.take_profit, 101.0);
        assert_eq!(sig.timestamp, fixed_time());
    }

    #[test]
    fn every_short_length_holds_at_last_close() {
        let mut bars = hammer_bars();
        bars.remove(0);
        for len in 1..MIN_BARS {
            // end each prefix on the hammer so a buy would be tempting
            let window = bars[bars.len() - len..].to_vec();
            let last_close = window[len - 1].close;
            let sig = engine().evaluate("BTC/USD", &PriceHistory::enriched(window));
            assert_eq!(sig.kind, SignalKind::Hold, "len {len}");
            assert_eq!(sig.confidence, 0.0, "len {len}");
            assert_eq!(sig.entry_price, last_close, "len {len}");
            assert_eq!(sig.stop_loss, last_close, "len {len}");
            assert_eq!(sig.take_profit, last_close, "len {len}");
        }
    }

    #[test]
    fn bullish_reversal_triggers_buy() {
        let history = with_rsi(PriceHistory::enriched(hammer_bars()), 25.0);
        let pattern = engine().score(&history).unwrap();
        assert_relative_eq!(pattern.wick_ratio, 3.0);
        assert_eq!(pattern.score, 90);

        let sig = engine().evaluate("AAPL", &history);
        assert_eq!(sig.kind, SignalKind::Buy);
        assert_relative_eq!(sig.confidence, 0.90);

        let atr = history.latest(VOLATILITY).unwrap();
        // TR: 2.0 on the flat bars, 4.5 on the hammer
        assert_relative_eq!(atr, (13.0 * 2.0 + 4.5) / 14.0);
        assert_relative_eq!(sig.entry_price, 101.0);
        assert_relative_eq!(sig.stop_loss, 101.0 - 2.5 * atr);
        assert_relative_eq!(sig.take_profit, 101.0 + 3.0 * (101.0 - sig.stop_loss));
        assert_eq!(sig.position_size, BUY_POSITION_SIZE);
        assert_eq!(sig.reason, "Bullish wick reversal (ratio=3.00, score=90)");
        assert_eq!(sig.metadata["pattern"], "hammer");
        assert_eq!(sig.metadata["timeframe"], "1h");
    }

    #[test]
    fn buy_diagnostics() {
        let history = with_rsi(PriceHistory::enriched(hammer_bars()), 25.0);
        let sig = engine().evaluate("AAPL", &history);
        assert_relative_eq!(sig.indicators["wick_ratio"], 3.0);
        assert_relative_eq!(sig.indicators["score"], 90.0);
        assert_relative_eq!(sig.indicators["rsi"], 25.0);
        assert_relative_eq!(sig.indicators["volume_ratio"], 2.0);
    }

    #[test]
    fn overbought_suppresses_buy() {
        let history = with_rsi(PriceHistory::enriched(hammer_bars()), 80.0);
        assert_eq!(engine().score(&history).unwrap().score, 50);

        let sig = engine().evaluate("AAPL", &history);
        assert_eq!(sig.kind, SignalKind::Hold);
        assert_eq!(sig.confidence, 0.0);
        assert_eq!(sig.entry_price, 101.0);
    }

    #[test]
    fn computed_rsi_is_used_when_absent() {
        // only one up-move in the window, so the computed RSI is 100: 40 - 20 + 20 + 10
        let history = PriceHistory::new(hammer_bars());
        let sig = engine().evaluate("AAPL", &history);
        assert_eq!(sig.kind, SignalKind::Hold);
    }

    #[test]
    fn upper_wick_dominance_never_sells() {
        let mut bars = hammer_bars();
        let last = bars.last_mut().unwrap();
        // shooting star: body 1, upper wick 3, lower wick 0.5
        last.open = 100.0;
        last.close = 101.0;
        last.high = 104.0;
        last.low = 99.5;
        let history = with_rsi(PriceHistory::enriched(bars), 25.0);

        assert_eq!(engine().score(&history).unwrap().score, 90);
        let sig = engine().evaluate("AAPL", &history);
        assert_eq!(sig.kind, SignalKind::Hold);
    }

    #[test]
    fn confidence_is_capped() {
        let params = StrategyParams {
            pattern_min_score: 0,
            ..StrategyParams::default()
        };
        let engine = WickMasterPro::with_clock(params, Arc::new(FixedClock(fixed_time())));
        let history = with_rsi(PriceHistory::enriched(hammer_bars()), 25.0);
        let sig = engine.evaluate("AAPL", &history);
        assert!(sig.confidence <= MAX_CONFIDENCE);
    }

    #[test]
    fn atr_fallback_uses_bar_range() {
        let mut history = with_rsi(PriceHistory::enriched(hammer_bars()), 25.0);
        let n = history.bar_count();
        history.indicators.insert(
            VOLATILITY,
            IndicatorSeries {
                indicator_type: VOLATILITY,
                values: vec![None; n],
            },
        );
        let sig = engine().evaluate("AAPL", &history);
        assert_eq!(sig.kind, SignalKind::Buy);
        // range of the hammer: 101.5 - 97.0
        assert_relative_eq!(sig.stop_loss, 101.0 - 2.5 * 4.5);
    }

    #[test]
    fn unavailable_sma_skips_trend_points() {
        let mut history = with_rsi(PriceHistory::enriched(hammer_bars()), 25.0);
        let n = history.bar_count();
        history.indicators.insert(
            TREND_SMA,
            IndicatorSeries {
                indicator_type: TREND_SMA,
                values: vec![None; n],
            },
        );
        assert_eq!(engine().score(&history).unwrap().score, 80);
    }

    #[test]
    fn doji_has_zero_wick_ratio() {
        let mut bars = hammer_bars();
        let last = bars.last_mut().unwrap();
        last.close = last.open;
        let history = with_rsi(PriceHistory::enriched(bars), 25.0);
        let pattern = engine().score(&history).unwrap();
        assert_eq!(pattern.wick_ratio, 0.0);
        // rsi + volume - trend: a close equal to the SMA is not above it
        assert!(pattern.score < 60);
    }

    #[test]
    fn zero_volume_baseline_omits_ratio() {
        let mut bars = hammer_bars();
        for b in bars.iter_mut() {
            b.volume = 0.0;
        }
        let history = with_rsi(PriceHistory::enriched(bars), 25.0);
        let pattern = engine().score(&history).unwrap();
        assert_eq!(pattern.volume_ratio, None);
    }

    #[test]
    fn evaluation_is_deterministic() {
        let history = with_rsi(PriceHistory::enriched(hammer_bars()), 25.0);
        let a = engine().evaluate("AAPL", &history);
        let b = engine().evaluate("AAPL", &history);
        assert_eq!(a, b);
        assert_eq!(a.stop_loss.to_bits(), b.stop_loss.to_bits());
        assert_eq!(a.take_profit.to_bits(), b.take_profit.to_bits());
    }

    #[test]
    fn trailing_volume_excludes_last_bar() {
        let bars = hammer_bars();
        assert_relative_eq!(trailing_volume_mean(&bars), 1000.0);
    }
}
