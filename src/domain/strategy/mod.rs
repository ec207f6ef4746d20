//! Scoring engines that turn a price history into a trading signal.
//!
//! Every engine implements [`ScoringEngine`]; engines are looked up by
//! identifier through the [`registry::StrategyRegistry`].

pub mod registry;
pub mod wick_master;

use crate::domain::error::WicktraderError;
use crate::domain::history::PriceHistory;
use crate::domain::signal::TradingSignal;

pub use registry::{StrategyFactory, StrategyRegistry};
pub use wick_master::WickMasterPro;

/// Capability shared by all strategies: a decision for the latest bar.
///
/// Engines are stateless between calls, so `evaluate` takes `&self` and an
/// engine may be shared across threads driving different symbols.
pub trait ScoringEngine: Send + Sync {
    fn name(&self) -> &str;

    /// Never fails: insufficient history or missing indicators resolve to a
    /// hold signal.
    fn evaluate(&self, symbol: &str, history: &PriceHistory) -> TradingSignal;
}

/// Tunable thresholds of the wick-pattern strategy.
#[derive(Debug, Clone, PartialEq)]
pub struct StrategyParams {
    /// Minimum max(wick) / body ratio that earns the wick points.
    pub wick_threshold: f64,
    /// Score needed before a buy is emitted.
    pub pattern_min_score: i32,
    /// Last volume must exceed the trailing average times this.
    pub volume_threshold: f64,
    /// Bar interval recorded in signal metadata.
    pub timeframe: String,
}

impl Default for StrategyParams {
    fn default() -> Self {
        StrategyParams {
            wick_threshold: 2.0,
            pattern_min_score: 60,
            volume_threshold: 1.5,
            timeframe: "1h".to_string(),
        }
    }
}

impl StrategyParams {
    pub fn validate(&self) -> Result<(), WicktraderError> {
        if !self.wick_threshold.is_finite() || self.wick_threshold <= 0.0 {
            return Err(invalid("wick_threshold", "wick_threshold must be positive"));
        }
        if !(0..=100).contains(&self.pattern_min_score) {
            return Err(invalid(
                "pattern_min_score",
                "pattern_min_score must be between 0 and 100",
            ));
        }
        if !self.volume_threshold.is_finite() || self.volume_threshold <= 0.0 {
            return Err(invalid(
                "volume_threshold",
                "volume_threshold must be positive",
            ));
        }
        if self.timeframe.trim().is_empty() {
            return Err(invalid("timeframe", "timeframe must not be empty"));
        }
        Ok(())
    }
}

fn invalid(key: &str, reason: &str) -> WicktraderError {
    WicktraderError::ConfigInvalid {
        section: "strategy".to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_params() {
        let p = StrategyParams::default();
        assert_eq!(p.wick_threshold, 2.0);
        assert_eq!(p.pattern_min_score, 60);
        assert_eq!(p.volume_threshold, 1.5);
        assert_eq!(p.timeframe, "1h");
        assert!(p.validate().is_ok());
    }

    #[test]
    fn rejects_non_positive_wick_threshold() {
        let p = StrategyParams {
            wick_threshold: 0.0,
            ..StrategyParams::default()
        };
        assert!(matches!(
            p.validate(),
            Err(WicktraderError::ConfigInvalid { ref key, .. }) if key == "wick_threshold"
        ));
    }

    #[test]
    fn rejects_out_of_range_min_score() {
        let p = StrategyParams {
            pattern_min_score: 101,
            ..StrategyParams::default()
        };
        assert!(p.validate().is_err());
    }

    #[test]
    fn rejects_nan_volume_threshold() {
        let p = StrategyParams {
            volume_threshold: f64::NAN,
            ..StrategyParams::default()
        };
        assert!(p.validate().is_err());
    }
}
