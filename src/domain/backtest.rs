//! Backtest replay loop.
//!
//! Order intents are applied to a portfolio ledger strictly in stream order;
//! the result marks the ledger at the last close.

use log::info;
use serde::{Deserialize, Serialize};

use crate::domain::error::WicktraderError;
use crate::domain::history::{PriceHistory, STANDARD_INDICATORS};
use crate::domain::indicator::IndicatorType;
use crate::domain::ohlcv::Bar;
use crate::domain::order_intent::OrderIntent;
use crate::domain::portfolio::{DEFAULT_ORDER_QTY, PaperPortfolio};
use crate::domain::strategy::ScoringEngine;
use crate::domain::strategy::wick_master::MIN_BARS;
use crate::ports::portfolio_port::PortfolioLedger;

pub const DEFAULT_INITIAL_CAPITAL: f64 = 10_000.0;

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestConfig {
    pub initial_capital: f64,
    pub order_qty: f64,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        BacktestConfig {
            initial_capital: DEFAULT_INITIAL_CAPITAL,
            order_qty: DEFAULT_ORDER_QTY,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestResult {
    pub initial: f64,
    #[serde(rename = "final")]
    pub final_nav: f64,
    pub trades: usize,
    pub return_pct: f64,
}

pub struct BacktestEngine<P: PortfolioLedger = PaperPortfolio> {
    portfolio: P,
    initial_capital: f64,
}

impl BacktestEngine<PaperPortfolio> {
    pub fn new(config: &BacktestConfig) -> Self {
        Self::with_portfolio(
            PaperPortfolio::with_order_qty(config.initial_capital, config.order_qty),
            config.initial_capital,
        )
    }
}

impl<P: PortfolioLedger> BacktestEngine<P> {
    /// `initial_capital` is the configured starting capital of `portfolio`.
    pub fn with_portfolio(portfolio: P, initial_capital: f64) -> Self {
        Self {
            portfolio,
            initial_capital,
        }
    }

    pub fn portfolio(&self) -> &P {
        &self.portfolio
    }

    pub fn into_portfolio(self) -> P {
        self.portfolio
    }

    /// Replays `intents` in order, then values the portfolio at the last
    /// close in `bars` (0.0 when there are no bars).
    ///
    /// The first malformed or rejected intent aborts the run with its
    /// position in the stream.
    ///
    /// `initial` reports the live cash balance while flat and the configured
    /// starting capital while a position is open.
    pub fn run(
        &mut self,
        intents: &[OrderIntent],
        bars: &[Bar],
    ) -> Result<BacktestResult, WicktraderError> {
        let mut trades = 0;
        for (index, intent) in intents.iter().enumerate() {
            validate_intent(index, intent)?;
            self.portfolio
                .apply(intent)
                .map_err(|e| WicktraderError::InvalidSignal {
                    index,
                    symbol: intent.symbol.clone(),
                    reason: e.to_string(),
                })?;
            trades += 1;
        }

        let final_price = bars.last().map(|b| b.close).unwrap_or(0.0);
        let nav = self.portfolio.net_asset_value(final_price);

        let initial = if self.portfolio.position() == 0.0 {
            self.portfolio.cash()
        } else {
            self.initial_capital
        };

        let result = BacktestResult {
            initial,
            final_nav: nav,
            trades,
            return_pct: round2((nav / self.initial_capital - 1.0) * 100.0),
        };
        info!(
            "replayed {} intents: nav {:.2} ({:+.2}%)",
            result.trades, result.final_nav, result.return_pct
        );
        Ok(result)
    }
}

fn validate_intent(index: usize, intent: &OrderIntent) -> Result<(), WicktraderError> {
    let fail = |reason: String| WicktraderError::InvalidSignal {
        index,
        symbol: intent.symbol.clone(),
        reason,
    };

    if intent.symbol.trim().is_empty() {
        return Err(fail("symbol is empty".to_string()));
    }
    if !intent.price.is_finite() || intent.price <= 0.0 {
        return Err(fail(format!("price must be positive, got {}", intent.price)));
    }
    if !(0.0..=1.0).contains(&intent.confidence) {
        return Err(fail(format!(
            "confidence must be within [0, 1], got {}",
            intent.confidence
        )));
    }
    if !intent.stop_loss.is_finite() || !intent.take_profit.is_finite() {
        return Err(fail("stop_loss and take_profit must be finite".to_string()));
    }
    if intent.parsed_timestamp().is_none() {
        return Err(fail(format!("invalid timestamp '{}'", intent.timestamp)));
    }
    Ok(())
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Evaluates `engine` on every prefix of `history` long enough to score and
/// collects the resulting intents in bar order. Each intent records the
/// timestamp of the bar it was generated on under `bar_time`.
///
/// The window grows one bar at a time instead of being rebuilt per prefix.
pub fn walk_forward_signals(
    engine: &dyn ScoringEngine,
    symbol: &str,
    history: &PriceHistory,
) -> Vec<OrderIntent> {
    if history.bar_count() < MIN_BARS {
        return Vec::new();
    }

    // Standard indicators are filled in once, before the window grows.
    let missing: Vec<IndicatorType> = STANDARD_INDICATORS
        .into_iter()
        .filter(|t| !history.has_indicator(*t))
        .collect();
    let filled;
    let source = if missing.is_empty() {
        history
    } else {
        let mut h = history.clone();
        h.add_indicators(&missing);
        filled = h;
        &filled
    };

    let mut intents = Vec::new();
    let mut window = source.prefix(MIN_BARS);
    loop {
        let signal = engine.evaluate(symbol, &window);
        if let Some(mut intent) = OrderIntent::from_signal(&signal) {
            if let Some(bar) = window.last_bar() {
                let bar_time = bar.timestamp.to_rfc3339();
                intent.metadata.insert("bar_time".to_string(), bar_time);
            }
            intents.push(intent);
        }
        if !window.advance_from(source) {
            break;
        }
    }
    intents
}
