//! Portfolio ledger port driven by the backtest replay loop.

use crate::domain::error::WicktraderError;
use crate::domain::order_intent::OrderIntent;

/// Cash/position ledger. The replay loop is its only writer during a run and
/// applies intents one at a time in stream order.
pub trait PortfolioLedger {
    fn apply(&mut self, intent: &OrderIntent) -> Result<(), WicktraderError>;

    /// Cash plus the open position marked at `price`.
    fn net_asset_value(&self, price: f64) -> f64;

    fn cash(&self) -> f64;

    /// Open quantity; zero when flat.
    fn position(&self) -> f64;
}
