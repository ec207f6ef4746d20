//! Paper portfolio: a single-instrument cash and position ledger.

use log::{debug, warn};

use crate::domain::error::WicktraderError;
use crate::domain::order_intent::{OrderIntent, Side};
use crate::ports::portfolio_port::PortfolioLedger;

pub const DEFAULT_ORDER_QTY: f64 = 0.001;

#[derive(Debug, Clone, PartialEq)]
pub struct Fill {
    pub side: Side,
    pub symbol: String,
    pub quantity: f64,
    pub price: f64,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PaperPortfolio {
    pub cash: f64,
    pub initial_capital: f64,
    /// Units held; never negative.
    pub position: f64,
    /// Volume-weighted entry of the open position, 0.0 when flat.
    pub avg_entry_price: f64,
    /// Units bought per buy intent.
    pub order_qty: f64,
    pub realized_pnl: f64,
    pub fills: Vec<Fill>,
}

impl PaperPortfolio {
    pub fn new(initial_capital: f64) -> Self {
        Self::with_order_qty(initial_capital, DEFAULT_ORDER_QTY)
    }

    pub fn with_order_qty(initial_capital: f64, order_qty: f64) -> Self {
        PaperPortfolio {
            cash: initial_capital,
            initial_capital,
            position: 0.0,
            avg_entry_price: 0.0,
            order_qty,
            realized_pnl: 0.0,
            fills: Vec::new(),
        }
    }

    pub fn is_flat(&self) -> bool {
        self.position == 0.0
    }

    pub fn unrealized_pnl(&self, price: f64) -> f64 {
        self.position * (price - self.avg_entry_price)
    }

    fn buy(&mut self, intent: &OrderIntent) {
        let cost = self.order_qty * intent.price;
        if cost > self.cash {
            warn!(
                "{}: buy of {} at {} needs {:.2}, only {:.2} cash - ignored",
                intent.symbol, self.order_qty, intent.price, cost, self.cash
            );
            return;
        }

        let new_position = self.position + self.order_qty;
        self.avg_entry_price =
            (self.avg_entry_price * self.position + intent.price * self.order_qty) / new_position;
        self.position = new_position;
        self.cash -= cost;
        self.record_fill(intent, self.order_qty);
    }

    fn sell(&mut self, intent: &OrderIntent) {
        if self.is_flat() {
            debug!("{}: sell while flat - ignored", intent.symbol);
            return;
        }

        let quantity = self.position;
        self.cash += quantity * intent.price;
        self.realized_pnl += quantity * (intent.price - self.avg_entry_price);
        self.position = 0.0;
        self.avg_entry_price = 0.0;
        self.record_fill(intent, quantity);
    }

    fn record_fill(&mut self, intent: &OrderIntent, quantity: f64) {
        self.fills.push(Fill {
            side: intent.side,
            symbol: intent.symbol.clone(),
            quantity,
            price: intent.price,
            timestamp: intent.timestamp.clone(),
        });
    }
}

impl PortfolioLedger for PaperPortfolio {
    fn apply(&mut self, intent: &OrderIntent) -> Result<(), WicktraderError> {
        if !intent.price.is_finite() || intent.price <= 0.0 {
            return Err(WicktraderError::Portfolio {
                reason: format!("cannot fill at price {}", intent.price),
            });
        }
        match intent.side {
            Side::Buy => self.buy(intent),
            Side::Sell => self.sell(intent),
        }
        Ok(())
    }

    fn net_asset_value(&self, price: f64) -> f64 {
        self.cash + self.position * price
    }

    fn cash(&self) -> f64 {
        self.cash
    }

    fn position(&self) -> f64 {
        self.position
    }
}
