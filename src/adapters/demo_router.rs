//! Order router that records orders instead of sending them to a broker.

use crate::domain::error::WicktraderError;
use crate::domain::order_intent::Side;
use crate::ports::execution_port::OrderRouter;
use log::info;
use std::cell::RefCell;

#[derive(Debug, Default)]
pub struct DemoRouter {
    submitted: RefCell<Vec<(Side, String, f64)>>,
}

impl DemoRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn submitted(&self) -> Vec<(Side, String, f64)> {
        self.submitted.borrow().clone()
    }
}

impl OrderRouter for DemoRouter {
    fn submit(&self, side: Side, symbol: &str, quantity: f64) -> Result<String, WicktraderError> {
        if !quantity.is_finite() || quantity <= 0.0 {
            return Err(WicktraderError::Portfolio {
                reason: format!("order quantity must be positive, got {}", quantity),
            });
        }
        info!("[DEMO] {} {:?} {} (not executed)", symbol, side, quantity);
        let mut submitted = self.submitted.borrow_mut();
        submitted.push((side, symbol.to_string(), quantity));
        Ok(format!("demo-{}", submitted.len()))
    }
}
