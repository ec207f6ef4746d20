//! Order routing port.

use crate::domain::error::WicktraderError;
use crate::domain::order_intent::Side;

pub trait OrderRouter {
    /// Submits a market order and returns the broker's acknowledgement.
    fn submit(&self, side: Side, symbol: &str, quantity: f64) -> Result<String, WicktraderError>;
}
