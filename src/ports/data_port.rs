//! Market data access port.

use crate::domain::error::WicktraderError;
use crate::domain::ohlcv::Bar;

pub trait DataPort {
    /// Bars for `symbol` at `timeframe`, ordered by strictly increasing
    /// timestamp.
    fn fetch_bars(&self, symbol: &str, timeframe: &str) -> Result<Vec<Bar>, WicktraderError>;

    fn list_symbols(&self, timeframe: &str) -> Result<Vec<String>, WicktraderError>;
}
