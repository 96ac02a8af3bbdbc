//! Data access port trait.
//!
//! Series are keyed by (ticker, period) the way the upstream market-data
//! sources key them; `period` is a human span such as "10y", "1y" or "6mo".

use crate::domain::error::NiftytraderError;
use crate::domain::ohlcv::OhlcvBar;

pub trait DataPort: std::fmt::Debug {
    /// Fetch the OHLCV series for a ticker over a period, ascending by date.
    fn fetch_ohlcv(&self, ticker: &str, period: &str) -> Result<Vec<OhlcvBar>, NiftytraderError>;

    /// Tickers this source can serve.
    fn list_tickers(&self) -> Result<Vec<String>, NiftytraderError>;
}
