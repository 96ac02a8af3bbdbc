//! Technical indicator series with explicit warm-up validity.
//!
//! - `IndicatorPoint`: a single dated value with a validity flag
//! - `IndicatorType`: indicator identity + parameters
//! - `IndicatorSeries`: one point per input bar, aligned with the bar order
//!
//! Points inside a rolling window's warm-up are marked invalid; downstream
//! signal logic treats invalid points as "no opinion" rather than zero.

pub mod rsi;
pub mod sma;

use chrono::NaiveDate;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorPoint {
    pub date: NaiveDate,
    pub valid: bool,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Sma(usize),
    Rsi(usize),
}

#[derive(Debug, Clone)]
pub struct IndicatorSeries {
    pub indicator_type: IndicatorType,
    pub values: Vec<IndicatorPoint>,
}

impl IndicatorSeries {
    /// Value at `index` if the point exists and is past its warm-up.
    pub fn value_at(&self, index: usize) -> Option<f64> {
        self.values
            .get(index)
            .filter(|p| p.valid)
            .map(|p| p.value)
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Sma(window) => write!(f, "SMA({})", window),
            IndicatorType::Rsi(period) => write!(f, "RSI({})", period),
        }
    }
}
