#![allow(dead_code)]

use chrono::NaiveDate;
use niftytrader::domain::error::NiftytraderError;
pub use niftytrader::domain::ohlcv::OhlcvBar;
use niftytrader::ports::data_port::DataPort;
use std::collections::HashMap;

#[derive(Debug)]
pub struct MockDataPort {
    pub data: HashMap<String, Vec<OhlcvBar>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, ticker: &str, bars: Vec<OhlcvBar>) -> Self {
        self.data.insert(ticker.to_string(), bars);
        self
    }

    pub fn with_error(mut self, ticker: &str, reason: &str) -> Self {
        self.errors.insert(ticker.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_ohlcv(&self, ticker: &str, _period: &str) -> Result<Vec<OhlcvBar>, NiftytraderError> {
        if let Some(reason) = self.errors.get(ticker) {
            return Err(NiftytraderError::Data {
                reason: reason.clone(),
            });
        }
        match self.data.get(ticker) {
            Some(bars) => Ok(bars.clone()),
            None => Err(NiftytraderError::NoData {
                ticker: ticker.to_string(),
            }),
        }
    }

    fn list_tickers(&self) -> Result<Vec<String>, NiftytraderError> {
        let mut tickers: Vec<String> = self.data.keys().cloned().collect();
        tickers.sort();
        Ok(tickers)
    }
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

pub fn make_bar(day_offset: i64, close: f64) -> OhlcvBar {
    OhlcvBar {
        date: date(2020, 1, 1) + chrono::Duration::days(day_offset),
        open: close,
        high: close,
        low: close,
        close,
        volume: 100_000,
    }
}

pub fn bars_from_closes(closes: &[f64]) -> Vec<OhlcvBar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| make_bar(i as i64, close))
        .collect()
}

/// `count` bars all at the same price.
pub fn constant_series(count: usize, price: f64) -> Vec<OhlcvBar> {
    bars_from_closes(&vec![price; count])
}

/// `count` bars rising linearly from `from` to `to`.
pub fn linear_series(count: usize, from: f64, to: f64) -> Vec<OhlcvBar> {
    let step = (to - from) / (count.saturating_sub(1).max(1)) as f64;
    let closes: Vec<f64> = (0..count).map(|i| from + step * i as f64).collect();
    bars_from_closes(&closes)
}
