//! Backtest engine: signal stream → position and return bookkeeping.
//!
//! Long-only accounting. The position entering a bar earns that bar's return
//! (lag-one application); the bar's own signal only affects the next bar.
//! Warm-up values are NaN, never zero. The cumulative products record NaN at
//! those bars while skipping them in the running accumulator.

use crate::domain::metrics::Metrics;
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::signal::{self, CurrentSignal, SignalPoint};
use crate::domain::strategy::StrategySpec;
use chrono::NaiveDate;

pub const DEFAULT_INITIAL_CAPITAL: f64 = 100_000.0;

/// One bar of backtest accounting.
#[derive(Debug, Clone)]
pub struct SignalRecord {
    pub date: NaiveDate,
    pub price: f64,
    pub signal: i32,
    /// Long/flat position held at the close of this bar: 0 or 1.
    pub position: i32,
    pub market_return: f64,
    pub strategy_return: f64,
    pub cumulative_market: f64,
    pub cumulative_strategy: f64,
    pub portfolio_value: f64,
}

#[derive(Debug, Clone)]
pub struct BacktestResult {
    pub metrics: Metrics,
    pub records: Vec<SignalRecord>,
}

impl BacktestResult {
    /// Actionable reading of the last record.
    pub fn current_signal(&self) -> Option<CurrentSignal> {
        let last = self.records.last()?;
        Some(CurrentSignal {
            action: signal::action_for(last.signal),
            price: last.price,
            date: last.date,
        })
    }
}

/// Convert a signal stream into per-bar positions and returns.
///
/// A positive signal opens (or keeps) a one-unit long position, a negative
/// signal closes to flat. A sell with no open position changes nothing but
/// the bar still carries its nonzero signal, so it counts as a trade event.
pub fn simulate(signals: &[SignalPoint], initial_capital: f64) -> Vec<SignalRecord> {
    let mut records = Vec::with_capacity(signals.len());
    let mut position = 0i32;
    let mut cum_market = 1.0;
    let mut cum_strategy = 1.0;

    for (i, point) in signals.iter().enumerate() {
        let market_return = if i == 0 {
            f64::NAN
        } else {
            let prev_price = signals[i - 1].price;
            (point.price - prev_price) / prev_price
        };

        // The position that entered this bar earns its return.
        let entering_position = position;
        if point.signal > 0 {
            position = 1;
        } else if point.signal < 0 {
            position = 0;
        }

        let strategy_return = if i == 0 {
            f64::NAN
        } else {
            entering_position as f64 * market_return
        };

        let cumulative_market = if market_return.is_nan() {
            f64::NAN
        } else {
            cum_market *= 1.0 + market_return;
            cum_market
        };
        let cumulative_strategy = if strategy_return.is_nan() {
            f64::NAN
        } else {
            cum_strategy *= 1.0 + strategy_return;
            cum_strategy
        };

        records.push(SignalRecord {
            date: point.date,
            price: point.price,
            signal: point.signal,
            position,
            market_return,
            strategy_return,
            cumulative_market,
            cumulative_strategy,
            portfolio_value: initial_capital * cumulative_strategy,
        });
    }

    records
}

/// One strategy evaluated against one price series.
///
/// Owns its derived signal stream; nothing is shared between runs, so
/// re-running with different parameters is a fresh `StrategyRun`.
pub struct StrategyRun {
    bars: Vec<OhlcvBar>,
    spec: StrategySpec,
    signals: Option<Vec<SignalPoint>>,
}

impl StrategyRun {
    pub fn new(bars: Vec<OhlcvBar>, spec: StrategySpec) -> Self {
        Self {
            bars,
            spec,
            signals: None,
        }
    }

    pub fn spec(&self) -> &StrategySpec {
        &self.spec
    }

    pub fn bars(&self) -> &[OhlcvBar] {
        &self.bars
    }

    /// The signal stream, generated on first use.
    pub fn signals(&mut self) -> &[SignalPoint] {
        if self.signals.is_none() {
            self.signals = Some(signal::generate_signals(&self.bars, &self.spec));
        }
        self.signals.as_deref().unwrap_or_default()
    }

    pub fn backtest(&mut self, initial_capital: f64) -> BacktestResult {
        let records = simulate(self.signals(), initial_capital);
        let metrics = Metrics::compute(&records, initial_capital);
        BacktestResult { metrics, records }
    }

    /// Actionable reading of the latest bar; generates signals if needed.
    pub fn current_signal(&mut self) -> Option<CurrentSignal> {
        signal::current_signal(self.signals())
    }
}
