//! Signal generation: price series + strategy spec → per-bar signal stream.
//!
//! All three variants share one output contract: exactly one `SignalPoint`
//! per input bar, signal 0 everywhere except the bar where a rule fires.
//!
//! The SMA and Combined variants diff a raw per-bar state, so a signal fires
//! only where the state changes; the magnitude is the state delta and can be
//! ±2 when the state swings between -1 and +1 without an intermediate bar.
//! The RSI variant is edge-triggered directly against its thresholds.

use crate::domain::indicator::rsi::calculate_rsi;
use crate::domain::indicator::sma::calculate_sma;
use crate::domain::indicator::IndicatorSeries;
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::strategy::StrategySpec;
use chrono::NaiveDate;
use std::fmt;

/// One bar's emitted signal alongside the price it was computed from.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalPoint {
    pub date: NaiveDate,
    pub price: f64,
    pub signal: i32,
}

/// Actionable reading of the latest bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalAction {
    Buy,
    Sell,
    Hold,
}

impl fmt::Display for SignalAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalAction::Buy => write!(f, "BUY"),
            SignalAction::Sell => write!(f, "SELL"),
            SignalAction::Hold => write!(f, "HOLD"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CurrentSignal {
    pub action: SignalAction,
    pub price: f64,
    pub date: NaiveDate,
}

pub fn generate_signals(bars: &[OhlcvBar], spec: &StrategySpec) -> Vec<SignalPoint> {
    match *spec {
        StrategySpec::SmaCross {
            short_window,
            long_window,
        } => sma_cross_signals(bars, short_window, long_window),
        StrategySpec::RsiReversal {
            period,
            oversold,
            overbought,
        } => rsi_reversal_signals(bars, period, oversold, overbought),
        StrategySpec::Combined {
            short_window,
            long_window,
            period,
            oversold,
            overbought,
        } => combined_signals(bars, short_window, long_window, period, oversold, overbought),
    }
}

/// Only an exact +1 or -1 is actionable; a ±2 trend swing reads as HOLD.
pub fn action_for(signal: i32) -> SignalAction {
    match signal {
        1 => SignalAction::Buy,
        -1 => SignalAction::Sell,
        _ => SignalAction::Hold,
    }
}

/// Map the last bar of a signal stream to an actionable state.
pub fn current_signal(signals: &[SignalPoint]) -> Option<CurrentSignal> {
    let last = signals.last()?;
    Some(CurrentSignal {
        action: action_for(last.signal),
        price: last.price,
        date: last.date,
    })
}

/// Raw trend state for one bar: +1 short above long, -1 short below long,
/// 0 on equality or while either average is still warming up.
fn trend_state(short: &IndicatorSeries, long: &IndicatorSeries, index: usize) -> i32 {
    match (short.value_at(index), long.value_at(index)) {
        (Some(s), Some(l)) if s > l => 1,
        (Some(s), Some(l)) if s < l => -1,
        _ => 0,
    }
}

/// First difference of a raw state series. Bar 0 has no predecessor and
/// emits 0.
fn diff_states(bars: &[OhlcvBar], states: &[i32]) -> Vec<SignalPoint> {
    bars.iter()
        .enumerate()
        .map(|(i, bar)| SignalPoint {
            date: bar.date,
            price: bar.close,
            signal: if i == 0 { 0 } else { states[i] - states[i - 1] },
        })
        .collect()
}

fn sma_cross_signals(bars: &[OhlcvBar], short_window: usize, long_window: usize) -> Vec<SignalPoint> {
    let short = calculate_sma(bars, short_window);
    let long = calculate_sma(bars, long_window);

    let states: Vec<i32> = (0..bars.len())
        .map(|i| trend_state(&short, &long, i))
        .collect();

    diff_states(bars, &states)
}

fn rsi_reversal_signals(
    bars: &[OhlcvBar],
    period: usize,
    oversold: f64,
    overbought: f64,
) -> Vec<SignalPoint> {
    let rsi = calculate_rsi(bars, period);

    bars.iter()
        .enumerate()
        .map(|(i, bar)| {
            let signal = if i == 0 {
                0
            } else {
                match (rsi.value_at(i), rsi.value_at(i - 1)) {
                    // Entering oversold territory from at-or-above the line.
                    (Some(cur), Some(prev)) if cur < oversold && prev >= oversold => 1,
                    // Entering overbought territory from at-or-below the line.
                    (Some(cur), Some(prev)) if cur > overbought && prev <= overbought => -1,
                    _ => 0,
                }
            };
            SignalPoint {
                date: bar.date,
                price: bar.close,
                signal,
            }
        })
        .collect()
}

fn combined_signals(
    bars: &[OhlcvBar],
    short_window: usize,
    long_window: usize,
    period: usize,
    oversold: f64,
    overbought: f64,
) -> Vec<SignalPoint> {
    let short = calculate_sma(bars, short_window);
    let long = calculate_sma(bars, long_window);
    let rsi = calculate_rsi(bars, period);

    let states: Vec<i32> = (0..bars.len())
        .map(|i| {
            let trend = trend_state(&short, &long, i);
            let rsi_val = rsi.value_at(i);
            let oversold_hit = rsi_val.is_some_and(|r| r < oversold);
            let overbought_hit = rsi_val.is_some_and(|r| r > overbought);

            // Sell is a disjunction and wins over the bullish conjunction.
            if trend == -1 || overbought_hit {
                -1
            } else if trend == 1 && oversold_hit {
                1
            } else {
                0
            }
        })
        .collect();

    diff_states(bars, &states)
}
