//! Strategy variants and parameter validation.
//!
//! One capability (turn a price series into a per-bar signal stream) with
//! three rules, selected by `StrategySpec`. Parameters are validated at
//! construction; a spec that exists is always safe to run.

use crate::domain::error::NiftytraderError;
use std::fmt;

/// Default SMA windows: the classic golden-cross pair.
pub const DEFAULT_SHORT_WINDOW: usize = 50;
pub const DEFAULT_LONG_WINDOW: usize = 200;
pub const DEFAULT_RSI_PERIOD: usize = 14;
pub const DEFAULT_OVERSOLD: f64 = 30.0;
pub const DEFAULT_OVERBOUGHT: f64 = 70.0;

#[derive(Debug, Clone, PartialEq)]
pub enum StrategySpec {
    SmaCross {
        short_window: usize,
        long_window: usize,
    },
    RsiReversal {
        period: usize,
        oversold: f64,
        overbought: f64,
    },
    Combined {
        short_window: usize,
        long_window: usize,
        period: usize,
        oversold: f64,
        overbought: f64,
    },
}

fn invalid(param: &str, reason: &str) -> NiftytraderError {
    NiftytraderError::InvalidParameter {
        param: param.to_string(),
        reason: reason.to_string(),
    }
}

fn check_windows(short_window: usize, long_window: usize) -> Result<(), NiftytraderError> {
    if short_window == 0 {
        return Err(invalid("short_window", "must be positive"));
    }
    if long_window == 0 {
        return Err(invalid("long_window", "must be positive"));
    }
    if short_window >= long_window {
        return Err(invalid(
            "short_window",
            "must be smaller than long_window",
        ));
    }
    Ok(())
}

fn check_rsi(period: usize, oversold: f64, overbought: f64) -> Result<(), NiftytraderError> {
    if period == 0 {
        return Err(invalid("rsi_period", "must be positive"));
    }
    if !(0.0 < oversold && oversold < 100.0) {
        return Err(invalid("oversold", "must be between 0 and 100"));
    }
    if !(0.0 < overbought && overbought < 100.0) {
        return Err(invalid("overbought", "must be between 0 and 100"));
    }
    if oversold >= overbought {
        return Err(invalid("oversold", "must be below overbought"));
    }
    Ok(())
}

impl StrategySpec {
    pub fn sma_cross(short_window: usize, long_window: usize) -> Result<Self, NiftytraderError> {
        check_windows(short_window, long_window)?;
        Ok(StrategySpec::SmaCross {
            short_window,
            long_window,
        })
    }

    pub fn rsi_reversal(
        period: usize,
        oversold: f64,
        overbought: f64,
    ) -> Result<Self, NiftytraderError> {
        check_rsi(period, oversold, overbought)?;
        Ok(StrategySpec::RsiReversal {
            period,
            oversold,
            overbought,
        })
    }

    pub fn combined(
        short_window: usize,
        long_window: usize,
        period: usize,
        oversold: f64,
        overbought: f64,
    ) -> Result<Self, NiftytraderError> {
        check_windows(short_window, long_window)?;
        check_rsi(period, oversold, overbought)?;
        Ok(StrategySpec::Combined {
            short_window,
            long_window,
            period,
            oversold,
            overbought,
        })
    }

    /// Bars needed before every indicator the variant uses is valid.
    /// A shorter series still runs, it just emits no signals.
    pub fn min_bars(&self) -> usize {
        match *self {
            StrategySpec::SmaCross { long_window, .. } => long_window,
            StrategySpec::RsiReversal { period, .. } => period,
            StrategySpec::Combined {
                long_window, period, ..
            } => long_window.max(period),
        }
    }
}

impl fmt::Display for StrategySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            StrategySpec::SmaCross {
                short_window,
                long_window,
            } => write!(f, "SMA Crossover ({}/{})", short_window, long_window),
            StrategySpec::RsiReversal {
                period,
                oversold,
                overbought,
            } => write!(
                f,
                "RSI Reversal ({}, {}/{})",
                period, oversold, overbought
            ),
            StrategySpec::Combined {
                short_window,
                long_window,
                period,
                oversold,
                overbought,
            } => write!(
                f,
                "Combined SMA+RSI ({}/{}, {}, {}/{})",
                short_window, long_window, period, oversold, overbought
            ),
        }
    }
}
