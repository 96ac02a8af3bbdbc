//! Configuration validation.
//!
//! All config fields are checked before any data is fetched or any
//! computation runs. Missing keys and malformed values are distinguished;
//! strategy parameters funnel through the `StrategySpec` constructors so the
//! offending parameter is always named.

use crate::domain::backtest::DEFAULT_INITIAL_CAPITAL;
use crate::domain::error::NiftytraderError;
use crate::domain::strategy::{
    StrategySpec, DEFAULT_LONG_WINDOW, DEFAULT_OVERBOUGHT, DEFAULT_OVERSOLD, DEFAULT_RSI_PERIOD,
    DEFAULT_SHORT_WINDOW,
};
use crate::ports::config_port::ConfigPort;

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), NiftytraderError> {
    validate_initial_capital(config)?;
    validate_ticker(config)?;
    validate_data_dir(config)?;
    build_strategy_spec(config)?;
    Ok(())
}

pub fn validate_initial_capital(config: &dyn ConfigPort) -> Result<(), NiftytraderError> {
    let value = config.get_double("backtest", "initial_capital", DEFAULT_INITIAL_CAPITAL);
    if value <= 0.0 {
        return Err(NiftytraderError::ConfigInvalid {
            section: "backtest".to_string(),
            key: "initial_capital".to_string(),
            reason: "initial_capital must be positive".to_string(),
        });
    }
    Ok(())
}

pub fn validate_ticker(config: &dyn ConfigPort) -> Result<(), NiftytraderError> {
    match config.get_string("backtest", "ticker") {
        Some(s) if !s.trim().is_empty() => Ok(()),
        _ => Err(NiftytraderError::ConfigMissing {
            section: "backtest".to_string(),
            key: "ticker".to_string(),
        }),
    }
}

pub fn validate_data_dir(config: &dyn ConfigPort) -> Result<(), NiftytraderError> {
    match config.get_string("data", "dir") {
        Some(s) if !s.trim().is_empty() => Ok(()),
        _ => Err(NiftytraderError::ConfigMissing {
            section: "data".to_string(),
            key: "dir".to_string(),
        }),
    }
}

/// Build the strategy spec from `[strategy]`, applying the classic defaults
/// for any parameter the file omits.
pub fn build_strategy_spec(config: &dyn ConfigPort) -> Result<StrategySpec, NiftytraderError> {
    let kind = match config.get_string("strategy", "kind") {
        Some(s) if !s.trim().is_empty() => s.trim().to_lowercase(),
        _ => {
            return Err(NiftytraderError::ConfigMissing {
                section: "strategy".to_string(),
                key: "kind".to_string(),
            })
        }
    };

    let short_window = parse_window(config, "short_window", DEFAULT_SHORT_WINDOW)?;
    let long_window = parse_window(config, "long_window", DEFAULT_LONG_WINDOW)?;
    let period = parse_window(config, "rsi_period", DEFAULT_RSI_PERIOD)?;
    let oversold = config.get_double("strategy", "oversold", DEFAULT_OVERSOLD);
    let overbought = config.get_double("strategy", "overbought", DEFAULT_OVERBOUGHT);

    match kind.as_str() {
        "sma_cross" => StrategySpec::sma_cross(short_window, long_window),
        "rsi_reversal" => StrategySpec::rsi_reversal(period, oversold, overbought),
        "combined" => {
            StrategySpec::combined(short_window, long_window, period, oversold, overbought)
        }
        other => Err(NiftytraderError::ConfigInvalid {
            section: "strategy".to_string(),
            key: "kind".to_string(),
            reason: format!(
                "unknown strategy kind '{}', expected sma_cross, rsi_reversal or combined",
                other
            ),
        }),
    }
}

fn parse_window(
    config: &dyn ConfigPort,
    key: &str,
    default: usize,
) -> Result<usize, NiftytraderError> {
    let value = config.get_int("strategy", key, default as i64);
    usize::try_from(value).map_err(|_| NiftytraderError::ConfigInvalid {
        section: "strategy".to_string(),
        key: key.to_string(),
        reason: format!("{} must not be negative", key),
    })
}
