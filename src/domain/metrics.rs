//! Performance metrics over a backtest record stream.
//!
//! NaN warm-up values are excluded from every statistic. The degenerate
//! denominators (no trades, zero return deviation, no defined portfolio
//! value) all resolve to 0 rather than NaN or a panic: a backtest always
//! yields a complete metrics block.

use crate::domain::backtest::SignalRecord;

const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Annualized risk-free rate used for excess returns.
pub const RISK_FREE_RATE: f64 = 0.06;

#[derive(Debug, Clone, PartialEq)]
pub struct Metrics {
    pub total_return_pct: f64,
    pub win_rate_pct: f64,
    pub max_drawdown_pct: f64,
    pub sharpe_ratio: f64,
    pub final_value: f64,
    pub total_trades: usize,
}

impl Metrics {
    pub fn compute(records: &[SignalRecord], initial_capital: f64) -> Self {
        let final_value = records
            .last()
            .map(|r| r.portfolio_value)
            .filter(|v| v.is_finite())
            .unwrap_or(initial_capital);

        let total_return_pct = if initial_capital > 0.0 {
            (final_value - initial_capital) / initial_capital * 100.0
        } else {
            0.0
        };

        // Every nonzero-signal bar is a trade event, entries and exits alike.
        let total_trades = records.iter().filter(|r| r.signal != 0).count();

        let winning_bars = records.iter().filter(|r| r.strategy_return > 0.0).count();
        let win_rate_pct = if total_trades > 0 {
            winning_bars as f64 / total_trades as f64 * 100.0
        } else {
            0.0
        };

        let max_drawdown_pct = compute_max_drawdown(records) * 100.0;

        let daily_rf = RISK_FREE_RATE / TRADING_DAYS_PER_YEAR;
        let sharpe_ratio = compute_sharpe(records, daily_rf);

        Metrics {
            total_return_pct,
            win_rate_pct,
            max_drawdown_pct,
            sharpe_ratio,
            final_value,
            total_trades,
        }
    }
}

/// Worst peak-to-trough decline of the cumulative strategy curve, as a
/// fraction ≤ 0. NaN bars are skipped.
fn compute_max_drawdown(records: &[SignalRecord]) -> f64 {
    let mut running_max = f64::NAN;
    let mut max_dd = 0.0_f64;

    for record in records {
        let cumulative = record.cumulative_strategy;
        if cumulative.is_nan() {
            continue;
        }
        if running_max.is_nan() || cumulative > running_max {
            running_max = cumulative;
        }
        let dd = (cumulative - running_max) / running_max;
        if dd < max_dd {
            max_dd = dd;
        }
    }

    max_dd
}

/// Annualized Sharpe ratio over daily excess returns; 0 when fewer than two
/// defined returns exist or the deviation is zero.
fn compute_sharpe(records: &[SignalRecord], daily_rf: f64) -> f64 {
    let excess: Vec<f64> = records
        .iter()
        .map(|r| r.strategy_return - daily_rf)
        .filter(|v| !v.is_nan())
        .collect();

    if excess.len() < 2 {
        return 0.0;
    }

    let n = excess.len() as f64;
    let mean = excess.iter().sum::<f64>() / n;
    // Sample deviation (n - 1).
    let variance = excess.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (n - 1.0);
    let stddev = variance.sqrt();

    if stddev > 0.0 {
        TRADING_DAYS_PER_YEAR.sqrt() * mean / stddev
    } else {
        0.0
    }
}
