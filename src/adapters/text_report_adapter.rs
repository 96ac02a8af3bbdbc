//! Plain-text report adapter implementing ReportPort.
//!
//! Writes the metrics block as a text file and, next to it, the full
//! per-bar signal records as `<output>.signals.csv`. NaN warm-up values
//! are written as empty CSV fields.

use crate::domain::backtest::{BacktestResult, SignalRecord};
use crate::domain::error::NiftytraderError;
use crate::domain::strategy::StrategySpec;
use crate::ports::report_port::ReportPort;
use std::fs;
use std::path::Path;

pub struct TextReportAdapter;

impl TextReportAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TextReportAdapter {
    fn default() -> Self {
        Self::new()
    }
}

/// Format the metrics block the way the console output prints it.
pub fn format_summary(result: &BacktestResult, spec: &StrategySpec, ticker: &str) -> String {
    let m = &result.metrics;
    let mut out = String::new();
    out.push_str(&format!("niftytrader backtest: {}\n", ticker));
    out.push_str(&format!("strategy:        {}\n", spec));
    out.push_str(&format!("bars:            {}\n", result.records.len()));
    out.push_str(&format!("final value:     {:.2}\n", m.final_value));
    out.push_str(&format!("total return:    {:.2}%\n", m.total_return_pct));
    out.push_str(&format!("win rate:        {:.2}%\n", m.win_rate_pct));
    out.push_str(&format!("max drawdown:    {:.2}%\n", m.max_drawdown_pct));
    out.push_str(&format!("sharpe ratio:    {:.2}\n", m.sharpe_ratio));
    out.push_str(&format!("total trades:    {}\n", m.total_trades));

    if let Some(current) = result.current_signal() {
        out.push_str(&format!(
            "current signal:  {} @ {:.2} ({})\n",
            current.action, current.price, current.date
        ));
    }

    out
}

fn fmt_opt(value: f64) -> String {
    if value.is_nan() {
        String::new()
    } else {
        value.to_string()
    }
}

/// Write the per-bar records as CSV.
pub fn write_signals_csv(path: &Path, records: &[SignalRecord]) -> Result<(), NiftytraderError> {
    let mut wtr = csv::Writer::from_path(path).map_err(|e| NiftytraderError::Data {
        reason: format!("failed to create {}: {}", path.display(), e),
    })?;

    wtr.write_record([
        "date",
        "price",
        "signal",
        "position",
        "market_return",
        "strategy_return",
        "cumulative_market",
        "cumulative_strategy",
        "portfolio_value",
    ])
    .map_err(|e| NiftytraderError::Data {
        reason: format!("CSV write error: {}", e),
    })?;

    for record in records {
        wtr.write_record([
            record.date.format("%Y-%m-%d").to_string(),
            record.price.to_string(),
            record.signal.to_string(),
            record.position.to_string(),
            fmt_opt(record.market_return),
            fmt_opt(record.strategy_return),
            fmt_opt(record.cumulative_market),
            fmt_opt(record.cumulative_strategy),
            fmt_opt(record.portfolio_value),
        ])
        .map_err(|e| NiftytraderError::Data {
            reason: format!("CSV write error: {}", e),
        })?;
    }

    wtr.flush().map_err(|e| NiftytraderError::Data {
        reason: format!("CSV write error: {}", e),
    })?;
    Ok(())
}

impl ReportPort for TextReportAdapter {
    fn write(
        &self,
        result: &BacktestResult,
        spec: &StrategySpec,
        ticker: &str,
        output_path: &str,
    ) -> Result<(), NiftytraderError> {
        let summary = format_summary(result, spec, ticker);
        fs::write(output_path, summary)?;

        let csv_path = format!("{}.signals.csv", output_path);
        write_signals_csv(Path::new(&csv_path), &result.records)?;
        Ok(())
    }
}
