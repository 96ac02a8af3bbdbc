//! Report output port trait.

use crate::domain::backtest::BacktestResult;
use crate::domain::error::NiftytraderError;
use crate::domain::strategy::StrategySpec;

/// Port for writing backtest results.
pub trait ReportPort {
    fn write(
        &self,
        result: &BacktestResult,
        spec: &StrategySpec,
        ticker: &str,
        output_path: &str,
    ) -> Result<(), NiftytraderError>;
}
