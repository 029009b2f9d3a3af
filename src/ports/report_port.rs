//! Report output port trait.

use crate::domain::backtest::BacktestResult;
use crate::domain::error::VoltimerError;

/// Port for rendering a finished backtest into the bytes of one output file.
/// Writing to disk is left to the caller so several reports can be committed
/// together.
pub trait ReportPort {
    fn render(&self, result: &BacktestResult) -> Result<Vec<u8>, VoltimerError>;
}
