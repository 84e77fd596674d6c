//! Backtest report port.

use std::path::Path;

use crate::domain::backtest::BacktestResult;
use crate::domain::error::MomtraderError;
use crate::ports::chart_port::ChartPoint;

/// Port for writing backtest reports.
pub trait ReportPort {
    fn write(
        &self,
        result: &BacktestResult,
        chart: &[ChartPoint],
        output_dir: &Path,
    ) -> Result<(), MomtraderError>;
}
