//! Report output port trait.

use std::path::{Path, PathBuf};

use crate::domain::backtest::BacktestResult;
use crate::domain::bar::BarSeries;
use crate::domain::error::IbsError;
use crate::domain::indicator::IndicatorRecord;
use crate::domain::metrics::PerformanceReport;
use crate::domain::strategy::StrategyConfig;

/// Port for persisting backtest output. Returns the paths written.
pub trait ReportPort {
    fn write(
        &self,
        result: &BacktestResult,
        report: &PerformanceReport,
        output_dir: &Path,
    ) -> Result<Vec<PathBuf>, IbsError>;

    fn write_indicators(
        &self,
        bars: &BarSeries,
        indicators: &[IndicatorRecord],
        config: &StrategyConfig,
        output_dir: &Path,
    ) -> Result<PathBuf, IbsError>;
}
