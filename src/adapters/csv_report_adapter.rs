//! CSV report adapter implementing ReportPort.
//!
//! Files written to the output directory:
//! - `trading_record.csv`: one row per closed trade
//! - `equity_curve.csv`: date, cumulative realized PnL
//! - `yearly_summary.csv`: one row per calendar year
//! - `ibs_indicator.csv`: per-bar IBS, rolling minimum and tag

use chrono::NaiveDate;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::backtest::BacktestResult;
use crate::domain::bar::BarSeries;
use crate::domain::error::IbsError;
use crate::domain::indicator::IndicatorRecord;
use crate::domain::metrics::PerformanceReport;
use crate::domain::strategy::StrategyConfig;
use crate::ports::report_port::ReportPort;

pub const TRADES_FILE: &str = "trading_record.csv";
pub const EQUITY_FILE: &str = "equity_curve.csv";
pub const YEARLY_FILE: &str = "yearly_summary.csv";
pub const INDICATOR_FILE: &str = "ibs_indicator.csv";

#[derive(Debug, Default)]
pub struct CsvReportAdapter;

impl CsvReportAdapter {
    pub fn new() -> Self {
        CsvReportAdapter
    }
}

fn csv_err(path: &Path, e: csv::Error) -> IbsError {
    IbsError::Report {
        reason: format!("failed to write {}: {}", path.display(), e),
    }
}

fn writer(output_dir: &Path, name: &str) -> Result<(csv::Writer<fs::File>, PathBuf), IbsError> {
    fs::create_dir_all(output_dir)?;
    let path = output_dir.join(name);
    let wtr = csv::Writer::from_path(&path).map_err(|e| csv_err(&path, e))?;
    Ok((wtr, path))
}

/// One row of `ibs_indicator.csv`.
#[derive(Debug, Serialize)]
struct IndicatorRow {
    datetime: NaiveDate,
    open: f64,
    close: f64,
    high: f64,
    low: f64,
    ibs_value: Option<f64>,
    min_last_days: Option<f64>,
    tag: Option<String>,
}

fn write_trades(result: &BacktestResult, output_dir: &Path) -> Result<PathBuf, IbsError> {
    let (mut wtr, path) = writer(output_dir, TRADES_FILE)?;
    if result.trades.is_empty() {
        wtr.write_record([
            "entry_date",
            "entry_price",
            "entry_index",
            "exit_date",
            "exit_price",
            "exit_index",
            "pnl_points",
            "pnl_dollars",
            "result",
        ])
        .map_err(|e| csv_err(&path, e))?;
    }
    for trade in &result.trades {
        wtr.serialize(trade).map_err(|e| csv_err(&path, e))?;
    }
    wtr.flush()?;
    Ok(path)
}

fn write_equity(result: &BacktestResult, output_dir: &Path) -> Result<PathBuf, IbsError> {
    let (mut wtr, path) = writer(output_dir, EQUITY_FILE)?;
    if result.equity_curve.is_empty() {
        wtr.write_record(["date", "cumulative_pnl_dollars"])
            .map_err(|e| csv_err(&path, e))?;
    }
    for point in &result.equity_curve {
        wtr.serialize(point).map_err(|e| csv_err(&path, e))?;
    }
    wtr.flush()?;
    Ok(path)
}

fn write_yearly(report: &PerformanceReport, output_dir: &Path) -> Result<PathBuf, IbsError> {
    let (mut wtr, path) = writer(output_dir, YEARLY_FILE)?;
    if report.yearly_breakdown.is_empty() {
        wtr.write_record([
            "year",
            "total_trades",
            "winning_trades",
            "win_rate",
            "total_pnl",
            "avg_pnl",
            "profit_factor",
            "sharpe",
            "sortino",
            "max_drawdown",
        ])
        .map_err(|e| csv_err(&path, e))?;
    }
    for stats in report.yearly_breakdown.values() {
        wtr.serialize(stats).map_err(|e| csv_err(&path, e))?;
    }
    wtr.flush()?;
    Ok(path)
}

impl ReportPort for CsvReportAdapter {
    fn write(
        &self,
        result: &BacktestResult,
        report: &PerformanceReport,
        output_dir: &Path,
    ) -> Result<Vec<PathBuf>, IbsError> {
        Ok(vec![
            write_trades(result, output_dir)?,
            write_equity(result, output_dir)?,
            write_yearly(report, output_dir)?,
        ])
    }

    fn write_indicators(
        &self,
        bars: &BarSeries,
        indicators: &[IndicatorRecord],
        config: &StrategyConfig,
        output_dir: &Path,
    ) -> Result<PathBuf, IbsError> {
        let (mut wtr, path) = writer(output_dir, INDICATOR_FILE)?;
        if bars.is_empty() {
            wtr.write_record([
                "datetime",
                "open",
                "close",
                "high",
                "low",
                "ibs_value",
                "min_last_days",
                "tag",
            ])
            .map_err(|e| csv_err(&path, e))?;
        }

        for (bar, record) in bars.iter().zip(indicators) {
            let row = IndicatorRow {
                datetime: bar.date,
                open: bar.open,
                close: bar.close,
                high: bar.high,
                low: bar.low,
                ibs_value: record.ibs,
                min_last_days: record.rolling_min_low,
                tag: record
                    .tag(config.entry_threshold, config.exit_threshold)
                    .map(|t| t.to_string()),
            };
            wtr.serialize(&row).map_err(|e| csv_err(&path, e))?;
        }
        wtr.flush()?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::backtest::run_strategy;
    use crate::domain::bar::Bar;
    use crate::domain::indicator::compute;
    use crate::domain::metrics::analyze;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn sample_bars() -> BarSeries {
        BarSeries::new(vec![
            Bar::new(day(1), 100.0, 101.0, 99.0, 100.0),
            Bar::new(day(2), 100.0, 105.0, 95.0, 96.0),
            Bar::new(day(3), 97.0, 100.0, 96.0, 99.6),
            Bar::new(day(4), 99.0, 102.0, 98.0, 101.0),
            Bar::new(day(5), 100.0, 100.0, 100.0, 100.0),
        ])
        .unwrap()
    }

    fn sample_config() -> StrategyConfig {
        StrategyConfig {
            lookback_days: 2,
            ..StrategyConfig::default()
        }
    }

    #[test]
    fn writes_ledger_equity_and_yearly_files() {
        let dir = TempDir::new().unwrap();
        let bars = sample_bars();
        let result = run_strategy(&bars, &sample_config()).unwrap();
        let report = analyze(&result.trades, &result.equity_curve, result.open_positions_at_end);

        let paths = CsvReportAdapter::new()
            .write(&result, &report, dir.path())
            .unwrap();
        assert_eq!(paths.len(), 3);

        let trades = fs::read_to_string(dir.path().join(TRADES_FILE)).unwrap();
        let mut lines = trades.lines();
        assert_eq!(
            lines.next().unwrap(),
            "entry_date,entry_price,entry_index,exit_date,exit_price,exit_index,pnl_points,pnl_dollars,result"
        );
        assert_eq!(lines.next().unwrap(), "2024-01-03,97.0,2,2024-01-04,99.0,3,2.0,40.0,win");
        assert!(lines.next().is_none());

        let equity = fs::read_to_string(dir.path().join(EQUITY_FILE)).unwrap();
        assert_eq!(equity.lines().count(), 6);
        assert!(equity.starts_with("date,cumulative_pnl_dollars\n2024-01-01,0.0\n"));

        let yearly = fs::read_to_string(dir.path().join(YEARLY_FILE)).unwrap();
        assert_eq!(yearly.lines().count(), 2);
        assert_eq!(
            yearly.lines().next().unwrap(),
            "year,total_trades,winning_trades,win_rate,total_pnl,avg_pnl,profit_factor,sharpe,sortino,max_drawdown"
        );
        assert!(yearly.lines().nth(1).unwrap().starts_with("2024,1,1,1.0,40.0,40.0,,"));
    }

    #[test]
    fn empty_ledger_still_has_header() {
        let dir = TempDir::new().unwrap();
        let bars = BarSeries::new(vec![]).unwrap();
        let result = run_strategy(&bars, &StrategyConfig::default()).unwrap();
        let report = analyze(&result.trades, &result.equity_curve, 0);

        CsvReportAdapter::new()
            .write(&result, &report, dir.path())
            .unwrap();

        let trades = fs::read_to_string(dir.path().join(TRADES_FILE)).unwrap();
        assert_eq!(trades.lines().count(), 1);
        assert!(trades.starts_with("entry_date,"));

        let yearly = fs::read_to_string(dir.path().join(YEARLY_FILE)).unwrap();
        assert_eq!(yearly.lines().count(), 1);
        assert!(yearly.starts_with("year,total_trades,"));
    }

    #[test]
    fn empty_indicator_file_still_has_header() {
        let dir = TempDir::new().unwrap();
        let bars = BarSeries::new(vec![]).unwrap();
        let config = sample_config();
        let records = compute(&bars, config.lookback_days);

        let path = CsvReportAdapter::new()
            .write_indicators(&bars, &records, &config, dir.path())
            .unwrap();

        let content = fs::read_to_string(path).unwrap();
        assert_eq!(content, "datetime,open,close,high,low,ibs_value,min_last_days,tag\n");
    }

    #[test]
    fn whole_numbers_keep_a_decimal_point_in_every_file() {
        let dir = TempDir::new().unwrap();
        let bars = sample_bars();
        let config = sample_config();
        let result = run_strategy(&bars, &config).unwrap();
        let report = analyze(&result.trades, &result.equity_curve, result.open_positions_at_end);
        let adapter = CsvReportAdapter::new();
        adapter.write(&result, &report, dir.path()).unwrap();
        adapter
            .write_indicators(&bars, &compute(&bars, config.lookback_days), &config, dir.path())
            .unwrap();

        let row = |name: &str, n: usize| {
            let content = fs::read_to_string(dir.path().join(name)).unwrap();
            content.lines().nth(n).unwrap().to_string()
        };
        // Price of 97 in the ledger and 40 dollars of PnL in equity and yearly rows.
        assert!(row(TRADES_FILE, 1).contains(",97.0,"));
        assert_eq!(row(EQUITY_FILE, 4), "2024-01-04,40.0");
        assert!(row(YEARLY_FILE, 1).contains(",40.0,40.0,"));
        assert!(row(INDICATOR_FILE, 3).starts_with("2024-01-03,97.0,"));
    }

    #[test]
    fn writes_indicator_file() {
        let dir = TempDir::new().unwrap();
        let bars = sample_bars();
        let config = sample_config();
        let records = compute(&bars, config.lookback_days);

        let path = CsvReportAdapter::new()
            .write_indicators(&bars, &records, &config, dir.path())
            .unwrap();

        let content = fs::read_to_string(path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 6);
        assert_eq!(
            lines[0],
            "datetime,open,close,high,low,ibs_value,min_last_days,tag"
        );
        assert_eq!(lines[1], "2024-01-01,100.0,100.0,101.0,99.0,0.5,,");
        assert_eq!(lines[2], "2024-01-02,100.0,96.0,105.0,95.0,0.1,95.0,entry");
        // Zero-range bar: undefined IBS, no tag.
        assert_eq!(lines[5], "2024-01-05,100.0,100.0,100.0,100.0,,98.0,");
    }
}
