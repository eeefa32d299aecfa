//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{info, warn};

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::backtest::{self as backtest_engine, BacktestResult};
use crate::domain::bar::BarSeries;
use crate::domain::config_validation::{
    build_strategy_config, unknown_sections, validate_data_config, validate_dates,
    validate_strategy_config,
};
use crate::domain::error::IbsError;
use crate::domain::indicator;
use crate::domain::metrics::{analyze, PerformanceReport};
use crate::domain::strategy::StrategyConfig;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;
use chrono::NaiveDate;

#[derive(Parser, Debug)]
#[command(name = "ibstrader", about = "IBS mean-reversion strategy backtester")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a backtest and write the trade ledger, equity curve and yearly summary
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbol: Option<String>,
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long)]
        dry_run: bool,
    },
    /// Write per-bar IBS and rolling-minimum values
    Indicators {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbol: Option<String>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

/// Where bars come from and where results go.
#[derive(Debug, Clone, PartialEq)]
pub struct DataConfig {
    pub symbol: String,
    pub data_dir: PathBuf,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub output_dir: PathBuf,
}

/// Everything a backtest run produces.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutput {
    pub result: BacktestResult,
    pub report: PerformanceReport,
    pub written: Vec<PathBuf>,
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Backtest {
            config,
            symbol,
            output,
            dry_run,
        } => run_backtest(&config, symbol.as_deref(), output.as_ref(), dry_run),
        Command::Indicators {
            config,
            symbol,
            output,
        } => run_indicators(&config, symbol.as_deref(), output.as_ref()),
        Command::Validate { config } => run_validate(&config),
    }
}

fn fail(err: &IbsError) -> ExitCode {
    eprintln!("error [{}]: {}", err.component(), err);
    err.into()
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, IbsError> {
    let adapter = FileConfigAdapter::from_file(path).map_err(|e| IbsError::ConfigParse {
        file: path.display().to_string(),
        reason: e.to_string(),
    })?;
    for section in unknown_sections(&adapter) {
        warn!(%section, "ignoring unknown config section");
    }
    Ok(adapter)
}

pub fn build_data_config(
    adapter: &dyn ConfigPort,
    symbol_override: Option<&str>,
    output_override: Option<&PathBuf>,
) -> Result<DataConfig, IbsError> {
    let symbol = match symbol_override {
        Some(s) => s.trim().to_string(),
        None => {
            validate_data_config(adapter)?;
            adapter
                .get_string("data", "symbol")
                .map(|s| s.trim().to_string())
                .unwrap_or_default()
        }
    };
    if symbol.is_empty() {
        return Err(IbsError::ConfigMissing {
            section: "data".into(),
            key: "symbol".into(),
        });
    }

    let data_dir = adapter
        .get_string("data", "data_dir")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("data"));
    let output_dir = output_override.cloned().unwrap_or_else(|| {
        adapter
            .get_string("output", "dir")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("outputs"))
    });

    let (start_date, end_date) = validate_dates(adapter)?;

    Ok(DataConfig {
        symbol,
        data_dir,
        start_date,
        end_date,
        output_dir,
    })
}

/// Fetch bars and validate them into a series.
pub fn load_bars(
    data_port: &dyn DataPort,
    data: &DataConfig,
    strategy: &StrategyConfig,
) -> Result<BarSeries, IbsError> {
    let bars = data_port
        .fetch_bars(&data.symbol, data.start_date, data.end_date)
        .inspect_err(|_| {
            if let Ok(available) = data_port.list_symbols() {
                warn!(symbol = %data.symbol, ?available, "could not load symbol");
            }
        })?;
    let series = BarSeries::new(bars)?;
    info!(
        symbol = %data.symbol,
        bars = series.len(),
        first = ?series.first_date(),
        last = ?series.last_date(),
        "bars loaded"
    );
    if let Err(e) = series.check_history(strategy.lookback_days) {
        warn!("{e}; no entry signals are possible");
    }
    Ok(series)
}

pub fn run_backtest_pipeline(
    data_port: &dyn DataPort,
    report_port: &dyn ReportPort,
    strategy: &StrategyConfig,
    data: &DataConfig,
) -> Result<PipelineOutput, IbsError> {
    let bars = load_bars(data_port, data, strategy)?;

    info!(
        entry_threshold = strategy.entry_threshold,
        exit_threshold = strategy.exit_threshold,
        lookback_days = strategy.lookback_days,
        max_positions = strategy.max_positions,
        point_value = strategy.point_value,
        close_all_on_exit = strategy.close_all_on_exit,
        "running backtest"
    );
    let result = backtest_engine::run_strategy(&bars, strategy)?;
    if result.entries_skipped > 0 {
        info!(skipped = result.entries_skipped, "entries skipped at max_positions");
    }
    if result.open_positions_at_end > 0 {
        warn!(
            open = result.open_positions_at_end,
            unrealized_pnl = result.unrealized_pnl_at_end,
            "positions still open at end of data are excluded from the ledger"
        );
    }

    let report = analyze(
        &result.trades,
        &result.equity_curve,
        result.open_positions_at_end,
    );

    let written = report_port.write(&result, &report, &data.output_dir)?;
    for path in &written {
        info!(path = %path.display(), "written");
    }

    Ok(PipelineOutput {
        result,
        report,
        written,
    })
}

pub fn format_summary(symbol: &str, result: &BacktestResult, report: &PerformanceReport) -> String {
    let mut out = String::new();
    let profit_factor = report
        .profit_factor
        .map(|pf| format!("{pf:.2}"))
        .unwrap_or_else(|| "n/a".to_string());

    let _ = writeln!(out, "=== {} IBS Results ===", symbol);
    let _ = writeln!(out, "Total Trades:     {}", report.total_trades);
    let _ = writeln!(
        out,
        "Wins / Losses:    {} / {}",
        report.winning_trades,
        report.losing_trades + report.breakeven_trades
    );
    let _ = writeln!(out, "Win Rate:         {:.1}%", report.win_rate * 100.0);
    let _ = writeln!(out, "Total PnL:        ${:.2}", report.total_pnl);
    let _ = writeln!(out, "Avg PnL:          ${:.2}", report.avg_pnl);
    let _ = writeln!(out, "Profit Factor:    {}", profit_factor);
    let _ = writeln!(out, "Sharpe Ratio:     {:.2}", report.sharpe);
    let _ = writeln!(out, "Sortino Ratio:    {:.2}", report.sortino);
    let _ = writeln!(out, "Max Drawdown:     ${:.2}", report.max_drawdown);
    if report.open_positions_at_end > 0 {
        let _ = writeln!(
            out,
            "Open At End:      {} (unrealized ${:.2})",
            report.open_positions_at_end, result.unrealized_pnl_at_end
        );
    } else {
        let _ = writeln!(out, "Open At End:      0");
    }

    if !report.yearly_breakdown.is_empty() {
        let _ = writeln!(out, "\n=== Yearly ===");
        for stats in report.yearly_breakdown.values() {
            let pnl_sign = if stats.total_pnl >= 0.0 { "+" } else { "-" };
            let _ = writeln!(
                out,
                "  {}:  {} trades, {:.1}% win rate, {}${:.2}",
                stats.year,
                stats.total_trades,
                stats.win_rate * 100.0,
                pnl_sign,
                stats.total_pnl.abs(),
            );
        }
    }
    out
}

fn run_backtest(
    config_path: &Path,
    symbol: Option<&str>,
    output: Option<&PathBuf>,
    dry_run: bool,
) -> ExitCode {
    info!(path = %config_path.display(), "loading config");
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(e) => return fail(&e),
    };
    let strategy = match build_strategy_config(&adapter) {
        Ok(s) => s,
        Err(e) => return fail(&e),
    };
    let data = match build_data_config(&adapter, symbol, output) {
        Ok(d) => d,
        Err(e) => return fail(&e),
    };

    if dry_run {
        println!("{:#?}", strategy);
        println!("{:#?}", data);
        info!("dry run complete: configuration is valid");
        return ExitCode::SUCCESS;
    }

    let data_port = CsvAdapter::new(data.data_dir.clone());
    match run_backtest_pipeline(&data_port, &CsvReportAdapter::new(), &strategy, &data) {
        Ok(output) => {
            print!(
                "{}",
                format_summary(&data.symbol, &output.result, &output.report)
            );
            ExitCode::SUCCESS
        }
        Err(e) => fail(&e),
    }
}

fn run_indicators(config_path: &Path, symbol: Option<&str>, output: Option<&PathBuf>) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(e) => return fail(&e),
    };
    let strategy = match build_strategy_config(&adapter) {
        Ok(s) => s,
        Err(e) => return fail(&e),
    };
    let data = match build_data_config(&adapter, symbol, output) {
        Ok(d) => d,
        Err(e) => return fail(&e),
    };

    let data_port = CsvAdapter::new(data.data_dir.clone());
    let bars = match load_bars(&data_port, &data, &strategy) {
        Ok(b) => b,
        Err(e) => return fail(&e),
    };
    let records = indicator::compute(&bars, strategy.lookback_days);

    match CsvReportAdapter::new().write_indicators(&bars, &records, &strategy, &data.output_dir) {
        Ok(path) => {
            info!(path = %path.display(), rows = records.len(), "indicators written");
            ExitCode::SUCCESS
        }
        Err(e) => fail(&e),
    }
}

fn run_validate(config_path: &Path) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(e) => return fail(&e),
    };
    if let Err(e) = validate_strategy_config(&adapter) {
        return fail(&e);
    }
    if let Err(e) = validate_data_config(&adapter) {
        return fail(&e);
    }
    println!("Configuration is valid.");
    ExitCode::SUCCESS
}
