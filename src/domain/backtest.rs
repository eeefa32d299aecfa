//! Backtest engine and daily event loop.
//!
//! Per trading day, in ascending date order:
//! 1. EXIT: close the oldest open position (or all, with `close_all_on_exit`)
//!    at the day's open
//! 2. ENTRY: open a position at the day's open if below `max_positions`
//! 3. Record realized cumulative PnL on the equity curve

use tracing::debug;

use super::bar::BarSeries;
use super::error::IbsError;
use super::indicator;
use super::portfolio::{EquityPoint, Portfolio};
use super::position::{Position, Trade};
use super::signal::{self, Signal, SignalKind};
use super::strategy::StrategyConfig;

/// Signals active on one trading day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DaySignals {
    pub exit: bool,
    pub entry: bool,
}

/// Map dated signals onto the bar series, one `DaySignals` per bar.
///
/// A signal dated on a day with no bar is rejected rather than shifted.
pub fn align_signals<I>(bars: &BarSeries, signals: I) -> Result<Vec<DaySignals>, IbsError>
where
    I: IntoIterator<Item = Signal>,
{
    let mut days = vec![DaySignals::default(); bars.len()];
    for signal in signals {
        let index = bars
            .index_of(signal.date)
            .ok_or(IbsError::SignalMisaligned { date: signal.date })?;
        match signal.kind {
            SignalKind::Exit => days[index].exit = true,
            SignalKind::Entry => days[index].entry = true,
        }
    }
    Ok(days)
}

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestResult {
    pub trades: Vec<Trade>,
    pub equity_curve: Vec<EquityPoint>,
    /// Positions still open when the bars ran out; not part of the ledger.
    pub open_positions: Vec<Position>,
    pub open_positions_at_end: usize,
    /// Open positions marked at the last bar's close, in dollars.
    pub unrealized_pnl_at_end: f64,
    /// ENTRY signals dropped because `max_positions` was reached.
    pub entries_skipped: usize,
    /// Highest number of simultaneously open positions observed.
    pub peak_open_positions: usize,
}

pub fn run<I>(
    bars: &BarSeries,
    signals: I,
    config: &StrategyConfig,
) -> Result<BacktestResult, IbsError>
where
    I: IntoIterator<Item = Signal>,
{
    config.validate()?;
    let days = align_signals(bars, signals)?;

    let mut portfolio = Portfolio::new(config.point_value);
    let mut entries_skipped = 0usize;
    let mut peak_open_positions = 0usize;

    for (index, (bar, day)) in bars.iter().zip(&days).enumerate() {
        if day.exit && portfolio.position_count() > 0 {
            if config.close_all_on_exit {
                portfolio.close_all(bar.date, bar.open, index);
            } else {
                portfolio.close_oldest(bar.date, bar.open, index);
            }
        }

        if day.entry {
            if portfolio.position_count() < config.max_positions {
                portfolio.add_position(Position::open(bar.date, bar.open, index));
                peak_open_positions = peak_open_positions.max(portfolio.position_count());
            } else {
                entries_skipped += 1;
                debug!(date = %bar.date, open = portfolio.position_count(), "entry skipped at capacity");
            }
        }

        portfolio.record_equity(bar.date);
    }

    let unrealized_pnl_at_end = bars
        .as_slice()
        .last()
        .map_or(0.0, |bar| portfolio.unrealized_pnl(bar.close));
    let open_positions: Vec<Position> = portfolio.positions.into_iter().collect();
    Ok(BacktestResult {
        trades: portfolio.closed_trades,
        equity_curve: portfolio.equity_curve,
        open_positions_at_end: open_positions.len(),
        open_positions,
        unrealized_pnl_at_end,
        entries_skipped,
        peak_open_positions,
    })
}

/// Indicators, signals and simulation in one pass over `bars`.
pub fn run_strategy(bars: &BarSeries, config: &StrategyConfig) -> Result<BacktestResult, IbsError> {
    config.validate()?;
    let indicators = indicator::compute(bars, config.lookback_days);
    let signals = signal::generate_with(&indicators, config.signal_params());
    run(bars, signals, config)
}
