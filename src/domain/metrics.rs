//! Performance metrics over the trade ledger and realized equity curve.
//!
//! Conventions:
//! - Sharpe and Sortino use day-over-day dollar changes of the equity curve,
//!   annualized by sqrt(252), with population (divide by n) deviations.
//! - Sortino downside deviation is sqrt(sum(min(d, 0)^2) / n).
//! - `profit_factor` is `None` when there are no losing trades.
//! - Drawdown is measured in dollars from a peak that starts at zero; a
//!   year's peak starts at the previous year's closing value.

use chrono::Datelike;
use serde::Serialize;
use std::collections::BTreeMap;

use super::portfolio::EquityPoint;
use super::position::Trade;

const TRADING_DAYS_PER_YEAR: f64 = 252.0;

#[derive(Debug, Clone, PartialEq)]
pub struct PerformanceReport {
    pub total_trades: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
    pub breakeven_trades: usize,
    pub win_rate: f64,
    pub profit_factor: Option<f64>,
    pub total_pnl: f64,
    pub gross_profit: f64,
    pub gross_loss: f64,
    pub avg_pnl: f64,
    pub avg_win: f64,
    pub avg_loss: f64,
    pub largest_win: f64,
    pub largest_loss: f64,
    pub avg_trade_duration_days: f64,
    pub sharpe: f64,
    pub sortino: f64,
    pub max_drawdown: f64,
    pub open_positions_at_end: usize,
    pub yearly_breakdown: BTreeMap<i32, YearlyStats>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearlyStats {
    pub year: i32,
    pub total_trades: usize,
    pub winning_trades: usize,
    pub win_rate: f64,
    pub total_pnl: f64,
    pub avg_pnl: f64,
    pub profit_factor: Option<f64>,
    pub sharpe: f64,
    pub sortino: f64,
    pub max_drawdown: f64,
}

impl YearlyStats {
    fn empty(year: i32) -> Self {
        YearlyStats {
            year,
            total_trades: 0,
            winning_trades: 0,
            win_rate: 0.0,
            total_pnl: 0.0,
            avg_pnl: 0.0,
            profit_factor: None,
            sharpe: 0.0,
            sortino: 0.0,
            max_drawdown: 0.0,
        }
    }
}

/// Aggregate win/loss statistics over a set of trades.
#[derive(Debug, Default)]
struct TradeTally {
    count: usize,
    won: usize,
    lost: usize,
    breakeven: usize,
    gross_profit: f64,
    gross_loss: f64,
    largest_win: f64,
    largest_loss: f64,
    duration_days: i64,
}

impl TradeTally {
    fn from_trades<'a>(trades: impl IntoIterator<Item = &'a Trade>) -> Self {
        let mut tally = TradeTally::default();
        for trade in trades {
            let pnl = trade.pnl_dollars;
            tally.count += 1;
            tally.duration_days += trade.duration_days();
            if pnl > 0.0 {
                tally.won += 1;
                tally.gross_profit += pnl;
                tally.largest_win = tally.largest_win.max(pnl);
            } else if pnl < 0.0 {
                tally.lost += 1;
                tally.gross_loss += pnl.abs();
                tally.largest_loss = tally.largest_loss.max(pnl.abs());
            } else {
                tally.breakeven += 1;
            }
        }
        tally
    }

    fn total_pnl(&self) -> f64 {
        self.gross_profit - self.gross_loss
    }

    fn win_rate(&self) -> f64 {
        ratio(self.won as f64, self.count)
    }

    fn avg_pnl(&self) -> f64 {
        ratio(self.total_pnl(), self.count)
    }

    fn profit_factor(&self) -> Option<f64> {
        (self.gross_loss > 0.0).then(|| self.gross_profit / self.gross_loss)
    }
}

fn ratio(numerator: f64, count: usize) -> f64 {
    if count > 0 {
        numerator / count as f64
    } else {
        0.0
    }
}

pub fn analyze(
    trades: &[Trade],
    equity_curve: &[EquityPoint],
    open_positions_at_end: usize,
) -> PerformanceReport {
    let tally = TradeTally::from_trades(trades);
    let deltas = equity_deltas(equity_curve);
    let (sharpe, sortino) = compute_risk_adjusted(deltas.iter().map(|&(_, d)| d));
    let values: Vec<f64> = equity_curve
        .iter()
        .map(|p| p.cumulative_pnl_dollars)
        .collect();

    PerformanceReport {
        total_trades: tally.count,
        winning_trades: tally.won,
        losing_trades: tally.lost,
        breakeven_trades: tally.breakeven,
        win_rate: tally.win_rate(),
        profit_factor: tally.profit_factor(),
        total_pnl: tally.total_pnl(),
        gross_profit: tally.gross_profit,
        gross_loss: tally.gross_loss,
        avg_pnl: tally.avg_pnl(),
        avg_win: ratio(tally.gross_profit, tally.won),
        avg_loss: ratio(tally.gross_loss, tally.lost),
        largest_win: tally.largest_win,
        largest_loss: tally.largest_loss,
        avg_trade_duration_days: ratio(tally.duration_days as f64, tally.count),
        sharpe,
        sortino,
        max_drawdown: compute_max_drawdown(values, 0.0),
        open_positions_at_end,
        yearly_breakdown: yearly_breakdown(trades, equity_curve, &deltas),
    }
}

/// (year of the later point, change in cumulative PnL) per consecutive pair.
fn equity_deltas(equity_curve: &[EquityPoint]) -> Vec<(i32, f64)> {
    equity_curve
        .windows(2)
        .map(|w| {
            (
                w[1].date.year(),
                w[1].cumulative_pnl_dollars - w[0].cumulative_pnl_dollars,
            )
        })
        .collect()
}

fn yearly_breakdown(
    trades: &[Trade],
    equity_curve: &[EquityPoint],
    deltas: &[(i32, f64)],
) -> BTreeMap<i32, YearlyStats> {
    let years = equity_curve
        .iter()
        .map(|p| p.date.year())
        .chain(trades.iter().map(|t| t.exit_date.year()));
    let (first, last) = match years.fold(None, |acc: Option<(i32, i32)>, y| match acc {
        None => Some((y, y)),
        Some((lo, hi)) => Some((lo.min(y), hi.max(y))),
    }) {
        Some(span) => span,
        None => return BTreeMap::new(),
    };

    (first..=last)
        .map(|year| {
            let tally = TradeTally::from_trades(trades.iter().filter(|t| t.exit_date.year() == year));
            let year_deltas: Vec<f64> = deltas
                .iter()
                .filter(|&&(y, _)| y == year)
                .map(|&(_, d)| d)
                .collect();
            let (sharpe, sortino) = compute_risk_adjusted(year_deltas.iter().copied());
            // Previous year's closing value; the boundary delta belongs to this year.
            let baseline = equity_curve
                .iter()
                .take_while(|p| p.date.year() < year)
                .last()
                .map_or(0.0, |p| p.cumulative_pnl_dollars);
            let values = equity_curve
                .iter()
                .filter(|p| p.date.year() == year)
                .map(|p| p.cumulative_pnl_dollars);

            let stats = if tally.count == 0 && year_deltas.is_empty() {
                YearlyStats::empty(year)
            } else {
                YearlyStats {
                    year,
                    total_trades: tally.count,
                    winning_trades: tally.won,
                    win_rate: tally.win_rate(),
                    total_pnl: tally.total_pnl(),
                    avg_pnl: tally.avg_pnl(),
                    profit_factor: tally.profit_factor(),
                    sharpe,
                    sortino,
                    max_drawdown: compute_max_drawdown(values, baseline),
                }
            };
            (year, stats)
        })
        .collect()
}

fn compute_max_drawdown(values: impl IntoIterator<Item = f64>, baseline: f64) -> f64 {
    let mut peak = baseline;
    let mut max_dd = 0.0_f64;
    for value in values {
        peak = peak.max(value);
        max_dd = max_dd.max(peak - value);
    }
    max_dd
}

fn compute_risk_adjusted(deltas: impl Iterator<Item = f64> + Clone) -> (f64, f64) {
    let n = deltas.clone().count();
    if n == 0 {
        return (0.0, 0.0);
    }
    let n = n as f64;
    let mean = deltas.clone().sum::<f64>() / n;

    let variance = deltas.clone().map(|d| (d - mean).powi(2)).sum::<f64>() / n;
    let stddev = variance.sqrt();
    let sharpe = if stddev > 0.0 {
        mean / stddev * TRADING_DAYS_PER_YEAR.sqrt()
    } else {
        0.0
    };

    let downside_variance = deltas.map(|d| d.min(0.0).powi(2)).sum::<f64>() / n;
    let downside_stddev = downside_variance.sqrt();
    let sortino = if downside_stddev > 0.0 {
        mean / downside_stddev * TRADING_DAYS_PER_YEAR.sqrt()
    } else {
        0.0
    };

    (sharpe, sortino)
}
