//! Positions and closed trades.

use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionStatus {
    Open,
    Closed,
}

/// A long position of one contract.
///
/// Exit fields are `None` while the position is open.
#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub entry_date: NaiveDate,
    pub entry_price: f64,
    pub entry_index: usize,
    pub exit_date: Option<NaiveDate>,
    pub exit_price: Option<f64>,
    pub exit_index: Option<usize>,
    pub status: PositionStatus,
}

impl Position {
    pub fn open(entry_date: NaiveDate, entry_price: f64, entry_index: usize) -> Self {
        Position {
            entry_date,
            entry_price,
            entry_index,
            exit_date: None,
            exit_price: None,
            exit_index: None,
            status: PositionStatus::Open,
        }
    }

    pub fn is_open(&self) -> bool {
        self.status == PositionStatus::Open
    }

    pub fn unrealized_points(&self, price: f64) -> f64 {
        price - self.entry_price
    }

    /// Close the position and finalize it into a trade.
    ///
    /// Returns `None` when the position is already closed or the exit would
    /// not come strictly after the entry.
    pub fn close(
        &mut self,
        exit_date: NaiveDate,
        exit_price: f64,
        exit_index: usize,
        point_value: f64,
    ) -> Option<Trade> {
        if !self.is_open() || exit_date <= self.entry_date {
            return None;
        }
        self.exit_date = Some(exit_date);
        self.exit_price = Some(exit_price);
        self.exit_index = Some(exit_index);
        self.status = PositionStatus::Closed;

        let pnl_points = exit_price - self.entry_price;
        Some(Trade {
            entry_date: self.entry_date,
            entry_price: self.entry_price,
            entry_index: self.entry_index,
            exit_date,
            exit_price,
            exit_index,
            pnl_points,
            pnl_dollars: pnl_points * point_value,
            result: TradeResult::from_points(pnl_points),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeResult {
    Win,
    Loss,
}

impl TradeResult {
    /// Breakeven counts as a loss.
    pub fn from_points(pnl_points: f64) -> Self {
        if pnl_points > 0.0 {
            TradeResult::Win
        } else {
            TradeResult::Loss
        }
    }
}

impl fmt::Display for TradeResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeResult::Win => write!(f, "win"),
            TradeResult::Loss => write!(f, "loss"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trade {
    pub entry_date: NaiveDate,
    pub entry_price: f64,
    pub entry_index: usize,
    pub exit_date: NaiveDate,
    pub exit_price: f64,
    pub exit_index: usize,
    pub pnl_points: f64,
    pub pnl_dollars: f64,
    pub result: TradeResult,
}

impl Trade {
    pub fn duration_days(&self) -> i64 {
        (self.exit_date - self.entry_date).num_days()
    }
}
