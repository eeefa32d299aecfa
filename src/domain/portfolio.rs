//! Open-position book, trade ledger and realized equity curve.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::VecDeque;

use super::position::{Position, Trade};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EquityPoint {
    pub date: NaiveDate,
    pub cumulative_pnl_dollars: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Portfolio {
    pub point_value: f64,
    /// Oldest position at the front.
    pub positions: VecDeque<Position>,
    pub closed_trades: Vec<Trade>,
    pub equity_curve: Vec<EquityPoint>,
    pub realized_pnl: f64,
}

impl Portfolio {
    pub fn new(point_value: f64) -> Self {
        Portfolio {
            point_value,
            positions: VecDeque::new(),
            closed_trades: Vec::new(),
            equity_curve: Vec::new(),
            realized_pnl: 0.0,
        }
    }

    pub fn position_count(&self) -> usize {
        self.positions.len()
    }

    pub fn add_position(&mut self, position: Position) {
        self.positions.push_back(position);
    }

    /// Close the oldest open position (FIFO).
    ///
    /// A position entered on `date` itself is never closed.
    pub fn close_oldest(&mut self, date: NaiveDate, price: f64, index: usize) -> Option<Trade> {
        let front = self.positions.front()?;
        if front.entry_date >= date {
            return None;
        }
        let mut position = self.positions.pop_front()?;
        let trade = position.close(date, price, index, self.point_value)?;
        self.record_trade(trade.clone());
        Some(trade)
    }

    /// Close every open position entered before `date`, oldest first.
    pub fn close_all(&mut self, date: NaiveDate, price: f64, index: usize) -> Vec<Trade> {
        let mut closed = Vec::new();
        while let Some(trade) = self.close_oldest(date, price, index) {
            closed.push(trade);
        }
        closed
    }

    pub fn record_trade(&mut self, trade: Trade) {
        self.realized_pnl += trade.pnl_dollars;
        self.closed_trades.push(trade);
    }

    pub fn record_equity(&mut self, date: NaiveDate) {
        self.equity_curve.push(EquityPoint {
            date,
            cumulative_pnl_dollars: self.realized_pnl,
        });
    }

    /// Mark-to-market PnL of the open positions, in dollars.
    pub fn unrealized_pnl(&self, price: f64) -> f64 {
        self.positions
            .iter()
            .map(|p| p.unrealized_points(price) * self.point_value)
            .sum()
    }
}
