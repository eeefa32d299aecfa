//! Signal generation from indicator records.
//!
//! The signal for trading day T is decided by the record of day T-1, the
//! last completed bar. Execution happens at T's open.

use chrono::NaiveDate;
use std::fmt;

use super::indicator::IndicatorRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignalKind {
    Entry,
    Exit,
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalKind::Entry => write!(f, "ENTRY"),
            SignalKind::Exit => write!(f, "EXIT"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signal {
    pub date: NaiveDate,
    pub kind: SignalKind,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalParams {
    pub entry_threshold: f64,
    pub exit_threshold: f64,
    pub lookback_days: usize,
}

impl SignalParams {
    fn entry_fires(&self, index: usize, record: &IndicatorRecord) -> bool {
        if index + 1 < self.lookback_days {
            return false;
        }
        record.ibs.is_some_and(|ibs| ibs < self.entry_threshold) && record.at_window_low()
    }

    fn exit_fires(&self, record: &IndicatorRecord) -> bool {
        record.ibs.is_some_and(|ibs| ibs > self.exit_threshold)
    }
}

/// Lazy signal sequence over a slice of indicator records.
///
/// Yields signals in date order; when both fire for the same day the EXIT is
/// yielded before the ENTRY.
#[derive(Debug, Clone)]
pub struct Signals<'a> {
    indicators: &'a [IndicatorRecord],
    params: SignalParams,
    // Index of the trading day T currently being evaluated.
    day: usize,
    pending_entry: Option<Signal>,
}

impl Iterator for Signals<'_> {
    type Item = Signal;

    fn next(&mut self) -> Option<Signal> {
        if let Some(entry) = self.pending_entry.take() {
            return Some(entry);
        }

        while self.day < self.indicators.len() {
            let t = self.day;
            self.day += 1;

            let prev = &self.indicators[t - 1];
            let date = self.indicators[t].date;

            let entry = self.params.entry_fires(t - 1, prev).then_some(Signal {
                date,
                kind: SignalKind::Entry,
            });

            if self.params.exit_fires(prev) {
                self.pending_entry = entry;
                return Some(Signal {
                    date,
                    kind: SignalKind::Exit,
                });
            }
            if entry.is_some() {
                return entry;
            }
        }

        None
    }
}

pub fn generate(
    indicators: &[IndicatorRecord],
    entry_threshold: f64,
    exit_threshold: f64,
    lookback_days: usize,
) -> Signals<'_> {
    generate_with(
        indicators,
        SignalParams {
            entry_threshold,
            exit_threshold,
            lookback_days,
        },
    )
}

pub fn generate_with(indicators: &[IndicatorRecord], params: SignalParams) -> Signals<'_> {
    Signals {
        indicators,
        params,
        // Day 0 has no prior bar.
        day: 1,
        pending_entry: None,
    }
}
