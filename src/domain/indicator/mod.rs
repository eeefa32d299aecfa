//! Indicator engine.
//!
//! Turns a bar series into one `IndicatorRecord` per bar:
//! - `ibs`: internal bar strength of the bar itself
//! - `rolling_min_low`: minimum low over the trailing `lookback_days` bars
//!
//! Undefined values (zero-range bars, warm-up window) are `None`.

pub mod ibs;
pub mod rolling_min;

use chrono::NaiveDate;
use std::fmt;

use crate::domain::bar::BarSeries;

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorRecord {
    pub date: NaiveDate,
    pub low: f64,
    pub ibs: Option<f64>,
    pub rolling_min_low: Option<f64>,
}

impl IndicatorRecord {
    /// True when this bar's low equals or undercuts its own trailing minimum.
    pub fn at_window_low(&self) -> bool {
        self.rolling_min_low.is_some_and(|min| self.low <= min)
    }

    /// Raw threshold tag of the bar's own IBS, ignoring the lookback filter.
    pub fn tag(&self, entry_threshold: f64, exit_threshold: f64) -> Option<Tag> {
        let ibs = self.ibs?;
        if ibs < entry_threshold {
            Some(Tag::Entry)
        } else if ibs > exit_threshold {
            Some(Tag::Exit)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    Entry,
    Exit,
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tag::Entry => write!(f, "entry"),
            Tag::Exit => write!(f, "exit"),
        }
    }
}

pub fn compute(bars: &BarSeries, lookback_days: usize) -> Vec<IndicatorRecord> {
    let slice = bars.as_slice();
    let lows: Vec<f64> = slice.iter().map(|b| b.low).collect();
    let ibs_values = ibs::calculate_ibs(slice);
    let mins = rolling_min::calculate_rolling_min(&lows, lookback_days);

    slice
        .iter()
        .zip(ibs_values)
        .zip(mins)
        .map(|((bar, ibs), rolling_min_low)| IndicatorRecord {
            date: bar.date,
            low: bar.low,
            ibs,
            rolling_min_low,
        })
        .collect()
}
