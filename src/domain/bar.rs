//! Daily OHLC bar and the validated bar series.

use chrono::NaiveDate;

use super::error::IbsError;

#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl Bar {
    pub fn new(date: NaiveDate, open: f64, high: f64, low: f64, close: f64) -> Self {
        Bar {
            date,
            open,
            high,
            low,
            close,
        }
    }

    /// high - low
    pub fn range(&self) -> f64 {
        self.high - self.low
    }

    fn check(&self) -> Result<(), IbsError> {
        let invalid = |reason: &str| IbsError::InvalidBarData {
            date: self.date,
            reason: reason.to_string(),
        };

        for (name, price) in [
            ("open", self.open),
            ("high", self.high),
            ("low", self.low),
            ("close", self.close),
        ] {
            if !price.is_finite() || price <= 0.0 {
                return Err(invalid(&format!("{name} must be a positive number, got {price}")));
            }
        }
        if self.high < self.low {
            return Err(invalid("high is below low"));
        }
        if self.open > self.high || self.open < self.low {
            return Err(invalid("open is outside the high/low range"));
        }
        if self.close > self.high || self.close < self.low {
            return Err(invalid("close is outside the high/low range"));
        }
        Ok(())
    }
}

/// An immutable, strictly date-ascending sequence of valid bars.
///
/// This is the ingestion boundary: malformed data is rejected here and never
/// repaired, so every downstream component may assume the bar invariants.
#[derive(Debug, Clone, PartialEq)]
pub struct BarSeries {
    bars: Vec<Bar>,
}

impl BarSeries {
    pub fn new(bars: Vec<Bar>) -> Result<Self, IbsError> {
        for bar in &bars {
            bar.check()?;
        }
        for pair in bars.windows(2) {
            if pair[1].date <= pair[0].date {
                return Err(IbsError::InvalidBarData {
                    date: pair[1].date,
                    reason: format!(
                        "dates must be strictly ascending (follows {})",
                        pair[0].date
                    ),
                });
            }
        }
        Ok(BarSeries { bars })
    }

    pub fn as_slice(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Bar> {
        self.bars.iter()
    }

    /// Position of `date` in the series, if it is a trading day.
    pub fn index_of(&self, date: NaiveDate) -> Option<usize> {
        self.bars.binary_search_by_key(&date, |b| b.date).ok()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.bars.first().map(|b| b.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.bars.last().map(|b| b.date)
    }

    /// Errors with `InsufficientHistory` when fewer bars than `lookback` exist.
    ///
    /// Callers treat this as "no entry signals possible" rather than a fatal
    /// failure.
    pub fn check_history(&self, lookback: usize) -> Result<(), IbsError> {
        if self.bars.len() < lookback {
            return Err(IbsError::InsufficientHistory {
                bars: self.bars.len(),
                lookback,
            });
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a BarSeries {
    type Item = &'a Bar;
    type IntoIter = std::slice::Iter<'a, Bar>;

    fn into_iter(self) -> Self::IntoIter {
        self.bars.iter()
    }
}
