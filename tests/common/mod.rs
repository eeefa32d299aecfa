#![allow(dead_code)]

use chrono::NaiveDate;
use ibstrader::domain::bar::{Bar, BarSeries};
use ibstrader::domain::error::IbsError;
use ibstrader::domain::strategy::StrategyConfig;
use ibstrader::ports::data_port::DataPort;
use std::collections::HashMap;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<Bar>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, symbol: &str, bars: Vec<Bar>) -> Self {
        self.data.insert(symbol.to_string(), bars);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_bars(
        &self,
        symbol: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Vec<Bar>, IbsError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(IbsError::DataSource {
                reason: reason.clone(),
            });
        }
        let bars = self.data.get(symbol).ok_or_else(|| IbsError::DataSource {
            reason: format!("no data for {symbol}"),
        })?;
        Ok(bars
            .iter()
            .filter(|b| start_date.is_none_or(|s| b.date >= s))
            .filter(|b| end_date.is_none_or(|e| b.date <= e))
            .cloned()
            .collect())
    }

    fn list_symbols(&self) -> Result<Vec<String>, IbsError> {
        let mut symbols: Vec<String> = self.data.keys().cloned().collect();
        symbols.sort();
        Ok(symbols)
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn make_bar(date: &str, open: f64, high: f64, low: f64, close: f64) -> Bar {
    Bar::new(
        NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
        open,
        high,
        low,
        close,
    )
}

/// Five bars whose only round trip is entry 2024-01-03 @ 97, exit 2024-01-04 @ 99
/// under lookback 2 and default thresholds.
pub fn single_trade_bars() -> Vec<Bar> {
    vec![
        make_bar("2024-01-01", 100.0, 101.0, 99.0, 100.0),
        make_bar("2024-01-02", 100.0, 105.0, 95.0, 96.0),
        make_bar("2024-01-03", 97.0, 100.0, 96.0, 99.6),
        make_bar("2024-01-04", 99.0, 102.0, 98.0, 101.0),
        make_bar("2024-01-05", 100.0, 100.0, 100.0, 100.0),
    ]
}

/// Repeating six-day dip-and-recover pattern on consecutive calendar days.
pub fn generate_bars(start_date: &str, count: usize) -> Vec<Bar> {
    const LOW_OFFSET: [f64; 6] = [0.0, -2.0, -4.0, -6.0, -3.0, 0.0];
    const CLOSE_POS: [f64; 6] = [0.5, 0.1, 0.1, 0.05, 0.9, 0.8];

    let start = NaiveDate::parse_from_str(start_date, "%Y-%m-%d").unwrap();
    (0..count)
        .map(|i| {
            let phase = i % 6;
            let low = 100.0 + LOW_OFFSET[phase];
            let high = low + 4.0;
            Bar::new(
                start + chrono::Duration::days(i as i64),
                low + 2.0,
                high,
                low,
                low + 4.0 * CLOSE_POS[phase],
            )
        })
        .collect()
}

pub fn series(bars: Vec<Bar>) -> BarSeries {
    BarSeries::new(bars).unwrap()
}

pub fn short_lookback_config() -> StrategyConfig {
    StrategyConfig {
        lookback_days: 2,
        ..StrategyConfig::default()
    }
}
