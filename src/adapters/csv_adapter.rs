//! CSV file data adapter.
//!
//! Reads `<base_path>/<SYMBOL>.csv` with a header row. Columns are matched
//! by name, case-insensitively: a date column (`Date` or `datetime`) plus
//! `Open`, `High`, `Low`, `Close`. Other columns (volume, dividends, ...)
//! are ignored. Dates may carry a time and offset suffix such as
//! `2020-01-02 00:00:00-05:00`; only the calendar day is kept.

use crate::domain::bar::Bar;
use crate::domain::error::IbsError;
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;

pub struct CsvAdapter {
    base_path: PathBuf,
}

struct Columns {
    date: usize,
    open: usize,
    high: usize,
    low: usize,
    close: usize,
}

impl Columns {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self, IbsError> {
        let find = |names: &[&str]| {
            headers
                .iter()
                .position(|h| names.iter().any(|n| h.trim().eq_ignore_ascii_case(n)))
                .ok_or_else(|| IbsError::DataSource {
                    reason: format!("missing {} column", names[0]),
                })
        };
        Ok(Columns {
            date: find(&["date", "datetime"])?,
            open: find(&["open"])?,
            high: find(&["high"])?,
            low: find(&["low"])?,
            close: find(&["close"])?,
        })
    }
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", symbol))
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate, IbsError> {
    let raw = raw.trim();
    let day = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").map_err(|e| IbsError::DataSource {
        reason: format!("invalid date {:?}: {}", raw, e),
    })
}

fn parse_price(record: &csv::StringRecord, index: usize, name: &str) -> Result<f64, IbsError> {
    record
        .get(index)
        .ok_or_else(|| IbsError::DataSource {
            reason: format!("missing {} value", name),
        })?
        .trim()
        .parse()
        .map_err(|e| IbsError::DataSource {
            reason: format!("invalid {} value: {}", name, e),
        })
}

impl DataPort for CsvAdapter {
    fn fetch_bars(
        &self,
        symbol: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Vec<Bar>, IbsError> {
        let path = self.csv_path(symbol);
        let content = fs::read_to_string(&path).map_err(|e| IbsError::DataSource {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(content.as_bytes());
        let headers = rdr.headers().map_err(|e| IbsError::DataSource {
            reason: format!("CSV header error: {}", e),
        })?;
        let columns = Columns::from_headers(headers)?;
        let mut bars = Vec::new();

        for result in rdr.records() {
            let record = result.map_err(|e| IbsError::DataSource {
                reason: format!("CSV parse error: {}", e),
            })?;

            let date_str = record.get(columns.date).ok_or_else(|| IbsError::DataSource {
                reason: "missing date value".into(),
            })?;
            let date = parse_date(date_str)?;

            if start_date.is_some_and(|s| date < s) || end_date.is_some_and(|e| date > e) {
                continue;
            }

            bars.push(Bar {
                date,
                open: parse_price(&record, columns.open, "open")?,
                high: parse_price(&record, columns.high, "high")?,
                low: parse_price(&record, columns.low, "low")?,
                close: parse_price(&record, columns.close, "close")?,
            });
        }

        Ok(bars)
    }

    fn list_symbols(&self) -> Result<Vec<String>, IbsError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| IbsError::DataSource {
            reason: format!(
                "failed to read directory {}: {}",
                self.base_path.display(),
                e
            ),
        })?;

        let mut symbols = Vec::new();

        for entry in entries {
            let entry = entry.map_err(|e| IbsError::DataSource {
                reason: format!("directory entry error: {}", e),
            })?;

            let name = entry.file_name();
            let name_str = name.to_string_lossy();

            if let Some(symbol) = name_str.strip_suffix(".csv") {
                symbols.push(symbol.to_string());
            }
        }

        symbols.sort();
        Ok(symbols)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup_test_data() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().to_path_buf();

        let csv_content = "Date,Open,High,Low,Close,Volume,Dividends,Stock Splits\n\
            2024-01-15 00:00:00-05:00,100.0,110.0,90.0,105.0,50000,0.0,0.0\n\
            2024-01-16 00:00:00-05:00,105.0,115.0,100.0,110.0,60000,0.0,0.0\n\
            2024-01-17 00:00:00-05:00,110.0,120.0,105.0,115.0,55000,0.0,0.0\n";

        fs::write(path.join("SPY.csv"), csv_content).unwrap();
        fs::write(
            path.join("QQQ.csv"),
            " datetime , open , high , low , close\n2024-02-01, 10, 11, 9, 10.5\n",
        )
        .unwrap();
        fs::write(path.join("notes.txt"), "not a data file").unwrap();

        (dir, path)
    }

    #[test]
    fn fetch_bars_returns_correct_data() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let bars = adapter.fetch_bars("SPY", None, None).unwrap();

        assert_eq!(bars.len(), 3);
        assert_eq!(bars[0].date, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        assert_eq!(bars[0].open, 100.0);
        assert_eq!(bars[0].high, 110.0);
        assert_eq!(bars[0].low, 90.0);
        assert_eq!(bars[0].close, 105.0);
    }

    #[test]
    fn fetch_bars_filters_by_date() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let day = NaiveDate::from_ymd_opt(2024, 1, 16).unwrap();
        let bars = adapter.fetch_bars("SPY", Some(day), Some(day)).unwrap();

        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].date, day);
    }

    #[test]
    fn fetch_bars_matches_headers_case_insensitively() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let bars = adapter.fetch_bars("QQQ", None, None).unwrap();
        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].date, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
        assert_eq!(bars[0].close, 10.5);
    }

    #[test]
    fn fetch_bars_errors_for_missing_file() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let result = adapter.fetch_bars("XYZ", None, None);
        assert!(matches!(result, Err(IbsError::DataSource { .. })));
    }

    #[test]
    fn fetch_bars_errors_for_missing_column() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("BAD.csv"), "Date,Open,High,Close\n2024-01-02,1,2,1.5\n").unwrap();
        let adapter = CsvAdapter::new(dir.path().to_path_buf());

        let err = adapter.fetch_bars("BAD", None, None).unwrap_err();
        assert!(matches!(err, IbsError::DataSource { reason } if reason.contains("low")));
    }

    #[test]
    fn fetch_bars_keeps_source_order() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("REV.csv"),
            "Date,Open,High,Low,Close\n2024-01-03,1,2,1,1.5\n2024-01-02,1,2,1,1.5\n",
        )
        .unwrap();
        let adapter = CsvAdapter::new(dir.path().to_path_buf());

        let bars = adapter.fetch_bars("REV", None, None).unwrap();
        assert_eq!(bars[0].date, NaiveDate::from_ymd_opt(2024, 1, 3).unwrap());
    }

    #[test]
    fn list_symbols_returns_csv_stems() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let symbols = adapter.list_symbols().unwrap();
        assert_eq!(symbols, vec!["QQQ", "SPY"]);
    }
}
