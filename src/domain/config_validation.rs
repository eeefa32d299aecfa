//! Configuration validation.
//!
//! Reads the `[strategy]` and `[data]` sections through a `ConfigPort` and
//! fails fast on any missing, unparsable or out-of-range value.

use chrono::NaiveDate;
use std::str::FromStr;

use crate::domain::error::IbsError;
use crate::domain::strategy::{
    StrategyConfig, DEFAULT_ENTRY_THRESHOLD, DEFAULT_EXIT_THRESHOLD, DEFAULT_LOOKBACK_DAYS,
    DEFAULT_MAX_POSITIONS, DEFAULT_POINT_VALUE,
};
use crate::ports::config_port::ConfigPort;

pub fn validate_strategy_config(config: &dyn ConfigPort) -> Result<(), IbsError> {
    build_strategy_config(config).map(|_| ())
}

pub fn validate_data_config(config: &dyn ConfigPort) -> Result<(), IbsError> {
    validate_symbol(config)?;
    validate_dates(config)?;
    Ok(())
}

/// Sections this program reads.
pub const KNOWN_SECTIONS: [&str; 3] = ["strategy", "data", "output"];

/// Sections present in the config that nothing reads, usually a typo.
pub fn unknown_sections(config: &dyn ConfigPort) -> Vec<String> {
    config
        .sections()
        .into_iter()
        .filter(|s| !KNOWN_SECTIONS.contains(&s.as_str()))
        .collect()
}

/// Build a validated `StrategyConfig`, falling back to defaults for absent keys.
pub fn build_strategy_config(config: &dyn ConfigPort) -> Result<StrategyConfig, IbsError> {
    let strategy = StrategyConfig {
        entry_threshold: parse_value(config, "strategy", "entry_threshold")?
            .unwrap_or(DEFAULT_ENTRY_THRESHOLD),
        exit_threshold: parse_value(config, "strategy", "exit_threshold")?
            .unwrap_or(DEFAULT_EXIT_THRESHOLD),
        lookback_days: parse_count(config, "lookback_days")?.unwrap_or(DEFAULT_LOOKBACK_DAYS),
        max_positions: parse_count(config, "max_positions")?.unwrap_or(DEFAULT_MAX_POSITIONS),
        point_value: parse_value(config, "strategy", "point_value")?
            .unwrap_or(DEFAULT_POINT_VALUE),
        close_all_on_exit: parse_bool(config, "strategy", "close_all_on_exit")?.unwrap_or(false),
    };
    strategy.validate()?;
    Ok(strategy)
}

fn parse_value<T: FromStr>(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<Option<T>, IbsError> {
    match config.get_string(section, key) {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => raw.trim().parse::<T>().map(Some).map_err(|_| {
            IbsError::invalid_config(section, key, format!("cannot parse {:?}", raw.trim()))
        }),
    }
}

fn parse_count(config: &dyn ConfigPort, key: &str) -> Result<Option<usize>, IbsError> {
    match parse_value::<i64>(config, "strategy", key)? {
        None => Ok(None),
        Some(v) if v < 1 => Err(IbsError::invalid_config(
            "strategy",
            key,
            format!("{key} must be at least 1"),
        )),
        Some(v) => Ok(Some(v as usize)),
    }
}

fn parse_bool(config: &dyn ConfigPort, section: &str, key: &str) -> Result<Option<bool>, IbsError> {
    match config.get_string(section, key) {
        None => Ok(None),
        Some(raw) => match raw.trim().to_lowercase().as_str() {
            "" => Ok(None),
            "true" | "yes" | "1" => Ok(Some(true)),
            "false" | "no" | "0" => Ok(Some(false)),
            other => Err(IbsError::invalid_config(
                section,
                key,
                format!("expected true/false, got {other:?}"),
            )),
        },
    }
}

fn validate_symbol(config: &dyn ConfigPort) -> Result<(), IbsError> {
    match config.get_string("data", "symbol") {
        Some(s) if !s.trim().is_empty() => Ok(()),
        _ => Err(IbsError::ConfigMissing {
            section: "data".to_string(),
            key: "symbol".to_string(),
        }),
    }
}

/// Parsed `[data]` start and end dates, rejecting a start on or after the end.
pub(crate) fn validate_dates(
    config: &dyn ConfigPort,
) -> Result<(Option<NaiveDate>, Option<NaiveDate>), IbsError> {
    let start_date = parse_date(config, "start_date")?;
    let end_date = parse_date(config, "end_date")?;
    if let (Some(start), Some(end)) = (start_date, end_date) {
        if start >= end {
            return Err(IbsError::invalid_config(
                "data",
                "start_date",
                "start_date must be before end_date",
            ));
        }
    }
    Ok((start_date, end_date))
}

/// Optional `[data]` date in YYYY-MM-DD form.
pub fn parse_date(config: &dyn ConfigPort, field: &str) -> Result<Option<NaiveDate>, IbsError> {
    match config.get_string("data", field) {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map(Some)
            .map_err(|_| {
                IbsError::invalid_config(
                    "data",
                    field,
                    format!("invalid {field} format, expected YYYY-MM-DD"),
                )
            }),
    }
}
