//! IBS strategy parameters.

use super::error::IbsError;
use super::signal::SignalParams;

pub const DEFAULT_ENTRY_THRESHOLD: f64 = 0.2;
pub const DEFAULT_EXIT_THRESHOLD: f64 = 0.6;
pub const DEFAULT_LOOKBACK_DAYS: usize = 10;
pub const DEFAULT_MAX_POSITIONS: usize = 3;
pub const DEFAULT_POINT_VALUE: f64 = 20.0;

#[derive(Debug, Clone, PartialEq)]
pub struct StrategyConfig {
    pub entry_threshold: f64,
    pub exit_threshold: f64,
    pub lookback_days: usize,
    pub max_positions: usize,
    pub point_value: f64,
    /// Close every open position on an EXIT day instead of only the oldest.
    pub close_all_on_exit: bool,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        StrategyConfig {
            entry_threshold: DEFAULT_ENTRY_THRESHOLD,
            exit_threshold: DEFAULT_EXIT_THRESHOLD,
            lookback_days: DEFAULT_LOOKBACK_DAYS,
            max_positions: DEFAULT_MAX_POSITIONS,
            point_value: DEFAULT_POINT_VALUE,
            close_all_on_exit: false,
        }
    }
}

impl StrategyConfig {
    pub fn validate(&self) -> Result<(), IbsError> {
        check_threshold("entry_threshold", self.entry_threshold)?;
        check_threshold("exit_threshold", self.exit_threshold)?;
        if self.lookback_days < 1 {
            return Err(IbsError::invalid_config(
                "strategy",
                "lookback_days",
                "lookback_days must be at least 1",
            ));
        }
        if self.max_positions < 1 {
            return Err(IbsError::invalid_config(
                "strategy",
                "max_positions",
                "max_positions must be at least 1",
            ));
        }
        if !self.point_value.is_finite() || self.point_value <= 0.0 {
            return Err(IbsError::invalid_config(
                "strategy",
                "point_value",
                "point_value must be positive",
            ));
        }
        Ok(())
    }

    pub fn signal_params(&self) -> SignalParams {
        SignalParams {
            entry_threshold: self.entry_threshold,
            exit_threshold: self.exit_threshold,
            lookback_days: self.lookback_days,
        }
    }
}

fn check_threshold(key: &str, value: f64) -> Result<(), IbsError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(IbsError::invalid_config(
            "strategy",
            key,
            format!("{key} must be between 0 and 1"),
        ));
    }
    Ok(())
}
