//! Domain error types.

use chrono::NaiveDate;
use std::fmt;

/// The pipeline stage an error originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Component {
    Ingestion,
    IndicatorEngine,
    SignalGenerator,
    Backtester,
    PerformanceAnalyzer,
    Configuration,
    DataSource,
    Report,
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Component::Ingestion => "ingestion",
            Component::IndicatorEngine => "indicator engine",
            Component::SignalGenerator => "signal generator",
            Component::Backtester => "backtester",
            Component::PerformanceAnalyzer => "performance analyzer",
            Component::Configuration => "configuration",
            Component::DataSource => "data source",
            Component::Report => "report",
        };
        f.write_str(name)
    }
}

/// Top-level error type for ibstrader.
#[derive(Debug, thiserror::Error)]
pub enum IbsError {
    #[error("invalid bar on {date}: {reason}")]
    InvalidBarData { date: NaiveDate, reason: String },

    #[error("insufficient history: have {bars} bars, lookback needs {lookback}")]
    InsufficientHistory { bars: usize, lookback: usize },

    #[error("signal dated {date} does not match any bar")]
    SignalMisaligned { date: NaiveDate },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("data source error: {reason}")]
    DataSource { reason: String },

    #[error("report error: {reason}")]
    Report { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl IbsError {
    pub fn component(&self) -> Component {
        match self {
            IbsError::InvalidBarData { .. } => Component::Ingestion,
            IbsError::InsufficientHistory { .. } => Component::IndicatorEngine,
            IbsError::SignalMisaligned { .. } => Component::Backtester,
            IbsError::ConfigParse { .. }
            | IbsError::ConfigMissing { .. }
            | IbsError::ConfigInvalid { .. } => Component::Configuration,
            IbsError::DataSource { .. } => Component::DataSource,
            IbsError::Report { .. } | IbsError::Io(_) => Component::Report,
        }
    }

    pub(crate) fn invalid_config(section: &str, key: &str, reason: impl Into<String>) -> Self {
        IbsError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<&IbsError> for std::process::ExitCode {
    fn from(err: &IbsError) -> Self {
        let code: u8 = match err.component() {
            Component::Report => 1,
            Component::Configuration => 2,
            Component::DataSource => 3,
            Component::Ingestion => 4,
            Component::IndicatorEngine
            | Component::SignalGenerator
            | Component::Backtester
            | Component::PerformanceAnalyzer => 5,
        };
        std::process::ExitCode::from(code)
    }
}
