//! Core domain types and logic.
//!
//! Data flows one way: bars → indicators → signals → trades → metrics.

pub mod bar;
pub mod indicator;
pub mod signal;
pub mod position;
pub mod portfolio;
pub mod backtest;
pub mod metrics;
pub mod strategy;
pub mod config_validation;
pub mod error;
