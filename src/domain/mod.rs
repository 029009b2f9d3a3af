//! Core domain types and the backtest pipeline.

pub mod price;
pub mod returns;
pub mod volatility;
pub mod signal;
pub mod strategy_returns;
pub mod equity;
pub mod metrics;
pub mod stats;
pub mod backtest;
pub mod table;
pub mod config_validation;
pub mod error;
