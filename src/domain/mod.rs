//! Core domain types and logic.

pub mod backtest;
pub mod config_validation;
pub mod error;
pub mod execution;
pub mod metrics;
pub mod order;
pub mod portfolio;
pub mod position;
pub mod price;
pub mod risk;
pub mod rolling_window;
pub mod signal;
pub mod state;
pub mod stats;
pub mod strategy;
pub mod volatility;
