//! momtrader: single-asset volatility-weighted momentum strategy.
//!
//! Hexagonal architecture: the daily decision core lives in [`domain`], port
//! traits for the data feed, broker, chart sink, config and reports in
//! [`ports`], and concrete implementations in [`adapters`].

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod cli;
