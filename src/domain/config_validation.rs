//! Configuration validation.
//!
//! Validates all config fields before a run starts. Defaults used here must
//! match the ones the CLI builders fall back to.

use crate::domain::error::MomtraderError;
use crate::domain::signal::{ShortWindowAnchor, DEFAULT_SHORT_WINDOW, DEFAULT_TRADING_DAYS};
use crate::domain::strategy::{DEFAULT_TARGET_FRACTION, DEFAULT_VOLATILITY_PERIOD};
use crate::domain::risk::DEFAULT_RISK_THRESHOLD;
use crate::domain::volatility::DEFAULT_VOLATILITY_SCALE;
use crate::ports::config_port::ConfigPort;
use chrono::{NaiveDate, NaiveTime};

pub const DEFAULT_SCHEDULE_TIME: &str = "15:58";

/// Upper bound on `volatility_period`; the rolling window is allocated up front.
pub const MAX_VOLATILITY_PERIOD: i64 = 10_000;

pub fn validate_strategy_config(config: &dyn ConfigPort) -> Result<(), MomtraderError> {
    validate_periods(config)?;
    validate_anchor(config)?;
    validate_positive("strategy", "trading_days_per_year", config, DEFAULT_TRADING_DAYS)?;
    validate_positive("strategy", "risk_threshold", config, DEFAULT_RISK_THRESHOLD)?;
    validate_positive("strategy", "volatility_scale", config, DEFAULT_VOLATILITY_SCALE)?;
    validate_target_fraction(config)?;
    Ok(())
}

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), MomtraderError> {
    validate_initial_capital(config)?;
    validate_costs(config)?;
    validate_risk_free_rate(config)?;
    validate_dates(config)?;
    validate_schedule(config)?;
    Ok(())
}

fn invalid(section: &str, key: &str, reason: &str) -> MomtraderError {
    MomtraderError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

fn validate_periods(config: &dyn ConfigPort) -> Result<(), MomtraderError> {
    let period = config.get_int("strategy", "volatility_period", DEFAULT_VOLATILITY_PERIOD as i64);
    if !(2..=MAX_VOLATILITY_PERIOD).contains(&period) {
        return Err(invalid(
            "strategy",
            "volatility_period",
            &format!("volatility_period must be between 2 and {MAX_VOLATILITY_PERIOD}"),
        ));
    }
    let short = config.get_int("strategy", "short_window", DEFAULT_SHORT_WINDOW as i64);
    if short < 2 || short > period.saturating_add(1) {
        return Err(invalid(
            "strategy",
            "short_window",
            "short_window must be between 2 and volatility_period + 1",
        ));
    }
    Ok(())
}

fn validate_anchor(config: &dyn ConfigPort) -> Result<(), MomtraderError> {
    if let Some(value) = config.get_string("strategy", "short_window_anchor") {
        value.parse::<ShortWindowAnchor>()?;
    }
    Ok(())
}

fn validate_positive(
    section: &str,
    key: &str,
    config: &dyn ConfigPort,
    default: f64,
) -> Result<(), MomtraderError> {
    let value = config.get_double(section, key, default);
    if !value.is_finite() || value <= 0.0 {
        return Err(invalid(section, key, &format!("{key} must be positive")));
    }
    Ok(())
}

fn validate_target_fraction(config: &dyn ConfigPort) -> Result<(), MomtraderError> {
    let value = config.get_double("strategy", "target_fraction", DEFAULT_TARGET_FRACTION);
    if !value.is_finite() || value <= 0.0 || value > 1.0 {
        return Err(invalid(
            "strategy",
            "target_fraction",
            "target_fraction must be in (0, 1]",
        ));
    }
    Ok(())
}

fn validate_initial_capital(config: &dyn ConfigPort) -> Result<(), MomtraderError> {
    let value = config.get_double("backtest", "initial_capital", 1_000_000.0);
    if !value.is_finite() || value <= 0.0 {
        return Err(invalid(
            "backtest",
            "initial_capital",
            "initial_capital must be positive",
        ));
    }
    Ok(())
}

fn validate_costs(config: &dyn ConfigPort) -> Result<(), MomtraderError> {
    for key in ["commission_per_trade", "commission_pct", "slippage_pct"] {
        if config.get_double("backtest", key, 0.0) < 0.0 {
            return Err(invalid("backtest", key, &format!("{key} must be non-negative")));
        }
    }
    if config.get_double("backtest", "slippage_pct", 0.0) >= 100.0 {
        return Err(invalid("backtest", "slippage_pct", "slippage_pct must be below 100"));
    }
    Ok(())
}

fn validate_risk_free_rate(config: &dyn ConfigPort) -> Result<(), MomtraderError> {
    let value = config.get_double("backtest", "risk_free_rate", 0.0);
    if !(0.0..1.0).contains(&value) {
        return Err(invalid(
            "backtest",
            "risk_free_rate",
            "risk_free_rate must be between 0 and 1",
        ));
    }
    Ok(())
}

fn validate_dates(config: &dyn ConfigPort) -> Result<(), MomtraderError> {
    let start = parse_date(config.get_string("backtest", "start_date").as_deref(), "start_date")?;
    let end = parse_date(config.get_string("backtest", "end_date").as_deref(), "end_date")?;

    if start >= end {
        return Err(invalid(
            "backtest",
            "start_date",
            "start_date must be before end_date",
        ));
    }
    Ok(())
}

pub fn parse_date(value: Option<&str>, field: &str) -> Result<NaiveDate, MomtraderError> {
    match value {
        None => Err(MomtraderError::ConfigMissing {
            section: "backtest".to_string(),
            key: field.to_string(),
        }),
        Some(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| {
            invalid(
                "backtest",
                field,
                &format!("invalid {} format, expected YYYY-MM-DD", field),
            )
        }),
    }
}

pub fn parse_schedule_time(value: &str) -> Result<NaiveTime, MomtraderError> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M")
        .map_err(|_| invalid("schedule", "time", "invalid time format, expected HH:MM"))
}

fn validate_schedule(config: &dyn ConfigPort) -> Result<(), MomtraderError> {
    parse_schedule_time(&config.get_string_or("schedule", "time", DEFAULT_SCHEDULE_TIME))?;
    Ok(())
}
