//! Volatility risk gate.
//!
//! RISK = SAMP_STDDEV(all closes) * sqrt(days_per_year / N)
//! The gate trips when RISK > threshold (strictly).

use super::price::PriceHistory;
use super::stats::{annualization_factor, sample_stddev};

pub const DEFAULT_RISK_THRESHOLD: f64 = 22.5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskGate {
    pub threshold: f64,
    pub trading_days: f64,
}

impl Default for RiskGate {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_RISK_THRESHOLD,
            trading_days: super::signal::DEFAULT_TRADING_DAYS,
        }
    }
}

impl RiskGate {
    pub fn new(threshold: f64, trading_days: f64) -> Self {
        Self {
            threshold,
            trading_days,
        }
    }

    pub fn measure(&self, history: &PriceHistory) -> f64 {
        let closes = history.closes();
        sample_stddev(closes) * annualization_factor(self.trading_days, closes.len())
    }

    pub fn exceeds(&self, measure: f64) -> bool {
        measure > self.threshold
    }
}
