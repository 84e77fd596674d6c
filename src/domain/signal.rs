//! Volatility-weighted mean signals.
//!
//! VWM(x) = MEAN(x) * SAMP_STDDEV(x) * sqrt(days_per_year / len(x))
//!
//! long_term  = VWM(all closes)
//! short_term = VWM(`short_window` closes taken from the anchored end)
//!
//! The short window is anchored at the oldest closes of the history by
//! default. A sharp rise over the newest days therefore leaves the short
//! term flat and the long term elevated, which reads as a Long signal.

use std::fmt;
use std::str::FromStr;

use super::error::MomtraderError;
use super::price::PriceHistory;
use super::stats::{annualization_factor, mean, sample_stddev};

pub const DEFAULT_SHORT_WINDOW: usize = 5;
pub const DEFAULT_TRADING_DAYS: f64 = 252.0;

/// Which end of the history the short window is cut from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShortWindowAnchor {
    #[default]
    Oldest,
    Newest,
}

impl fmt::Display for ShortWindowAnchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShortWindowAnchor::Oldest => write!(f, "oldest"),
            ShortWindowAnchor::Newest => write!(f, "newest"),
        }
    }
}

impl FromStr for ShortWindowAnchor {
    type Err = MomtraderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "oldest" => Ok(ShortWindowAnchor::Oldest),
            "newest" => Ok(ShortWindowAnchor::Newest),
            other => Err(MomtraderError::ConfigInvalid {
                section: "strategy".into(),
                key: "short_window_anchor".into(),
                reason: format!("expected oldest or newest, got {other:?}"),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Signal {
    pub long_term: f64,
    pub short_term: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalComputer {
    pub short_window: usize,
    pub trading_days: f64,
    pub anchor: ShortWindowAnchor,
}

impl Default for SignalComputer {
    fn default() -> Self {
        Self {
            short_window: DEFAULT_SHORT_WINDOW,
            trading_days: DEFAULT_TRADING_DAYS,
            anchor: ShortWindowAnchor::default(),
        }
    }
}

impl SignalComputer {
    pub fn new(short_window: usize, trading_days: f64, anchor: ShortWindowAnchor) -> Self {
        Self {
            short_window,
            trading_days,
            anchor,
        }
    }

    fn short_closes<'a>(&self, history: &'a PriceHistory) -> &'a [f64] {
        match self.anchor {
            ShortWindowAnchor::Oldest => history.head(self.short_window),
            ShortWindowAnchor::Newest => history.tail(self.short_window),
        }
    }

    pub fn volatility_weighted_mean(&self, closes: &[f64]) -> f64 {
        mean(closes) * sample_stddev(closes) * annualization_factor(self.trading_days, closes.len())
    }

    pub fn compute(&self, history: &PriceHistory) -> Signal {
        Signal {
            long_term: self.volatility_weighted_mean(history.closes()),
            short_term: self.volatility_weighted_mean(self.short_closes(history)),
        }
    }
}
