//! Instrument identity, daily price bars and validated price history.

use chrono::NaiveDate;
use std::fmt;

use super::error::MomtraderError;

/// Ticker symbol of the traded instrument, always upper-case.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InstrumentId(String);

impl InstrumentId {
    pub fn new(symbol: &str) -> Self {
        Self(symbol.trim().to_uppercase())
    }

    pub fn symbol(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InstrumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One daily bar as delivered by a data feed. `close` is `None` when the
/// feed has no value for that date.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub close: Option<f64>,
}

impl PriceBar {
    pub fn new(date: NaiveDate, close: f64) -> Self {
        Self {
            date,
            close: Some(close),
        }
    }

    pub fn missing(date: NaiveDate) -> Self {
        Self { date, close: None }
    }

    /// The close, if it is usable as a price.
    pub fn valid_close(&self) -> Option<f64> {
        self.close.filter(|c| c.is_finite() && *c > 0.0)
    }
}

/// Closing prices that passed validation, oldest first.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceHistory {
    dates: Vec<NaiveDate>,
    closes: Vec<f64>,
}

impl PriceHistory {
    /// Validate raw feed output before any computation touches it.
    ///
    /// Empty input or any unusable close is `MissingData`; fewer than
    /// `minimum` closes is `InsufficientData`.
    pub fn validate(
        instrument: &InstrumentId,
        bars: &[PriceBar],
        minimum: usize,
    ) -> Result<Self, MomtraderError> {
        if bars.is_empty() {
            return Err(MomtraderError::MissingData {
                symbol: instrument.symbol().to_string(),
                reason: "no historical data available".into(),
            });
        }

        let mut dates = Vec::with_capacity(bars.len());
        let mut closes = Vec::with_capacity(bars.len());
        for bar in bars {
            let close = bar.valid_close().ok_or_else(|| MomtraderError::MissingData {
                symbol: instrument.symbol().to_string(),
                reason: format!("missing close on {}", bar.date),
            })?;
            dates.push(bar.date);
            closes.push(close);
        }

        let minimum = minimum.max(2);
        if closes.len() < minimum {
            return Err(MomtraderError::InsufficientData {
                symbol: instrument.symbol().to_string(),
                bars: closes.len(),
                minimum,
            });
        }

        Ok(Self { dates, closes })
    }

    pub fn closes(&self) -> &[f64] {
        &self.closes
    }

    pub fn len(&self) -> usize {
        self.closes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.closes.is_empty()
    }

    /// The oldest `n` closes (all of them if fewer are held).
    pub fn head(&self, n: usize) -> &[f64] {
        &self.closes[..n.min(self.closes.len())]
    }

    /// The most recent `n` closes (all of them if fewer are held).
    pub fn tail(&self, n: usize) -> &[f64] {
        &self.closes[self.closes.len().saturating_sub(n)..]
    }

    pub fn last_close(&self) -> f64 {
        self.closes[self.closes.len() - 1]
    }

    pub fn last_date(&self) -> NaiveDate {
        self.dates[self.dates.len() - 1]
    }
}
