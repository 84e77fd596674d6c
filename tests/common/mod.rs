#![allow(dead_code)]

use chrono::{NaiveDate, NaiveTime};
use momtrader::domain::backtest::BacktestConfig;
use momtrader::domain::error::MomtraderError;
use momtrader::domain::order::OrderIntent;
use momtrader::domain::price::{InstrumentId, PriceBar};
use momtrader::ports::data_port::DataPort;
use momtrader::ports::execution_port::ExecutionPort;
use std::cell::Cell;
use std::collections::HashMap;

pub struct MockDataPort {
    pub data: HashMap<InstrumentId, Vec<PriceBar>>,
    pub errors: HashMap<InstrumentId, String>,
    pub history_calls: Cell<usize>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
            history_calls: Cell::new(0),
        }
    }

    pub fn with_bars(mut self, symbol: &str, bars: Vec<PriceBar>) -> Self {
        self.data.insert(InstrumentId::new(symbol), bars);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors
            .insert(InstrumentId::new(symbol), reason.to_string());
        self
    }

    fn lookup(&self, instrument: &InstrumentId) -> Result<Vec<PriceBar>, MomtraderError> {
        if let Some(reason) = self.errors.get(instrument) {
            return Err(MomtraderError::Data {
                reason: reason.clone(),
            });
        }
        Ok(self.data.get(instrument).cloned().unwrap_or_default())
    }
}

impl DataPort for MockDataPort {
    fn history(
        &self,
        instrument: &InstrumentId,
        lookback: usize,
        before: NaiveDate,
    ) -> Result<Vec<PriceBar>, MomtraderError> {
        self.history_calls.set(self.history_calls.get() + 1);
        let prior: Vec<PriceBar> = self
            .lookup(instrument)?
            .into_iter()
            .filter(|b| b.date < before)
            .collect();
        let skip = prior.len().saturating_sub(lookback);
        Ok(prior[skip..].to_vec())
    }

    fn bars(
        &self,
        instrument: &InstrumentId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PriceBar>, MomtraderError> {
        Ok(self
            .lookup(instrument)?
            .into_iter()
            .filter(|b| b.date >= start && b.date <= end)
            .collect())
    }

    fn get_data_range(
        &self,
        instrument: &InstrumentId,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, MomtraderError> {
        let bars = self.lookup(instrument)?;
        match (bars.first(), bars.last()) {
            (Some(first), Some(last)) => Ok(Some((first.date, last.date, bars.len()))),
            _ => Ok(None),
        }
    }
}

/// Broker double that records every call in order.
#[derive(Debug, Default)]
pub struct RecordingBroker {
    pub calls: Vec<(InstrumentId, OrderIntent)>,
    pub fail_with: Option<String>,
}

impl ExecutionPort for RecordingBroker {
    fn liquidate(&mut self, instrument: &InstrumentId) -> Result<(), MomtraderError> {
        if let Some(reason) = &self.fail_with {
            return Err(MomtraderError::Execution {
                reason: reason.clone(),
            });
        }
        self.calls.push((instrument.clone(), OrderIntent::Liquidate));
        Ok(())
    }

    fn set_holdings(
        &mut self,
        instrument: &InstrumentId,
        fraction: f64,
    ) -> Result<(), MomtraderError> {
        if let Some(reason) = &self.fail_with {
            return Err(MomtraderError::Execution {
                reason: reason.clone(),
            });
        }
        self.calls
            .push((instrument.clone(), OrderIntent::SetTarget(fraction)));
        Ok(())
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Consecutive calendar days starting at `start`, one bar per close.
pub fn bars_from(start: NaiveDate, closes: &[f64]) -> Vec<PriceBar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| PriceBar::new(start + chrono::Duration::days(i as i64), c))
        .collect()
}

pub fn make_bars(closes: &[f64]) -> Vec<PriceBar> {
    bars_from(date(2024, 1, 1), closes)
}

/// 100, 100.5, 101, ... : steady climb with low volatility.
pub fn uptrend(count: usize) -> Vec<f64> {
    (0..count).map(|i| 100.0 + 0.5 * i as f64).collect()
}

/// Flat at 100, then trending upward sharply over the last five days.
pub fn sharp_late_rise() -> Vec<f64> {
    let mut closes = vec![100.0; 23];
    closes.extend([102.0, 104.0, 106.0, 108.0, 110.0]);
    closes
}

/// A five-day climb at the start of the history, then flat at the top.
pub fn early_swing() -> Vec<f64> {
    let mut closes = vec![100.0, 104.0, 108.0, 112.0, 116.0];
    closes.extend([116.0; 23]);
    closes
}

/// 100, 120, 100, 120, ...: dispersion far above the risk threshold.
pub fn alternating(count: usize) -> Vec<f64> {
    (0..count)
        .map(|i| if i % 2 == 0 { 100.0 } else { 120.0 })
        .collect()
}

pub fn sample_config(start: NaiveDate, end: NaiveDate) -> BacktestConfig {
    BacktestConfig {
        start_date: start,
        end_date: end,
        initial_capital: 1_000_000.0,
        commission_per_trade: 0.0,
        commission_pct: 0.0,
        slippage_pct: 0.0,
        risk_free_rate: 0.0,
        schedule_time: NaiveTime::from_hms_opt(15, 58, 0).unwrap(),
    }
}
