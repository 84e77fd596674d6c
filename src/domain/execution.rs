//! Simulated brokerage used by the backtest driver.
//!
//! Fills happen at the current mark price adjusted for slippage, in whole
//! shares, with a flat plus percentage commission. No leverage and no
//! shorting: holdings targets are limited to `[0, 1]` of equity and to the
//! cash actually available.

use chrono::NaiveDate;

use super::error::MomtraderError;
use super::portfolio::Portfolio;
use super::position::{ClosedTrade, Position};
use super::price::InstrumentId;
use crate::ports::execution_port::ExecutionPort;

/// Configuration for fill simulation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ExecutionConfig {
    pub commission_per_trade: f64,
    pub commission_pct: f64,
    pub slippage_pct: f64,
}

/// Calculate commission: flat_fee + (trade_value * pct / 100).
pub fn calculate_commission(trade_value: f64, config: &ExecutionConfig) -> f64 {
    config.commission_per_trade + (trade_value * config.commission_pct / 100.0)
}

/// Buy: execution_price = market_price * (1 + slippage_pct / 100)
pub fn apply_slippage_buy(market_price: f64, slippage_pct: f64) -> f64 {
    market_price * (1.0 + slippage_pct / 100.0)
}

/// Sell: execution_price = market_price * (1 - slippage_pct / 100)
pub fn apply_slippage_sell(market_price: f64, slippage_pct: f64) -> f64 {
    market_price * (1.0 - slippage_pct / 100.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Buy,
    Sell,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Fill {
    pub date: NaiveDate,
    pub side: Side,
    pub quantity: i64,
    pub price: f64,
    pub commission: f64,
}

#[derive(Debug, Clone)]
pub struct SimulatedBroker {
    portfolio: Portfolio,
    config: ExecutionConfig,
    mark: Option<(NaiveDate, f64)>,
    fills: Vec<Fill>,
}

impl SimulatedBroker {
    pub fn new(initial_capital: f64, config: ExecutionConfig) -> Self {
        Self {
            portfolio: Portfolio::new(initial_capital),
            config,
            mark: None,
            fills: Vec::new(),
        }
    }

    /// Set the price orders fill against until the next mark.
    pub fn mark(&mut self, date: NaiveDate, price: f64) {
        self.mark = Some((date, price));
    }

    pub fn portfolio(&self) -> &Portfolio {
        &self.portfolio
    }

    pub fn into_portfolio(self) -> Portfolio {
        self.portfolio
    }

    pub fn fills(&self) -> &[Fill] {
        &self.fills
    }

    /// Equity at the current mark, or cash when nothing has been marked.
    pub fn equity(&self) -> f64 {
        match self.mark {
            Some((_, price)) => self.portfolio.total_equity(price),
            None => self.portfolio.cash,
        }
    }

    /// Append equity on `date`, valued at the latest mark.
    pub fn record_equity(&mut self, date: NaiveDate) {
        let equity = self.equity();
        self.portfolio.record_equity(date, equity);
    }

    fn current_mark(&self) -> Result<(NaiveDate, f64), MomtraderError> {
        self.mark.ok_or_else(|| MomtraderError::Execution {
            reason: "no mark price set".into(),
        })
    }

    fn buy(&mut self, instrument: &InstrumentId, quantity: i64) -> Result<(), MomtraderError> {
        let (date, market_price) = self.current_mark()?;
        let price = apply_slippage_buy(market_price, self.config.slippage_pct);
        let cost = quantity as f64 * price;
        let commission = calculate_commission(cost, &self.config);

        self.portfolio.cash -= cost + commission;
        match self.portfolio.position.as_mut() {
            Some(pos) => pos.add(quantity, price, commission),
            None => {
                self.portfolio.position = Some(Position {
                    instrument: instrument.clone(),
                    quantity,
                    entry_price: price,
                    entry_date: date,
                    entry_commission: commission,
                })
            }
        }

        tracing::debug!(%instrument, quantity, price, commission, "buy filled");
        self.fills.push(Fill {
            date,
            side: Side::Buy,
            quantity,
            price,
            commission,
        });
        Ok(())
    }

    fn sell(&mut self, quantity: i64) -> Result<(), MomtraderError> {
        let (date, market_price) = self.current_mark()?;
        let Some(mut position) = self.portfolio.position.take() else {
            return Ok(());
        };
        let quantity = quantity.min(position.quantity);

        let price = apply_slippage_sell(market_price, self.config.slippage_pct);
        let value = quantity as f64 * price;
        let commission = calculate_commission(value, &self.config);
        let entry_commission = position.entry_commission * quantity as f64 / position.quantity as f64;
        let pnl = quantity as f64 * (price - position.entry_price) - entry_commission - commission;

        self.portfolio.cash += value - commission;
        self.portfolio.record_trade(ClosedTrade {
            instrument: position.instrument.clone(),
            quantity,
            entry_price: position.entry_price,
            exit_price: price,
            entry_date: position.entry_date,
            exit_date: date,
            pnl,
        });

        tracing::debug!(instrument = %position.instrument, quantity, price, pnl, "sell filled");
        self.fills.push(Fill {
            date,
            side: Side::Sell,
            quantity,
            price,
            commission,
        });

        position.quantity -= quantity;
        position.entry_commission -= entry_commission;
        if position.quantity > 0 {
            self.portfolio.position = Some(position);
        }
        Ok(())
    }
}

impl ExecutionPort for SimulatedBroker {
    fn liquidate(&mut self, _instrument: &InstrumentId) -> Result<(), MomtraderError> {
        let quantity = self.portfolio.quantity();
        if quantity == 0 {
            return Ok(());
        }
        self.sell(quantity)
    }

    fn set_holdings(
        &mut self,
        instrument: &InstrumentId,
        fraction: f64,
    ) -> Result<(), MomtraderError> {
        if !fraction.is_finite() || !(0.0..=1.0).contains(&fraction) {
            return Err(MomtraderError::Execution {
                reason: format!("target fraction {fraction} outside [0, 1]"),
            });
        }
        let (_, market_price) = self.current_mark()?;

        let target_value = self.portfolio.total_equity(market_price) * fraction;
        let held = self.portfolio.quantity();
        let held_value = held as f64 * market_price;

        if target_value > held_value {
            let price = apply_slippage_buy(market_price, self.config.slippage_pct);
            let wanted = ((target_value - held_value) / price).floor() as i64;
            let affordable = ((self.portfolio.cash - self.config.commission_per_trade)
                / (price * (1.0 + self.config.commission_pct / 100.0)))
                .floor() as i64;
            let quantity = wanted.min(affordable);
            if quantity <= 0 {
                tracing::debug!(%instrument, fraction, "insufficient capital for target");
                return Ok(());
            }
            self.buy(instrument, quantity)
        } else {
            let target_quantity = (target_value / market_price).floor() as i64;
            let quantity = held - target_quantity;
            if quantity <= 0 {
                return Ok(());
            }
            self.sell(quantity)
        }
    }
}
