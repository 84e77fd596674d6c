//! Open holding and closed-trade ledger entries.

use chrono::NaiveDate;

use super::price::InstrumentId;

#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub instrument: InstrumentId,
    pub quantity: i64,
    pub entry_price: f64,
    pub entry_date: NaiveDate,
    /// Commission paid on the shares still held.
    pub entry_commission: f64,
}

impl Position {
    pub fn market_value(&self, price: f64) -> f64 {
        self.quantity as f64 * price
    }

    pub fn unrealized_pnl(&self, price: f64) -> f64 {
        self.quantity as f64 * (price - self.entry_price)
    }

    /// Add shares, averaging the entry price.
    pub fn add(&mut self, quantity: i64, price: f64, commission: f64) {
        let total = self.quantity + quantity;
        if total > 0 {
            self.entry_price =
                (self.entry_price * self.quantity as f64 + price * quantity as f64) / total as f64;
        }
        self.quantity = total;
        self.entry_commission += commission;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClosedTrade {
    pub instrument: InstrumentId,
    pub quantity: i64,
    pub entry_price: f64,
    pub exit_price: f64,
    pub entry_date: NaiveDate,
    pub exit_date: NaiveDate,
    pub pnl: f64,
}

impl ClosedTrade {
    pub fn holding_days(&self) -> i64 {
        (self.exit_date - self.entry_date).num_days()
    }
}
