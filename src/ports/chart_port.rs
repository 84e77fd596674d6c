//! Charting sink port. Plots are a side channel and never affect decisions.

use chrono::NaiveDate;

pub const PRICE_CHART: &str = "Price Evolution";
pub const SIGNAL_CHART: &str = "Signals and Volatility";

pub const LONG_TERM_SERIES: &str = "Long-Term Average";
pub const SHORT_TERM_SERIES: &str = "Short-Term Average";
pub const BUY_SERIES: &str = "Buy Signal";
pub const SELL_SERIES: &str = "Sell Signal";
pub const UPPER_VOLATILITY_SERIES: &str = "Upper Volatility";
pub const LOWER_VOLATILITY_SERIES: &str = "Lower Volatility";

/// One plotted value.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartPoint {
    pub chart: String,
    pub series: String,
    pub date: NaiveDate,
    pub value: f64,
}

pub trait ChartPort {
    fn plot(&mut self, chart: &str, series: &str, date: NaiveDate, value: f64);
}
