//! Daily price feed port.

use crate::domain::error::MomtraderError;
use crate::domain::price::{InstrumentId, PriceBar};
use chrono::NaiveDate;

pub trait DataPort {
    /// The `lookback` most recent bars dated strictly before `before`,
    /// oldest first. May be empty or contain missing closes.
    fn history(
        &self,
        instrument: &InstrumentId,
        lookback: usize,
        before: NaiveDate,
    ) -> Result<Vec<PriceBar>, MomtraderError>;

    /// All bars dated within `[start, end]`, oldest first.
    fn bars(
        &self,
        instrument: &InstrumentId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PriceBar>, MomtraderError>;

    fn get_data_range(
        &self,
        instrument: &InstrumentId,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, MomtraderError>;
}
