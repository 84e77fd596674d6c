//! Brokerage execution port.

use crate::domain::error::MomtraderError;
use crate::domain::order::OrderIntent;
use crate::domain::price::InstrumentId;

pub trait ExecutionPort {
    /// Close all exposure in `instrument`. A no-op when already flat.
    fn liquidate(&mut self, instrument: &InstrumentId) -> Result<(), MomtraderError>;

    /// Rebalance `instrument` to `fraction` of total equity.
    fn set_holdings(&mut self, instrument: &InstrumentId, fraction: f64)
        -> Result<(), MomtraderError>;

    /// Default implementation: dispatch each intent in order.
    fn submit(
        &mut self,
        instrument: &InstrumentId,
        orders: &[OrderIntent],
    ) -> Result<(), MomtraderError> {
        for order in orders {
            match *order {
                OrderIntent::Liquidate => self.liquidate(instrument)?,
                OrderIntent::SetTarget(fraction) => self.set_holdings(instrument, fraction)?,
            }
        }
        Ok(())
    }
}
