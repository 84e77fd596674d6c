//! Order intents handed across the core/broker boundary.

use std::fmt;

use super::state::PositionState;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OrderIntent {
    /// Close all exposure in the instrument.
    Liquidate,
    /// Target weight of total equity.
    SetTarget(f64),
}

impl fmt::Display for OrderIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderIntent::Liquidate => write!(f, "LIQUIDATE"),
            OrderIntent::SetTarget(fraction) => write!(f, "SET_TARGET({})", fraction),
        }
    }
}

/// Orders that move the book into `state`. Liquidation always comes first.
pub fn orders_for(state: PositionState, target_fraction: f64) -> Vec<OrderIntent> {
    match state {
        PositionState::Long => vec![OrderIntent::Liquidate, OrderIntent::SetTarget(target_fraction)],
        PositionState::Flat => vec![OrderIntent::Liquidate],
        PositionState::Neutral => vec![],
    }
}
