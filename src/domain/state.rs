//! Position state and the signal-driven transition rule.

use std::fmt;

use super::signal::Signal;

/// Held position. `Neutral` is the initial state and is never re-entered.
/// `Flat` never shorts; it only means "no exposure".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PositionState {
    Flat,
    #[default]
    Neutral,
    Long,
}

impl fmt::Display for PositionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PositionState::Flat => write!(f, "FLAT"),
            PositionState::Neutral => write!(f, "NEUTRAL"),
            PositionState::Long => write!(f, "LONG"),
        }
    }
}

/// Next state for a signal. Equal signals keep the current state.
pub fn next_state(current: PositionState, signal: &Signal) -> PositionState {
    if signal.short_term < signal.long_term && current != PositionState::Long {
        PositionState::Long
    } else if signal.short_term > signal.long_term && current != PositionState::Flat {
        PositionState::Flat
    } else {
        current
    }
}
