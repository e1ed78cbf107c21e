use serde::{Deserialize, Serialize};
use std::fmt;

/// Exposure to the spread held at one time step
///
/// `LongSpread` is long A / short B (bet the ratio rises), `ShortSpread` is
/// short A / long B (bet the ratio falls).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TradeState {
    #[default]
    Flat,
    LongSpread,
    ShortSpread,
}

impl TradeState {
    /// Signed exposure multiplier applied to `retA - retB`
    pub fn exposure(self) -> f64 {
        match self {
            TradeState::Flat => 0.0,
            TradeState::LongSpread => 1.0,
            TradeState::ShortSpread => -1.0,
        }
    }

    /// Integer code: 0, +1 or -1
    pub fn code(self) -> i8 {
        match self {
            TradeState::Flat => 0,
            TradeState::LongSpread => 1,
            TradeState::ShortSpread => -1,
        }
    }

    pub fn is_open(self) -> bool {
        self != TradeState::Flat
    }
}

impl fmt::Display for TradeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeState::Flat => write!(f, "Flat"),
            TradeState::LongSpread => write!(f, "LongSpread"),
            TradeState::ShortSpread => write!(f, "ShortSpread"),
        }
    }
}
