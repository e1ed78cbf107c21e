//! Strategy Layer - Ratio Z-Score with Entry/Exit Hysteresis
//!
//! - Ratio of the two legs with rolling mean/std over a lookback window
//! - Z-score of the ratio, undefined during warm-up or zero dispersion
//! - Three-state machine: enter beyond the entry band, exit inside the exit band

pub mod params;
pub mod spread_estimator;
pub mod state_machine;

pub use params::{ConfigError, SpreadConfig};
pub use spread_estimator::{estimate, price_ratio, RatioWindow, SpreadPoint};
pub use state_machine::{SpreadStateMachine, Thresholds};
