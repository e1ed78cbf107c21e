//! Domain Layer - Core types and pure computations for the spread monitor
//!
//! This module contains pure domain types and logic with no I/O.
//! Price data enters through the ports layer.
//!
//! - `price_series`: price history per instrument and pair alignment
//! - `trade_state`: the three-valued spread position
//! - `returns`: lagged strategy returns and equity curve
//! - `performance`: annualized metrics and drawdown
//! - `trade`: round-trip extraction from the position series

pub mod price_series;
pub mod trade_state;
pub mod returns;
pub mod performance;
pub mod trade;

pub use price_series::{align_pair, AlignedPair, DataAlignmentError, PricePoint, PriceSeries, SeriesError};
pub use trade_state::TradeState;
pub use returns::{equity_curve, lagged_strategy_returns, simple_returns};
pub use performance::{summarize, PerformanceSummary};
pub use trade::{trade_log, TradeRecord};
