//! Performance Summary
//!
//! Annualized return, annualized volatility, Sharpe ratio, maximum drawdown
//! and trade-day count for a strategy return series and its equity curve.
//! Metrics that cannot be computed are `None`, never NaN or infinity.

use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

use crate::domain::trade_state::TradeState;

/// Scalar performance metrics for one run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSummary {
    /// `equity[last] ^ (A / N) - 1`; `None` when final equity is not positive
    pub annualized_return: Option<f64>,
    /// Sample std of strategy returns scaled by `sqrt(A)`
    pub annualized_volatility: Option<f64>,
    /// Annualized return over annualized volatility; `None` at zero volatility
    pub sharpe_ratio: Option<f64>,
    /// Worst `equity / running_max - 1`, always <= 0
    pub max_drawdown: f64,
    /// Steps with an open position
    pub trade_days: usize,
    /// Number of return observations `N`
    pub observations: usize,
    /// Last value of the equity curve (1.0 for an empty run)
    pub final_equity: f64,
}

/// Summarize a completed run
pub fn summarize(
    strategy_returns: &[f64],
    equity: &[f64],
    positions: &[TradeState],
    annualization: u32,
) -> PerformanceSummary {
    let annualized_return = annualized_return(equity, strategy_returns.len(), annualization);
    let annualized_volatility = annualized_volatility(strategy_returns, annualization);

    PerformanceSummary {
        annualized_return,
        annualized_volatility,
        sharpe_ratio: sharpe_ratio(annualized_return, annualized_volatility),
        max_drawdown: max_drawdown(equity),
        trade_days: trade_days(positions),
        observations: strategy_returns.len(),
        final_equity: equity.last().copied().unwrap_or(1.0),
    }
}

pub fn annualized_return(equity: &[f64], observations: usize, annualization: u32) -> Option<f64> {
    let last = *equity.last()?;
    if observations == 0 || !last.is_finite() || last <= 0.0 {
        return None;
    }
    let value = last.powf(annualization as f64 / observations as f64) - 1.0;
    value.is_finite().then_some(value)
}

pub fn annualized_volatility(strategy_returns: &[f64], annualization: u32) -> Option<f64> {
    if strategy_returns.len() < 2 {
        return None;
    }
    let std = strategy_returns.iter().std_dev();
    if !std.is_finite() {
        return None;
    }
    Some(std * (annualization as f64).sqrt())
}

pub fn sharpe_ratio(annualized_return: Option<f64>, annualized_volatility: Option<f64>) -> Option<f64> {
    let (ret, vol) = (annualized_return?, annualized_volatility?);
    if vol == 0.0 {
        return None;
    }
    Some(ret / vol)
}

/// Largest peak-to-trough decline as a negative fraction
pub fn max_drawdown(equity: &[f64]) -> f64 {
    let mut peak = f64::NEG_INFINITY;
    let mut worst: f64 = 0.0;

    for &value in equity {
        if value > peak {
            peak = value;
        }
        if peak > 0.0 {
            worst = worst.min(value / peak - 1.0);
        }
    }

    worst
}

pub fn trade_days(positions: &[TradeState]) -> usize {
    positions.iter().filter(|p| p.is_open()).count()
}
