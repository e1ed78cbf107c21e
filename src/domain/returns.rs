//! Lagged Return Composition
//!
//! Turns a position series into realized strategy returns. The position
//! decided at step `t-1` is the one applied to the returns observed at step
//! `t`; nothing decided at `t` ever touches return `t`.

use crate::domain::price_series::is_valid_price;
use crate::domain::trade_state::TradeState;

/// Simple return between two consecutive prices
///
/// Returns 0 when either price is unusable, so an invalid observation never
/// leaks NaN/Inf into the strategy returns.
pub fn simple_return(previous: f64, current: f64) -> f64 {
    if is_valid_price(previous) && is_valid_price(current) {
        current / previous - 1.0
    } else {
        0.0
    }
}

/// Return of `current` against the last valid price seen before it
///
/// An invalid `current` books 0; the move across the gap is booked on the
/// next valid price instead.
pub fn return_since_valid(last_valid: Option<f64>, current: f64) -> f64 {
    match last_valid {
        Some(previous) => simple_return(previous, current),
        None => 0.0,
    }
}

/// Simple returns of a price path, with `0` at the first step
///
/// Invalid prices are skipped over: each valid price is compared with the
/// last valid one before it.
pub fn simple_returns(prices: &[f64]) -> Vec<f64> {
    let mut last_valid = None;
    prices
        .iter()
        .map(|&price| {
            let r = return_since_valid(last_valid, price);
            if is_valid_price(price) {
                last_valid = Some(price);
            }
            r
        })
        .collect()
}

/// Strategy return for one step given the position held coming into it
pub fn lagged_return(held: TradeState, return_a: f64, return_b: f64) -> f64 {
    held.exposure() * (return_a - return_b)
}

/// `stratRet[t] = position[t-1] * (retA[t] - retB[t])`, `stratRet[0] = 0`
///
/// Output length is the shortest of the three inputs.
pub fn lagged_strategy_returns(
    positions: &[TradeState],
    returns_a: &[f64],
    returns_b: &[f64],
) -> Vec<f64> {
    let n = positions.len().min(returns_a.len()).min(returns_b.len());
    let mut out = Vec::with_capacity(n);
    if n == 0 {
        return out;
    }
    out.push(0.0);
    for t in 1..n {
        out.push(lagged_return(positions[t - 1], returns_a[t], returns_b[t]));
    }
    out
}

/// Running product of `(1 + r)` starting from a base of 1
pub fn equity_curve(strategy_returns: &[f64]) -> Vec<f64> {
    strategy_returns
        .iter()
        .scan(1.0, |equity, r| {
            *equity *= 1.0 + r;
            Some(*equity)
        })
        .collect()
}
