use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::trade_state::TradeState;

/// One round-trip in the spread, from entry bar to exit bar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub direction: TradeState,
    pub entry_index: usize,
    pub entry_time: DateTime<Utc>,
    /// `None` while the trade is still open at the end of the series
    pub exit_index: Option<usize>,
    pub exit_time: Option<DateTime<Utc>>,
    /// Steps on which the position was recorded as open
    pub bars_held: usize,
    /// Compounded strategy return earned while the position was held
    pub trade_return: f64,
}

impl TradeRecord {
    pub fn is_open(&self) -> bool {
        self.exit_index.is_none()
    }
}

impl fmt::Display for TradeRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let exit = match self.exit_time {
            Some(ts) => ts.format("%Y-%m-%d").to_string(),
            None => "open".to_string(),
        };
        write!(
            f,
            "{} {} -> {} ({} bars, {:+.2}%)",
            self.direction,
            self.entry_time.format("%Y-%m-%d"),
            exit,
            self.bars_held,
            self.trade_return * 100.0
        )
    }
}

/// Extract round-trips from a position series
///
/// A trade entered at step `e` earns the strategy returns at steps `e+1`
/// through the step on which the state leaves it, because of the one-step lag.
pub fn trade_log(
    timestamps: &[DateTime<Utc>],
    positions: &[TradeState],
    strategy_returns: &[f64],
) -> Vec<TradeRecord> {
    let n = timestamps.len().min(positions.len()).min(strategy_returns.len());
    let mut trades = Vec::new();
    let mut current: Option<TradeRecord> = None;

    for t in 0..n {
        let state = positions[t];

        if let Some(trade) = current.as_mut() {
            // Return at t was earned by the position held at t-1
            trade.trade_return = (1.0 + trade.trade_return) * (1.0 + strategy_returns[t]) - 1.0;

            if state != trade.direction {
                trade.exit_index = Some(t);
                trade.exit_time = Some(timestamps[t]);
                trade.bars_held = t - trade.entry_index;
                trades.extend(current.take());
            }
        }

        if current.is_none() && state.is_open() {
            current = Some(TradeRecord {
                direction: state,
                entry_index: t,
                entry_time: timestamps[t],
                exit_index: None,
                exit_time: None,
                bars_held: 0,
                trade_return: 0.0,
            });
        }
    }

    if let Some(mut trade) = current {
        trade.bars_held = n - trade.entry_index;
        trades.push(trade);
    }

    trades
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::{Duration, TimeZone};
    use TradeState::*;

    fn timestamps(n: usize) -> Vec<DateTime<Utc>> {
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        (0..n).map(|i| start + Duration::days(i as i64)).collect()
    }

    #[test]
    fn test_single_round_trip() {
        let positions = [Flat, ShortSpread, ShortSpread, Flat, Flat];
        let returns = [0.0, 0.0, 0.01, 0.02, 0.0];
        let trades = trade_log(&timestamps(5), &positions, &returns);

        assert_eq!(trades.len(), 1);
        let trade = &trades[0];
        assert_eq!(trade.direction, ShortSpread);
        assert_eq!(trade.entry_index, 1);
        assert_eq!(trade.exit_index, Some(3));
        assert_eq!(trade.bars_held, 2);
        assert_relative_eq!(trade.trade_return, 1.01 * 1.02 - 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_open_trade_at_end() {
        let positions = [Flat, Flat, LongSpread, LongSpread];
        let returns = [0.0, 0.0, 0.0, -0.01];
        let trades = trade_log(&timestamps(4), &positions, &returns);

        assert_eq!(trades.len(), 1);
        assert!(trades[0].is_open());
        assert_eq!(trades[0].bars_held, 2);
        assert_relative_eq!(trades[0].trade_return, -0.01, epsilon = 1e-12);
    }

    #[test]
    fn test_multiple_trades() {
        let positions = [LongSpread, Flat, ShortSpread, Flat, LongSpread];
        let returns = [0.0; 5];
        let trades = trade_log(&timestamps(5), &positions, &returns);

        let directions: Vec<_> = trades.iter().map(|t| t.direction).collect();
        assert_eq!(directions, vec![LongSpread, ShortSpread, LongSpread]);
        assert!(trades[2].is_open());
    }

    #[test]
    fn test_no_trades_when_flat() {
        assert!(trade_log(&timestamps(3), &[Flat; 3], &[0.0; 3]).is_empty());
    }
}
