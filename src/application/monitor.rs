//! Streaming Spread Monitor
//!
//! Online version of the pipeline: one aligned tick at a time, same estimator
//! window, same state machine and same one-step lag. Fed the same ticks as a
//! batch run, it produces the same `StepRecord`s.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::application::pipeline::StepRecord;
use crate::domain::price_series::is_valid_price;
use crate::domain::returns::{lagged_return, return_since_valid};
use crate::domain::trade_state::TradeState;
use crate::strategy::params::{ConfigError, SpreadConfig};
use crate::strategy::spread_estimator::{price_ratio, RatioWindow};
use crate::strategy::state_machine::{SpreadStateMachine, Thresholds};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MonitorError {
    #[error("Tick at {timestamp} is not after last tick at {last}")]
    OutOfOrder {
        timestamp: DateTime<Utc>,
        last: DateTime<Utc>,
    },
}

#[derive(Debug, Clone, Copy)]
struct LastTick {
    timestamp: DateTime<Utc>,
    /// Last valid price of each leg, carried over invalid ticks
    valid_a: Option<f64>,
    valid_b: Option<f64>,
}

/// Tick-by-tick spread monitor
#[derive(Debug, Clone)]
pub struct SpreadMonitor {
    window: RatioWindow,
    machine: SpreadStateMachine,
    last: Option<LastTick>,
    equity: f64,
}

impl SpreadMonitor {
    pub fn new(config: &SpreadConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            window: RatioWindow::new(config.lookback),
            machine: SpreadStateMachine::new(Thresholds::try_from(config)?),
            last: None,
            equity: 1.0,
        })
    }

    /// Process the next aligned observation
    ///
    /// The return for this tick is settled with the position held coming into
    /// it, before this tick's z-score can change that position.
    pub fn on_tick(
        &mut self,
        timestamp: DateTime<Utc>,
        price_a: f64,
        price_b: f64,
    ) -> Result<StepRecord, MonitorError> {
        if let Some(last) = self.last {
            if timestamp <= last.timestamp {
                return Err(MonitorError::OutOfOrder { timestamp, last: last.timestamp });
            }
        }

        let held = self.machine.state();
        let (valid_a, valid_b) = self.last.map_or((None, None), |l| (l.valid_a, l.valid_b));
        let strategy_return = match self.last {
            Some(_) => lagged_return(
                held,
                return_since_valid(valid_a, price_a),
                return_since_valid(valid_b, price_b),
            ),
            None => 0.0,
        };
        self.equity *= 1.0 + strategy_return;

        let point = self.window.push(price_ratio(price_a, price_b));
        let position = self.machine.step(point.z_score);

        self.last = Some(LastTick {
            timestamp,
            valid_a: if is_valid_price(price_a) { Some(price_a) } else { valid_a },
            valid_b: if is_valid_price(price_b) { Some(price_b) } else { valid_b },
        });

        Ok(StepRecord {
            timestamp,
            price_a,
            price_b,
            ratio: point.ratio,
            mean: point.mean,
            std_dev: point.std_dev,
            z_score: point.z_score,
            position,
            strategy_return,
            equity: self.equity,
        })
    }

    /// Position decided at the last tick, applied to the next one
    pub fn position(&self) -> TradeState {
        self.machine.state()
    }

    pub fn equity(&self) -> f64 {
        self.equity
    }

    pub fn ticks(&self) -> usize {
        self.machine.steps()
    }

    /// Estimator has a full window
    pub fn is_warm(&self) -> bool {
        self.window.is_ready()
    }
}
