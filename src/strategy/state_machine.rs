//! Spread State Machine
//!
//! Three states (`Flat`, `LongSpread`, `ShortSpread`) driven by the z-score
//! with separate entry and exit bands:
//!
//! - Flat: enter `ShortSpread` when z > E, `LongSpread` when z < -E
//! - Open: return to `Flat` when |z| < X, otherwise hold
//! - Undefined z: hold whatever state is current
//!
//! An open position never flips directly to the opposite side; it has to be
//! closed by an observation inside the exit band first.

use crate::domain::trade_state::TradeState;
use crate::strategy::params::{validate_thresholds, ConfigError, SpreadConfig};

/// Entry/exit hysteresis band
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    entry: f64,
    exit: f64,
}

impl Thresholds {
    pub fn new(entry: f64, exit: f64) -> Result<Self, ConfigError> {
        validate_thresholds(entry, exit)?;
        Ok(Self { entry, exit })
    }

    pub fn entry(&self) -> f64 {
        self.entry
    }

    pub fn exit(&self) -> f64 {
        self.exit
    }

    /// Next state from the current one and this step's z-score
    pub fn transition(&self, state: TradeState, z_score: Option<f64>) -> TradeState {
        let Some(z) = z_score.filter(|z| z.is_finite()) else {
            return state;
        };

        match state {
            TradeState::Flat if z > self.entry => TradeState::ShortSpread,
            TradeState::Flat if z < -self.entry => TradeState::LongSpread,
            TradeState::Flat => TradeState::Flat,
            _ if z.abs() < self.exit => TradeState::Flat,
            open => open,
        }
    }

    /// Fold a whole z-score series into the position series, starting `Flat`
    pub fn positions(&self, z_scores: &[Option<f64>]) -> Vec<TradeState> {
        z_scores
            .iter()
            .scan(TradeState::Flat, |state, &z| {
                *state = self.transition(*state, z);
                Some(*state)
            })
            .collect()
    }
}

impl TryFrom<&SpreadConfig> for Thresholds {
    type Error = ConfigError;

    fn try_from(config: &SpreadConfig) -> Result<Self, Self::Error> {
        Thresholds::new(config.entry_z, config.exit_z)
    }
}

/// Stateful wrapper for step-by-step processing
#[derive(Debug, Clone)]
pub struct SpreadStateMachine {
    thresholds: Thresholds,
    state: TradeState,
    steps: usize,
}

impl SpreadStateMachine {
    pub fn new(thresholds: Thresholds) -> Self {
        Self {
            thresholds,
            state: TradeState::Flat,
            steps: 0,
        }
    }

    /// Current state (the one decided at the last processed step)
    pub fn state(&self) -> TradeState {
        self.state
    }

    pub fn thresholds(&self) -> Thresholds {
        self.thresholds
    }

    /// Number of steps processed so far
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Apply one observation and return the resulting state
    pub fn step(&mut self, z_score: Option<f64>) -> TradeState {
        let next = self.thresholds.transition(self.state, z_score);
        if next != self.state {
            match next {
                TradeState::Flat => tracing::debug!(
                    step = self.steps,
                    z = ?z_score,
                    "Exit {} -> Flat",
                    self.state
                ),
                entered => tracing::debug!(
                    step = self.steps,
                    z = ?z_score,
                    "Enter {}",
                    entered
                ),
            }
        }
        self.state = next;
        self.steps += 1;
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use TradeState::*;

    fn thresholds() -> Thresholds {
        Thresholds::new(2.0, 0.5).unwrap()
    }

    fn run(z: &[f64]) -> Vec<TradeState> {
        let z: Vec<Option<f64>> = z.iter().copied().map(Some).collect();
        thresholds().positions(&z)
    }

    #[test]
    fn test_rejects_bad_band() {
        assert!(Thresholds::new(2.0, 2.0).is_err());
        assert!(Thresholds::new(0.0, 0.0).is_err());
        assert!(Thresholds::new(2.0, 0.0).is_ok());
    }

    #[test]
    fn test_short_entry_and_exit_scenario() {
        let states = run(&[0.0, 0.0, 2.5, 2.2, 1.0, 0.3, 0.1]);
        assert_eq!(
            states,
            vec![Flat, Flat, ShortSpread, ShortSpread, ShortSpread, Flat, Flat]
        );
    }

    #[test]
    fn test_long_entry() {
        let states = run(&[-1.0, -2.1, -0.6, -0.4]);
        assert_eq!(states, vec![Flat, LongSpread, LongSpread, Flat]);
    }

    #[test]
    fn test_entry_requires_strict_crossing() {
        assert!(run(&[2.0; 10]).iter().all(|s| *s == Flat));
        assert!(run(&[-2.0; 10]).iter().all(|s| *s == Flat));
        assert_eq!(run(&[2.0001]), vec![ShortSpread]);
    }

    #[test]
    fn test_exit_requires_strict_crossing() {
        let states = run(&[2.5, 0.5, -0.5, 0.49]);
        assert_eq!(states, vec![ShortSpread, ShortSpread, ShortSpread, Flat]);
    }

    #[test]
    fn test_no_direct_reversal() {
        // Swinging straight through to the opposite extreme holds the position
        let states = run(&[2.5, -3.0, -2.5, 0.2, -2.5]);
        assert_eq!(
            states,
            vec![ShortSpread, ShortSpread, ShortSpread, Flat, LongSpread]
        );
    }

    #[test]
    fn test_undefined_z_holds_open_position() {
        let z = [Some(2.5), None, None, Some(1.0), Some(0.1)];
        assert_eq!(
            thresholds().positions(&z),
            vec![ShortSpread, ShortSpread, ShortSpread, ShortSpread, Flat]
        );
    }

    #[test]
    fn test_undefined_z_keeps_flat() {
        let z = [None, None, Some(1.9), None];
        assert!(thresholds().positions(&z).iter().all(|s| *s == Flat));
    }

    #[test]
    fn test_nan_z_is_undefined() {
        let t = thresholds();
        assert_eq!(t.transition(LongSpread, Some(f64::NAN)), LongSpread);
        assert_eq!(t.transition(Flat, Some(f64::INFINITY)), Flat);
    }

    #[test]
    fn test_stateful_machine_matches_fold() {
        let z = [Some(0.0), Some(-2.4), None, Some(-0.3), Some(3.0)];
        let mut machine = SpreadStateMachine::new(thresholds());
        let stepped: Vec<_> = z.iter().map(|&v| machine.step(v)).collect();

        assert_eq!(stepped, thresholds().positions(&z));
        assert_eq!(machine.steps(), 5);
        assert_eq!(machine.state(), ShortSpread);
    }

    #[test]
    fn test_thresholds_from_config() {
        let config = SpreadConfig::default().with_entry(1.5).with_exit(0.25);
        let t = Thresholds::try_from(&config).unwrap();
        assert_eq!(t.entry(), 1.5);
        assert_eq!(t.exit(), 0.25);
    }
}
