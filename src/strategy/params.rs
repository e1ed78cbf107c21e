//! Strategy Parameters
//!
//! Configuration for the spread strategy. Defaults match the classic daily
//! setup: 60-bar lookback, enter beyond 2 standard deviations, exit inside 0.5.

use serde::{Deserialize, Serialize};

/// Main spread strategy configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpreadConfig {
    /// Number of bars for the rolling mean/std of the ratio (L)
    pub lookback: usize,
    /// Enter when |z| exceeds this (E)
    pub entry_z: f64,
    /// Exit when |z| falls below this (X), must satisfy 0 <= X < E
    pub exit_z: f64,
    /// Trading periods per year used to annualize metrics (A)
    pub annualization_factor: u32,
}

impl Default for SpreadConfig {
    fn default() -> Self {
        Self {
            lookback: 60,
            entry_z: 2.0,
            exit_z: 0.5,
            annualization_factor: 252,
        }
    }
}

impl SpreadConfig {
    pub fn with_lookback(mut self, lookback: usize) -> Self {
        self.lookback = lookback;
        self
    }

    pub fn with_entry(mut self, entry_z: f64) -> Self {
        self.entry_z = entry_z;
        self
    }

    pub fn with_exit(mut self, exit_z: f64) -> Self {
        self.exit_z = exit_z;
        self
    }

    pub fn with_annualization(mut self, periods: u32) -> Self {
        self.annualization_factor = periods;
        self
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.lookback < 2 {
            return Err(ConfigError::InvalidLookback(self.lookback));
        }
        validate_thresholds(self.entry_z, self.exit_z)?;
        if self.annualization_factor == 0 {
            return Err(ConfigError::InvalidAnnualization(self.annualization_factor));
        }
        Ok(())
    }
}

/// Check the hysteresis band `0 <= X < E`
pub fn validate_thresholds(entry_z: f64, exit_z: f64) -> Result<(), ConfigError> {
    if !entry_z.is_finite() || entry_z <= 0.0 {
        return Err(ConfigError::InvalidEntryThreshold(entry_z));
    }
    if !exit_z.is_finite() || exit_z < 0.0 || exit_z >= entry_z {
        return Err(ConfigError::InvalidExitThreshold { exit: exit_z, entry: entry_z });
    }
    Ok(())
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid lookback: {0} (minimum 2)")]
    InvalidLookback(usize),
    #[error("Invalid entry threshold: {0} (must be > 0)")]
    InvalidEntryThreshold(f64),
    #[error("Invalid exit threshold: {exit} (must be 0 <= exit < entry {entry})")]
    InvalidExitThreshold { exit: f64, entry: f64 },
    #[error("Invalid annualization factor: {0} (must be > 0)")]
    InvalidAnnualization(u32),
}
