//! Configuration Loader
//!
//! Loads and validates configuration from TOML files matching config.toml structure.

use chrono::NaiveDate;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::adapters::market_data::SyntheticConfig;
use crate::strategy::params::SpreadConfig;

/// Environment variable overriding `[data] data_dir`
pub const DATA_DIR_ENV: &str = "SPREAD_DATA_DIR";

/// Main configuration structure matching config.toml
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub pair: PairSection,
    pub strategy: StrategySection,
    #[serde(default)]
    pub performance: PerformanceSection,
    #[serde(default)]
    pub data: DataSection,
}

/// Instrument pair configuration section
#[derive(Debug, Clone, Deserialize)]
pub struct PairSection {
    /// Numerator leg of the ratio (e.g. "KO")
    pub symbol_a: String,
    /// Denominator leg of the ratio (e.g. "PEP")
    pub symbol_b: String,
    /// First date to load (inclusive)
    #[serde(default)]
    pub start: Option<NaiveDate>,
    /// Last date to load (inclusive)
    #[serde(default)]
    pub end: Option<NaiveDate>,
}

impl PairSection {
    /// Display label such as "KO/PEP"
    pub fn label(&self) -> String {
        format!("{}/{}", self.symbol_a, self.symbol_b)
    }
}

/// Strategy configuration section
#[derive(Debug, Clone, Deserialize)]
pub struct StrategySection {
    /// Rolling window for mean/std of the ratio (in bars)
    pub lookback: usize,
    /// Enter when |z| > entry_z
    pub entry_z: f64,
    /// Exit when |z| < exit_z
    pub exit_z: f64,
}

/// Performance reporting section
#[derive(Debug, Clone, Deserialize)]
pub struct PerformanceSection {
    /// Trading periods per year (252 for daily bars)
    #[serde(default = "default_annualization")]
    pub annualization_factor: u32,
}

impl Default for PerformanceSection {
    fn default() -> Self {
        Self { annualization_factor: default_annualization() }
    }
}

fn default_annualization() -> u32 {
    252
}

/// Where price history comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DataSourceKind {
    #[default]
    Csv,
    Synthetic,
}

/// Price data configuration section
#[derive(Debug, Clone, Deserialize)]
pub struct DataSection {
    #[serde(default)]
    pub source: DataSourceKind,
    /// Directory holding `<SYMBOL>.csv` files
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    /// Generator parameters when `source = "synthetic"`
    #[serde(default)]
    pub synthetic: SyntheticConfig,
}

impl Default for DataSection {
    fn default() -> Self {
        Self {
            source: DataSourceKind::default(),
            data_dir: default_data_dir(),
            synthetic: SyntheticConfig::default(),
        }
    }
}

fn default_data_dir() -> String {
    "data".to_string()
}

impl DataSection {
    /// Get data directory with environment variable override
    /// Checks SPREAD_DATA_DIR env var first, falls back to config value, expands `~`
    pub fn get_data_dir(&self) -> PathBuf {
        let raw = std::env::var(DATA_DIR_ENV).unwrap_or_else(|_| self.data_dir.clone());
        PathBuf::from(shellexpand::tilde(&raw).into_owned())
    }
}

/// Configuration file errors
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

/// Load configuration from a TOML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, LoadError> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parse and validate configuration from TOML text
pub fn parse_config(content: &str) -> Result<Config, LoadError> {
    let config: Config = toml::from_str(content)?;
    config.validate()?;
    Ok(config)
}

impl Config {
    /// Validate all configuration parameters
    pub fn validate(&self) -> Result<(), LoadError> {
        if self.pair.symbol_a.trim().is_empty() || self.pair.symbol_b.trim().is_empty() {
            return Err(LoadError::ValidationError(
                "symbol_a and symbol_b cannot be empty".to_string(),
            ));
        }

        if self.pair.symbol_a == self.pair.symbol_b {
            return Err(LoadError::ValidationError(format!(
                "symbol_a and symbol_b must differ, both are {}",
                self.pair.symbol_a
            )));
        }

        if let (Some(start), Some(end)) = (self.pair.start, self.pair.end) {
            if start > end {
                return Err(LoadError::ValidationError(format!(
                    "start {} is after end {}",
                    start, end
                )));
            }
        }

        SpreadConfig::from(self)
            .validate()
            .map_err(|e| LoadError::ValidationError(e.to_string()))?;

        if self.data.source == DataSourceKind::Csv && self.data.data_dir.is_empty() {
            return Err(LoadError::ValidationError(
                "data_dir cannot be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Synthetic generator settings with the pair's symbols applied
    pub fn synthetic_config(&self) -> SyntheticConfig {
        SyntheticConfig {
            symbol_a: self.pair.symbol_a.clone(),
            symbol_b: self.pair.symbol_b.clone(),
            ..self.data.synthetic.clone()
        }
    }
}

// Conversion from Config to SpreadConfig
impl From<&Config> for SpreadConfig {
    fn from(config: &Config) -> Self {
        SpreadConfig {
            lookback: config.strategy.lookback,
            entry_z: config.strategy.entry_z,
            exit_z: config.strategy.exit_z,
            annualization_factor: config.performance.annualization_factor,
        }
    }
}
