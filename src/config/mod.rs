//! Configuration Module
//!
//! Loads and validates configuration from TOML files.

pub mod loader;

pub use loader::{
    Config, DataSourceKind, LoadError, load_config, parse_config,
};
