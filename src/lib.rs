//! Spread Monitor - Pairs Trading Z-Score Library
//!
//! Monitors the price ratio of two related instruments, trades its rolling
//! z-score with entry/exit hysteresis, and scores the result with lagged returns.
//!
//! # Modules
//!
//! - `domain`: Core types (PriceSeries, TradeState, returns, performance metrics)
//! - `ports`: Trait abstractions (PriceSource)
//! - `strategy`: Ratio estimator, z-score and the spread state machine
//! - `adapters`: External implementations (CSV files, synthetic data, CLI)
//! - `config`: Configuration loading and validation
//! - `application`: Batch pipeline, streaming monitor and reports

pub mod domain;
pub mod ports;
pub mod strategy;
pub mod adapters;
pub mod config;
pub mod application;
