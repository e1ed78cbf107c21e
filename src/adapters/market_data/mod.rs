//! Market Data Adapters
//!
//! Implementations of `PriceSource`:
//! - `CsvPriceSource`: daily closes from per-symbol CSV files
//! - `SyntheticPairSource`: seeded cointegrated pair for demos and tests

mod csv_file;
mod synthetic;

pub use csv_file::{parse_csv, parse_timestamp, CsvPriceSource};
pub use synthetic::{SyntheticConfig, SyntheticPairSource};
