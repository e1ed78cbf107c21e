use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

use crate::domain::price_series::{PriceSeries, SeriesError};

/// Price source error type
#[derive(Error, Debug)]
pub enum PriceSourceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("No price history for symbol: {0}")]
    NotFound(String),

    #[error("Parse error in {source_name} line {line}: {message}")]
    Parse {
        source_name: String,
        line: usize,
        message: String,
    },

    #[error("Invalid series: {0}")]
    Series(#[from] SeriesError),

    #[error("Generator error: {0}")]
    Generator(String),
}

/// Historical price provider for one instrument at a time
///
/// `start` and `end` are inclusive calendar-date bounds; `None` leaves that
/// side open.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PriceSource: Send + Sync {
    async fn fetch_history(
        &self,
        symbol: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<PriceSeries, PriceSourceError>;
}
