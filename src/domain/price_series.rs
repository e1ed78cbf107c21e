//! Price Series and Pair Alignment
//!
//! A `PriceSeries` is an ordered sequence of `(timestamp, price)` observations
//! for one instrument. Two series are only usable together once they share an
//! identical timestamp set, represented by `AlignedPair`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Single price observation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub timestamp: DateTime<Utc>,
    pub price: f64,
}

impl PricePoint {
    pub fn new(timestamp: DateTime<Utc>, price: f64) -> Self {
        Self { timestamp, price }
    }

    /// A price is usable only when finite and strictly positive
    pub fn is_valid(&self) -> bool {
        is_valid_price(self.price)
    }
}

/// Check a raw price for use in ratio and return calculations
pub fn is_valid_price(price: f64) -> bool {
    price.is_finite() && price > 0.0
}

/// Errors constructing a single price series
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SeriesError {
    #[error("Price series for {0} is empty")]
    Empty(String),
    #[error("Price series for {symbol}: timestamp {timestamp} at index {index} is not after its predecessor")]
    NonIncreasing {
        symbol: String,
        index: usize,
        timestamp: DateTime<Utc>,
    },
}

/// Errors pairing two price series
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DataAlignmentError {
    #[error("Length mismatch: {left} has {left_len} points, {right} has {right_len}")]
    LengthMismatch {
        left: String,
        right: String,
        left_len: usize,
        right_len: usize,
    },
    #[error("Timestamp mismatch at index {index}: {left_ts} vs {right_ts}")]
    TimestampMismatch {
        index: usize,
        left_ts: DateTime<Utc>,
        right_ts: DateTime<Utc>,
    },
    #[error("No overlapping timestamps between {left} and {right}")]
    NoOverlap { left: String, right: String },
}

/// Ordered price history for one instrument
///
/// Timestamps are strictly increasing. Prices are stored as delivered; a
/// non-finite or non-positive price is kept so that downstream stages can mark
/// that step as undefined instead of dropping it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    symbol: String,
    points: Vec<PricePoint>,
}

impl PriceSeries {
    pub fn new(symbol: impl Into<String>, points: Vec<PricePoint>) -> Result<Self, SeriesError> {
        let symbol = symbol.into();
        if points.is_empty() {
            return Err(SeriesError::Empty(symbol));
        }

        for (index, pair) in points.windows(2).enumerate() {
            if pair[1].timestamp <= pair[0].timestamp {
                return Err(SeriesError::NonIncreasing {
                    symbol,
                    index: index + 1,
                    timestamp: pair[1].timestamp,
                });
            }
        }

        Ok(Self { symbol, points })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of observations that are unusable as prices
    pub fn invalid_count(&self) -> usize {
        self.points.iter().filter(|p| !p.is_valid()).count()
    }
}

/// Two price series sharing one timestamp index
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlignedPair {
    symbol_a: String,
    symbol_b: String,
    timestamps: Vec<DateTime<Utc>>,
    prices_a: Vec<f64>,
    prices_b: Vec<f64>,
}

impl AlignedPair {
    /// Pair two series whose timestamp sets must already be identical
    pub fn try_new(a: &PriceSeries, b: &PriceSeries) -> Result<Self, DataAlignmentError> {
        if a.len() != b.len() {
            return Err(DataAlignmentError::LengthMismatch {
                left: a.symbol.clone(),
                right: b.symbol.clone(),
                left_len: a.len(),
                right_len: b.len(),
            });
        }

        for (index, (pa, pb)) in a.points.iter().zip(&b.points).enumerate() {
            if pa.timestamp != pb.timestamp {
                return Err(DataAlignmentError::TimestampMismatch {
                    index,
                    left_ts: pa.timestamp,
                    right_ts: pb.timestamp,
                });
            }
        }

        Ok(Self {
            symbol_a: a.symbol.clone(),
            symbol_b: b.symbol.clone(),
            timestamps: a.points.iter().map(|p| p.timestamp).collect(),
            prices_a: a.points.iter().map(|p| p.price).collect(),
            prices_b: b.points.iter().map(|p| p.price).collect(),
        })
    }

    pub fn symbol_a(&self) -> &str {
        &self.symbol_a
    }

    pub fn symbol_b(&self) -> &str {
        &self.symbol_b
    }

    pub fn timestamps(&self) -> &[DateTime<Utc>] {
        &self.timestamps
    }

    pub fn prices_a(&self) -> &[f64] {
        &self.prices_a
    }

    pub fn prices_b(&self) -> &[f64] {
        &self.prices_b
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }
}

/// Align two series on the intersection of their timestamps
///
/// Timestamps present in only one series are dropped. Fails only when nothing
/// overlaps.
pub fn align_pair(a: &PriceSeries, b: &PriceSeries) -> Result<AlignedPair, DataAlignmentError> {
    let mut left = Vec::with_capacity(a.len().min(b.len()));
    let mut right = Vec::with_capacity(left.capacity());

    let (mut i, mut j) = (0, 0);
    while i < a.points.len() && j < b.points.len() {
        let (pa, pb) = (a.points[i], b.points[j]);
        if pa.timestamp == pb.timestamp {
            left.push(pa);
            right.push(pb);
            i += 1;
            j += 1;
        } else if pa.timestamp < pb.timestamp {
            i += 1;
        } else {
            j += 1;
        }
    }

    if left.is_empty() {
        return Err(DataAlignmentError::NoOverlap {
            left: a.symbol.clone(),
            right: b.symbol.clone(),
        });
    }

    let dropped = a.len() + b.len() - 2 * left.len();
    if dropped > 0 {
        tracing::debug!(
            "Aligned {}/{}: dropped {} unmatched observations, {} remain",
            a.symbol, b.symbol, dropped, left.len()
        );
    }

    // Intersection of two strictly increasing sequences is strictly increasing
    let left = PriceSeries { symbol: a.symbol.clone(), points: left };
    let right = PriceSeries { symbol: b.symbol.clone(), points: right };
    AlignedPair::try_new(&left, &right)
}
