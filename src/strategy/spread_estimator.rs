//! Ratio & Dispersion Estimator
//!
//! Price ratio of the two legs, its trailing mean and sample standard
//! deviation over `lookback` bars, and the resulting z-score.
//!
//! Z-Score Formula: z = (ratio - rolling_mean) / rolling_std
//!
//! A statistic is undefined (`None`) during warm-up, when any ratio in the
//! window is undefined, and (for z only) when the window has no dispersion.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

use crate::domain::price_series::{is_valid_price, AlignedPair};

/// Std below this fraction of |mean| is treated as zero dispersion
const MIN_RELATIVE_STD: f64 = 1e-12;

/// Estimator output for one time step
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SpreadPoint {
    pub ratio: Option<f64>,
    pub mean: Option<f64>,
    pub std_dev: Option<f64>,
    pub z_score: Option<f64>,
}

/// Ratio of A over B, undefined for unusable prices
pub fn price_ratio(price_a: f64, price_b: f64) -> Option<f64> {
    if !is_valid_price(price_a) || !is_valid_price(price_b) {
        return None;
    }
    let ratio = price_a / price_b;
    ratio.is_finite().then_some(ratio)
}

/// Trailing window of ratio observations
#[derive(Debug, Clone)]
pub struct RatioWindow {
    lookback: usize,
    buffer: VecDeque<Option<f64>>,
}

impl RatioWindow {
    pub fn new(lookback: usize) -> Self {
        Self {
            lookback,
            buffer: VecDeque::with_capacity(lookback),
        }
    }

    /// Add the next ratio and compute the statistics ending at it
    pub fn push(&mut self, ratio: Option<f64>) -> SpreadPoint {
        self.buffer.push_back(ratio);
        if self.buffer.len() > self.lookback {
            self.buffer.pop_front();
        }

        let Some((mean, std_dev)) = self.stats() else {
            return SpreadPoint { ratio, ..Default::default() };
        };

        let z_score = match ratio {
            Some(r) if std_dev > MIN_RELATIVE_STD * mean.abs() => {
                Some((r - mean) / std_dev).filter(|z| z.is_finite())
            }
            _ => None,
        };

        SpreadPoint {
            ratio,
            mean: Some(mean),
            std_dev: Some(std_dev),
            z_score,
        }
    }

    /// Mean and sample std of a full window with no undefined entries
    fn stats(&self) -> Option<(f64, f64)> {
        if !self.is_ready() {
            return None;
        }
        let values = self.buffer.iter().copied().collect::<Option<Vec<f64>>>()?;

        let mean = values.iter().mean();
        let std_dev = values.iter().std_dev();
        (mean.is_finite() && std_dev.is_finite()).then_some((mean, std_dev))
    }

    pub fn lookback(&self) -> usize {
        self.lookback
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Window holds `lookback` observations
    pub fn is_ready(&self) -> bool {
        self.lookback >= 2 && self.buffer.len() >= self.lookback
    }

    pub fn reset(&mut self) {
        self.buffer.clear();
    }
}

/// Run the estimator over an aligned pair, index-aligned to its timestamps
pub fn estimate(pair: &AlignedPair, lookback: usize) -> Vec<SpreadPoint> {
    let mut window = RatioWindow::new(lookback);
    pair.prices_a()
        .iter()
        .zip(pair.prices_b())
        .map(|(&a, &b)| window.push(price_ratio(a, b)))
        .collect()
}
