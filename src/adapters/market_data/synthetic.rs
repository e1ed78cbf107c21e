//! Synthetic Pair Generator
//!
//! Deterministic, seeded price paths for a cointegrated pair:
//! - Leg B follows a geometric Brownian motion
//! - The log ratio ln(A/B) follows a discrete Ornstein-Uhlenbeck process
//!   around ln(ratio_mean)
//! - Leg A = B * exp(log ratio)
//!
//! Observations fall on weekdays only.

use async_trait::async_trait;
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use rand::distributions::Distribution;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use statrs::distribution::Normal;

use crate::domain::price_series::{PricePoint, PriceSeries};
use crate::ports::price_source::{PriceSource, PriceSourceError};

/// Trading days per year used to scale drift and volatility
const PERIODS_PER_YEAR: f64 = 252.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyntheticConfig {
    pub symbol_a: String,
    pub symbol_b: String,
    /// Number of observations to generate
    pub days: usize,
    pub seed: u64,
    pub start: NaiveDate,
    /// Initial price of leg B
    pub start_price: f64,
    /// Annual drift of leg B
    pub drift: f64,
    /// Annual volatility of leg B
    pub volatility: f64,
    /// Equilibrium level of A/B
    pub ratio_mean: f64,
    /// Fraction of the log-ratio gap closed per step (0-1)
    pub ratio_reversion: f64,
    /// Per-step std of log-ratio shocks
    pub ratio_volatility: f64,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            symbol_a: "SYN_A".to_string(),
            symbol_b: "SYN_B".to_string(),
            days: 750,
            seed: 42,
            start: NaiveDate::from_ymd_opt(2018, 1, 2).unwrap_or_default(),
            start_price: 100.0,
            drift: 0.05,
            volatility: 0.20,
            ratio_mean: 0.5,
            ratio_reversion: 0.05,
            ratio_volatility: 0.01,
        }
    }
}

/// Price source backed by the synthetic generator
#[derive(Debug, Clone)]
pub struct SyntheticPairSource {
    config: SyntheticConfig,
}

impl SyntheticPairSource {
    pub fn new(config: SyntheticConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SyntheticConfig {
        &self.config
    }

    /// Generate both legs; identical seeds give identical paths
    pub fn generate(&self) -> Result<(PriceSeries, PriceSeries), PriceSourceError> {
        let c = &self.config;
        if c.days == 0 {
            return Err(PriceSourceError::Generator("days must be > 0".to_string()));
        }
        if !(c.start_price > 0.0 && c.ratio_mean > 0.0) {
            return Err(PriceSourceError::Generator(
                "start_price and ratio_mean must be positive".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&c.ratio_reversion) {
            return Err(PriceSourceError::Generator(format!(
                "ratio_reversion must be within 0-1, got {}",
                c.ratio_reversion
            )));
        }

        let normal = Normal::new(0.0, 1.0).map_err(|e| PriceSourceError::Generator(e.to_string()))?;
        let mut rng = StdRng::seed_from_u64(c.seed);

        let dt = 1.0 / PERIODS_PER_YEAR;
        let step_drift = (c.drift - 0.5 * c.volatility * c.volatility) * dt;
        let step_vol = c.volatility * dt.sqrt();
        let equilibrium = c.ratio_mean.ln();

        let mut log_b = c.start_price.ln();
        let mut log_ratio = equilibrium;
        let mut points_a = Vec::with_capacity(c.days);
        let mut points_b = Vec::with_capacity(c.days);

        for date in weekdays(c.start).take(c.days) {
            let timestamp = date
                .and_hms_opt(0, 0, 0)
                .map(|dt| dt.and_utc())
                .ok_or_else(|| PriceSourceError::Generator(format!("invalid date {}", date)))?;

            let price_b = log_b.exp();
            points_b.push(PricePoint::new(timestamp, price_b));
            points_a.push(PricePoint::new(timestamp, price_b * log_ratio.exp()));

            log_b += step_drift + step_vol * normal.sample(&mut rng);
            log_ratio += c.ratio_reversion * (equilibrium - log_ratio)
                + c.ratio_volatility * normal.sample(&mut rng);
        }

        Ok((
            PriceSeries::new(c.symbol_a.clone(), points_a)?,
            PriceSeries::new(c.symbol_b.clone(), points_b)?,
        ))
    }
}

#[async_trait]
impl PriceSource for SyntheticPairSource {
    async fn fetch_history(
        &self,
        symbol: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<PriceSeries, PriceSourceError> {
        let (a, b) = self.generate()?;
        let series = if symbol == self.config.symbol_a {
            a
        } else if symbol == self.config.symbol_b {
            b
        } else {
            return Err(PriceSourceError::NotFound(symbol.to_string()));
        };

        let points = series
            .points()
            .iter()
            .filter(|p| {
                let date = p.timestamp.date_naive();
                start.map_or(true, |s| date >= s) && end.map_or(true, |e| date <= e)
            })
            .copied()
            .collect();
        Ok(PriceSeries::new(symbol, points)?)
    }
}

/// Weekdays from `start` onwards
fn weekdays(start: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    std::iter::successors(Some(start), |d| d.checked_add_signed(Duration::days(1)))
        .filter(|d| !matches!(d.weekday(), Weekday::Sat | Weekday::Sun))
}
