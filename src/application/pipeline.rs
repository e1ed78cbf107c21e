//! Spread Pipeline
//!
//! Batch run over an aligned pair, strictly forward:
//! ratio & z-score -> state machine -> lagged returns -> performance summary.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::domain::performance::{summarize, PerformanceSummary};
use crate::domain::price_series::{align_pair, AlignedPair, DataAlignmentError, PriceSeries};
use crate::domain::returns::{equity_curve, lagged_strategy_returns, simple_returns};
use crate::domain::trade::{trade_log, TradeRecord};
use crate::domain::trade_state::TradeState;
use crate::ports::price_source::{PriceSource, PriceSourceError};
use crate::strategy::params::{ConfigError, SpreadConfig};
use crate::strategy::spread_estimator::estimate;
use crate::strategy::state_machine::Thresholds;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Data alignment error: {0}")]
    Alignment(#[from] DataAlignmentError),
    #[error("Price source error: {0}")]
    Source(#[from] PriceSourceError),
}

/// Every per-step output of the pipeline for one timestamp
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StepRecord {
    pub timestamp: DateTime<Utc>,
    pub price_a: f64,
    pub price_b: f64,
    pub ratio: Option<f64>,
    pub mean: Option<f64>,
    pub std_dev: Option<f64>,
    pub z_score: Option<f64>,
    /// State decided at this step, first applied to the next step's return
    pub position: TradeState,
    /// Return earned by the previous step's position
    pub strategy_return: f64,
    pub equity: f64,
}

/// Output of one pipeline run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BacktestResult {
    pub symbol_a: String,
    pub symbol_b: String,
    pub config: SpreadConfig,
    pub summary: PerformanceSummary,
    pub trades: Vec<TradeRecord>,
    pub timeline: Vec<StepRecord>,
}

impl BacktestResult {
    pub fn ratios(&self) -> Vec<Option<f64>> {
        self.timeline.iter().map(|s| s.ratio).collect()
    }

    pub fn z_scores(&self) -> Vec<Option<f64>> {
        self.timeline.iter().map(|s| s.z_score).collect()
    }

    pub fn positions(&self) -> Vec<TradeState> {
        self.timeline.iter().map(|s| s.position).collect()
    }

    pub fn strategy_returns(&self) -> Vec<f64> {
        self.timeline.iter().map(|s| s.strategy_return).collect()
    }

    pub fn equity_curve(&self) -> Vec<f64> {
        self.timeline.iter().map(|s| s.equity).collect()
    }
}

/// Validated pipeline ready to run on price data
#[derive(Debug, Clone)]
pub struct SpreadPipeline {
    config: SpreadConfig,
    thresholds: Thresholds,
}

impl SpreadPipeline {
    pub fn new(config: SpreadConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let thresholds = Thresholds::try_from(&config)?;
        Ok(Self { config, thresholds })
    }

    pub fn config(&self) -> &SpreadConfig {
        &self.config
    }

    /// Run all stages over an aligned pair
    pub fn run(&self, pair: &AlignedPair) -> BacktestResult {
        tracing::info!(
            "Running spread pipeline on {}/{} ({} observations, lookback {})",
            pair.symbol_a(),
            pair.symbol_b(),
            pair.len(),
            self.config.lookback
        );

        let spread = estimate(pair, self.config.lookback);
        let z_scores: Vec<Option<f64>> = spread.iter().map(|p| p.z_score).collect();
        let undefined = z_scores.iter().filter(|z| z.is_none()).count();
        tracing::debug!("Z-score undefined on {} of {} steps", undefined, z_scores.len());

        let positions = self.thresholds.positions(&z_scores);

        let returns_a = simple_returns(pair.prices_a());
        let returns_b = simple_returns(pair.prices_b());
        let strategy_returns = lagged_strategy_returns(&positions, &returns_a, &returns_b);
        let equity = equity_curve(&strategy_returns);

        let summary = summarize(
            &strategy_returns,
            &equity,
            &positions,
            self.config.annualization_factor,
        );
        let trades = trade_log(pair.timestamps(), &positions, &strategy_returns);

        tracing::info!(
            "Pipeline complete: {} trades, {} trade-days, final equity {:.4}",
            trades.len(),
            summary.trade_days,
            summary.final_equity
        );

        let timeline = (0..pair.len())
            .map(|t| StepRecord {
                timestamp: pair.timestamps()[t],
                price_a: pair.prices_a()[t],
                price_b: pair.prices_b()[t],
                ratio: spread[t].ratio,
                mean: spread[t].mean,
                std_dev: spread[t].std_dev,
                z_score: spread[t].z_score,
                position: positions[t],
                strategy_return: strategy_returns[t],
                equity: equity[t],
            })
            .collect();

        BacktestResult {
            symbol_a: pair.symbol_a().to_string(),
            symbol_b: pair.symbol_b().to_string(),
            config: self.config.clone(),
            summary,
            trades,
            timeline,
        }
    }

    /// Run on two series that must share an identical timestamp set
    pub fn run_series(&self, a: &PriceSeries, b: &PriceSeries) -> Result<BacktestResult, PipelineError> {
        let pair = AlignedPair::try_new(a, b)?;
        Ok(self.run(&pair))
    }

    /// Fetch both legs, align them on common timestamps and run
    pub async fn run_from_source<S: PriceSource + ?Sized>(
        &self,
        source: &S,
        symbol_a: &str,
        symbol_b: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<BacktestResult, PipelineError> {
        let (a, b) = tokio::try_join!(
            source.fetch_history(symbol_a, start, end),
            source.fetch_history(symbol_b, start, end),
        )?;

        if a.invalid_count() + b.invalid_count() > 0 {
            tracing::warn!(
                "Invalid prices: {} in {}, {} in {}; affected steps carry no signal",
                a.invalid_count(),
                symbol_a,
                b.invalid_count(),
                symbol_b
            );
        }

        let pair = align_pair(&a, &b)?;
        Ok(self.run(&pair))
    }
}
