//! Backtest Report Output
//!
//! Text summary for the console and JSON export of a `BacktestResult`.

use std::fmt::{self, Write as _};
use std::path::Path;

use serde::Serialize;
use thiserror::Error;

use crate::application::pipeline::BacktestResult;
use crate::domain::performance::PerformanceSummary;
use crate::domain::trade::TradeRecord;
use crate::strategy::params::SpreadConfig;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Failed to write report: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to serialize report: {0}")]
    Json(#[from] serde_json::Error),
}

/// Summary view without the per-step timeline
#[derive(Debug, Serialize)]
pub struct ReportSummary<'a> {
    pub pair: String,
    pub config: &'a SpreadConfig,
    pub summary: &'a PerformanceSummary,
    pub trades: &'a [TradeRecord],
}

impl<'a> From<&'a BacktestResult> for ReportSummary<'a> {
    fn from(result: &'a BacktestResult) -> Self {
        Self {
            pair: format!("{}/{}", result.symbol_a, result.symbol_b),
            config: &result.config,
            summary: &result.summary,
            trades: &result.trades,
        }
    }
}

fn percent(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.2}%", v * 100.0),
        None => "undefined".to_string(),
    }
}

/// Console summary of one run
pub fn render_text(result: &BacktestResult, show_trades: bool) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail
    let _ = write_summary(&mut out, result, show_trades);
    out
}

fn write_summary(out: &mut String, result: &BacktestResult, show_trades: bool) -> fmt::Result {
    let s = &result.summary;
    let c = &result.config;
    let sharpe = s
        .sharpe_ratio
        .map_or_else(|| "undefined".to_string(), |v| format!("{:.2}", v));

    writeln!(out, "Pairs Trading Strategy (Z-score Spread)")?;
    writeln!(out, "--------------------------------------")?;
    writeln!(out, "Pair: {} / {}", result.symbol_a, result.symbol_b)?;
    writeln!(out, "Lookback: {}, Entry Z: {}, Exit Z: {}", c.lookback, c.entry_z, c.exit_z)?;
    writeln!(out, "Observations: {}", s.observations)?;
    writeln!(out, "Annualized Return: {}", percent(s.annualized_return))?;
    writeln!(out, "Annualized Vol: {}", percent(s.annualized_volatility))?;
    writeln!(out, "Sharpe (approx): {}", sharpe)?;
    writeln!(out, "Max Drawdown: {}", percent(Some(s.max_drawdown)))?;
    writeln!(out, "Number of trade-days (in position): {}", s.trade_days)?;
    writeln!(out, "Round trips: {}", result.trades.len())?;

    if show_trades {
        for trade in &result.trades {
            writeln!(out, "  {}", trade)?;
        }
    }

    Ok(())
}

/// Summary (config, metrics, trades) as pretty JSON
pub fn summary_json(result: &BacktestResult) -> Result<String, ReportError> {
    Ok(serde_json::to_string_pretty(&ReportSummary::from(result))?)
}

/// Write the full result, timeline included, as pretty JSON
pub fn export_json(result: &BacktestResult, path: &Path) -> Result<(), ReportError> {
    let file = std::fs::File::create(path)?;
    serde_json::to_writer_pretty(std::io::BufWriter::new(file), result)?;
    tracing::info!("Exported {} steps to {}", result.timeline.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::pipeline::SpreadPipeline;
    use crate::domain::price_series::{PricePoint, PriceSeries};
    use chrono::{Duration, TimeZone, Utc};
    use tempfile::NamedTempFile;

    fn flat_result() -> BacktestResult {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mk = |symbol: &str, price: f64| {
            let points = (0..5)
                .map(|i| PricePoint::new(start + Duration::days(i), price))
                .collect();
            PriceSeries::new(symbol, points).unwrap()
        };
        SpreadPipeline::new(SpreadConfig::default().with_lookback(3))
            .unwrap()
            .run_series(&mk("KO", 60.0), &mk("PEP", 150.0))
            .unwrap()
    }

    #[test]
    fn test_render_text_marks_undefined_sharpe() {
        let text = render_text(&flat_result(), true);
        assert!(text.contains("Pair: KO / PEP"));
        assert!(text.contains("Sharpe (approx): undefined"));
        assert!(text.contains("Max Drawdown: 0.00%"));
        assert!(text.contains("Number of trade-days (in position): 0"));
    }

    #[test]
    fn test_render_text_lists_every_field_and_trade() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let a = [50.0, 50.5, 49.5, 50.0, 50.5, 49.5, 50.0, 50.5, 58.0, 57.0, 50.0, 50.2];
        let points = |prices: &[f64]| {
            prices
                .iter()
                .enumerate()
                .map(|(i, &p)| PricePoint::new(start + Duration::days(i as i64), p))
                .collect()
        };
        let result = SpreadPipeline::new(SpreadConfig::default().with_lookback(8))
            .unwrap()
            .run_series(
                &PriceSeries::new("A", points(&a)).unwrap(),
                &PriceSeries::new("B", points(&[100.0; 12])).unwrap(),
            )
            .unwrap();
        assert_eq!(result.trades.len(), 1);

        let brief = render_text(&result, false);
        let full = render_text(&result, true);
        assert_eq!(brief.lines().count(), 11);
        assert_eq!(full.lines().count(), 12);
        assert!(full.starts_with(&brief));
        assert!(brief.contains("Round trips: 1"));
        assert!(full.lines().last().unwrap().starts_with("  "));
    }

    #[test]
    fn test_summary_json_omits_timeline() {
        let json = summary_json(&flat_result()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["pair"], "KO/PEP");
        assert_eq!(value["config"]["lookback"], 3);
        assert!(value["summary"]["sharpe_ratio"].is_null());
        assert!(value.get("timeline").is_none());
    }

    #[test]
    fn test_export_json_writes_timeline() {
        let file = NamedTempFile::new().unwrap();
        export_json(&flat_result(), file.path()).unwrap();

        let content = std::fs::read_to_string(file.path()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(value["timeline"].as_array().unwrap().len(), 5);
        assert_eq!(value["timeline"][0]["position"], "Flat");
    }
}
