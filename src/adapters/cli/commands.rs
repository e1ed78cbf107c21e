//! CLI Command Handlers
//!
//! Implementation of all CLI commands for the spread monitor.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use crate::adapters::market_data::{CsvPriceSource, SyntheticConfig, SyntheticPairSource};
use crate::application::{export_json, render_text, summary_json, BacktestResult, SpreadPipeline};
use crate::config::{load_config, Config, DataSourceKind};
use crate::domain::price_series::align_pair;
use crate::ports::PriceSource;
use crate::strategy::SpreadConfig;

/// Spread Monitor - Pairs trading z-score backtester
#[derive(Parser, Debug)]
#[command(
    name = "spread-monitor",
    version = env!("CARGO_PKG_VERSION"),
    author = env!("CARGO_PKG_AUTHORS"),
    about = "Pairs trading spread monitor and backtester",
    long_about = "Tracks the price ratio of two instruments, opens a long or short spread \
                  when its rolling z-score stretches past the entry threshold, closes it \
                  when the z-score reverts, and reports lagged performance."
)]
pub struct CliApp {
    /// The command to execute
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Backtest the pair described by a configuration file
    Run(RunCmd),

    /// Backtest on a seeded synthetic pair, no data files needed
    Simulate(SimulateCmd),

    /// Validate a configuration file and its price data
    Check(CheckCmd),
}

/// Backtest from configuration
#[derive(Parser, Debug)]
pub struct RunCmd {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", default_value = "config/pairs.toml")]
    pub config: PathBuf,

    /// Print the summary as JSON instead of text
    #[arg(long)]
    pub json: bool,

    /// List every round trip
    #[arg(short, long)]
    pub trades: bool,

    /// Export the full result (timeline included) to JSON
    #[arg(long, value_name = "FILE")]
    pub export: Option<PathBuf>,
}

/// Backtest on synthetic data
#[derive(Parser, Debug)]
pub struct SimulateCmd {
    /// Number of observations to generate
    #[arg(short, long, value_name = "DAYS", default_value = "750")]
    pub days: usize,

    /// Random seed
    #[arg(short, long, value_name = "SEED", default_value = "42")]
    pub seed: u64,

    /// Rolling window length
    #[arg(long, value_name = "PERIODS", default_value = "60")]
    pub lookback: usize,

    /// Entry z-score threshold
    #[arg(long, value_name = "Z", default_value = "2.0")]
    pub entry: f64,

    /// Exit z-score threshold
    #[arg(long, value_name = "Z", default_value = "0.5")]
    pub exit: f64,

    /// Periods per year
    #[arg(long, value_name = "PERIODS", default_value = "252")]
    pub annualization: u32,

    /// Print the summary as JSON instead of text
    #[arg(long)]
    pub json: bool,

    /// List every round trip
    #[arg(short, long)]
    pub trades: bool,

    /// Export the full result (timeline included) to JSON
    #[arg(long, value_name = "FILE")]
    pub export: Option<PathBuf>,
}

/// Validate configuration
#[derive(Parser, Debug)]
pub struct CheckCmd {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", default_value = "config/pairs.toml")]
    pub config: PathBuf,
}

/// Execute the CLI command
pub async fn execute(app: CliApp) -> Result<()> {
    // Initialize logging based on flags
    init_logging(app.verbose, app.debug)?;

    match app.command {
        Command::Run(cmd) => run_command(cmd).await,
        Command::Simulate(cmd) => simulate_command(cmd).await,
        Command::Check(cmd) => check_command(cmd).await,
    }
}

/// Initialize logging system
fn init_logging(verbose: bool, debug: bool) -> Result<()> {
    use tracing_subscriber::{fmt, EnvFilter};

    let default_level = if debug {
        "debug"
    } else if verbose {
        "info"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}

/// Price source selected by `[data] source`
fn build_source(config: &Config) -> Box<dyn PriceSource> {
    match config.data.source {
        DataSourceKind::Csv => Box::new(CsvPriceSource::new(config.data.get_data_dir())),
        DataSourceKind::Synthetic => Box::new(SyntheticPairSource::new(config.synthetic_config())),
    }
}

/// Handle run command
async fn run_command(cmd: RunCmd) -> Result<()> {
    tracing::info!("Config: {}", cmd.config.display());

    let config = load_config(&cmd.config)
        .with_context(|| format!("Failed to load configuration from {}", cmd.config.display()))?;
    let pipeline = SpreadPipeline::new(SpreadConfig::from(&config))
        .context("Invalid strategy parameters")?;
    let source = build_source(&config);

    let result = pipeline
        .run_from_source(
            source.as_ref(),
            &config.pair.symbol_a,
            &config.pair.symbol_b,
            config.pair.start,
            config.pair.end,
        )
        .await
        .with_context(|| format!("Backtest failed for {}", config.pair.label()))?;

    output(&result, cmd.json, cmd.trades, cmd.export.as_deref())
}

/// Handle simulate command
async fn simulate_command(cmd: SimulateCmd) -> Result<()> {
    let spread_config = SpreadConfig::default()
        .with_lookback(cmd.lookback)
        .with_entry(cmd.entry)
        .with_exit(cmd.exit)
        .with_annualization(cmd.annualization);
    let pipeline = SpreadPipeline::new(spread_config).context("Invalid strategy parameters")?;

    let synthetic = SyntheticConfig {
        days: cmd.days,
        seed: cmd.seed,
        ..Default::default()
    };
    tracing::info!("Simulating {} days with seed {}", synthetic.days, synthetic.seed);

    let (a, b) = SyntheticPairSource::new(synthetic)
        .generate()
        .context("Failed to generate synthetic pair")?;
    let result = pipeline.run_series(&a, &b)?;

    output(&result, cmd.json, cmd.trades, cmd.export.as_deref())
}

/// Handle check command
async fn check_command(cmd: CheckCmd) -> Result<()> {
    let config = load_config(&cmd.config)
        .with_context(|| format!("Failed to load configuration from {}", cmd.config.display()))?;

    println!("✓ Configuration valid: {}", cmd.config.display());
    println!("  Pair: {}", config.pair.label());
    println!(
        "  Lookback: {}, Entry Z: {}, Exit Z: {}",
        config.strategy.lookback, config.strategy.entry_z, config.strategy.exit_z
    );

    let source = build_source(&config);
    let (a, b) = tokio::try_join!(
        source.fetch_history(&config.pair.symbol_a, config.pair.start, config.pair.end),
        source.fetch_history(&config.pair.symbol_b, config.pair.start, config.pair.end),
    )
    .context("Failed to load price history")?;
    let pair = align_pair(&a, &b).context("Price histories do not overlap")?;

    println!(
        "✓ Price data: {} {} bars, {} {} bars, {} aligned",
        a.len(),
        a.symbol(),
        b.len(),
        b.symbol(),
        pair.len()
    );
    if a.invalid_count() + b.invalid_count() > 0 {
        println!(
            "  Invalid prices: {} in {}, {} in {}",
            a.invalid_count(),
            a.symbol(),
            b.invalid_count(),
            b.symbol()
        );
    }
    if pair.len() <= config.strategy.lookback {
        bail!(
            "Only {} aligned bars, need more than lookback {} for any signal",
            pair.len(),
            config.strategy.lookback
        );
    }

    Ok(())
}

fn output(result: &BacktestResult, json: bool, trades: bool, export: Option<&Path>) -> Result<()> {
    if json {
        println!("{}", summary_json(result)?);
    } else {
        print!("{}", render_text(result, trades));
    }

    if let Some(path) = export {
        export_json(result, path)
            .with_context(|| format!("Failed to export results to {}", path.display()))?;
        println!("Results exported to {}", path.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_app_parse_run() {
        let args = vec!["spread-monitor", "run", "--config", "test.toml"];
        let app = CliApp::try_parse_from(args).unwrap();

        match app.command {
            Command::Run(cmd) => {
                assert_eq!(cmd.config, PathBuf::from("test.toml"));
                assert!(!cmd.json);
                assert!(cmd.export.is_none());
            }
            _ => panic!("Expected Run command"),
        }
    }

    #[test]
    fn test_cli_app_parse_run_with_exports() {
        let args = vec!["spread-monitor", "run", "--json", "-t", "--export", "out.json"];
        let app = CliApp::try_parse_from(args).unwrap();

        match app.command {
            Command::Run(cmd) => {
                assert!(cmd.json);
                assert!(cmd.trades);
                assert_eq!(cmd.export, Some(PathBuf::from("out.json")));
            }
            _ => panic!("Expected Run command"),
        }
    }

    #[test]
    fn test_default_config_path() {
        let args = vec!["spread-monitor", "run"];
        let app = CliApp::try_parse_from(args).unwrap();

        match app.command {
            Command::Run(cmd) => {
                assert_eq!(cmd.config, PathBuf::from("config/pairs.toml"));
            }
            _ => panic!("Expected Run command"),
        }
    }

    #[test]
    fn test_cli_app_parse_simulate_defaults() {
        let args = vec!["spread-monitor", "simulate"];
        let app = CliApp::try_parse_from(args).unwrap();

        match app.command {
            Command::Simulate(cmd) => {
                assert_eq!(cmd.days, 750);
                assert_eq!(cmd.seed, 42);
                assert_eq!(cmd.lookback, 60);
                assert_eq!(cmd.entry, 2.0);
                assert_eq!(cmd.exit, 0.5);
                assert_eq!(cmd.annualization, 252);
            }
            _ => panic!("Expected Simulate command"),
        }
    }

    #[test]
    fn test_cli_app_parse_simulate_with_overrides() {
        let args = vec![
            "spread-monitor", "simulate", "--days", "500", "--seed", "7", "--lookback", "20",
            "--entry", "1.5", "--exit", "0.25",
        ];
        let app = CliApp::try_parse_from(args).unwrap();

        match app.command {
            Command::Simulate(cmd) => {
                assert_eq!(cmd.days, 500);
                assert_eq!(cmd.seed, 7);
                assert_eq!(cmd.lookback, 20);
                assert_eq!(cmd.entry, 1.5);
                assert_eq!(cmd.exit, 0.25);
            }
            _ => panic!("Expected Simulate command"),
        }
    }

    #[test]
    fn test_cli_app_parse_check() {
        let args = vec!["spread-monitor", "check", "-c", "pairs.toml"];
        let app = CliApp::try_parse_from(args).unwrap();

        assert!(matches!(app.command, Command::Check(ref cmd) if cmd.config == PathBuf::from("pairs.toml")));
    }

    #[test]
    fn test_global_flags() {
        let args = vec!["spread-monitor", "-v", "--debug", "simulate"];
        let app = CliApp::try_parse_from(args).unwrap();

        assert!(app.verbose);
        assert!(app.debug);
    }

    #[test]
    fn test_unknown_command_rejected() {
        let args = vec!["spread-monitor", "swap"];
        assert!(CliApp::try_parse_from(args).is_err());
    }
}
