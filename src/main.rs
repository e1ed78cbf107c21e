//! Spread Monitor - Pairs Trading Z-Score Backtester
//!
//! Ratio z-score entry/exit on a pair of instruments with lagged performance reporting.

use anyhow::Result;

use spread_monitor::adapters::cli;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (SPREAD_DATA_DIR, RUST_LOG)
    dotenvy::dotenv().ok();

    let app = cli::init();
    cli::execute(app).await
}
