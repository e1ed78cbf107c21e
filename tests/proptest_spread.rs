//! Property-based tests for the spread pipeline
//!
//! These tests use proptest to verify invariants across many random price
//! paths: causality, warm-up, hysteresis and the one-step execution lag.

use chrono::{Duration, TimeZone, Utc};
use proptest::prelude::*;

use spread_monitor::application::{BacktestResult, SpreadMonitor, SpreadPipeline};
use spread_monitor::domain::performance::max_drawdown;
use spread_monitor::domain::{PricePoint, PriceSeries, TradeState};
use spread_monitor::strategy::SpreadConfig;

fn series(symbol: &str, prices: &[f64]) -> PriceSeries {
    let start = Utc.with_ymd_and_hms(2022, 1, 3, 0, 0, 0).unwrap();
    let points = prices
        .iter()
        .enumerate()
        .map(|(i, &p)| PricePoint::new(start + Duration::days(i as i64), p))
        .collect();
    PriceSeries::new(symbol, points).unwrap()
}

fn run(config: &SpreadConfig, a: &[f64], b: &[f64]) -> BacktestResult {
    SpreadPipeline::new(config.clone())
        .unwrap()
        .run_series(&series("A", a), &series("B", b))
        .unwrap()
}

/// Two equal-length price legs
fn legs() -> impl Strategy<Value = (Vec<f64>, Vec<f64>)> {
    (20usize..120).prop_flat_map(|n| {
        (
            prop::collection::vec(50.0f64..150.0, n),
            prop::collection::vec(50.0f64..150.0, n),
        )
    })
}

/// Valid lookback and thresholds with exit < entry
fn config() -> impl Strategy<Value = SpreadConfig> {
    (2usize..15, 0.5f64..2.5, 0.0f64..1.0).prop_map(|(lookback, entry, exit_frac)| {
        SpreadConfig::default()
            .with_lookback(lookback)
            .with_entry(entry)
            .with_exit(entry * exit_frac)
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Outputs up to step k do not depend on prices after k
    #[test]
    fn no_look_ahead((a, b) in legs(), config in config(), cut in 0.0f64..1.0) {
        let k = ((a.len() - 1) as f64 * cut) as usize;
        let full = run(&config, &a, &b);
        let truncated = run(&config, &a[..=k], &b[..=k]);

        prop_assert_eq!(&full.timeline[..=k], &truncated.timeline[..]);
    }

    /// Running twice on the same input gives the same result
    #[test]
    fn run_is_deterministic((a, b) in legs(), config in config()) {
        prop_assert_eq!(run(&config, &a, &b), run(&config, &a, &b));
    }

    /// Nothing is defined before the window fills
    #[test]
    fn warm_up_is_flat((a, b) in legs(), config in config()) {
        let result = run(&config, &a, &b);
        let warm = (config.lookback - 1).min(result.timeline.len());

        for step in &result.timeline[..warm] {
            prop_assert!(step.z_score.is_none());
            prop_assert_eq!(step.position, TradeState::Flat);
        }
        for step in &result.timeline[warm..] {
            prop_assert!(step.mean.is_some());
        }
    }

    /// Long and short are only reached through flat
    #[test]
    fn no_direct_reversal((a, b) in legs(), config in config()) {
        let positions = run(&config, &a, &b).positions();
        for pair in positions.windows(2) {
            let reversal = matches!(
                (pair[0], pair[1]),
                (TradeState::LongSpread, TradeState::ShortSpread)
                    | (TradeState::ShortSpread, TradeState::LongSpread)
            );
            prop_assert!(!reversal);
        }
    }

    /// Entries need |z| beyond the entry band, exits need |z| inside the exit band
    #[test]
    fn transitions_respect_thresholds((a, b) in legs(), config in config()) {
        let result = run(&config, &a, &b);
        for pair in result.timeline.windows(2) {
            let (prev, cur) = (&pair[0], &pair[1]);
            if prev.position == cur.position {
                continue;
            }
            let z = cur.z_score.expect("state changed on an undefined z-score");
            match cur.position {
                TradeState::ShortSpread => prop_assert!(z > config.entry_z),
                TradeState::LongSpread => prop_assert!(z < -config.entry_z),
                TradeState::Flat => prop_assert!(z.abs() < config.exit_z),
            }
        }
    }

    /// A step's return is earned by the previous step's position
    #[test]
    fn returns_are_lagged((a, b) in legs(), config in config()) {
        let result = run(&config, &a, &b);
        prop_assert_eq!(result.timeline[0].strategy_return, 0.0);

        for t in 1..result.timeline.len() {
            let held = result.timeline[t - 1].position;
            let ra = a[t] / a[t - 1] - 1.0;
            let rb = b[t] / b[t - 1] - 1.0;
            let expected = held.exposure() * (ra - rb);
            prop_assert!((result.timeline[t].strategy_return - expected).abs() < 1e-12);
        }
    }

    /// Summary counts and drawdown agree with the timeline
    #[test]
    fn summary_matches_timeline((a, b) in legs(), config in config()) {
        let result = run(&config, &a, &b);
        let equity = result.equity_curve();

        prop_assert_eq!(result.summary.observations, a.len());
        prop_assert_eq!(
            result.summary.trade_days,
            result.positions().iter().filter(|p| p.is_open()).count()
        );
        prop_assert!(result.summary.max_drawdown <= 0.0);
        prop_assert_eq!(result.summary.max_drawdown, max_drawdown(&equity));
    }

    /// Tick-by-tick processing reproduces the batch run exactly
    #[test]
    fn streaming_matches_batch((a, b) in legs(), config in config()) {
        let batch = run(&config, &a, &b);
        let mut monitor = SpreadMonitor::new(&config).unwrap();

        for (i, expected) in batch.timeline.iter().enumerate() {
            let tick = monitor.on_tick(expected.timestamp, a[i], b[i]).unwrap();
            prop_assert_eq!(&tick, expected);
        }
    }
}
