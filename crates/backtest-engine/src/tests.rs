use std::collections::HashMap;

use chrono::{TimeZone, Utc};
use rust_decimal::prelude::*;
use rust_decimal_macros::dec;

use watchlist_core::PricePoint;

use crate::engine::run_dca;
use crate::models::DcaConfig;

/// Helper: a monthly observation for 2024.
fn point(month: u32, close: Option<f64>) -> PricePoint {
    PricePoint {
        timestamp: Utc.with_ymd_and_hms(2024, month, 1, 0, 0, 0).unwrap(),
        close,
    }
}

fn config(monthly: Decimal) -> DcaConfig {
    DcaConfig {
        monthly_contribution: monthly,
        start_year: 2024,
    }
}

#[test]
fn two_month_contribution_accumulates_fractional_shares() {
    // $25/month at closes [100, 50]: 0.25 + 0.5 = 0.75 shares, $50 invested,
    // marked at 50 → $37.50, gain -$12.50, return -25.00%.
    let mut data = HashMap::new();
    data.insert(
        "AAPL".to_string(),
        vec![point(1, Some(100.0)), point(2, Some(50.0))],
    );

    let report = run_dca(&data, &config(dec!(25)));

    assert_eq!(report.symbols.len(), 1);
    let result = &report.symbols[0];
    assert_eq!(result.shares, dec!(0.75));
    assert_eq!(result.invested, dec!(50));
    assert_eq!(result.current_value, dec!(37.50));
    assert_eq!(result.gain, dec!(-12.50));
    assert_eq!(result.return_pct, -25.0);

    assert_eq!(report.totals.invested, dec!(50));
    assert_eq!(report.totals.return_pct, -25.0);
}

#[test]
fn missing_closes_are_forward_filled() {
    // The null February close fills from January's 100: two contributions at
    // 100, one at 50.
    let mut data = HashMap::new();
    data.insert(
        "MSFT".to_string(),
        vec![point(1, Some(100.0)), point(2, None), point(3, Some(50.0))],
    );

    let report = run_dca(&data, &config(dec!(25)));

    let result = &report.symbols[0];
    assert_eq!(result.months, 3);
    assert_eq!(result.invested, dec!(75));
    assert_eq!(result.shares, dec!(1.0));
    assert_eq!(result.current_value, dec!(50));
}

#[test]
fn leading_nulls_are_dropped_not_zero_filled() {
    let mut data = HashMap::new();
    data.insert(
        "IPO".to_string(),
        vec![point(1, None), point(2, None), point(3, Some(10.0))],
    );

    let report = run_dca(&data, &config(dec!(25)));

    let result = &report.symbols[0];
    assert_eq!(result.months, 1);
    assert_eq!(result.invested, dec!(25));
    assert_eq!(result.shares, dec!(2.5));
}

#[test]
fn symbols_without_data_are_skipped_from_totals() {
    let mut data = HashMap::new();
    data.insert(
        "AAPL".to_string(),
        vec![point(1, Some(100.0)), point(2, Some(110.0))],
    );
    data.insert("GHOST".to_string(), Vec::new());

    let report = run_dca(&data, &config(dec!(25)));

    assert_eq!(report.symbols.len(), 1);
    assert_eq!(report.skipped, vec!["GHOST".to_string()]);
    assert_eq!(report.totals.invested, dec!(50));
}

#[test]
fn aggregate_sums_across_symbols() {
    let mut data = HashMap::new();
    data.insert(
        "AAA".to_string(),
        vec![point(1, Some(100.0)), point(2, Some(50.0))],
    );
    data.insert(
        "BBB".to_string(),
        vec![point(1, Some(10.0)), point(2, Some(20.0))],
    );

    let report = run_dca(&data, &config(dec!(25)));

    // AAA: 0.75 shares @ 50 = 37.50. BBB: 3.75 shares @ 20 = 75.00.
    assert_eq!(report.totals.invested, dec!(100));
    assert_eq!(report.totals.current_value, dec!(112.50));
    assert_eq!(report.totals.gain, dec!(12.50));
    assert_eq!(report.totals.return_pct, 12.5);

    // Per-symbol results come back sorted.
    assert_eq!(report.symbols[0].symbol, "AAA");
    assert_eq!(report.symbols[1].symbol, "BBB");
}

#[test]
fn zero_contribution_guards_return_percent() {
    let mut data = HashMap::new();
    data.insert(
        "AAPL".to_string(),
        vec![point(1, Some(100.0)), point(2, Some(110.0))],
    );

    let report = run_dca(&data, &config(Decimal::ZERO));

    assert_eq!(report.symbols[0].return_pct, 0.0);
    assert_eq!(report.totals.return_pct, 0.0);
}
