use std::collections::HashMap;

use rust_decimal::prelude::*;
use rust_decimal_macros::dec;

use watchlist_core::PricePoint;

use crate::models::{DcaConfig, DcaReport, DcaTotals, SymbolDca};

/// Run a dollar-cost-averaging simulation over monthly closing prices.
///
/// For each symbol, the fixed contribution is invested at every monthly
/// observation in chronological order and converted into fractional shares
/// at that month's close; the accumulated position is then marked to market
/// at the most recent close. Symbols with no usable price data are skipped
/// entirely — excluded from the aggregate totals, not counted as zero.
///
/// Missing monthly closes are forward-filled from the most recent prior
/// observed close; observations before the first observed close are dropped.
pub fn run_dca(
    historical_data: &HashMap<String, Vec<PricePoint>>,
    config: &DcaConfig,
) -> DcaReport {
    let contribution = config.monthly_contribution;

    let mut report = DcaReport::default();

    for (symbol, series) in historical_data {
        let closes = forward_fill(series);
        if closes.is_empty() {
            tracing::warn!(%symbol, "no price data for period, skipping");
            report.skipped.push(symbol.clone());
            continue;
        }

        let mut invested = Decimal::ZERO;
        let mut shares = Decimal::ZERO;
        for close in &closes {
            invested += contribution;
            shares += contribution / *close;
        }

        let latest = closes[closes.len() - 1];
        let current_value = shares * latest;
        let gain = current_value - invested;

        report.symbols.push(SymbolDca {
            symbol: symbol.clone(),
            months: closes.len(),
            invested,
            shares,
            current_value,
            gain,
            return_pct: percent_of(gain, invested),
        });

        report.totals.invested += invested;
        report.totals.current_value += current_value;
        report.totals.gain += gain;
    }

    report.symbols.sort_by(|a, b| a.symbol.cmp(&b.symbol));
    report.skipped.sort();
    report.totals.return_pct = percent_of(report.totals.gain, report.totals.invested);

    report
}

/// Closes with gaps forward-filled from the most recent prior observation.
/// Non-positive closes are treated as gaps: a contribution cannot buy shares
/// at a zero price.
fn forward_fill(series: &[PricePoint]) -> Vec<Decimal> {
    let mut filled = Vec::with_capacity(series.len());
    let mut last: Option<Decimal> = None;

    for point in series {
        if let Some(close) = point.close.filter(|c| *c > 0.0) {
            last = Decimal::from_f64(close).or(last);
        }
        if let Some(price) = last {
            filled.push(price);
        }
    }

    filled
}

/// `gain / invested` as a percentage rounded to 2 decimals, with the
/// zero-invested guard.
fn percent_of(gain: Decimal, invested: Decimal) -> f64 {
    if invested.is_zero() {
        return 0.0;
    }

    (gain / invested * dec!(100))
        .round_dp(2)
        .to_f64()
        .unwrap_or(0.0)
}
