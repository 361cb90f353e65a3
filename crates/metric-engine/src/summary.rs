//! Financial summary panel assembly.

use chrono::Datelike;
use serde::Serialize;
use std::collections::BTreeMap;
use utoipa::ToSchema;
use watchlist_core::{round2, CompanyProfile, DividendPayment, FinancialRow, Fundamentals};

use crate::metrics::truncate_description;

/// How many trailing periods each summary series keeps.
const SUMMARY_PERIODS: usize = 5;

pub const FALLBACK_SECTOR: &str = "Other";
pub const FALLBACK_INDUSTRY: &str = "Unknown";
pub const FALLBACK_DESCRIPTION: &str = "No summary available.";
pub const FALLBACK_RECOMMENDATION: &str = "N/A";

/// Profile plus last-5-period fundamentals for one symbol.
///
/// The series maps are keyed by period label (report date for fundamentals,
/// 4-digit year for dividends); periods the provider had no value for are
/// omitted entirely rather than carried as nulls.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SymbolSummary {
    pub symbol: String,
    pub name: String,
    pub sector: String,
    pub industry: String,
    pub description: String,
    pub recommendation: String,
    pub revenue: BTreeMap<String, f64>,
    pub diluted_eps: BTreeMap<String, f64>,
    pub gross_margin: BTreeMap<String, f64>,
    pub dividends: BTreeMap<String, f64>,
}

pub fn build_summary(
    symbol: &str,
    profile: &CompanyProfile,
    fundamentals: &Fundamentals,
    dividends: &[DividendPayment],
) -> SymbolSummary {
    SymbolSummary {
        symbol: symbol.to_string(),
        name: profile.name.clone().unwrap_or_else(|| symbol.to_string()),
        sector: profile
            .sector
            .clone()
            .unwrap_or_else(|| FALLBACK_SECTOR.to_string()),
        industry: profile
            .industry
            .clone()
            .unwrap_or_else(|| FALLBACK_INDUSTRY.to_string()),
        description: profile
            .long_description
            .as_deref()
            .and_then(truncate_description)
            .unwrap_or_else(|| FALLBACK_DESCRIPTION.to_string()),
        recommendation: profile
            .recommendation
            .as_deref()
            .map(capitalize)
            .unwrap_or_else(|| FALLBACK_RECOMMENDATION.to_string()),
        revenue: last_periods(&fundamentals.total_revenue),
        diluted_eps: last_periods(&fundamentals.diluted_eps),
        gross_margin: gross_margin_by_period(fundamentals),
        dividends: annual_dividend_sums(dividends),
    }
}

/// Uppercase the first letter of a recommendation key (`"buy"` → `"Buy"`).
fn capitalize(key: &str) -> String {
    let mut chars = key.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// The most recent `SUMMARY_PERIODS` non-null entries of a series, keyed by
/// period label. Input is ordered ascending by period.
fn last_periods(series: &[FinancialRow]) -> BTreeMap<String, f64> {
    let present: Vec<(&str, f64)> = series
        .iter()
        .filter_map(|row| row.value.map(|v| (row.period.as_str(), v)))
        .collect();

    present
        .iter()
        .rev()
        .take(SUMMARY_PERIODS)
        .map(|(period, value)| (period.to_string(), *value))
        .collect()
}

/// Gross margin percent per period, only where both gross profit and a
/// non-zero revenue exist for the same period label.
fn gross_margin_by_period(fundamentals: &Fundamentals) -> BTreeMap<String, f64> {
    let revenue_by_period: BTreeMap<&str, f64> = fundamentals
        .total_revenue
        .iter()
        .filter_map(|row| row.value.map(|v| (row.period.as_str(), v)))
        .collect();

    let margins: Vec<FinancialRow> = fundamentals
        .gross_profit
        .iter()
        .map(|row| FinancialRow {
            period: row.period.clone(),
            value: row.value.and_then(|gp| {
                revenue_by_period
                    .get(row.period.as_str())
                    .filter(|&&rev| rev != 0.0)
                    .map(|rev| round2(gp / rev * 100.0))
            }),
        })
        .collect();

    last_periods(&margins)
}

/// Per-payment dividends resampled to annual sums, most recent 5 years.
fn annual_dividend_sums(dividends: &[DividendPayment]) -> BTreeMap<String, f64> {
    let mut by_year: BTreeMap<i32, f64> = BTreeMap::new();
    for payment in dividends {
        *by_year.entry(payment.date.year()).or_insert(0.0) += payment.amount;
    }

    let years: Vec<i32> = by_year.keys().copied().collect();
    let keep: Vec<i32> = years.iter().rev().take(SUMMARY_PERIODS).copied().collect();

    by_year
        .into_iter()
        .filter(|(year, _)| keep.contains(year))
        .map(|(year, total)| (year.to_string(), round2(total)))
        .collect()
}
