use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Configuration for a dollar-cost-averaging backtest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DcaConfig {
    /// Fixed amount contributed at every monthly observation.
    pub monthly_contribution: Decimal,
    /// Contributions start at Jan 1 of this year.
    pub start_year: i32,
}

/// Per-symbol outcome of a DCA run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymbolDca {
    pub symbol: String,
    /// Number of monthly contributions actually made.
    pub months: usize,
    pub invested: Decimal,
    pub shares: Decimal,
    pub current_value: Decimal,
    pub gain: Decimal,
    /// Percent return, rounded to 2 decimals.
    pub return_pct: f64,
}

/// Aggregate outcome across all processed symbols.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DcaTotals {
    pub invested: Decimal,
    pub current_value: Decimal,
    pub gain: Decimal,
    pub return_pct: f64,
}

/// Full DCA report: per-symbol breakdown, aggregate totals, and the symbols
/// skipped because no price data was available (excluded from the totals,
/// not counted as zero).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DcaReport {
    pub symbols: Vec<SymbolDca>,
    pub skipped: Vec<String>,
    pub totals: DcaTotals,
}
