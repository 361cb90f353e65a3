use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single point in a closing-price series.
///
/// `close` is `None` when the provider reports a gap for that timestamp.
/// Series are always ordered ascending by time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricePoint {
    pub timestamp: DateTime<Utc>,
    pub close: Option<f64>,
}

/// Analyst price-target snapshot for one symbol at query time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PriceTarget {
    pub mean_target: Option<f64>,
    pub current_price: Option<f64>,
}

/// A single consensus estimate record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Estimate {
    pub avg: Option<f64>,
}

/// Consensus estimates keyed by relative year offset.
///
/// The current fiscal year is `"0y"`, the next one `"+1y"`. Other offsets
/// the provider may return are stored but never consumed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EstimateTable {
    pub estimates: HashMap<String, Estimate>,
}

impl EstimateTable {
    pub fn avg_for(&self, offset: &str) -> Option<f64> {
        self.estimates.get(offset).and_then(|e| e.avg)
    }

    pub fn insert(&mut self, offset: impl Into<String>, avg: Option<f64>) {
        self.estimates.insert(offset.into(), Estimate { avg });
    }
}

/// One line item value for one reporting period.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinancialRow {
    /// Period label, e.g. `"2023-12-31"`. Ordered ascending within a series.
    pub period: String,
    pub value: Option<f64>,
}

/// Historical financial-statement line items for one symbol.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Fundamentals {
    pub total_revenue: Vec<FinancialRow>,
    pub diluted_eps: Vec<FinancialRow>,
    pub gross_profit: Vec<FinancialRow>,
}

/// A single historical dividend payment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DividendPayment {
    pub date: DateTime<Utc>,
    pub amount: f64,
}

/// Company profile fields used by the summary panel.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompanyProfile {
    pub name: Option<String>,
    pub sector: Option<String>,
    pub industry: Option<String>,
    pub long_description: Option<String>,
    /// Provider recommendation key, lowercase (e.g. `"buy"`, `"hold"`).
    pub recommendation: Option<String>,
}
