use async_trait::async_trait;

use crate::{
    CompanyProfile, DividendPayment, EstimateTable, Fundamentals, MarketError, PricePoint,
    PriceTarget,
};

/// The market-data provider seam.
///
/// One call per symbol per concern; callers treat every failure as terminal
/// for that symbol only. Implemented by `yahoo-client` in production and by
/// stubs in tests.
#[async_trait]
pub trait MarketData: Send + Sync {
    /// Closing prices for `range` (provider period string, e.g. `"1d"`,
    /// `"1mo"`, `"1y"`) at `interval` granularity, ordered ascending.
    async fn fetch_history(
        &self,
        symbol: &str,
        range: &str,
        interval: &str,
    ) -> Result<Vec<PricePoint>, MarketError>;

    async fn fetch_price_target(&self, symbol: &str) -> Result<PriceTarget, MarketError>;

    /// Forward consensus estimates: `(revenue, eps)` tables keyed by
    /// relative year offset.
    async fn fetch_estimates(
        &self,
        symbol: &str,
    ) -> Result<(EstimateTable, EstimateTable), MarketError>;

    async fn fetch_profile(&self, symbol: &str) -> Result<CompanyProfile, MarketError>;

    async fn fetch_fundamentals(&self, symbol: &str) -> Result<Fundamentals, MarketError>;

    async fn fetch_dividends(&self, symbol: &str) -> Result<Vec<DividendPayment>, MarketError>;
}
