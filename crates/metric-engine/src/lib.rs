pub mod metrics;
pub mod summary;

pub use summary::SymbolSummary;

use serde::Serialize;
use std::collections::BTreeMap;
use utoipa::ToSchema;

use watchlist_core::{MarketData, MarketError};

/// Batch analysis result: three symbol-keyed sub-maps.
///
/// `growth` is the combined forward revenue + EPS growth composite, not
/// revenue growth alone.
#[derive(Debug, Default, Serialize, ToSchema)]
pub struct BatchAnalysis {
    pub upside: BTreeMap<String, Option<f64>>,
    pub growth: BTreeMap<String, Option<f64>>,
    pub sector: BTreeMap<String, String>,
}

/// Computes derived metrics by querying the market-data provider once per
/// symbol. Symbols are processed sequentially and independently: a fetch or
/// compute failure records a null/fallback result for that symbol only and
/// the batch continues. Every batch result carries one entry per requested
/// symbol.
pub struct MetricEngine<P> {
    provider: P,
}

impl<P: MarketData> MetricEngine<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Percent price change over `period` for each symbol.
    pub async fn batch_price_change(
        &self,
        symbols: &[String],
        period: &str,
    ) -> BTreeMap<String, Option<f64>> {
        let mut results = BTreeMap::new();

        for raw in symbols {
            let symbol = raw.trim().to_uppercase();
            let change = match self
                .provider
                .fetch_history(&symbol, period, interval_for(period))
                .await
            {
                Ok(series) => metrics::percent_change(&series),
                Err(e) => {
                    tracing::warn!(%symbol, error = %e, "price history fetch failed");
                    None
                }
            };
            results.insert(symbol, change);
        }

        results
    }

    /// Analyst upside, growth composite and sector for each symbol.
    pub async fn batch_analysis(&self, symbols: &[String]) -> BatchAnalysis {
        let mut analysis = BatchAnalysis::default();

        for raw in symbols {
            let symbol = raw.trim().to_uppercase();

            let upside = match self.provider.fetch_price_target(&symbol).await {
                Ok(target) => metrics::upside(&target),
                Err(e) => {
                    tracing::warn!(%symbol, error = %e, "price target fetch failed");
                    None
                }
            };

            let growth = match self.provider.fetch_estimates(&symbol).await {
                Ok((revenue, eps)) => metrics::growth_composite(&revenue, &eps),
                Err(e) => {
                    tracing::warn!(%symbol, error = %e, "estimates fetch failed");
                    None
                }
            };

            let sector = match self.provider.fetch_profile(&symbol).await {
                Ok(profile) => profile
                    .sector
                    .unwrap_or_else(|| summary::FALLBACK_SECTOR.to_string()),
                Err(e) => {
                    tracing::warn!(%symbol, error = %e, "profile fetch failed");
                    summary::FALLBACK_SECTOR.to_string()
                }
            };

            analysis.upside.insert(symbol.clone(), upside);
            analysis.growth.insert(symbol.clone(), growth);
            analysis.sector.insert(symbol, sector);
        }

        analysis
    }

    /// Full summary panel for one symbol. The only metric operation that
    /// surfaces a hard error to the caller.
    pub async fn symbol_summary(&self, symbol: &str) -> Result<SymbolSummary, MarketError> {
        let symbol = symbol.trim().to_uppercase();

        let profile = self.provider.fetch_profile(&symbol).await?;
        let fundamentals = self.provider.fetch_fundamentals(&symbol).await?;
        let dividends = self.provider.fetch_dividends(&symbol).await?;

        Ok(summary::build_summary(
            &symbol,
            &profile,
            &fundamentals,
            &dividends,
        ))
    }
}

/// Provider interval granularity for a requested period: intraday bars for a
/// one-day window, daily bars otherwise.
fn interval_for(period: &str) -> &'static str {
    match period {
        "1d" => "5m",
        _ => "1d",
    }
}
