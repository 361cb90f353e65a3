use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashMap;

use watchlist_core::{
    CompanyProfile, DividendPayment, EstimateTable, FinancialRow, Fundamentals, MarketData,
    MarketError, PricePoint, PriceTarget,
};

const CHART_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";
const QUOTE_SUMMARY_URL: &str = "https://query2.finance.yahoo.com/v10/finance/quoteSummary";
const TIMESERIES_URL: &str =
    "https://query1.finance.yahoo.com/ws/fundamentals-timeseries/v1/finance/timeseries";

/// Yahoo rejects requests without a browser-ish user agent.
const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36";

/// Annual line items consumed by the financial summary panel.
const FUNDAMENTAL_TYPES: &[&str] = &["annualTotalRevenue", "annualDilutedEPS", "annualGrossProfit"];

#[derive(Clone)]
pub struct YahooClient {
    client: Client,
}

impl Default for YahooClient {
    fn default() -> Self {
        Self::new()
    }
}

impl YahooClient {
    pub fn new() -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { client }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, MarketError> {
        tracing::debug!(%url, "yahoo request");
        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| MarketError::Upstream(e.to_string()))?;

        if !response.status().is_success() {
            return Err(MarketError::Upstream(format!(
                "HTTP {}: {}",
                response.status(),
                response.text().await.unwrap_or_default()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| MarketError::Upstream(e.to_string()))
    }

    /// Fetch one chart-API result for a symbol.
    ///
    /// `events` adds the optional `events=div` parameter so dividend history
    /// rides along with the price series.
    async fn get_chart(
        &self,
        symbol: &str,
        range: &str,
        interval: &str,
        events: Option<&str>,
    ) -> Result<ChartResult, MarketError> {
        let url = format!("{}/{}", CHART_URL, symbol);
        let mut query = vec![
            ("range", range.to_string()),
            ("interval", interval.to_string()),
        ];
        if let Some(ev) = events {
            query.push(("events", ev.to_string()));
        }

        let chart: ChartResponse = self.get_json(&url, &query).await?;

        if let Some(err) = chart.chart.error {
            return Err(MarketError::Upstream(err.description));
        }

        chart
            .chart
            .result
            .into_iter()
            .next()
            .ok_or_else(|| MarketError::Upstream(format!("no chart data for {}", symbol)))
    }

    /// Fetch quoteSummary modules for a symbol in one round trip.
    async fn get_quote_summary(
        &self,
        symbol: &str,
        modules: &str,
    ) -> Result<QuoteSummaryResult, MarketError> {
        let url = format!("{}/{}", QUOTE_SUMMARY_URL, symbol);
        let query = vec![("modules", modules.to_string())];

        let summary: QuoteSummaryResponse = self.get_json(&url, &query).await?;

        if let Some(err) = summary.quote_summary.error {
            return Err(MarketError::Upstream(err.description));
        }

        summary
            .quote_summary
            .result
            .into_iter()
            .next()
            .ok_or_else(|| MarketError::Upstream(format!("no quote summary for {}", symbol)))
    }

    /// Closing prices between two instants, ordered ascending.
    ///
    /// Used by the DCA backtest, whose window is anchored to Jan 1 of the
    /// start year rather than a relative range.
    pub async fn get_history_between(
        &self,
        symbol: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        interval: &str,
    ) -> Result<Vec<PricePoint>, MarketError> {
        let url = format!("{}/{}", CHART_URL, symbol);
        let query = vec![
            ("period1", from.timestamp().to_string()),
            ("period2", to.timestamp().to_string()),
            ("interval", interval.to_string()),
        ];

        let chart: ChartResponse = self.get_json(&url, &query).await?;

        if let Some(err) = chart.chart.error {
            return Err(MarketError::Upstream(err.description));
        }

        let result = chart
            .chart
            .result
            .into_iter()
            .next()
            .ok_or_else(|| MarketError::Upstream(format!("no chart data for {}", symbol)))?;

        Ok(price_points(result))
    }

    /// Closing prices for a range, ordered ascending.
    pub async fn get_history(
        &self,
        symbol: &str,
        range: &str,
        interval: &str,
    ) -> Result<Vec<PricePoint>, MarketError> {
        let result = self.get_chart(symbol, range, interval, None).await?;
        Ok(price_points(result))
    }

    /// Analyst mean target and current price.
    pub async fn get_price_target(&self, symbol: &str) -> Result<PriceTarget, MarketError> {
        let result = self.get_quote_summary(symbol, "financialData").await?;
        let data = result
            .financial_data
            .ok_or_else(|| MarketError::MissingField(format!("financialData for {}", symbol)))?;

        Ok(PriceTarget {
            mean_target: data.target_mean_price.and_then(|v| v.raw),
            current_price: data.current_price.and_then(|v| v.raw),
        })
    }

    /// Forward revenue and EPS consensus estimates keyed by year offset.
    pub async fn get_estimates(
        &self,
        symbol: &str,
    ) -> Result<(EstimateTable, EstimateTable), MarketError> {
        let result = self.get_quote_summary(symbol, "earningsTrend").await?;
        let trend = result
            .earnings_trend
            .ok_or_else(|| MarketError::MissingField(format!("earningsTrend for {}", symbol)))?;

        let mut revenue = EstimateTable::default();
        let mut eps = EstimateTable::default();

        for entry in trend.trend {
            let Some(period) = entry.period else {
                continue;
            };
            revenue.insert(
                period.clone(),
                entry.revenue_estimate.and_then(|e| e.avg).and_then(|v| v.raw),
            );
            eps.insert(
                period,
                entry.earnings_estimate.and_then(|e| e.avg).and_then(|v| v.raw),
            );
        }

        Ok((revenue, eps))
    }

    /// Company profile fields for the summary panel.
    pub async fn get_profile(&self, symbol: &str) -> Result<CompanyProfile, MarketError> {
        let result = self
            .get_quote_summary(symbol, "assetProfile,price,financialData")
            .await?;

        let asset = result.asset_profile.unwrap_or_default();
        let price = result.price.unwrap_or_default();
        let financial = result.financial_data.unwrap_or_default();

        Ok(CompanyProfile {
            name: price.long_name.or(price.short_name),
            sector: asset.sector,
            industry: asset.industry,
            long_description: asset.long_business_summary,
            recommendation: financial.recommendation_key,
        })
    }

    /// Annual revenue / diluted EPS / gross profit series, ordered ascending.
    pub async fn get_fundamentals(&self, symbol: &str) -> Result<Fundamentals, MarketError> {
        let url = format!("{}/{}", TIMESERIES_URL, symbol);
        let now = Utc::now();
        // Six years back covers the five most recent annual periods.
        let period1 = now - Duration::days(6 * 365);
        let query = vec![
            ("type", FUNDAMENTAL_TYPES.join(",")),
            ("period1", period1.timestamp().to_string()),
            ("period2", now.timestamp().to_string()),
        ];

        let response: TimeseriesResponse = self.get_json(&url, &query).await?;

        if let Some(err) = response.timeseries.error {
            return Err(MarketError::Upstream(err.description));
        }

        let mut fundamentals = Fundamentals::default();
        for result in response.timeseries.result {
            let Some(kind) = result.meta.r#type.first().map(String::as_str) else {
                continue;
            };
            let rows = extract_timeseries_rows(&result.values, kind);
            match kind {
                "annualTotalRevenue" => fundamentals.total_revenue = rows,
                "annualDilutedEPS" => fundamentals.diluted_eps = rows,
                "annualGrossProfit" => fundamentals.gross_profit = rows,
                _ => {}
            }
        }

        Ok(fundamentals)
    }

    /// Per-payment dividend history, ordered ascending by date.
    pub async fn get_dividends(&self, symbol: &str) -> Result<Vec<DividendPayment>, MarketError> {
        let result = self.get_chart(symbol, "10y", "1mo", Some("div")).await?;

        let mut payments: Vec<DividendPayment> = result
            .events
            .and_then(|ev| ev.dividends)
            .unwrap_or_default()
            .into_values()
            .filter_map(|d| {
                let date = DateTime::from_timestamp(d.date?, 0)?;
                Some(DividendPayment {
                    date,
                    amount: d.amount?,
                })
            })
            .collect();

        payments.sort_by_key(|p| p.date);
        Ok(payments)
    }
}

/// Zip a chart result's timestamps with its (nullable) closes.
fn price_points(result: ChartResult) -> Vec<PricePoint> {
    let closes = result
        .indicators
        .quote
        .into_iter()
        .next()
        .map(|q| q.close)
        .unwrap_or_default();

    result
        .timestamp
        .into_iter()
        .zip(closes)
        .filter_map(|(ts, close)| {
            DateTime::from_timestamp(ts, 0).map(|timestamp| PricePoint { timestamp, close })
        })
        .collect()
}

/// Pull `(asOfDate, reportedValue.raw)` rows out of the dynamically-keyed
/// timeseries payload. Null entries (periods the provider has no value for)
/// are dropped.
fn extract_timeseries_rows(values: &serde_json::Value, kind: &str) -> Vec<FinancialRow> {
    values
        .get(kind)
        .and_then(|v| v.as_array())
        .map(|rows| {
            rows.iter()
                .filter_map(|row| {
                    let period = row.get("asOfDate")?.as_str()?.to_string();
                    let value = row
                        .get("reportedValue")
                        .and_then(|v| v.get("raw"))
                        .and_then(|v| v.as_f64());
                    Some(FinancialRow { period, value })
                })
                .collect()
        })
        .unwrap_or_default()
}

#[async_trait]
impl MarketData for YahooClient {
    async fn fetch_history(
        &self,
        symbol: &str,
        range: &str,
        interval: &str,
    ) -> Result<Vec<PricePoint>, MarketError> {
        self.get_history(symbol, range, interval).await
    }

    async fn fetch_price_target(&self, symbol: &str) -> Result<PriceTarget, MarketError> {
        self.get_price_target(symbol).await
    }

    async fn fetch_estimates(
        &self,
        symbol: &str,
    ) -> Result<(EstimateTable, EstimateTable), MarketError> {
        self.get_estimates(symbol).await
    }

    async fn fetch_profile(&self, symbol: &str) -> Result<CompanyProfile, MarketError> {
        self.get_profile(symbol).await
    }

    async fn fetch_fundamentals(&self, symbol: &str) -> Result<Fundamentals, MarketError> {
        self.get_fundamentals(symbol).await
    }

    async fn fetch_dividends(&self, symbol: &str) -> Result<Vec<DividendPayment>, MarketError> {
        self.get_dividends(symbol).await
    }
}

// Response structures

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartEnvelope,
}

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    #[serde(default)]
    result: Vec<ChartResult>,
    error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: ChartIndicators,
    #[serde(default)]
    events: Option<ChartEvents>,
}

#[derive(Debug, Deserialize)]
struct ChartIndicators {
    #[serde(default)]
    quote: Vec<ChartQuote>,
}

#[derive(Debug, Deserialize)]
struct ChartQuote {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct ChartEvents {
    #[serde(default)]
    dividends: Option<HashMap<String, DividendEvent>>,
}

#[derive(Debug, Deserialize)]
struct DividendEvent {
    #[serde(default)]
    amount: Option<f64>,
    #[serde(default)]
    date: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct QuoteSummaryResponse {
    #[serde(rename = "quoteSummary")]
    quote_summary: QuoteSummaryEnvelope,
}

#[derive(Debug, Deserialize)]
struct QuoteSummaryEnvelope {
    #[serde(default)]
    result: Vec<QuoteSummaryResult>,
    error: Option<ApiErrorBody>,
}

#[derive(Debug, Default, Deserialize)]
struct QuoteSummaryResult {
    #[serde(rename = "financialData", default)]
    financial_data: Option<FinancialDataModule>,
    #[serde(rename = "earningsTrend", default)]
    earnings_trend: Option<EarningsTrendModule>,
    #[serde(rename = "assetProfile", default)]
    asset_profile: Option<AssetProfileModule>,
    #[serde(default)]
    price: Option<PriceModule>,
}

#[derive(Debug, Default, Deserialize)]
struct FinancialDataModule {
    #[serde(rename = "targetMeanPrice", default)]
    target_mean_price: Option<RawValue>,
    #[serde(rename = "currentPrice", default)]
    current_price: Option<RawValue>,
    #[serde(rename = "recommendationKey", default)]
    recommendation_key: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct EarningsTrendModule {
    #[serde(default)]
    trend: Vec<TrendEntry>,
}

#[derive(Debug, Deserialize)]
struct TrendEntry {
    #[serde(default)]
    period: Option<String>,
    #[serde(rename = "revenueEstimate", default)]
    revenue_estimate: Option<EstimateBlock>,
    #[serde(rename = "earningsEstimate", default)]
    earnings_estimate: Option<EstimateBlock>,
}

#[derive(Debug, Deserialize)]
struct EstimateBlock {
    #[serde(default)]
    avg: Option<RawValue>,
}

#[derive(Debug, Default, Deserialize)]
struct AssetProfileModule {
    #[serde(default)]
    sector: Option<String>,
    #[serde(default)]
    industry: Option<String>,
    #[serde(rename = "longBusinessSummary", default)]
    long_business_summary: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct PriceModule {
    #[serde(rename = "longName", default)]
    long_name: Option<String>,
    #[serde(rename = "shortName", default)]
    short_name: Option<String>,
}

/// The `{raw, fmt}` value objects quoteSummary wraps every number in.
#[derive(Debug, Deserialize)]
struct RawValue {
    #[serde(default)]
    raw: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct TimeseriesResponse {
    timeseries: TimeseriesEnvelope,
}

#[derive(Debug, Deserialize)]
struct TimeseriesEnvelope {
    #[serde(default)]
    result: Vec<TimeseriesResult>,
    error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize)]
struct TimeseriesResult {
    meta: TimeseriesMeta,
    /// The rows live under a key equal to the requested type name
    /// (`"annualTotalRevenue": [...]`), so they are captured loose and
    /// extracted by name.
    #[serde(flatten)]
    values: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct TimeseriesMeta {
    #[serde(default, rename = "type")]
    r#type: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chart_response_parses_nullable_closes() {
        let body = r#"{
            "chart": {
                "result": [{
                    "timestamp": [1700000000, 1700086400, 1700172800],
                    "indicators": {"quote": [{"close": [189.71, null, 191.45]}]}
                }],
                "error": null
            }
        }"#;

        let parsed: ChartResponse = serde_json::from_str(body).unwrap();
        let result = &parsed.chart.result[0];
        assert_eq!(result.timestamp.len(), 3);
        assert_eq!(result.indicators.quote[0].close[1], None);
        assert_eq!(result.indicators.quote[0].close[2], Some(191.45));
    }

    #[test]
    fn quote_summary_parses_raw_values_and_trend() {
        let body = r#"{
            "quoteSummary": {
                "result": [{
                    "financialData": {
                        "targetMeanPrice": {"raw": 120.5, "fmt": "120.50"},
                        "currentPrice": {"raw": 100.0, "fmt": "100.00"},
                        "recommendationKey": "buy"
                    },
                    "earningsTrend": {
                        "trend": [
                            {"period": "0y", "revenueEstimate": {"avg": {"raw": 100.0}}, "earningsEstimate": {"avg": {"raw": 2.0}}},
                            {"period": "+1y", "revenueEstimate": {"avg": {"raw": 110.0}}, "earningsEstimate": {"avg": {"raw": 2.5}}}
                        ]
                    }
                }],
                "error": null
            }
        }"#;

        let parsed: QuoteSummaryResponse = serde_json::from_str(body).unwrap();
        let result = &parsed.quote_summary.result[0];
        let data = result.financial_data.as_ref().unwrap();
        assert_eq!(data.target_mean_price.as_ref().unwrap().raw, Some(120.5));
        assert_eq!(data.recommendation_key.as_deref(), Some("buy"));

        let trend = result.earnings_trend.as_ref().unwrap();
        assert_eq!(trend.trend.len(), 2);
        assert_eq!(trend.trend[0].period.as_deref(), Some("0y"));
    }

    #[test]
    fn timeseries_rows_extracted_by_type_name() {
        let body = r#"{
            "timeseries": {
                "result": [{
                    "meta": {"type": ["annualTotalRevenue"]},
                    "annualTotalRevenue": [
                        {"asOfDate": "2022-12-31", "reportedValue": {"raw": 500.0}},
                        {"asOfDate": "2023-12-31", "reportedValue": {"raw": 550.0}}
                    ]
                }],
                "error": null
            }
        }"#;

        let parsed: TimeseriesResponse = serde_json::from_str(body).unwrap();
        let result = &parsed.timeseries.result[0];
        let rows = extract_timeseries_rows(&result.values, "annualTotalRevenue");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].period, "2022-12-31");
        assert_eq!(rows[1].value, Some(550.0));
    }
}
