//! Derived-metric API routes.
//!
//! Batch endpoints degrade per symbol and never fail as a whole; the
//! single-symbol summary is the one endpoint that surfaces a hard error.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use std::collections::BTreeMap;

use metric_engine::BatchAnalysis;

use crate::{ApiResponse, AppState};

#[derive(Deserialize, utoipa::ToSchema)]
pub struct PriceChangeRequest {
    pub symbols: Vec<String>,
    #[serde(default = "default_period")]
    pub period: String,
}

fn default_period() -> String {
    "1d".to_string()
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct AnalysisRequest {
    pub symbols: Vec<String>,
}

pub fn market_routes() -> Router<AppState> {
    Router::new()
        .route("/api/market/price-change", post(price_change))
        .route("/api/market/analysis", post(analysis))
        .route("/api/market/summary/:symbol", get(summary))
}

#[utoipa::path(
    post,
    path = "/api/market/price-change",
    request_body = PriceChangeRequest,
    responses((status = 200, description = "Percent price change per symbol; null where data was insufficient")),
    tag = "Market"
)]
pub(crate) async fn price_change(
    State(state): State<AppState>,
    Json(req): Json<PriceChangeRequest>,
) -> Json<ApiResponse<BTreeMap<String, Option<f64>>>> {
    let results = state
        .engine
        .batch_price_change(&req.symbols, &req.period)
        .await;
    Json(ApiResponse::success(results))
}

#[utoipa::path(
    post,
    path = "/api/market/analysis",
    request_body = AnalysisRequest,
    responses((status = 200, description = "Analyst upside, combined growth and sector per symbol")),
    tag = "Market"
)]
pub(crate) async fn analysis(
    State(state): State<AppState>,
    Json(req): Json<AnalysisRequest>,
) -> Json<ApiResponse<BatchAnalysis>> {
    let results = state.engine.batch_analysis(&req.symbols).await;
    Json(ApiResponse::success(results))
}

#[utoipa::path(
    get,
    path = "/api/market/summary/{symbol}",
    params(("symbol" = String, Path, description = "Ticker symbol")),
    responses(
        (status = 200, description = "Company profile and last-5-period financials"),
        (status = 500, description = "Summary could not be fetched")
    ),
    tag = "Market"
)]
pub(crate) async fn summary(State(state): State<AppState>, Path(symbol): Path<String>) -> Response {
    match state.engine.symbol_summary(&symbol).await {
        Ok(summary) => Json(ApiResponse::success(summary)).into_response(),
        Err(e) => {
            tracing::error!(%symbol, error = %e, "summary fetch failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": "Could not fetch summary."})),
            )
                .into_response()
        }
    }
}
