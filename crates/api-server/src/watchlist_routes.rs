//! Watchlist API routes.
//!
//! Add and remove are idempotent and always report success; the persistence
//! layer silently ignores duplicate inserts and missing deletes.

use axum::{
    extract::{Path, State},
    routing::{delete, get},
    Json, Router,
};
use serde::Deserialize;

use crate::{ApiResponse, AppError, AppState};

#[derive(Deserialize, utoipa::ToSchema)]
pub struct SymbolRequest {
    pub symbol: String,
}

pub fn watchlist_routes() -> Router<AppState> {
    Router::new()
        .route("/api/watchlist", get(list_symbols).post(add_symbol))
        .route("/api/watchlist/:symbol", delete(remove_symbol))
}

#[utoipa::path(
    get,
    path = "/api/watchlist",
    responses((status = 200, description = "Saved ticker symbols, ordered alphabetically")),
    tag = "Watchlist"
)]
pub(crate) async fn list_symbols(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<String>>>, AppError> {
    let symbols = state.db.list().await?;
    Ok(Json(ApiResponse::success(symbols)))
}

#[utoipa::path(
    post,
    path = "/api/watchlist",
    request_body = SymbolRequest,
    responses((status = 200, description = "Symbol saved (no-op if already present)")),
    tag = "Watchlist"
)]
pub(crate) async fn add_symbol(
    State(state): State<AppState>,
    Json(req): Json<SymbolRequest>,
) -> Result<Json<ApiResponse<String>>, AppError> {
    let symbol = req.symbol.trim().to_uppercase();
    state.db.add(&symbol).await?;
    Ok(Json(ApiResponse::success(format!(
        "{} added to watchlist",
        symbol
    ))))
}

#[utoipa::path(
    delete,
    path = "/api/watchlist/{symbol}",
    params(("symbol" = String, Path, description = "Ticker symbol to remove")),
    responses((status = 200, description = "Symbol removed (no-op if absent)")),
    tag = "Watchlist"
)]
pub(crate) async fn remove_symbol(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> Result<Json<ApiResponse<String>>, AppError> {
    let symbol = symbol.trim().to_uppercase();
    state.db.remove(&symbol).await?;
    Ok(Json(ApiResponse::success(format!(
        "{} removed from watchlist",
        symbol
    ))))
}
