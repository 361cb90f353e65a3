//! TickerScope HTTP server.
//!
//! Thin axum surface over the watchlist store and the metric engine: route
//! modules per concern, a shared JSON envelope, and the embedded frontend.

pub mod frontend;
pub mod market_routes;
pub mod watchlist_routes;

use std::sync::Arc;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use metric_engine::MetricEngine;
use watchlist_store::WatchlistDb;
use yahoo_client::YahooClient;

#[derive(Clone)]
pub struct AppState {
    pub db: WatchlistDb,
    pub engine: Arc<MetricEngine<YahooClient>>,
}

/// Standard JSON envelope for API responses.
#[derive(Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Handler-level error: anything `anyhow` can wrap, rendered as a JSON 500.
pub struct AppError(anyhow::Error);

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self.0, "request failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::<()>::error(self.0.to_string())),
        )
            .into_response()
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        watchlist_routes::list_symbols,
        watchlist_routes::add_symbol,
        watchlist_routes::remove_symbol,
        market_routes::price_change,
        market_routes::analysis,
        market_routes::summary,
    ),
    components(schemas(
        watchlist_routes::SymbolRequest,
        market_routes::PriceChangeRequest,
        market_routes::AnalysisRequest,
    )),
    tags(
        (name = "Watchlist", description = "Saved ticker symbols"),
        (name = "Market", description = "Derived metrics from market data")
    )
)]
struct ApiDoc;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(watchlist_routes::watchlist_routes())
        .merge(market_routes::market_routes())
        .route("/", get(frontend::index))
        .route("/static/*path", get(frontend::asset))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

pub async fn run_server() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:tickers.db".to_string());
    let db = WatchlistDb::new(&database_url).await?;
    let engine = Arc::new(MetricEngine::new(YahooClient::new()));

    let state = AppState { db, engine };
    let app = build_router(state);

    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "tickerscope listening");
    axum::serve(listener, app).await?;

    Ok(())
}
