//! System endpoints: health check and market configuration.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use crate::app_state::AppState;
use crate::domain::{CurveShape, TokenAmount, UnitPrice, Valuation};

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Always `"healthy"` while the server answers.
    pub status: String,
    /// Server time.
    pub timestamp: String,
    /// Crate version.
    pub version: String,
    /// Number of registered launches.
    pub launch_count: usize,
    /// Open event-bus receivers (live WebSocket connections).
    pub event_receivers: usize,
}

/// `GET /health`: Service health status.
#[utoipa::path(
    get,
    path = "/health",
    tag = "System",
    summary = "Health check",
    description = "Returns service health status, version, current timestamp, and the number of launches.",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
    )
)]
pub async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            timestamp: Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            launch_count: state.launch_service.launch_count().await,
            event_receivers: state.event_bus.receiver_count(),
        }),
    )
}

/// Market parameters shared by every launch.
#[derive(Debug, Serialize, ToSchema)]
pub struct MarketConfigResponse {
    /// `"linear"` or `"constant_product"`.
    pub curve_shape: &'static str,
    /// Price at zero sold supply.
    #[schema(value_type = String)]
    pub base_price: UnitPrice,
    /// Price increase per token (linear curves only).
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub slope: Option<UnitPrice>,
    /// Virtual token reserve (constant-product curves only).
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub virtual_token_reserve: Option<TokenAmount>,
    /// Total supply of each launched token.
    #[schema(value_type = String)]
    pub total_supply: TokenAmount,
    /// Tokens sold on the curve.
    #[schema(value_type = String)]
    pub curve_supply: TokenAmount,
    /// Price once the whole curve supply is sold.
    #[schema(value_type = String)]
    pub max_price: UnitPrice,
    /// Valuation once the whole curve supply is sold.
    #[schema(value_type = String)]
    pub max_valuation: Valuation,
    /// Valuation at which launches become eligible for migration.
    #[schema(value_type = String)]
    pub migration_threshold: Valuation,
    /// Oldest accepted reference rate in seconds, if bounded.
    pub max_rate_age_secs: Option<i64>,
}

/// `GET /config/market`: Market parameters.
#[utoipa::path(
    get,
    path = "/config/market",
    tag = "System",
    summary = "Market parameters",
    description = "Returns the bonding-curve parameters and migration threshold every launch is priced by.",
    responses(
        (status = 200, description = "Market parameters", body = MarketConfigResponse),
    )
)]
pub async fn market_config_handler(State(state): State<AppState>) -> impl IntoResponse {
    let market = state.launch_service.market();
    let curve = market.curve;
    let (slope, virtual_token_reserve) = match curve.shape() {
        CurveShape::Linear { slope, .. } => (Some(slope), None),
        CurveShape::ConstantProduct {
            virtual_token_reserve,
            ..
        } => (None, Some(virtual_token_reserve)),
    };

    Json(MarketConfigResponse {
        curve_shape: curve.shape().name(),
        base_price: curve.shape().base_price(),
        slope,
        virtual_token_reserve,
        total_supply: curve.total_supply(),
        curve_supply: curve.curve_supply(),
        max_price: curve.max_price(),
        max_valuation: curve.valuation(curve.max_price()),
        migration_threshold: market.migration_threshold,
        max_rate_age_secs: market.max_rate_age.map(|age| age.num_seconds()),
    })
}

/// System routes mounted at the root level (not under /api/v1).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_handler))
        .route("/config/market", get(market_config_handler))
}
