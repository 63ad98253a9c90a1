//! REST API layer: route handlers, DTOs, and router composition.
//!
//! All launch endpoints are mounted under `/api/v1`; health and market
//! configuration live at the root.

pub mod dto;
pub mod handlers;

use axum::Router;
use utoipa::OpenApi;

use crate::app_state::AppState;
use crate::error::{ErrorBody, ErrorResponse};

/// OpenAPI description of the REST surface.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "launchpad-gateway",
        description = "Bonding-curve launch ledger: create launches, trade against the curve, and migrate at the valuation threshold."
    ),
    paths(
        handlers::launch::create_launch,
        handlers::launch::list_launches,
        handlers::launch::get_launch,
        handlers::trade::quote_buy,
        handlers::trade::quote_sell,
        handlers::trade::buy,
        handlers::trade::sell,
        handlers::migration::migration_status,
        handlers::migration::migrate,
        handlers::system::health_handler,
        handlers::system::market_config_handler,
    ),
    components(schemas(
        dto::CreateLaunchRequest,
        dto::InitialBuyRequest,
        dto::CreateLaunchResponse,
        dto::LaunchResponse,
        dto::LaunchListResponse,
        dto::PaginationMeta,
        dto::BuyRequest,
        dto::SellRequest,
        dto::QuoteResponse,
        dto::ReceiptResponse,
        dto::MigrationStatusResponse,
        handlers::system::HealthResponse,
        handlers::system::MarketConfigResponse,
        ErrorResponse,
        ErrorBody,
    )),
    tags(
        (name = "Launches", description = "Launch registry"),
        (name = "Trading", description = "Curve buys, sells, and quotes"),
        (name = "Migration", description = "Threshold check and migration transition"),
        (name = "System", description = "Health and configuration"),
    )
)]
pub struct ApiDoc;

/// Builds the complete API router with all REST endpoints.
pub fn build_router() -> Router<AppState> {
    Router::new()
        .nest("/api/v1", handlers::routes())
        .merge(handlers::system::routes())
}
