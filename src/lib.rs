//! # launchpad-gateway
//!
//! Bonding-curve launch ledger with a REST and WebSocket gateway.
//!
//! Every launch starts with its whole curve allocation in a pool. Buys
//! and sells trade against that pool at a price that rises with the
//! supply sold, and once the market valuation reaches a threshold the
//! launch may be migrated, closing its curve market for good.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP, WebSocket)
//!     │
//!     ├── REST Handlers (api/)
//!     ├── WS Handler (ws/)
//!     │
//!     ├── LaunchService (service/)
//!     ├── EventBus (domain/)
//!     │
//!     ├── LaunchLedger + BondingCurve (domain/)
//!     │
//!     └── Snapshot stores: JSON file / PostgreSQL (persistence/)
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod persistence;
pub mod service;
pub mod ws;

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::app_state::AppState;
use crate::domain::{EventBus, LaunchLedger, LedgerConfig};
use crate::service::LaunchService;

/// Builds the ledger, event bus, and service for `config`.
#[must_use]
pub fn build_state(config: LedgerConfig, event_bus_capacity: usize) -> AppState {
    let ledger = Arc::new(LaunchLedger::new(config));
    let event_bus = EventBus::new(event_bus_capacity);
    AppState::new(Arc::new(LaunchService::new(ledger, event_bus)))
}

/// Builds the full HTTP application: REST routes, `/ws`, and the
/// tracing and CORS layers.
pub fn build_app(state: AppState) -> Router {
    let router = Router::new()
        .merge(api::build_router())
        .route("/ws", get(ws::handler::ws_handler));

    #[cfg(feature = "swagger-ui")]
    let router = {
        use utoipa::OpenApi;
        router.merge(
            utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
                .url("/api-docs/openapi.json", api::ApiDoc::openapi()),
        )
    };

    router
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
