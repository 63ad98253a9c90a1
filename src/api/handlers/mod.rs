//! REST endpoint handlers organized by resource.

pub mod launch;
pub mod migration;
pub mod system;
pub mod trade;

use axum::Router;

use crate::app_state::AppState;

/// Composes all resource routes under `/api/v1`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(launch::routes())
        .merge(trade::routes())
        .merge(migration::routes())
}
