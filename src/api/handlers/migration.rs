//! Migration handlers: eligibility check and the migration transition.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::MigrationStatusResponse;
use crate::app_state::AppState;
use crate::domain::{LaunchId, LaunchView};
use crate::error::{ErrorResponse, GatewayError};

fn status(view: LaunchView, eligible: bool, state: &AppState) -> MigrationStatusResponse {
    MigrationStatusResponse {
        launch_id: view.id,
        eligible,
        migrated: view.migrated,
        market_valuation: view.market_valuation,
        threshold: state.launch_service.market().migration_threshold,
        migrated_at: view.migrated_at,
    }
}

/// `GET /launches/{id}/migration`: Migration eligibility.
///
/// # Errors
///
/// Returns [`GatewayError`] if the launch does not exist.
#[utoipa::path(
    get,
    path = "/api/v1/launches/{id}/migration",
    tag = "Migration",
    summary = "Check migration eligibility",
    description = "Reports whether the launch's valuation has reached the migration threshold. Never migrates.",
    params(
        ("id" = String, Path, description = "Launch identifier"),
    ),
    responses(
        (status = 200, description = "Migration status", body = MigrationStatusResponse),
        (status = 404, description = "Launch not found", body = ErrorResponse),
    )
)]
pub async fn migration_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, GatewayError> {
    let id = LaunchId::parse(id)?;
    let eligible = state.launch_service.check_migration(&id).await?;
    let view = state.launch_service.get_launch(&id).await?;
    Ok(Json(status(view, eligible, &state)))
}

/// `POST /launches/{id}/migrate`: Perform the migration transition.
///
/// # Errors
///
/// Returns [`GatewayError`] if the launch does not exist, is below the
/// threshold, or has already migrated.
#[utoipa::path(
    post,
    path = "/api/v1/launches/{id}/migrate",
    tag = "Migration",
    summary = "Migrate a launch",
    description = "Marks an eligible launch as migrated, permanently closing its curve market.",
    params(
        ("id" = String, Path, description = "Launch identifier"),
    ),
    responses(
        (status = 200, description = "Launch migrated", body = MigrationStatusResponse),
        (status = 404, description = "Launch not found", body = ErrorResponse),
        (status = 409, description = "Not eligible or already migrated", body = ErrorResponse),
    )
)]
pub async fn migrate(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, GatewayError> {
    let id = LaunchId::parse(id)?;
    let view = state.launch_service.mark_migrated(&id).await?;
    Ok(Json(status(view, false, &state)))
}

/// Migration routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/launches/{id}/migration", get(migration_status))
        .route("/launches/{id}/migrate", post(migrate))
}
