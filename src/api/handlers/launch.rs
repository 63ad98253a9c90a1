//! Launch handlers: create, list, get.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::{
    CreateLaunchRequest, CreateLaunchResponse, LaunchListResponse, LaunchResponse,
    PaginationParams,
};
use crate::app_state::AppState;
use crate::domain::{LaunchId, RateSample, ReferenceRate, ValueAmount};
use crate::error::{ErrorResponse, GatewayError};
use crate::service::InitialBuy;

/// `POST /launches`: Create a launch.
///
/// # Errors
///
/// Returns [`GatewayError`] on an invalid identifier or amount, a taken
/// identifier, or a rejected initial buy.
#[utoipa::path(
    post,
    path = "/api/v1/launches",
    tag = "Launches",
    summary = "Create a launch",
    description = "Registers a new token launch with a full curve reserve. The identifier is generated when omitted. An optional initial buy is settled atomically with creation.",
    request_body = CreateLaunchRequest,
    responses(
        (status = 201, description = "Launch created", body = CreateLaunchResponse),
        (status = 400, description = "Invalid identifier or amount", body = ErrorResponse),
        (status = 409, description = "Identifier already registered", body = ErrorResponse),
        (status = 422, description = "Initial buy cannot be filled", body = ErrorResponse),
    )
)]
pub async fn create_launch(
    State(state): State<AppState>,
    Json(req): Json<CreateLaunchRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    if req.name.trim().is_empty() || req.symbol.trim().is_empty() {
        return Err(GatewayError::InvalidRequest(
            "name and symbol are required".to_string(),
        ));
    }
    let id = req.id.clone().map(LaunchId::parse).transpose()?;
    let initial_buy = match &req.initial_buy {
        Some(buy) => {
            let value: ValueAmount = buy.value.parse()?;
            let rate: ReferenceRate = buy.reference_rate.parse()?;
            Some(InitialBuy {
                value,
                rate: RateSample {
                    rate,
                    observed_at: buy.rate_observed_at,
                },
            })
        }
        None => None,
    };

    let (view, receipt) = state
        .launch_service
        .create_launch(id, req.metadata(), initial_buy)
        .await?;

    let response = CreateLaunchResponse {
        launch: view.into(),
        initial_buy: receipt.map(Into::into),
    };
    Ok((StatusCode::CREATED, Json(response)))
}

/// `GET /launches`: List launches with pagination.
///
/// # Errors
///
/// Returns [`GatewayError`] on internal failures.
#[utoipa::path(
    get,
    path = "/api/v1/launches",
    tag = "Launches",
    summary = "List launches",
    description = "Returns a paginated list of all launches in creation order.",
    params(PaginationParams),
    responses(
        (status = 200, description = "Paginated launch list", body = LaunchListResponse),
    )
)]
pub async fn list_launches(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> Result<impl IntoResponse, GatewayError> {
    let views = state.launch_service.list_launches().await;
    let (page, pagination) = params.paginate(views);

    Ok(Json(LaunchListResponse {
        data: page.into_iter().map(LaunchResponse::from).collect(),
        pagination,
    }))
}

/// `GET /launches/{id}`: Get launch details.
///
/// # Errors
///
/// Returns [`GatewayError`] if the launch does not exist.
#[utoipa::path(
    get,
    path = "/api/v1/launches/{id}",
    tag = "Launches",
    summary = "Get launch details",
    description = "Returns the launch's metadata, pool state, current price, valuation, and trading statistics.",
    params(
        ("id" = String, Path, description = "Launch identifier"),
    ),
    responses(
        (status = 200, description = "Launch details", body = LaunchResponse),
        (status = 404, description = "Launch not found", body = ErrorResponse),
    )
)]
pub async fn get_launch(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, GatewayError> {
    let id = LaunchId::parse(id)?;
    let view = state.launch_service.get_launch(&id).await?;
    Ok(Json(LaunchResponse::from(view)))
}

/// Launch routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/launches", get(list_launches).post(create_launch))
        .route("/launches/{id}", get(get_launch))
}
