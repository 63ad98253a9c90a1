//! Buy, sell, and quote handlers.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};

use crate::api::dto::{BuyRequest, QuoteResponse, ReceiptResponse, SellRequest};
use crate::app_state::AppState;
use crate::domain::LaunchId;
use crate::error::{ErrorResponse, GatewayError};

/// `POST /launches/{id}/quote/buy`: Quote a buy.
///
/// # Errors
///
/// Returns [`GatewayError`] if the buy would be rejected.
#[utoipa::path(
    post,
    path = "/api/v1/launches/{id}/quote/buy",
    tag = "Trading",
    summary = "Quote a buy",
    description = "Computes the tokens a buy would receive at the current price without changing state.",
    params(
        ("id" = String, Path, description = "Launch identifier"),
    ),
    request_body = BuyRequest,
    responses(
        (status = 200, description = "Buy quote", body = QuoteResponse),
        (status = 400, description = "Invalid amount or rate", body = ErrorResponse),
        (status = 404, description = "Launch not found", body = ErrorResponse),
        (status = 409, description = "Market closed", body = ErrorResponse),
        (status = 422, description = "Insufficient liquidity or stale rate", body = ErrorResponse),
    )
)]
pub async fn quote_buy(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<BuyRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let id = LaunchId::parse(id)?;
    let (value, rate) = req.parse()?;
    let quote = state.launch_service.quote_buy(&id, value, rate).await?;
    Ok(Json(QuoteResponse::from(quote)))
}

/// `POST /launches/{id}/quote/sell`: Quote a sell.
///
/// # Errors
///
/// Returns [`GatewayError`] if the sell would be rejected.
#[utoipa::path(
    post,
    path = "/api/v1/launches/{id}/quote/sell",
    tag = "Trading",
    summary = "Quote a sell",
    description = "Computes the value a sell would return at the current price without changing state.",
    params(
        ("id" = String, Path, description = "Launch identifier"),
    ),
    request_body = SellRequest,
    responses(
        (status = 200, description = "Sell quote", body = QuoteResponse),
        (status = 400, description = "Invalid amount or rate", body = ErrorResponse),
        (status = 404, description = "Launch not found", body = ErrorResponse),
        (status = 409, description = "Market closed", body = ErrorResponse),
        (status = 422, description = "Oversell, insufficient reserve, or stale rate", body = ErrorResponse),
    )
)]
pub async fn quote_sell(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<SellRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let id = LaunchId::parse(id)?;
    let (amount, rate) = req.parse()?;
    let quote = state.launch_service.quote_sell(&id, amount, rate).await?;
    Ok(Json(QuoteResponse::from(quote)))
}

/// `POST /launches/{id}/buy`: Execute a buy.
///
/// # Errors
///
/// Returns [`GatewayError`] if the buy is rejected.
#[utoipa::path(
    post,
    path = "/api/v1/launches/{id}/buy",
    tag = "Trading",
    summary = "Execute a buy",
    description = "Buys tokens from the pool at the current curve price and returns the receipt.",
    params(
        ("id" = String, Path, description = "Launch identifier"),
    ),
    request_body = BuyRequest,
    responses(
        (status = 200, description = "Buy executed", body = ReceiptResponse),
        (status = 400, description = "Invalid amount or rate", body = ErrorResponse),
        (status = 404, description = "Launch not found", body = ErrorResponse),
        (status = 409, description = "Market closed", body = ErrorResponse),
        (status = 422, description = "Insufficient liquidity or stale rate", body = ErrorResponse),
    )
)]
pub async fn buy(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<BuyRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let id = LaunchId::parse(id)?;
    let (value, rate) = req.parse()?;
    let receipt = state.launch_service.execute_buy(&id, value, rate).await?;
    Ok(Json(ReceiptResponse::from(receipt)))
}

/// `POST /launches/{id}/sell`: Execute a sell.
///
/// # Errors
///
/// Returns [`GatewayError`] if the sell is rejected.
#[utoipa::path(
    post,
    path = "/api/v1/launches/{id}/sell",
    tag = "Trading",
    summary = "Execute a sell",
    description = "Sells tokens back to the pool at the post-sell curve price and returns the receipt.",
    params(
        ("id" = String, Path, description = "Launch identifier"),
    ),
    request_body = SellRequest,
    responses(
        (status = 200, description = "Sell executed", body = ReceiptResponse),
        (status = 400, description = "Invalid amount or rate", body = ErrorResponse),
        (status = 404, description = "Launch not found", body = ErrorResponse),
        (status = 409, description = "Market closed", body = ErrorResponse),
        (status = 422, description = "Oversell, insufficient reserve, or stale rate", body = ErrorResponse),
    )
)]
pub async fn sell(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<SellRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let id = LaunchId::parse(id)?;
    let (amount, rate) = req.parse()?;
    let receipt = state.launch_service.execute_sell(&id, amount, rate).await?;
    Ok(Json(ReceiptResponse::from(receipt)))
}

/// Trading routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/launches/{id}/quote/buy", post(quote_buy))
        .route("/launches/{id}/quote/sell", post(quote_sell))
        .route("/launches/{id}/buy", post(buy))
        .route("/launches/{id}/sell", post(sell))
}
