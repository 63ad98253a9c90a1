//! Ledger and gateway error types.
//!
//! [`LedgerError`] covers every recoverable failure of the launch ledger.
//! [`GatewayError`] is the central error type of the service: it wraps
//! ledger errors and adds request, persistence, and internal failures.
//! Each gateway variant maps to a specific HTTP status code and a
//! structured JSON error response.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::amount::{AmountError, TokenAmount, ValueAmount};
use crate::domain::launch_id::{InvalidLaunchId, LaunchId};

/// Recoverable ledger failure. A failing operation leaves pool state
/// unchanged.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    /// No launch with the given identifier.
    #[error("launch not found: {0}")]
    NotFound(LaunchId),

    /// A launch with the given identifier already exists.
    #[error("launch already exists: {0}")]
    DuplicateAsset(LaunchId),

    /// Non-positive, out-of-range, or malformed amount or rate.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// The launch has migrated; curve trading is over.
    #[error("market closed: launch {0} has migrated")]
    MarketClosed(LaunchId),

    /// A buy would take more tokens than the pool holds.
    #[error("insufficient liquidity: requested {requested} tokens, pool holds {available}")]
    InsufficientLiquidity {
        /// Tokens the order would receive.
        requested: u128,
        /// Tokens left in the pool.
        available: TokenAmount,
    },

    /// A sell would pay out more value than the pool holds.
    #[error("insufficient reserve: requested {requested}, pool holds {available}")]
    InsufficientReserve {
        /// Value the order would receive.
        requested: ValueAmount,
        /// Value left in the pool.
        available: ValueAmount,
    },

    /// A sell would return more supply than has ever been sold.
    #[error("oversell: returning {requested} tokens but only {sold} sold")]
    OversellSupply {
        /// Tokens offered.
        requested: TokenAmount,
        /// Cumulative sold supply.
        sold: TokenAmount,
    },

    /// The reference rate is older than the configured bound.
    #[error("stale reference rate: {0}")]
    StaleRate(String),

    /// Migration requested before the valuation threshold was reached.
    #[error("launch {0} has not reached the migration threshold")]
    MigrationNotEligible(LaunchId),

    /// A snapshot record violates the ledger invariants.
    #[error("corrupt snapshot: {0}")]
    CorruptSnapshot(String),
}

impl From<AmountError> for LedgerError {
    fn from(err: AmountError) -> Self {
        Self::InvalidAmount(err.to_string())
    }
}

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 4001,
///     "message": "insufficient liquidity: requested 900000000 tokens, pool holds 800000000",
///     "details": null
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code.
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category        | HTTP Status                  |
/// |-----------|-----------------|------------------------------|
/// | 1000–1999 | Validation      | 400 Bad Request              |
/// | 2000–2999 | State/Not Found | 404 Not Found / 409 Conflict |
/// | 3000–3999 | Server          | 500 Internal Server Error    |
/// | 4000–4999 | Market          | 422 Unprocessable Entity     |
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Error propagated from the launch ledger.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Request validation failed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Snapshot store failure.
    #[error("persistence error: {0}")]
    PersistenceError(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<InvalidLaunchId> for GatewayError {
    fn from(err: InvalidLaunchId) -> Self {
        Self::InvalidRequest(err.to_string())
    }
}

impl From<AmountError> for GatewayError {
    fn from(err: AmountError) -> Self {
        Self::Ledger(err.into())
    }
}

impl GatewayError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidRequest(_) => 1001,
            Self::Ledger(err) => match err {
                LedgerError::InvalidAmount(_) => 1002,
                LedgerError::NotFound(_) => 2001,
                LedgerError::DuplicateAsset(_) => 2002,
                LedgerError::MarketClosed(_) => 2003,
                LedgerError::MigrationNotEligible(_) => 2004,
                LedgerError::InsufficientLiquidity { .. } => 4001,
                LedgerError::InsufficientReserve { .. } => 4002,
                LedgerError::OversellSupply { .. } => 4003,
                LedgerError::StaleRate(_) => 4004,
                LedgerError::CorruptSnapshot(_) => 3002,
            },
            Self::PersistenceError(_) => 3001,
            Self::Internal(_) => 3000,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::Ledger(err) => match err {
                LedgerError::InvalidAmount(_) => StatusCode::BAD_REQUEST,
                LedgerError::NotFound(_) => StatusCode::NOT_FOUND,
                LedgerError::DuplicateAsset(_)
                | LedgerError::MarketClosed(_)
                | LedgerError::MigrationNotEligible(_) => StatusCode::CONFLICT,
                LedgerError::InsufficientLiquidity { .. }
                | LedgerError::InsufficientReserve { .. }
                | LedgerError::OversellSupply { .. }
                | LedgerError::StaleRate(_) => StatusCode::UNPROCESSABLE_ENTITY,
                LedgerError::CorruptSnapshot(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::PersistenceError(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details: None,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}
