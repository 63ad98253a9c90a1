//! Launch DTOs for create, get, list, and migration endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::common_dto::PaginationMeta;
use super::trade_dto::ReceiptResponse;
use crate::domain::{
    LaunchId, LaunchMetadata, LaunchView, TokenAmount, UnitPrice, Valuation, ValueAmount,
};

/// Creator's first purchase inside `POST /launches`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct InitialBuyRequest {
    /// Settlement value to spend, as a decimal string (e.g. `"1.5"`).
    pub value: String,
    /// Reference rate, as a decimal string (e.g. `"150"`).
    pub reference_rate: String,
    /// When the rate was observed.
    #[serde(default)]
    pub rate_observed_at: Option<DateTime<Utc>>,
}

/// Request body for `POST /launches`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateLaunchRequest {
    /// Caller-chosen identifier (e.g. a mint address). Generated when
    /// omitted.
    #[serde(default)]
    pub id: Option<String>,
    /// Display name.
    pub name: String,
    /// Ticker symbol.
    pub symbol: String,
    /// Creator identity.
    pub creator: String,
    /// Free-form description.
    #[serde(default)]
    pub description: Option<String>,
    /// Image URI.
    #[serde(default)]
    pub image_uri: Option<String>,
    /// Twitter handle or URL.
    #[serde(default)]
    pub twitter: Option<String>,
    /// Project website.
    #[serde(default)]
    pub website: Option<String>,
    /// Optional first purchase by the creator.
    #[serde(default)]
    pub initial_buy: Option<InitialBuyRequest>,
}

impl CreateLaunchRequest {
    /// Splits out the descriptive metadata.
    #[must_use]
    pub fn metadata(&self) -> LaunchMetadata {
        LaunchMetadata {
            name: self.name.clone(),
            symbol: self.symbol.clone(),
            creator: self.creator.clone(),
            description: self.description.clone(),
            image_uri: self.image_uri.clone(),
            twitter: self.twitter.clone(),
            website: self.website.clone(),
        }
    }
}

/// Launch state as returned by every launch endpoint.
///
/// Amounts are decimal strings.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LaunchResponse {
    /// Launch identifier.
    #[schema(value_type = String)]
    pub id: LaunchId,
    /// Display name.
    pub name: String,
    /// Ticker symbol.
    pub symbol: String,
    /// Creator identity.
    pub creator: String,
    /// Free-form description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Image URI.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_uri: Option<String>,
    /// Twitter handle or URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub twitter: Option<String>,
    /// Project website.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Tokens still held by the pool.
    #[schema(value_type = String)]
    pub pool_token_reserve: TokenAmount,
    /// Settlement value held by the pool.
    #[schema(value_type = String)]
    pub pool_value_reserve: ValueAmount,
    /// Tokens sold out of the pool.
    #[schema(value_type = String)]
    pub cumulative_sold: TokenAmount,
    /// Current unit price.
    #[schema(value_type = String)]
    pub unit_price: UnitPrice,
    /// Current market valuation.
    #[schema(value_type = String)]
    pub market_valuation: Valuation,
    /// Whether the launch has migrated.
    pub migrated: bool,
    /// Time of the migration transition.
    pub migrated_at: Option<DateTime<Utc>>,
    /// Number of committed trades.
    pub trade_count: u64,
    /// Settlement value traded in either direction.
    #[schema(value_type = String)]
    pub value_volume: ValueAmount,
    /// Time of the last trade.
    pub last_trade_at: Option<DateTime<Utc>>,
}

impl From<LaunchView> for LaunchResponse {
    fn from(view: LaunchView) -> Self {
        let LaunchView {
            id,
            metadata,
            created_at,
            pool_token_reserve,
            pool_value_reserve,
            cumulative_sold,
            unit_price,
            market_valuation,
            migrated,
            migrated_at,
            stats,
        } = view;
        Self {
            id,
            name: metadata.name,
            symbol: metadata.symbol,
            creator: metadata.creator,
            description: metadata.description,
            image_uri: metadata.image_uri,
            twitter: metadata.twitter,
            website: metadata.website,
            created_at,
            pool_token_reserve,
            pool_value_reserve,
            cumulative_sold,
            unit_price,
            market_valuation,
            migrated,
            migrated_at,
            trade_count: stats.trade_count,
            value_volume: stats.value_volume,
            last_trade_at: stats.last_trade_at,
        }
    }
}

/// Response body for `POST /launches` (201 Created).
#[derive(Debug, Serialize, ToSchema)]
pub struct CreateLaunchResponse {
    /// Launch state after creation (and the initial buy, if any).
    pub launch: LaunchResponse,
    /// Receipt of the initial buy.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_buy: Option<ReceiptResponse>,
}

/// Paginated list response for `GET /launches`.
#[derive(Debug, Serialize, ToSchema)]
pub struct LaunchListResponse {
    /// Launches on this page, in creation order.
    pub data: Vec<LaunchResponse>,
    /// Pagination metadata.
    pub pagination: PaginationMeta,
}

/// Response body for the migration endpoints.
#[derive(Debug, Serialize, ToSchema)]
pub struct MigrationStatusResponse {
    /// Launch identifier.
    #[schema(value_type = String)]
    pub launch_id: LaunchId,
    /// Valuation has reached the threshold and the launch has not
    /// migrated yet.
    pub eligible: bool,
    /// Whether the launch has migrated.
    pub migrated: bool,
    /// Current market valuation.
    #[schema(value_type = String)]
    pub market_valuation: Valuation,
    /// Configured migration threshold.
    #[schema(value_type = String)]
    pub threshold: Valuation,
    /// Time of the migration transition.
    pub migrated_at: Option<DateTime<Utc>>,
}
