//! Buy, sell, and quote DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::launch_dto::LaunchResponse;
use crate::domain::{
    Quote, RateSample, Receipt, ReferenceRate, TokenAmount, TradeSide, UnitPrice, ValueAmount,
};
use crate::error::GatewayError;

/// Parses a reference rate and its optional observation time.
fn rate_sample(
    reference_rate: &str,
    observed_at: Option<DateTime<Utc>>,
) -> Result<RateSample, GatewayError> {
    let rate: ReferenceRate = reference_rate.parse()?;
    Ok(RateSample {
        rate,
        observed_at,
    })
}

/// Request body for `POST /launches/{id}/buy` and `/quote/buy`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct BuyRequest {
    /// Settlement value to spend, as a decimal string (e.g. `"1"`).
    pub value: String,
    /// Reference rate, as a decimal string (e.g. `"150"`).
    pub reference_rate: String,
    /// When the rate was observed.
    #[serde(default)]
    pub rate_observed_at: Option<DateTime<Utc>>,
}

impl BuyRequest {
    /// Parses the request into ledger inputs.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] if an amount is malformed.
    pub fn parse(&self) -> Result<(ValueAmount, RateSample), GatewayError> {
        let value: ValueAmount = self.value.parse()?;
        Ok((value, rate_sample(&self.reference_rate, self.rate_observed_at)?))
    }
}

/// Request body for `POST /launches/{id}/sell` and `/quote/sell`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SellRequest {
    /// Whole tokens to sell, as a decimal string.
    pub amount: String,
    /// Reference rate, as a decimal string (e.g. `"150"`).
    pub reference_rate: String,
    /// When the rate was observed.
    #[serde(default)]
    pub rate_observed_at: Option<DateTime<Utc>>,
}

impl SellRequest {
    /// Parses the request into ledger inputs.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] if an amount is malformed.
    pub fn parse(&self) -> Result<(TokenAmount, RateSample), GatewayError> {
        let amount: TokenAmount = self.amount.parse()?;
        Ok((amount, rate_sample(&self.reference_rate, self.rate_observed_at)?))
    }
}

/// Response body for the quote endpoints.
#[derive(Debug, Serialize, ToSchema)]
pub struct QuoteResponse {
    /// `"buy"` or `"sell"`.
    #[schema(value_type = String)]
    pub side: TradeSide,
    /// Tokens received (buy) or offered (sell).
    #[schema(value_type = String)]
    pub token_amount: TokenAmount,
    /// Value offered (buy) or received (sell).
    #[schema(value_type = String)]
    pub value_amount: ValueAmount,
    /// Spot price before the order.
    #[schema(value_type = String)]
    pub price_before: UnitPrice,
    /// Spot price after the order.
    #[schema(value_type = String)]
    pub price_after: UnitPrice,
    /// Rate the quote was computed at.
    #[schema(value_type = String)]
    pub reference_rate: ReferenceRate,
}

impl From<Quote> for QuoteResponse {
    fn from(q: Quote) -> Self {
        Self {
            side: q.side,
            token_amount: q.token_amount,
            value_amount: q.value_amount,
            price_before: q.price_before,
            price_after: q.price_after,
            reference_rate: q.reference_rate,
        }
    }
}

/// Response body for executed buys and sells.
#[derive(Debug, Serialize, ToSchema)]
pub struct ReceiptResponse {
    /// `"buy"` or `"sell"`.
    #[schema(value_type = String)]
    pub side: TradeSide,
    /// Tokens moved.
    #[schema(value_type = String)]
    pub amount_traded: TokenAmount,
    /// Value moved.
    #[schema(value_type = String)]
    pub counter_amount: ValueAmount,
    /// Spot price before the trade.
    #[schema(value_type = String)]
    pub price_before: UnitPrice,
    /// Spot price after the trade.
    #[schema(value_type = String)]
    pub price_after: UnitPrice,
    /// Rate applied.
    #[schema(value_type = String)]
    pub reference_rate: ReferenceRate,
    /// Commit timestamp.
    pub executed_at: DateTime<Utc>,
    /// This trade lifted the valuation to the migration threshold.
    pub crossed_migration_threshold: bool,
    /// Launch state after the trade.
    pub launch: LaunchResponse,
}

impl From<Receipt> for ReceiptResponse {
    fn from(r: Receipt) -> Self {
        Self {
            side: r.side,
            amount_traded: r.amount_traded,
            counter_amount: r.counter_amount,
            price_before: r.price_before,
            price_after: r.price_after,
            reference_rate: r.reference_rate,
            executed_at: r.executed_at,
            crossed_migration_threshold: r.crossed_migration_threshold,
            launch: r.launch.into(),
        }
    }
}
