//! Order settlement against a pool: quotes, receipts, and the math that
//! produces them.
//!
//! Settlement uses the spot price and rounds down, always in the pool's
//! favour:
//!
//! ```text
//! buy:  amount_out = floor(value_in * rate / price(sold))
//! sell: value_out  = floor(amount_in * price(sold - amount_in) / rate)
//! ```
//!
//! Returned supply is valued at the marginal price it occupies once back
//! in the pool, so a buy followed by a sell of the same tokens at the same
//! rate restores the pool up to dust smaller than the value of one token.
//! Sells are not priced at the current spot `price(sold)`; on a rising
//! curve that pays out more than the matching buy paid in and drains the
//! value reserve.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::amount::{ReferenceRate, TokenAmount, UnitPrice, ValueAmount};
use super::curve::BondingCurve;
use super::launch::{LaunchView, PoolState};
use crate::error::LedgerError;

/// Direction of an order, from the trader's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeSide {
    /// Value in, tokens out.
    Buy,
    /// Tokens in, value out.
    Sell,
}

/// Reference rate supplied with an order, optionally timestamped by the
/// price source so staleness can be bounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateSample {
    /// Pricing-currency units per settlement unit.
    pub rate: ReferenceRate,
    /// When the rate was observed.
    pub observed_at: Option<DateTime<Utc>>,
}

impl RateSample {
    /// A rate observed at `observed_at`.
    #[must_use]
    pub const fn observed(rate: ReferenceRate, observed_at: DateTime<Utc>) -> Self {
        Self {
            rate,
            observed_at: Some(observed_at),
        }
    }
}

impl From<ReferenceRate> for RateSample {
    fn from(rate: ReferenceRate) -> Self {
        Self {
            rate,
            observed_at: None,
        }
    }
}

/// Read-only projection of an order against the current pool state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Quote {
    /// Order direction.
    pub side: TradeSide,
    /// Tokens received (buy) or offered (sell).
    pub token_amount: TokenAmount,
    /// Value offered (buy) or received (sell).
    pub value_amount: ValueAmount,
    /// Spot price before the order.
    pub price_before: UnitPrice,
    /// Spot price after the order.
    pub price_after: UnitPrice,
    /// Rate the quote was computed at.
    pub reference_rate: ReferenceRate,
}

/// Record of a committed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Receipt {
    /// Order direction.
    pub side: TradeSide,
    /// Tokens moved out of (buy) or into (sell) the pool.
    pub amount_traded: TokenAmount,
    /// Value moved into (buy) or out of (sell) the pool.
    pub counter_amount: ValueAmount,
    /// Spot price before the order.
    pub price_before: UnitPrice,
    /// Spot price after the order.
    pub price_after: UnitPrice,
    /// Rate applied to the order.
    pub reference_rate: ReferenceRate,
    /// Commit timestamp.
    pub executed_at: DateTime<Utc>,
    /// `true` if this order lifted the valuation from below the migration
    /// threshold to at or above it.
    pub crossed_migration_threshold: bool,
    /// Launch state after the commit.
    pub launch: LaunchView,
}

/// Outcome of settling an order: the quote plus the pool state to commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Settlement {
    pub(crate) quote: Quote,
    pub(crate) pool_after: PoolState,
}

/// Settles a buy of `value_in` against `pool`.
///
/// Callers validate `value_in` and `rate` bounds first; with those bounds
/// `value_in * rate` cannot overflow.
pub(crate) fn settle_buy(
    pool: &PoolState,
    curve: &BondingCurve,
    value_in: ValueAmount,
    rate: ReferenceRate,
) -> Result<Settlement, LedgerError> {
    let price_before = curve.price(pool.cumulative_sold);
    let amount_out = value_in.raw() * rate.raw() / price_before.raw();

    if amount_out == 0 {
        return Err(LedgerError::InvalidAmount(format!(
            "{value_in} buys less than one token at {price_before}"
        )));
    }
    let available = u128::from(pool.token_reserve.get());
    if amount_out > available {
        return Err(LedgerError::InsufficientLiquidity {
            requested: amount_out,
            available: pool.token_reserve,
        });
    }
    let amount_out = TokenAmount::new(u64::try_from(amount_out).unwrap_or(u64::MAX));
    let Some(value_reserve) = pool.value_reserve.raw().checked_add(value_in.raw()) else {
        return Err(LedgerError::InvalidAmount(format!(
            "{value_in} overflows the value reserve {}",
            pool.value_reserve
        )));
    };

    let pool_after = PoolState {
        token_reserve: TokenAmount::new(pool.token_reserve.get() - amount_out.get()),
        cumulative_sold: TokenAmount::new(pool.cumulative_sold.get() + amount_out.get()),
        value_reserve: ValueAmount::from_raw(value_reserve),
    };

    Ok(Settlement {
        quote: Quote {
            side: TradeSide::Buy,
            token_amount: amount_out,
            value_amount: value_in,
            price_before,
            price_after: curve.price(pool_after.cumulative_sold),
            reference_rate: rate,
        },
        pool_after,
    })
}

/// Settles a sell of `amount_in` tokens against `pool`.
pub(crate) fn settle_sell(
    pool: &PoolState,
    curve: &BondingCurve,
    amount_in: TokenAmount,
    rate: ReferenceRate,
) -> Result<Settlement, LedgerError> {
    if amount_in > pool.cumulative_sold {
        return Err(LedgerError::OversellSupply {
            requested: amount_in,
            sold: pool.cumulative_sold,
        });
    }

    let sold_after = TokenAmount::new(pool.cumulative_sold.get() - amount_in.get());
    let price_after = curve.price(sold_after);
    let value_out =
        ValueAmount::from_raw(u128::from(amount_in.get()) * price_after.raw() / rate.raw());

    if value_out.is_zero() {
        return Err(LedgerError::InvalidAmount(format!(
            "{amount_in} tokens are worth less than the smallest value unit"
        )));
    }
    if value_out > pool.value_reserve {
        return Err(LedgerError::InsufficientReserve {
            requested: value_out,
            available: pool.value_reserve,
        });
    }

    let pool_after = PoolState {
        token_reserve: TokenAmount::new(pool.token_reserve.get() + amount_in.get()),
        cumulative_sold: sold_after,
        value_reserve: ValueAmount::from_raw(pool.value_reserve.raw() - value_out.raw()),
    };

    Ok(Settlement {
        quote: Quote {
            side: TradeSide::Sell,
            token_amount: amount_in,
            value_amount: value_out,
            price_before: curve.price(pool.cumulative_sold),
            price_after,
            reference_rate: rate,
        },
        pool_after,
    })
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::curve::CurveShape;

    fn curve() -> BondingCurve {
        let shape = CurveShape::Linear {
            base_price: UnitPrice::from_raw(5_000_000_000_000),
            slope: UnitPrice::from_raw(118_750),
        };
        let Ok(curve) = BondingCurve::with_allocation(shape, TokenAmount::new(1_000_000_000), 8_000)
        else {
            panic!("valid curve");
        };
        curve
    }

    fn rate(units: u128) -> ReferenceRate {
        ReferenceRate::from_units(units)
    }

    #[test]
    fn buy_at_base_price() {
        let curve = curve();
        let pool = PoolState::initial(curve.curve_supply());
        let Ok(s) = settle_buy(&pool, &curve, ValueAmount::from_units(1), rate(150)) else {
            panic!("buy settles");
        };
        // floor(150 / 0.000005)
        assert_eq!(s.quote.token_amount, TokenAmount::new(30_000_000));
        assert_eq!(s.pool_after.cumulative_sold, TokenAmount::new(30_000_000));
        assert_eq!(s.pool_after.token_reserve, TokenAmount::new(770_000_000));
        assert_eq!(s.pool_after.value_reserve, ValueAmount::from_units(1));
        assert!(s.quote.price_after > s.quote.price_before);
    }

    #[test]
    fn buy_rejects_dust() {
        let curve = curve();
        let pool = PoolState::initial(curve.curve_supply());
        let result = settle_buy(&pool, &curve, ValueAmount::from_raw(1), rate(1));
        assert!(matches!(result, Err(LedgerError::InvalidAmount(_))));
    }

    #[test]
    fn buy_into_saturated_value_reserve_fails() {
        let curve = curve();
        let mut pool = PoolState::initial(curve.curve_supply());
        pool.value_reserve = ValueAmount::from_raw(u128::MAX - 1);
        let result = settle_buy(&pool, &curve, ValueAmount::from_units(1), rate(150));
        assert!(matches!(result, Err(LedgerError::InvalidAmount(_))));
    }

    #[test]
    fn buy_beyond_reserve_fails() {
        let curve = curve();
        let pool = PoolState::initial(curve.curve_supply());
        let result = settle_buy(&pool, &curve, ValueAmount::from_units(30), rate(150));
        assert!(matches!(
            result,
            Err(LedgerError::InsufficientLiquidity {
                requested: 900_000_000,
                ..
            })
        ));
    }

    #[test]
    fn sell_returns_buy_value_at_same_rate() {
        let curve = curve();
        let pool = PoolState::initial(curve.curve_supply());
        let Ok(buy) = settle_buy(&pool, &curve, ValueAmount::from_units(1), rate(150)) else {
            panic!("buy settles");
        };
        let Ok(sell) = settle_sell(&buy.pool_after, &curve, buy.quote.token_amount, rate(150))
        else {
            panic!("sell settles");
        };
        assert_eq!(sell.quote.value_amount, ValueAmount::from_units(1));
        assert_eq!(sell.pool_after, pool);
    }

    #[test]
    fn sell_more_than_sold_fails() {
        let curve = curve();
        let pool = PoolState::initial(curve.curve_supply());
        let result = settle_sell(&pool, &curve, TokenAmount::new(1), rate(150));
        assert!(matches!(result, Err(LedgerError::OversellSupply { .. })));
    }

    #[test]
    fn sell_at_higher_value_rate_exhausts_reserve() {
        let curve = curve();
        let pool = PoolState::initial(curve.curve_supply());
        let Ok(buy) = settle_buy(&pool, &curve, ValueAmount::from_units(1), rate(150)) else {
            panic!("buy settles");
        };
        let result = settle_sell(&buy.pool_after, &curve, buy.quote.token_amount, rate(100));
        assert!(matches!(
            result,
            Err(LedgerError::InsufficientReserve { .. })
        ));
    }
}
