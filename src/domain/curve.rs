//! Bonding-curve pricing function.
//!
//! [`BondingCurve::price`] maps cumulative sold supply to a unit price.
//! It is pure, total over `0..=curve_supply` (inputs beyond the curve
//! supply are clamped), and monotonically non-decreasing.
//!
//! # Overflow
//!
//! [`BondingCurve::new`] evaluates the curve at full sale with checked
//! arithmetic and also checks `price(curve_supply) * total_supply`. Every
//! runtime evaluation is bounded by those values, so the hot path uses
//! plain integer arithmetic. With `overflow-checks` enabled in every
//! profile a violated bound aborts instead of wrapping.

use serde::Serialize;

use super::amount::{MAX_TOTAL_SUPPLY, TokenAmount, UnitPrice, Valuation};

/// Basis-point denominator for the curve allocation fraction.
pub const BPS_DENOMINATOR: u64 = 10_000;

/// Shape of the price curve. Fixed at process start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum CurveShape {
    /// `price(s) = base_price + slope * s`.
    Linear {
        /// Price at zero sold supply.
        base_price: UnitPrice,
        /// Price increase per whole token sold.
        slope: UnitPrice,
    },
    /// Virtual-reserve constant product:
    /// `price(s) = base_price * v^2 / (v - s)^2`.
    ConstantProduct {
        /// Price at zero sold supply.
        base_price: UnitPrice,
        /// Virtual token reserve `v`; must exceed the curve supply.
        virtual_token_reserve: TokenAmount,
    },
}

impl CurveShape {
    /// Returns the configuration name of the shape.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Linear { .. } => "linear",
            Self::ConstantProduct { .. } => "constant_product",
        }
    }

    /// Returns the price at zero sold supply.
    #[must_use]
    pub const fn base_price(&self) -> UnitPrice {
        match self {
            Self::Linear { base_price, .. } | Self::ConstantProduct { base_price, .. } => {
                *base_price
            }
        }
    }

    fn checked_price(&self, sold: u64) -> Option<u128> {
        let sold = u128::from(sold);
        match *self {
            Self::Linear { base_price, slope } => slope
                .raw()
                .checked_mul(sold)?
                .checked_add(base_price.raw()),
            Self::ConstantProduct {
                base_price,
                virtual_token_reserve,
            } => {
                let v = u128::from(virtual_token_reserve.get());
                let rem = v.checked_sub(sold).filter(|r| *r > 0)?;
                base_price
                    .raw()
                    .checked_mul(v)?
                    .checked_div(rem)?
                    .checked_mul(v)?
                    .checked_div(rem)
            }
        }
    }
}

/// Rejected curve configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CurveError {
    /// Base price was zero.
    #[error("base price must be positive")]
    ZeroBasePrice,

    /// Curve supply was zero or exceeded the total supply.
    #[error("curve supply must be positive and at most the total supply")]
    InvalidCurveSupply,

    /// Total supply above [`MAX_TOTAL_SUPPLY`].
    #[error("total supply exceeds {MAX_TOTAL_SUPPLY}")]
    SupplyTooLarge,

    /// Allocation fraction outside `1..=10000` basis points.
    #[error("curve allocation must be 1-10000 bps, got {0}")]
    InvalidAllocation(u64),

    /// Constant-product virtual reserve not above the curve supply.
    #[error("virtual token reserve must exceed the curve supply")]
    VirtualReserveTooSmall,

    /// Curve parameters overflow at full sale.
    #[error("curve parameters overflow at full sale")]
    Overflow,
}

/// Validated pricing function for one market configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BondingCurve {
    shape: CurveShape,
    total_supply: TokenAmount,
    curve_supply: TokenAmount,
    max_price: UnitPrice,
}

impl BondingCurve {
    /// Validates a curve over `curve_supply` tokens out of `total_supply`.
    ///
    /// # Errors
    ///
    /// Returns a [`CurveError`] if any parameter is out of range or the
    /// curve would overflow at full sale.
    pub fn new(
        shape: CurveShape,
        total_supply: TokenAmount,
        curve_supply: TokenAmount,
    ) -> Result<Self, CurveError> {
        if shape.base_price().is_zero() {
            return Err(CurveError::ZeroBasePrice);
        }
        if total_supply.get() > MAX_TOTAL_SUPPLY {
            return Err(CurveError::SupplyTooLarge);
        }
        if curve_supply.is_zero() || curve_supply > total_supply {
            return Err(CurveError::InvalidCurveSupply);
        }
        if let CurveShape::ConstantProduct {
            virtual_token_reserve,
            ..
        } = shape
            && virtual_token_reserve <= curve_supply
        {
            return Err(CurveError::VirtualReserveTooSmall);
        }

        let max_price = shape
            .checked_price(curve_supply.get())
            .ok_or(CurveError::Overflow)?;
        max_price
            .checked_mul(u128::from(total_supply.get()))
            .ok_or(CurveError::Overflow)?;

        Ok(Self {
            shape,
            total_supply,
            curve_supply,
            max_price: UnitPrice::from_raw(max_price),
        })
    }

    /// Validates a curve that receives `allocation_bps / 10000` of the
    /// total supply.
    ///
    /// # Errors
    ///
    /// Returns a [`CurveError`] on an invalid allocation or any error
    /// from [`BondingCurve::new`].
    pub fn with_allocation(
        shape: CurveShape,
        total_supply: TokenAmount,
        allocation_bps: u64,
    ) -> Result<Self, CurveError> {
        if allocation_bps == 0 || allocation_bps > BPS_DENOMINATOR {
            return Err(CurveError::InvalidAllocation(allocation_bps));
        }
        let curve = u128::from(total_supply.get()) * u128::from(allocation_bps)
            / u128::from(BPS_DENOMINATOR);
        let curve = u64::try_from(curve).map_err(|_| CurveError::SupplyTooLarge)?;
        Self::new(shape, total_supply, TokenAmount::new(curve))
    }

    /// Unit price after `sold` tokens have left the pool.
    #[must_use]
    pub fn price(&self, sold: TokenAmount) -> UnitPrice {
        let sold = u128::from(sold.get().min(self.curve_supply.get()));
        let raw = match self.shape {
            CurveShape::Linear { base_price, slope } => base_price.raw() + slope.raw() * sold,
            CurveShape::ConstantProduct {
                base_price,
                virtual_token_reserve,
            } => {
                let v = u128::from(virtual_token_reserve.get());
                let rem = v - sold;
                base_price.raw() * v / rem * v / rem
            }
        };
        UnitPrice::from_raw(raw)
    }

    /// Market valuation of the full supply at `price`.
    #[must_use]
    pub fn valuation(&self, price: UnitPrice) -> Valuation {
        let price = price.raw().min(self.max_price.raw());
        Valuation::from_raw(price * u128::from(self.total_supply.get()))
    }

    /// Configured curve shape.
    #[must_use]
    pub const fn shape(&self) -> CurveShape {
        self.shape
    }

    /// Total asset supply.
    #[must_use]
    pub const fn total_supply(&self) -> TokenAmount {
        self.total_supply
    }

    /// Portion of the supply traded on the curve.
    #[must_use]
    pub const fn curve_supply(&self) -> TokenAmount {
        self.curve_supply
    }

    /// Price with the whole curve supply sold.
    #[must_use]
    pub const fn max_price(&self) -> UnitPrice {
        self.max_price
    }
}
