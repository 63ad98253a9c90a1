//! Fixed-point quantities used by the pricing curve and the ledger.
//!
//! Every quantity is an unsigned integer with an implied decimal scale:
//!
//! | Type              | Meaning                                   | Decimals |
//! |-------------------|-------------------------------------------|----------|
//! | [`TokenAmount`]   | whole tokens of the launched asset        | 0        |
//! | [`ValueAmount`]   | settlement value (e.g. SOL)               | 9        |
//! | [`ReferenceRate`] | pricing currency per settlement unit      | 9        |
//! | [`UnitPrice`]     | pricing currency per whole token          | 18       |
//! | [`Valuation`]     | pricing currency                          | 18       |
//!
//! The scales are chosen so that settlement never needs rescaling:
//! `value (1e-9) * rate (1e-9)` is already in price units (`1e-18`), and
//! `tokens * price / rate` lands back in value units.
//!
//! All quantities serialize as plain decimal strings to avoid precision
//! loss in JSON.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Fractional digits carried by [`ValueAmount`].
pub const VALUE_DECIMALS: u32 = 9;

/// Fractional digits carried by [`ReferenceRate`].
pub const RATE_DECIMALS: u32 = 9;

/// Fractional digits carried by [`UnitPrice`] and [`Valuation`].
pub const PRICE_DECIMALS: u32 = 18;

/// Largest settlement value accepted for a single order, in whole units.
pub const MAX_ORDER_VALUE_UNITS: u128 = 1_000_000_000;

/// Largest reference rate accepted, in whole pricing units per value unit.
pub const MAX_RATE_UNITS: u128 = 1_000_000_000;

/// Largest total supply a curve may be configured with.
pub const MAX_TOTAL_SUPPLY: u64 = 1_000_000_000_000_000;

/// Failure to parse a decimal quantity.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AmountError {
    /// Input was empty or whitespace.
    #[error("amount is empty")]
    Empty,

    /// Input was not a plain unsigned decimal.
    #[error("malformed decimal: {0:?}")]
    Malformed(String),

    /// Input carried more fractional digits than the type supports.
    #[error("too many fractional digits (at most {max})")]
    Precision {
        /// Supported fractional digits.
        max: u32,
    },

    /// Input does not fit the underlying integer.
    #[error("amount out of range: {0}")]
    OutOfRange(String),
}

/// Parses an unsigned decimal string into a raw fixed-point integer.
fn parse_fixed(input: &str, decimals: u32) -> Result<u128, AmountError> {
    let s = input.trim();
    if s.is_empty() {
        return Err(AmountError::Empty);
    }

    let (int_part, frac_part) = s.split_once('.').unwrap_or((s, ""));
    let is_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
    if (int_part.is_empty() && frac_part.is_empty()) || !is_digits(int_part) || !is_digits(frac_part)
    {
        return Err(AmountError::Malformed(s.to_string()));
    }

    let frac_len = u32::try_from(frac_part.len()).unwrap_or(u32::MAX);
    if frac_len > decimals {
        return Err(AmountError::Precision { max: decimals });
    }

    let out_of_range = || AmountError::OutOfRange(s.to_string());
    let int: u128 = if int_part.is_empty() {
        0
    } else {
        int_part.parse().map_err(|_| out_of_range())?
    };
    let frac: u128 = if frac_part.is_empty() {
        0
    } else {
        frac_part.parse().map_err(|_| out_of_range())?
    };

    let frac = frac * 10u128.pow(decimals - frac_len);
    int.checked_mul(10u128.pow(decimals))
        .and_then(|v| v.checked_add(frac))
        .ok_or_else(out_of_range)
}

/// Renders a raw fixed-point integer as a decimal string without
/// trailing zeros.
fn format_fixed(raw: u128, decimals: u32, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let scale = 10u128.pow(decimals);
    let int = raw / scale;
    let frac = raw % scale;
    if frac == 0 {
        return write!(f, "{int}");
    }
    let digits = format!("{frac:0width$}", width = decimals as usize);
    write!(f, "{int}.{}", digits.trim_end_matches('0'))
}

macro_rules! fixed_point {
    ($(#[$meta:meta])* $name:ident, $decimals:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(u128);

        impl $name {
            /// Zero.
            pub const ZERO: Self = Self(0);

            /// Number of fractional digits.
            pub const DECIMALS: u32 = $decimals;

            /// Wraps a raw fixed-point integer.
            #[must_use]
            pub const fn from_raw(raw: u128) -> Self {
                Self(raw)
            }

            /// Builds a value from a whole number of units.
            #[must_use]
            pub const fn from_units(units: u128) -> Self {
                Self(units.saturating_mul(10u128.pow($decimals)))
            }

            /// Returns the raw fixed-point integer.
            #[must_use]
            pub const fn raw(self) -> u128 {
                self.0
            }

            /// Returns `true` if the value is zero.
            #[must_use]
            pub const fn is_zero(self) -> bool {
                self.0 == 0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                format_fixed(self.0, $decimals, f)
            }
        }

        impl FromStr for $name {
            type Err = AmountError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                parse_fixed(s, $decimals).map(Self)
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.collect_str(self)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                s.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

fixed_point!(
    /// Settlement value (e.g. SOL) with lamport precision.
    ValueAmount,
    VALUE_DECIMALS
);

fixed_point!(
    /// Externally supplied conversion rate: pricing-currency units per
    /// settlement unit (e.g. USD per SOL).
    ReferenceRate,
    RATE_DECIMALS
);

fixed_point!(
    /// Price of one whole token in the pricing currency.
    UnitPrice,
    PRICE_DECIMALS
);

fixed_point!(
    /// Market valuation in the pricing currency.
    Valuation,
    PRICE_DECIMALS
);

impl ValueAmount {
    /// Largest value accepted for a single order.
    pub const MAX_ORDER: Self = Self::from_units(MAX_ORDER_VALUE_UNITS);

    /// Adds two values, saturating at the numeric bound.
    #[must_use]
    pub const fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }
}

impl ReferenceRate {
    /// Largest rate accepted.
    pub const MAX: Self = Self::from_units(MAX_RATE_UNITS);
}

/// Whole-token amount of a launched asset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TokenAmount(u64);

impl TokenAmount {
    /// Zero tokens.
    pub const ZERO: Self = Self(0);

    /// Wraps a token count.
    #[must_use]
    pub const fn new(amount: u64) -> Self {
        Self(amount)
    }

    /// Returns the token count.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Returns `true` if the amount is zero.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TokenAmount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = parse_fixed(s, 0)?;
        u64::try_from(raw)
            .map(Self)
            .map_err(|_| AmountError::OutOfRange(s.trim().to_string()))
    }
}

impl From<u64> for TokenAmount {
    fn from(amount: u64) -> Self {
        Self(amount)
    }
}

impl Serialize for TokenAmount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TokenAmount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn parses_whole_and_fractional_values() {
        let Ok(one) = "1.0".parse::<ValueAmount>() else {
            panic!("valid value");
        };
        assert_eq!(one.raw(), 1_000_000_000);

        let Ok(price) = "0.000005".parse::<UnitPrice>() else {
            panic!("valid price");
        };
        assert_eq!(price.raw(), 5_000_000_000_000);

        let Ok(half) = ".5".parse::<ReferenceRate>() else {
            panic!("valid rate");
        };
        assert_eq!(half.raw(), 500_000_000);
    }

    #[test]
    fn rejects_malformed_input() {
        assert_eq!("".parse::<ValueAmount>(), Err(AmountError::Empty));
        assert!(matches!(
            "-1".parse::<ValueAmount>(),
            Err(AmountError::Malformed(_))
        ));
        assert!(matches!(
            "1e9".parse::<ValueAmount>(),
            Err(AmountError::Malformed(_))
        ));
        assert!(matches!(
            ".".parse::<ValueAmount>(),
            Err(AmountError::Malformed(_))
        ));
        assert!(matches!(
            "1.2.3".parse::<ValueAmount>(),
            Err(AmountError::Malformed(_))
        ));
        assert_eq!(
            "0.0000000001".parse::<ValueAmount>(),
            Err(AmountError::Precision { max: 9 })
        );
    }

    #[test]
    fn rejects_out_of_range() {
        let huge = "9".repeat(40);
        assert!(matches!(
            huge.parse::<UnitPrice>(),
            Err(AmountError::OutOfRange(_))
        ));
        assert!(matches!(
            "18446744073709551616".parse::<TokenAmount>(),
            Err(AmountError::OutOfRange(_))
        ));
    }

    #[test]
    fn display_trims_trailing_zeros() {
        assert_eq!(ValueAmount::from_raw(1_500_000_000).to_string(), "1.5");
        assert_eq!(ValueAmount::from_units(3).to_string(), "3");
        assert_eq!(UnitPrice::from_raw(5_000_000_000_000).to_string(), "0.000005");
        assert_eq!(Valuation::ZERO.to_string(), "0");
    }

    #[test]
    fn tokens_reject_fractions() {
        assert!(matches!(
            "1.5".parse::<TokenAmount>(),
            Err(AmountError::Precision { max: 0 })
        ));
        assert_eq!("42".parse::<TokenAmount>(), Ok(TokenAmount::new(42)));
    }

    #[test]
    fn serializes_as_string() {
        let json = serde_json::to_string(&ValueAmount::from_raw(250_000_000)).unwrap_or_default();
        assert_eq!(json, "\"0.25\"");

        let back: Result<ValueAmount, _> = serde_json::from_str(&json);
        assert_eq!(back.ok(), Some(ValueAmount::from_raw(250_000_000)));

        let tokens = serde_json::to_string(&TokenAmount::new(800_000_000)).unwrap_or_default();
        assert_eq!(tokens, "\"800000000\"");
    }

    #[test]
    fn order_bounds_fit_without_overflow() {
        let product = ValueAmount::MAX_ORDER
            .raw()
            .checked_mul(ReferenceRate::MAX.raw());
        assert!(product.is_some());
    }
}
