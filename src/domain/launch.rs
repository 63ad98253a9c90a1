//! Launch entity: descriptive metadata, pool state, and trading stats.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::LaunchId;
use super::amount::{TokenAmount, UnitPrice, Valuation, ValueAmount};
use super::curve::BondingCurve;

/// Descriptive metadata supplied at creation. Immutable afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchMetadata {
    /// Display name.
    pub name: String,
    /// Ticker symbol.
    pub symbol: String,
    /// Creator identity (e.g. wallet address).
    pub creator: String,
    /// Free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Image URI.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_uri: Option<String>,
    /// Twitter handle or URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub twitter: Option<String>,
    /// Project website.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
}

impl LaunchMetadata {
    /// Creates metadata with the required fields only.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        symbol: impl Into<String>,
        creator: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            symbol: symbol.into(),
            creator: creator.into(),
            ..Self::default()
        }
    }
}

/// Mutable pool state, always read and written as one unit.
///
/// Invariant: `token_reserve + cumulative_sold == curve_supply`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolState {
    /// Tokens still held by the pool.
    pub token_reserve: TokenAmount,
    /// Tokens sold out of the pool, net of sells.
    pub cumulative_sold: TokenAmount,
    /// Settlement value held by the pool.
    pub value_reserve: ValueAmount,
}

impl PoolState {
    /// State of a freshly created pool.
    #[must_use]
    pub const fn initial(curve_supply: TokenAmount) -> Self {
        Self {
            token_reserve: curve_supply,
            cumulative_sold: TokenAmount::ZERO,
            value_reserve: ValueAmount::ZERO,
        }
    }

    /// Returns `true` if reserve and sold supply add up to `curve_supply`.
    #[must_use]
    pub fn conserves(&self, curve_supply: TokenAmount) -> bool {
        self.token_reserve
            .get()
            .checked_add(self.cumulative_sold.get())
            == Some(curve_supply.get())
    }
}

/// Running trading statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeStats {
    /// Number of committed buys and sells.
    pub trade_count: u64,
    /// Settlement value moved in either direction.
    pub value_volume: ValueAmount,
    /// Time of the last committed trade.
    pub last_trade_at: Option<DateTime<Utc>>,
}

/// Canonical launch record. Owned exclusively by the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Launch {
    /// Unique identifier (immutable after creation).
    pub id: LaunchId,
    /// Descriptive metadata (immutable after creation).
    pub metadata: LaunchMetadata,
    /// Creation timestamp (immutable after creation).
    pub created_at: DateTime<Utc>,
    /// Pool state.
    pub pool: PoolState,
    /// One-way migration flag.
    pub migrated: bool,
    /// Time of the migration transition.
    pub migrated_at: Option<DateTime<Utc>>,
    /// Trading statistics.
    #[serde(default)]
    pub stats: TradeStats,
}

impl Launch {
    /// Creates a launch with the initial pool state.
    #[must_use]
    pub fn new(
        id: LaunchId,
        metadata: LaunchMetadata,
        curve_supply: TokenAmount,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            metadata,
            created_at,
            pool: PoolState::initial(curve_supply),
            migrated: false,
            migrated_at: None,
            stats: TradeStats::default(),
        }
    }

    /// Current unit price.
    #[must_use]
    pub fn unit_price(&self, curve: &BondingCurve) -> UnitPrice {
        curve.price(self.pool.cumulative_sold)
    }

    /// Current market valuation.
    #[must_use]
    pub fn market_valuation(&self, curve: &BondingCurve) -> Valuation {
        curve.valuation(self.unit_price(curve))
    }

    /// Immutable view of the launch with derived fields filled in.
    #[must_use]
    pub fn view(&self, curve: &BondingCurve) -> LaunchView {
        let unit_price = self.unit_price(curve);
        LaunchView {
            id: self.id.clone(),
            metadata: self.metadata.clone(),
            created_at: self.created_at,
            pool_token_reserve: self.pool.token_reserve,
            pool_value_reserve: self.pool.value_reserve,
            cumulative_sold: self.pool.cumulative_sold,
            unit_price,
            market_valuation: curve.valuation(unit_price),
            migrated: self.migrated,
            migrated_at: self.migrated_at,
            stats: self.stats,
        }
    }
}

/// Point-in-time view of a launch handed to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LaunchView {
    /// Launch identifier.
    pub id: LaunchId,
    /// Descriptive metadata.
    #[serde(flatten)]
    pub metadata: LaunchMetadata,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Tokens still held by the pool.
    pub pool_token_reserve: TokenAmount,
    /// Settlement value held by the pool.
    pub pool_value_reserve: ValueAmount,
    /// Tokens sold out of the pool.
    pub cumulative_sold: TokenAmount,
    /// Current unit price.
    pub unit_price: UnitPrice,
    /// `unit_price * total_supply`.
    pub market_valuation: Valuation,
    /// Whether the launch has migrated.
    pub migrated: bool,
    /// Time of the migration transition.
    pub migrated_at: Option<DateTime<Utc>>,
    /// Trading statistics.
    #[serde(flatten)]
    pub stats: TradeStats,
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

    #[test]
    fn new_launch_starts_with_full_reserve() {
        let curve = curve();
        let launch = Launch::new(
            LaunchId::generate(),
            LaunchMetadata::new("Grok", "GROK", "creator"),
            curve.curve_supply(),
            Utc::now(),
        );
        assert!(launch.pool.conserves(curve.curve_supply()));
        assert_eq!(launch.pool.cumulative_sold, TokenAmount::ZERO);
        assert_eq!(launch.pool.value_reserve, ValueAmount::ZERO);
        assert!(!launch.migrated);
    }

    #[test]
    fn view_derives_price_and_valuation() {
        let curve = curve();
        let launch = Launch::new(
            LaunchId::generate(),
            LaunchMetadata::new("Grok", "GROK", "creator"),
            curve.curve_supply(),
            Utc::now(),
        );
        let view = launch.view(&curve);
        assert_eq!(view.unit_price.to_string(), "0.000005");
        assert_eq!(view.market_valuation.to_string(), "5000");
        assert_eq!(view.pool_token_reserve, TokenAmount::new(800_000_000));
    }

    #[test]
    fn conserves_detects_drift() {
        let pool = PoolState {
            token_reserve: TokenAmount::new(10),
            cumulative_sold: TokenAmount::new(5),
            value_reserve: ValueAmount::ZERO,
        };
        assert!(pool.conserves(TokenAmount::new(15)));
        assert!(!pool.conserves(TokenAmount::new(16)));
    }

    #[test]
    fn view_serializes_flat() {
        let curve = curve();
        let launch = Launch::new(
            LaunchId::generate(),
            LaunchMetadata::new("Grok", "GROK", "creator"),
            curve.curve_supply(),
            Utc::now(),
        );
        let json = serde_json::to_value(launch.view(&curve)).unwrap_or_default();
        assert_eq!(json.get("symbol"), Some(&serde_json::json!("GROK")));
        assert_eq!(json.get("trade_count"), Some(&serde_json::json!(0)));
        assert_eq!(
            json.get("pool_token_reserve"),
            Some(&serde_json::json!("800000000"))
        );
    }
}
