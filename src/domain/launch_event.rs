//! Domain events reflecting launch state changes.
//!
//! Every committed mutation emits a [`LaunchEvent`] through the
//! [`super::EventBus`]. Events are broadcast to WebSocket subscribers.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::LaunchId;
use super::amount::{ReferenceRate, TokenAmount, UnitPrice, Valuation, ValueAmount};
use super::trade::{Receipt, TradeSide};

/// Domain event emitted after every state mutation.
///
/// Amounts serialize as decimal strings.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum LaunchEvent {
    /// Emitted when a new launch is created.
    LaunchCreated {
        /// Launch identifier.
        launch_id: LaunchId,
        /// Display name.
        name: String,
        /// Ticker symbol.
        symbol: String,
        /// Creator identity.
        creator: String,
        /// Creation timestamp.
        timestamp: DateTime<Utc>,
    },

    /// Emitted after a committed buy or sell.
    TradeExecuted {
        /// Launch identifier.
        launch_id: LaunchId,
        /// Order direction.
        side: TradeSide,
        /// Tokens moved.
        amount_traded: TokenAmount,
        /// Value moved.
        counter_amount: ValueAmount,
        /// Spot price before the trade.
        price_before: UnitPrice,
        /// Spot price after the trade.
        price_after: UnitPrice,
        /// Rate applied.
        reference_rate: ReferenceRate,
        /// Valuation after the trade.
        market_valuation: Valuation,
        /// Commit timestamp.
        timestamp: DateTime<Utc>,
    },

    /// Emitted when a trade lifts the valuation to the migration threshold.
    MigrationEligible {
        /// Launch identifier.
        launch_id: LaunchId,
        /// Valuation after the trade.
        market_valuation: Valuation,
        /// Configured threshold.
        threshold: Valuation,
        /// Timestamp of the crossing.
        timestamp: DateTime<Utc>,
    },

    /// Emitted after the explicit migration transition.
    LaunchMigrated {
        /// Launch identifier.
        launch_id: LaunchId,
        /// Valuation at migration.
        market_valuation: Valuation,
        /// Migration timestamp.
        timestamp: DateTime<Utc>,
    },
}

impl LaunchEvent {
    /// Builds a [`LaunchEvent::TradeExecuted`] from a receipt.
    #[must_use]
    pub fn trade(receipt: &Receipt) -> Self {
        Self::TradeExecuted {
            launch_id: receipt.launch.id.clone(),
            side: receipt.side,
            amount_traded: receipt.amount_traded,
            counter_amount: receipt.counter_amount,
            price_before: receipt.price_before,
            price_after: receipt.price_after,
            reference_rate: receipt.reference_rate,
            market_valuation: receipt.launch.market_valuation,
            timestamp: receipt.executed_at,
        }
    }

    /// Returns the launch ID associated with this event.
    #[must_use]
    pub fn launch_id(&self) -> &LaunchId {
        match self {
            Self::LaunchCreated { launch_id, .. }
            | Self::TradeExecuted { launch_id, .. }
            | Self::MigrationEligible { launch_id, .. }
            | Self::LaunchMigrated { launch_id, .. } => launch_id,
        }
    }

    /// Returns the event type as a static string slice.
    #[must_use]
    pub const fn event_type_str(&self) -> &'static str {
        match self {
            Self::LaunchCreated { .. } => "launch_created",
            Self::TradeExecuted { .. } => "trade_executed",
            Self::MigrationEligible { .. } => "migration_eligible",
            Self::LaunchMigrated { .. } => "launch_migrated",
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn launch_created_event_type() {
        let event = LaunchEvent::LaunchCreated {
            launch_id: LaunchId::generate(),
            name: "Grok".to_string(),
            symbol: "GROK".to_string(),
            creator: "creator".to_string(),
            timestamp: Utc::now(),
        };
        assert_eq!(event.event_type_str(), "launch_created");
    }

    #[test]
    fn trade_executed_serializes() {
        let event = LaunchEvent::TradeExecuted {
            launch_id: LaunchId::generate(),
            side: TradeSide::Buy,
            amount_traded: TokenAmount::new(30_000_000),
            counter_amount: ValueAmount::from_units(1),
            price_before: UnitPrice::from_raw(5_000_000_000_000),
            price_after: UnitPrice::from_raw(8_562_500_000_000),
            reference_rate: ReferenceRate::from_units(150),
            market_valuation: Valuation::from_units(8_562),
            timestamp: Utc::now(),
        };
        let json = serde_json::to_string(&event).unwrap_or_default();
        assert!(json.contains("\"event_type\":\"trade_executed\""));
        assert!(json.contains("\"side\":\"buy\""));
        assert!(json.contains("\"amount_traded\":\"30000000\""));
    }

    #[test]
    fn launch_id_accessor() {
        let id = LaunchId::generate();
        let event = LaunchEvent::LaunchMigrated {
            launch_id: id.clone(),
            market_valuation: Valuation::ZERO,
            timestamp: Utc::now(),
        };
        assert_eq!(event.launch_id(), &id);
    }
}
