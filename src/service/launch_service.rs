//! Launch service: wraps the ledger and emits events.

use std::sync::Arc;

use chrono::Utc;

use crate::domain::{
    EventBus, LaunchEvent, LaunchId, LaunchLedger, LaunchMetadata, LaunchView, LedgerConfig,
    Quote, RateSample, Receipt, TokenAmount, ValueAmount,
};
use crate::error::GatewayError;

/// Creator's optional first purchase, settled together with creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InitialBuy {
    /// Settlement value spent.
    pub value: ValueAmount,
    /// Rate applied.
    pub rate: RateSample,
}

/// Orchestration layer for all launch operations.
///
/// Stateless coordinator: owns references to [`LaunchLedger`] for state
/// and [`EventBus`] for event emission. Every mutation method follows
/// the pattern: call the ledger → emit events → log → return result.
/// Events are published after the launch lock is released.
#[derive(Debug, Clone)]
pub struct LaunchService {
    ledger: Arc<LaunchLedger>,
    event_bus: EventBus,
}

impl LaunchService {
    /// Creates a new `LaunchService`.
    #[must_use]
    pub fn new(ledger: Arc<LaunchLedger>, event_bus: EventBus) -> Self {
        Self { ledger, event_bus }
    }

    /// Returns a reference to the inner [`EventBus`].
    #[must_use]
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    /// Returns a reference to the inner [`LaunchLedger`].
    #[must_use]
    pub fn ledger(&self) -> &Arc<LaunchLedger> {
        &self.ledger
    }

    /// Returns the market parameters.
    #[must_use]
    pub fn market(&self) -> &LedgerConfig {
        self.ledger.config()
    }

    /// Creates a launch, generating an identifier when none is given.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] if the identifier is taken or the
    /// initial buy is rejected. A rejected initial buy registers nothing.
    pub async fn create_launch(
        &self,
        id: Option<LaunchId>,
        metadata: LaunchMetadata,
        initial_buy: Option<InitialBuy>,
    ) -> Result<(LaunchView, Option<Receipt>), GatewayError> {
        let id = id.unwrap_or_else(LaunchId::generate);

        let (view, receipt) = match initial_buy {
            Some(buy) => {
                let receipt = self
                    .ledger
                    .create_launch_with_buy(id, metadata, buy.value, buy.rate)
                    .await?;
                (receipt.launch.clone(), Some(receipt))
            }
            None => (self.ledger.create_launch(id, metadata).await?, None),
        };

        let _ = self.event_bus.publish(LaunchEvent::LaunchCreated {
            launch_id: view.id.clone(),
            name: view.metadata.name.clone(),
            symbol: view.metadata.symbol.clone(),
            creator: view.metadata.creator.clone(),
            timestamp: view.created_at,
        });
        tracing::info!(launch_id = %view.id, symbol = %view.metadata.symbol, "launch created");

        if let Some(receipt) = &receipt {
            self.publish_trade(receipt);
        }
        Ok((view, receipt))
    }

    /// Projects a buy without mutating state.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] if the order would be rejected.
    pub async fn quote_buy(
        &self,
        id: &LaunchId,
        value_in: ValueAmount,
        rate: RateSample,
    ) -> Result<Quote, GatewayError> {
        Ok(self.ledger.quote_buy(id, value_in, rate).await?)
    }

    /// Projects a sell without mutating state.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] if the order would be rejected.
    pub async fn quote_sell(
        &self,
        id: &LaunchId,
        amount_in: TokenAmount,
        rate: RateSample,
    ) -> Result<Quote, GatewayError> {
        Ok(self.ledger.quote_sell(id, amount_in, rate).await?)
    }

    /// Executes a buy.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] if the order is rejected.
    pub async fn execute_buy(
        &self,
        id: &LaunchId,
        value_in: ValueAmount,
        rate: RateSample,
    ) -> Result<Receipt, GatewayError> {
        let receipt = self.ledger.execute_buy(id, value_in, rate).await?;
        self.publish_trade(&receipt);
        Ok(receipt)
    }

    /// Executes a sell.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] if the order is rejected.
    pub async fn execute_sell(
        &self,
        id: &LaunchId,
        amount_in: TokenAmount,
        rate: RateSample,
    ) -> Result<Receipt, GatewayError> {
        let receipt = self.ledger.execute_sell(id, amount_in, rate).await?;
        self.publish_trade(&receipt);
        Ok(receipt)
    }

    /// Returns whether the launch is eligible for migration.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] if the launch does not exist.
    pub async fn check_migration(&self, id: &LaunchId) -> Result<bool, GatewayError> {
        Ok(self.ledger.check_migration(id).await?)
    }

    /// Migrates an eligible launch, closing its market.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] if the launch does not exist, is not
    /// eligible, or has already migrated.
    pub async fn mark_migrated(&self, id: &LaunchId) -> Result<LaunchView, GatewayError> {
        let view = self.ledger.mark_migrated(id).await?;

        let _ = self.event_bus.publish(LaunchEvent::LaunchMigrated {
            launch_id: view.id.clone(),
            market_valuation: view.market_valuation,
            timestamp: view.migrated_at.unwrap_or_else(Utc::now),
        });
        tracing::info!(
            launch_id = %view.id,
            market_valuation = %view.market_valuation,
            "launch migrated"
        );
        Ok(view)
    }

    /// Returns a view of one launch.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] if the launch does not exist.
    pub async fn get_launch(&self, id: &LaunchId) -> Result<LaunchView, GatewayError> {
        Ok(self.ledger.get_launch(id).await?)
    }

    /// Returns views of all launches in insertion order.
    pub async fn list_launches(&self) -> Vec<LaunchView> {
        self.ledger.list_launches().await
    }

    /// Number of launches.
    pub async fn launch_count(&self) -> usize {
        self.ledger.len().await
    }

    fn publish_trade(&self, receipt: &Receipt) {
        let launch = &receipt.launch;
        let _ = self.event_bus.publish(LaunchEvent::trade(receipt));
        tracing::info!(
            launch_id = %launch.id,
            side = ?receipt.side,
            amount = %receipt.amount_traded,
            value = %receipt.counter_amount,
            price_after = %receipt.price_after,
            "trade executed"
        );

        if receipt.crossed_migration_threshold {
            let threshold = self.ledger.config().migration_threshold;
            let _ = self.event_bus.publish(LaunchEvent::MigrationEligible {
                launch_id: launch.id.clone(),
                market_valuation: launch.market_valuation,
                threshold,
                timestamp: receipt.executed_at,
            });
            tracing::info!(
                launch_id = %launch.id,
                market_valuation = %launch.market_valuation,
                %threshold,
                "migration threshold reached"
            );
        }
    }
}
