//! Authoritative in-memory registry of launches.
//!
//! [`LaunchLedger`] owns every [`Launch`] and is the only place pool
//! state is mutated. Launches live in a map guarded by a
//! [`tokio::sync::RwLock`], and each launch sits behind its own
//! `Arc<RwLock<Launch>>`.
//!
//! # Concurrency
//!
//! - The registry lock is held only to look up or insert an identifier.
//! - Buys, sells, and the migration transition on one launch take its
//!   write lock, so they serialize and never lose an update.
//! - Operations on different launches never wait on each other.
//! - Quotes and views take the read lock and see a consistent pool.
//! - Nothing awaits I/O while holding a launch lock.
//!
//! Every mutation validates against the locked state before writing
//! anything, so a rejected order leaves the pool untouched.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use tokio::sync::RwLock;

use super::LaunchId;
use super::amount::{ReferenceRate, TokenAmount, Valuation, ValueAmount};
use super::curve::BondingCurve;
use super::launch::{Launch, LaunchMetadata, LaunchView};
use super::snapshot::{LedgerSnapshot, SNAPSHOT_VERSION};
use super::trade::{Quote, RateSample, Receipt, Settlement, settle_buy, settle_sell};
use crate::error::LedgerError;

/// Market parameters fixed at process start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerConfig {
    /// Pricing function.
    pub curve: BondingCurve,
    /// Valuation at which a launch becomes eligible for migration.
    pub migration_threshold: Valuation,
    /// Oldest reference rate accepted, if bounded.
    pub max_rate_age: Option<TimeDelta>,
}

impl LedgerConfig {
    /// Creates a configuration without a rate staleness bound.
    #[must_use]
    pub const fn new(curve: BondingCurve, migration_threshold: Valuation) -> Self {
        Self {
            curve,
            migration_threshold,
            max_rate_age: None,
        }
    }

    /// Rejects reference rates observed more than `max_age` ago.
    #[must_use]
    pub const fn with_max_rate_age(mut self, max_age: TimeDelta) -> Self {
        self.max_rate_age = Some(max_age);
        self
    }
}

#[derive(Debug, Default)]
struct LaunchSlots {
    index: HashMap<LaunchId, Arc<RwLock<Launch>>>,
    order: Vec<Arc<RwLock<Launch>>>,
}

impl LaunchSlots {
    fn insert(&mut self, launch: Launch) {
        let id = launch.id.clone();
        let entry = Arc::new(RwLock::new(launch));
        self.order.push(Arc::clone(&entry));
        self.index.insert(id, entry);
    }
}

/// Registry and sole mutator of launch state.
#[derive(Debug)]
pub struct LaunchLedger {
    config: LedgerConfig,
    launches: RwLock<LaunchSlots>,
}

impl LaunchLedger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new(config: LedgerConfig) -> Self {
        Self {
            config,
            launches: RwLock::new(LaunchSlots::default()),
        }
    }

    /// Market parameters.
    #[must_use]
    pub const fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Pricing function.
    #[must_use]
    pub const fn curve(&self) -> &BondingCurve {
        &self.config.curve
    }

    /// Registers a new launch with a full token reserve and no value.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::DuplicateAsset`] if `id` is already taken.
    pub async fn create_launch(
        &self,
        id: LaunchId,
        metadata: LaunchMetadata,
    ) -> Result<LaunchView, LedgerError> {
        let launch = Launch::new(id, metadata, self.config.curve.curve_supply(), Utc::now());
        let view = launch.view(&self.config.curve);

        let mut slots = self.launches.write().await;
        if slots.index.contains_key(&launch.id) {
            return Err(LedgerError::DuplicateAsset(launch.id));
        }
        slots.insert(launch);
        Ok(view)
    }

    /// Registers a new launch and settles the creator's first buy against
    /// it before the launch becomes visible.
    ///
    /// Nothing is registered if the buy is rejected.
    ///
    /// # Errors
    ///
    /// Fails like [`LaunchLedger::create_launch`] and
    /// [`LaunchLedger::execute_buy`].
    pub async fn create_launch_with_buy(
        &self,
        id: LaunchId,
        metadata: LaunchMetadata,
        value_in: ValueAmount,
        rate: impl Into<RateSample>,
    ) -> Result<Receipt, LedgerError> {
        validate_value(value_in)?;
        let now = Utc::now();
        let rate = self.validate_rate(&rate.into(), now)?;

        let mut launch = Launch::new(id, metadata, self.config.curve.curve_supply(), now);
        let settlement = settle_buy(&launch.pool, &self.config.curve, value_in, rate)?;
        let receipt = self.commit(&mut launch, settlement, now);

        let mut slots = self.launches.write().await;
        if slots.index.contains_key(&launch.id) {
            return Err(LedgerError::DuplicateAsset(launch.id));
        }
        slots.insert(launch);
        Ok(receipt)
    }

    /// Projects a buy of `value_in` without touching the pool.
    ///
    /// # Errors
    ///
    /// Fails with the same errors [`LaunchLedger::execute_buy`] would.
    pub async fn quote_buy(
        &self,
        id: &LaunchId,
        value_in: ValueAmount,
        rate: impl Into<RateSample>,
    ) -> Result<Quote, LedgerError> {
        validate_value(value_in)?;
        let rate = self.validate_rate(&rate.into(), Utc::now())?;

        let entry = self.entry(id).await?;
        let launch = entry.read().await;
        ensure_open(&launch)?;
        settle_buy(&launch.pool, &self.config.curve, value_in, rate).map(|s| s.quote)
    }

    /// Projects a sell of `amount_in` tokens without touching the pool.
    ///
    /// # Errors
    ///
    /// Fails with the same errors [`LaunchLedger::execute_sell`] would.
    pub async fn quote_sell(
        &self,
        id: &LaunchId,
        amount_in: TokenAmount,
        rate: impl Into<RateSample>,
    ) -> Result<Quote, LedgerError> {
        validate_tokens(amount_in)?;
        let rate = self.validate_rate(&rate.into(), Utc::now())?;

        let entry = self.entry(id).await?;
        let launch = entry.read().await;
        ensure_open(&launch)?;
        settle_sell(&launch.pool, &self.config.curve, amount_in, rate).map(|s| s.quote)
    }

    /// Buys tokens with `value_in` at the current price and commits.
    ///
    /// The price is read from the committed state under the launch's
    /// write lock, never from an earlier quote.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::InvalidAmount`] for a zero or oversized value, a
    ///   bad rate, or an order too small to buy one token.
    /// - [`LedgerError::StaleRate`] if the rate is older than allowed.
    /// - [`LedgerError::NotFound`] for an unknown launch.
    /// - [`LedgerError::MarketClosed`] if the launch has migrated.
    /// - [`LedgerError::InsufficientLiquidity`] if the pool cannot fill
    ///   the order.
    pub async fn execute_buy(
        &self,
        id: &LaunchId,
        value_in: ValueAmount,
        rate: impl Into<RateSample>,
    ) -> Result<Receipt, LedgerError> {
        validate_value(value_in)?;
        let now = Utc::now();
        let rate = self.validate_rate(&rate.into(), now)?;

        let entry = self.entry(id).await?;
        let mut launch = entry.write().await;
        ensure_open(&launch)?;
        let settlement = settle_buy(&launch.pool, &self.config.curve, value_in, rate)?;
        yield_before_commit().await;
        Ok(self.commit(&mut launch, settlement, now))
    }

    /// Sells `amount_in` tokens back to the pool and commits.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::InvalidAmount`] for a zero amount, a bad rate, or
    ///   a sell worth less than one value unit.
    /// - [`LedgerError::StaleRate`] if the rate is older than allowed.
    /// - [`LedgerError::NotFound`] for an unknown launch.
    /// - [`LedgerError::MarketClosed`] if the launch has migrated.
    /// - [`LedgerError::OversellSupply`] if `amount_in` exceeds the
    ///   cumulative sold supply.
    /// - [`LedgerError::InsufficientReserve`] if the pool cannot pay out.
    pub async fn execute_sell(
        &self,
        id: &LaunchId,
        amount_in: TokenAmount,
        rate: impl Into<RateSample>,
    ) -> Result<Receipt, LedgerError> {
        validate_tokens(amount_in)?;
        let now = Utc::now();
        let rate = self.validate_rate(&rate.into(), now)?;

        let entry = self.entry(id).await?;
        let mut launch = entry.write().await;
        ensure_open(&launch)?;
        let settlement = settle_sell(&launch.pool, &self.config.curve, amount_in, rate)?;
        yield_before_commit().await;
        Ok(self.commit(&mut launch, settlement, now))
    }

    /// Returns `true` if the launch has reached the migration threshold
    /// and has not migrated yet. Never migrates by itself.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::NotFound`] for an unknown launch.
    pub async fn check_migration(&self, id: &LaunchId) -> Result<bool, LedgerError> {
        let entry = self.entry(id).await?;
        let launch = entry.read().await;
        Ok(!launch.migrated
            && launch.market_valuation(&self.config.curve) >= self.config.migration_threshold)
    }

    /// Performs the one-way migration transition, closing the market.
    ///
    /// Invoked by the collaborator that has seeded off-curve liquidity.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::NotFound`] for an unknown launch.
    /// - [`LedgerError::MarketClosed`] if the launch already migrated.
    /// - [`LedgerError::MigrationNotEligible`] below the threshold.
    pub async fn mark_migrated(&self, id: &LaunchId) -> Result<LaunchView, LedgerError> {
        let entry = self.entry(id).await?;
        let mut launch = entry.write().await;
        ensure_open(&launch)?;
        if launch.market_valuation(&self.config.curve) < self.config.migration_threshold {
            return Err(LedgerError::MigrationNotEligible(launch.id.clone()));
        }
        launch.migrated = true;
        launch.migrated_at = Some(Utc::now());
        Ok(launch.view(&self.config.curve))
    }

    /// Returns a view of one launch.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::NotFound`] for an unknown launch.
    pub async fn get_launch(&self, id: &LaunchId) -> Result<LaunchView, LedgerError> {
        let entry = self.entry(id).await?;
        let launch = entry.read().await;
        Ok(launch.view(&self.config.curve))
    }

    /// Returns views of all launches in insertion order.
    pub async fn list_launches(&self) -> Vec<LaunchView> {
        let entries = self.entries().await;
        let mut views = Vec::with_capacity(entries.len());
        for entry in &entries {
            views.push(entry.read().await.view(&self.config.curve));
        }
        views
    }

    /// Number of launches.
    pub async fn len(&self) -> usize {
        self.launches.read().await.order.len()
    }

    /// Returns `true` if the ledger holds no launches.
    pub async fn is_empty(&self) -> bool {
        self.launches.read().await.order.is_empty()
    }

    /// Captures every launch, each under its own read lock.
    pub async fn snapshot(&self) -> LedgerSnapshot {
        let entries = self.entries().await;
        let mut launches = Vec::with_capacity(entries.len());
        for entry in &entries {
            launches.push(entry.read().await.clone());
        }
        LedgerSnapshot {
            version: SNAPSHOT_VERSION,
            taken_at: Utc::now(),
            curve_supply: self.config.curve.curve_supply(),
            launches,
        }
    }

    /// Loads the launches of `snapshot`, returning how many were added.
    ///
    /// All records are validated before any is inserted.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::CorruptSnapshot`] on a version or curve-supply
    ///   mismatch, a record that breaks supply conservation, or a value
    ///   reserve with no room left for a maximum order.
    /// - [`LedgerError::DuplicateAsset`] if an identifier repeats or is
    ///   already registered.
    pub async fn restore(&self, snapshot: LedgerSnapshot) -> Result<usize, LedgerError> {
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(LedgerError::CorruptSnapshot(format!(
                "unsupported snapshot version {}",
                snapshot.version
            )));
        }
        let curve_supply = self.config.curve.curve_supply();
        if snapshot.curve_supply != curve_supply {
            return Err(LedgerError::CorruptSnapshot(format!(
                "snapshot curve supply {} does not match configured {curve_supply}",
                snapshot.curve_supply
            )));
        }

        let mut seen = HashSet::with_capacity(snapshot.len());
        for launch in &snapshot.launches {
            if !launch.pool.conserves(curve_supply) {
                return Err(LedgerError::CorruptSnapshot(format!(
                    "launch {} breaks supply conservation",
                    launch.id
                )));
            }
            if launch
                .pool
                .value_reserve
                .raw()
                .checked_add(ValueAmount::MAX_ORDER.raw())
                .is_none()
            {
                return Err(LedgerError::CorruptSnapshot(format!(
                    "launch {} holds an out-of-range value reserve",
                    launch.id
                )));
            }
            if !seen.insert(&launch.id) {
                return Err(LedgerError::DuplicateAsset(launch.id.clone()));
            }
        }

        let mut slots = self.launches.write().await;
        if let Some(dup) = snapshot
            .launches
            .iter()
            .find(|launch| slots.index.contains_key(&launch.id))
        {
            return Err(LedgerError::DuplicateAsset(dup.id.clone()));
        }
        let count = snapshot.len();
        for launch in snapshot.launches {
            slots.insert(launch);
        }
        Ok(count)
    }

    async fn entry(&self, id: &LaunchId) -> Result<Arc<RwLock<Launch>>, LedgerError> {
        let slots = self.launches.read().await;
        slots
            .index
            .get(id)
            .cloned()
            .ok_or_else(|| LedgerError::NotFound(id.clone()))
    }

    async fn entries(&self) -> Vec<Arc<RwLock<Launch>>> {
        self.launches.read().await.order.clone()
    }

    fn validate_rate(
        &self,
        sample: &RateSample,
        now: DateTime<Utc>,
    ) -> Result<ReferenceRate, LedgerError> {
        if sample.rate.is_zero() {
            return Err(LedgerError::InvalidAmount(
                "reference rate must be positive".to_string(),
            ));
        }
        if sample.rate > ReferenceRate::MAX {
            return Err(LedgerError::InvalidAmount(format!(
                "reference rate exceeds {}",
                ReferenceRate::MAX
            )));
        }
        if let Some(max_age) = self.config.max_rate_age {
            let Some(observed_at) = sample.observed_at else {
                return Err(LedgerError::StaleRate(
                    "rate carries no observation time".to_string(),
                ));
            };
            let age = now.signed_duration_since(observed_at);
            if age > max_age {
                return Err(LedgerError::StaleRate(format!(
                    "observed {}s ago, limit is {}s",
                    age.num_seconds(),
                    max_age.num_seconds()
                )));
            }
        }
        Ok(sample.rate)
    }

    fn commit(&self, launch: &mut Launch, settlement: Settlement, now: DateTime<Utc>) -> Receipt {
        let curve = &self.config.curve;
        let threshold = self.config.migration_threshold;
        let quote = settlement.quote;
        let valuation_before = curve.valuation(quote.price_before);

        launch.pool = settlement.pool_after;
        debug_assert!(launch.pool.conserves(curve.curve_supply()));
        launch.stats.trade_count = launch.stats.trade_count.saturating_add(1);
        launch.stats.value_volume = launch.stats.value_volume.saturating_add(quote.value_amount);
        launch.stats.last_trade_at = Some(now);

        let view = launch.view(curve);
        Receipt {
            side: quote.side,
            amount_traded: quote.token_amount,
            counter_amount: quote.value_amount,
            price_before: quote.price_before,
            price_after: quote.price_after,
            reference_rate: quote.reference_rate,
            executed_at: now,
            crossed_migration_threshold: valuation_before < threshold
                && view.market_valuation >= threshold,
            launch: view,
        }
    }
}

/// Test builds yield here so concurrent trades interleave between
/// settlement and commit.
#[cfg(test)]
async fn yield_before_commit() {
    tokio::task::yield_now().await;
}

#[cfg(not(test))]
#[allow(clippy::unused_async)]
async fn yield_before_commit() {}

fn validate_value(value: ValueAmount) -> Result<(), LedgerError> {
    if value.is_zero() {
        return Err(LedgerError::InvalidAmount(
            "value must be positive".to_string(),
        ));
    }
    if value > ValueAmount::MAX_ORDER {
        return Err(LedgerError::InvalidAmount(format!(
            "value exceeds the per-order maximum of {}",
            ValueAmount::MAX_ORDER
        )));
    }
    Ok(())
}

fn validate_tokens(amount: TokenAmount) -> Result<(), LedgerError> {
    if amount.is_zero() {
        return Err(LedgerError::InvalidAmount(
            "token amount must be positive".to_string(),
        ));
    }
    Ok(())
}

fn ensure_open(launch: &Launch) -> Result<(), LedgerError> {
    if launch.migrated {
        return Err(LedgerError::MarketClosed(launch.id.clone()));
    }
    Ok(())
}
