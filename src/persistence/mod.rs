//! Persistence layer: ledger snapshots.
//!
//! The ledger keeps all state in memory. A [`SnapshotStore`] saves a
//! [`LedgerSnapshot`] periodically and on shutdown, and the newest one
//! is restored at startup. Two stores exist: a JSON file and a
//! PostgreSQL table accessed through `sqlx::PgPool`.

pub mod file;
pub mod postgres;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

pub use file::FileSnapshotStore;
pub use postgres::PostgresSnapshotStore;

use crate::config::{SnapshotBackendKind, SnapshotConfig};
use crate::domain::{LaunchLedger, LedgerSnapshot};
use crate::error::GatewayError;

/// Durable home for ledger snapshots.
pub trait SnapshotStore: Send + Sync {
    /// Stores `snapshot` as the newest one.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError::PersistenceError`] on storage failure.
    fn save(
        &self,
        snapshot: &LedgerSnapshot,
    ) -> impl Future<Output = Result<(), GatewayError>> + Send;

    /// Loads the newest snapshot, if any.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError::PersistenceError`] on storage failure
    /// and a corrupt-snapshot error if the stored data cannot be decoded.
    fn load_latest(
        &self,
    ) -> impl Future<Output = Result<Option<LedgerSnapshot>, GatewayError>> + Send;

    /// Drops snapshots older than `retention_days`, returning how many
    /// were removed.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError::PersistenceError`] on storage failure.
    fn prune(&self, retention_days: u64)
    -> impl Future<Output = Result<u64, GatewayError>> + Send;
}

/// Snapshot store selected by configuration.
#[derive(Debug, Clone)]
pub enum SnapshotBackend {
    /// JSON file store.
    File(FileSnapshotStore),
    /// PostgreSQL store.
    Postgres(PostgresSnapshotStore),
}

impl SnapshotBackend {
    /// Opens the configured store, or `None` when persistence is off.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError::PersistenceError`] if the database
    /// cannot be reached.
    pub async fn from_config(config: &SnapshotConfig) -> Result<Option<Self>, GatewayError> {
        match config.backend {
            SnapshotBackendKind::None => Ok(None),
            SnapshotBackendKind::File => {
                Ok(Some(Self::File(FileSnapshotStore::new(config.path.clone()))))
            }
            SnapshotBackendKind::Postgres => Ok(Some(Self::Postgres(
                PostgresSnapshotStore::connect(&config.database).await?,
            ))),
        }
    }

    /// Backend name for logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::File(_) => "file",
            Self::Postgres(_) => "postgres",
        }
    }
}

impl SnapshotStore for SnapshotBackend {
    async fn save(&self, snapshot: &LedgerSnapshot) -> Result<(), GatewayError> {
        match self {
            Self::File(store) => store.save(snapshot).await,
            Self::Postgres(store) => store.save(snapshot).await,
        }
    }

    async fn load_latest(&self) -> Result<Option<LedgerSnapshot>, GatewayError> {
        match self {
            Self::File(store) => store.load_latest().await,
            Self::Postgres(store) => store.load_latest().await,
        }
    }

    async fn prune(&self, retention_days: u64) -> Result<u64, GatewayError> {
        match self {
            Self::File(store) => store.prune(retention_days).await,
            Self::Postgres(store) => store.prune(retention_days).await,
        }
    }
}

/// Restores the newest stored snapshot into `ledger`, returning the
/// number of launches loaded.
///
/// # Errors
///
/// Returns a [`GatewayError`] if loading fails or the snapshot is
/// rejected by the ledger.
pub async fn restore_latest(
    store: &impl SnapshotStore,
    ledger: &LaunchLedger,
) -> Result<usize, GatewayError> {
    let Some(snapshot) = store.load_latest().await? else {
        tracing::info!("no snapshot found, starting empty");
        return Ok(0);
    };
    let taken_at = snapshot.taken_at;
    let count = ledger.restore(snapshot).await?;
    tracing::info!(launches = count, %taken_at, "ledger restored from snapshot");
    Ok(count)
}

/// Takes a snapshot of `ledger` and saves it, returning the number of
/// launches written.
///
/// # Errors
///
/// Returns a [`GatewayError`] if the store rejects the write.
pub async fn persist(store: &impl SnapshotStore, ledger: &LaunchLedger) -> Result<usize, GatewayError> {
    let snapshot = ledger.snapshot().await;
    let count = snapshot.len();
    store.save(&snapshot).await?;
    tracing::debug!(launches = count, "ledger snapshot saved");
    Ok(count)
}

/// Spawns the periodic snapshot task.
///
/// Failures are logged and retried on the next tick.
pub fn spawn_snapshot_task(
    store: Arc<SnapshotBackend>,
    ledger: Arc<LaunchLedger>,
    interval: Duration,
    retention_days: u64,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval.max(Duration::from_secs(1)));
        // The first tick completes immediately.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            if let Err(e) = persist(store.as_ref(), &ledger).await {
                tracing::warn!(error = %e, backend = store.name(), "periodic snapshot failed");
                continue;
            }
            match store.prune(retention_days).await {
                Ok(0) => {}
                Ok(removed) => tracing::info!(removed, "old snapshots pruned"),
                Err(e) => tracing::warn!(error = %e, "snapshot pruning failed"),
            }
        }
    })
}
