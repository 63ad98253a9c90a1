//! PostgreSQL snapshot store.

use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use super::SnapshotStore;
use crate::config::DatabaseConfig;
use crate::domain::LedgerSnapshot;
use crate::error::{GatewayError, LedgerError};

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS launch_snapshots (\
     id BIGSERIAL PRIMARY KEY, \
     taken_at TIMESTAMPTZ NOT NULL, \
     launch_count BIGINT NOT NULL, \
     payload JSONB NOT NULL)";

/// PostgreSQL-backed snapshot store using `sqlx::PgPool`.
///
/// Each save appends a row; loads read the newest one.
#[derive(Debug, Clone)]
pub struct PostgresSnapshotStore {
    pool: PgPool,
}

impl PostgresSnapshotStore {
    /// Creates a store over an existing connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects with the configured pool sizing and creates the table if
    /// it does not exist.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError::PersistenceError`] if the database is
    /// unreachable or the schema cannot be created.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, GatewayError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
            .connect(&config.url)
            .await
            .map_err(|e| GatewayError::PersistenceError(e.to_string()))?;

        let store = Self::new(pool);
        store.ensure_schema().await?;
        Ok(store)
    }

    /// Creates the `launch_snapshots` table if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError::PersistenceError`] on database failure.
    pub async fn ensure_schema(&self) -> Result<(), GatewayError> {
        sqlx::query(CREATE_TABLE)
            .execute(&self.pool)
            .await
            .map_err(|e| GatewayError::PersistenceError(e.to_string()))?;
        Ok(())
    }

    /// Deletes snapshots older than the given number of days, always
    /// keeping the newest one.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError::PersistenceError`] on database failure.
    pub async fn delete_old_snapshots(&self, before_days: u64) -> Result<u64, GatewayError> {
        let Some(cutoff) = i64::try_from(before_days)
            .ok()
            .and_then(TimeDelta::try_days)
            .and_then(|age| Utc::now().checked_sub_signed(age))
        else {
            return Ok(0);
        };

        let result = sqlx::query(
            "DELETE FROM launch_snapshots WHERE taken_at < $1 \
             AND id <> (SELECT MAX(id) FROM launch_snapshots)",
        )
        .bind(cutoff)
        .execute(&self.pool)
        .await
        .map_err(|e| GatewayError::PersistenceError(e.to_string()))?;

        Ok(result.rows_affected())
    }
}

impl SnapshotStore for PostgresSnapshotStore {
    async fn save(&self, snapshot: &LedgerSnapshot) -> Result<(), GatewayError> {
        let payload = serde_json::to_value(snapshot)
            .map_err(|e| GatewayError::Internal(format!("snapshot encoding failed: {e}")))?;
        let launch_count = i64::try_from(snapshot.len()).unwrap_or(i64::MAX);

        sqlx::query(
            "INSERT INTO launch_snapshots (taken_at, launch_count, payload) VALUES ($1, $2, $3)",
        )
        .bind(snapshot.taken_at)
        .bind(launch_count)
        .bind(payload)
        .execute(&self.pool)
        .await
        .map_err(|e| GatewayError::PersistenceError(e.to_string()))?;

        Ok(())
    }

    async fn load_latest(&self) -> Result<Option<LedgerSnapshot>, GatewayError> {
        let row = sqlx::query_as::<_, (serde_json::Value, DateTime<Utc>)>(
            "SELECT payload, taken_at FROM launch_snapshots ORDER BY id DESC LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| GatewayError::PersistenceError(e.to_string()))?;

        let Some((payload, taken_at)) = row else {
            return Ok(None);
        };
        serde_json::from_value(payload).map(Some).map_err(|e| {
            GatewayError::Ledger(LedgerError::CorruptSnapshot(format!(
                "snapshot taken at {taken_at}: {e}"
            )))
        })
    }

    async fn prune(&self, retention_days: u64) -> Result<u64, GatewayError> {
        if retention_days == 0 {
            return Ok(0);
        }
        self.delete_old_snapshots(retention_days).await
    }
}
