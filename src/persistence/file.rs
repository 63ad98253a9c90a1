//! JSON file snapshot store.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::SnapshotStore;
use crate::domain::LedgerSnapshot;
use crate::error::{GatewayError, LedgerError};

/// Keeps the latest snapshot as a single JSON document.
///
/// Writes go to a sibling temporary file that is then renamed over the
/// target, so a crash mid-write never leaves a truncated snapshot.
#[derive(Debug, Clone)]
pub struct FileSnapshotStore {
    path: PathBuf,
}

impl FileSnapshotStore {
    /// Creates a store writing to `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Snapshot file location.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

fn io_error(action: &str, path: &Path, e: &std::io::Error) -> GatewayError {
    GatewayError::PersistenceError(format!("{action} {}: {e}", path.display()))
}

impl SnapshotStore for FileSnapshotStore {
    async fn save(&self, snapshot: &LedgerSnapshot) -> Result<(), GatewayError> {
        let bytes = serde_json::to_vec_pretty(snapshot)
            .map_err(|e| GatewayError::Internal(format!("snapshot encoding failed: {e}")))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| io_error("creating", parent, &e))?;
        }

        let temp = self.temp_path();
        tokio::fs::write(&temp, bytes)
            .await
            .map_err(|e| io_error("writing", &temp, &e))?;
        tokio::fs::rename(&temp, &self.path)
            .await
            .map_err(|e| io_error("replacing", &self.path, &e))?;
        Ok(())
    }

    async fn load_latest(&self) -> Result<Option<LedgerSnapshot>, GatewayError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(io_error("reading", &self.path, &e)),
        };
        serde_json::from_slice(&bytes).map(Some).map_err(|e| {
            GatewayError::Ledger(LedgerError::CorruptSnapshot(format!(
                "{}: {e}",
                self.path.display()
            )))
        })
    }

    async fn prune(&self, _retention_days: u64) -> Result<u64, GatewayError> {
        Ok(0)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::domain::{SNAPSHOT_VERSION, TokenAmount};

    fn temp_store(name: &str) -> FileSnapshotStore {
        let dir = std::env::temp_dir().join(format!("launchpad-{}", uuid::Uuid::new_v4().simple()));
        FileSnapshotStore::new(dir.join(name))
    }

    fn empty_snapshot() -> LedgerSnapshot {
        LedgerSnapshot {
            version: SNAPSHOT_VERSION,
            taken_at: Utc::now(),
            curve_supply: TokenAmount::new(800_000_000),
            launches: Vec::new(),
        }
    }

    #[tokio::test]
    async fn missing_file_loads_nothing() {
        let store = temp_store("absent.json");
        let Ok(loaded) = store.load_latest().await else {
            panic!("missing file is not an error");
        };
        assert!(loaded.is_none());
    }

    #[tokio::test]
    async fn save_then_load() {
        let store = temp_store("ledger.json");
        let snapshot = empty_snapshot();
        assert!(store.save(&snapshot).await.is_ok());
        assert!(!store.temp_path().exists());

        let Ok(Some(loaded)) = store.load_latest().await else {
            panic!("snapshot loads");
        };
        assert_eq!(loaded, snapshot);
    }

    #[tokio::test]
    async fn garbage_is_corrupt() {
        let store = temp_store("ledger.json");
        let Some(parent) = store.path().parent() else {
            panic!("store path has a parent");
        };
        assert!(tokio::fs::create_dir_all(parent).await.is_ok());
        assert!(tokio::fs::write(store.path(), b"{not json").await.is_ok());

        assert!(matches!(
            store.load_latest().await,
            Err(GatewayError::Ledger(LedgerError::CorruptSnapshot(_)))
        ));
    }
}
