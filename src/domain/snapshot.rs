//! Serializable image of the whole ledger.
//!
//! The ledger itself never touches storage. A [`LedgerSnapshot`] is taken
//! and restored on request; the snapshot stores in
//! [`crate::persistence`] decide where it lives.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::amount::TokenAmount;
use super::launch::Launch;

/// Current snapshot format version.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Every launch in insertion order, each captured under its own lock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    /// Format version.
    pub version: u32,
    /// When the snapshot was taken.
    pub taken_at: DateTime<Utc>,
    /// Curve supply the launches were created under.
    pub curve_supply: TokenAmount,
    /// Launch records in insertion order.
    pub launches: Vec<Launch>,
}

impl LedgerSnapshot {
    /// Number of launches in the snapshot.
    #[must_use]
    pub fn len(&self) -> usize {
        self.launches.len()
    }

    /// Returns `true` if the snapshot holds no launches.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.launches.is_empty()
    }
}
