//! Opaque launch identifier.
//!
//! [`LaunchId`] wraps the asset key handed out by the asset-creation
//! collaborator (typically a mint address). The ledger never interprets
//! it beyond equality and hashing.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Longest identifier accepted, in bytes.
pub const MAX_LAUNCH_ID_LEN: usize = 128;

/// Rejected launch identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid launch id {0:?}: must be 1-128 printable characters without whitespace")]
pub struct InvalidLaunchId(pub String);

/// Unique identifier of a launch.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LaunchId(String);

impl LaunchId {
    /// Validates and wraps an externally supplied identifier.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidLaunchId`] if the identifier is empty, longer than
    /// [`MAX_LAUNCH_ID_LEN`], or contains whitespace or control characters.
    pub fn parse(id: impl Into<String>) -> Result<Self, InvalidLaunchId> {
        let id = id.into();
        let valid = !id.is_empty()
            && id.len() <= MAX_LAUNCH_ID_LEN
            && id.chars().all(|c| !c.is_whitespace() && !c.is_control());
        if valid {
            Ok(Self(id))
        } else {
            Err(InvalidLaunchId(id))
        }
    }

    /// Generates a random identifier for callers that have no asset key
    /// of their own (demo mode).
    #[must_use]
    pub fn generate() -> Self {
        Self(format!("demo{}", uuid::Uuid::new_v4().simple()))
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LaunchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for LaunchId {
    type Err = InvalidLaunchId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for LaunchId {
    type Error = InvalidLaunchId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<LaunchId> for String {
    fn from(id: LaunchId) -> Self {
        id.0
    }
}
