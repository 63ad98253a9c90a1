//! Per-connection launch subscriptions.
//!
//! A client names launches by raw string; `"*"` toggles the wildcard.
//! Ids that are not valid [`LaunchId`]s are reported back and otherwise
//! ignored, so one bad entry never fails the whole command.

use std::collections::HashSet;

use serde::Serialize;

use crate::domain::{LaunchEvent, LaunchId};

const WILDCARD: &str = "*";

/// Outcome of a subscribe or unsubscribe command.
#[derive(Debug, Default, Serialize, PartialEq, Eq)]
pub struct SubscriptionChange {
    /// Ids the command applied to.
    pub applied: Vec<LaunchId>,
    /// Entries skipped because they are not valid launch ids.
    pub rejected: Vec<String>,
    /// Explicit subscriptions held after the command.
    pub count: usize,
    /// Wildcard state after the command.
    pub wildcard: bool,
}

/// Launch filter for one WebSocket connection.
#[derive(Debug, Default)]
pub struct SubscriptionManager {
    launch_ids: HashSet<LaunchId>,
    wildcard: bool,
}

impl SubscriptionManager {
    /// Creates a manager that matches nothing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the named launches; `"*"` enables the wildcard.
    pub fn subscribe(&mut self, raw: &[String]) -> SubscriptionChange {
        let (applied, rejected, wildcard) = split_ids(raw);
        self.wildcard |= wildcard;
        self.launch_ids.extend(applied.iter().cloned());
        self.change(applied, rejected)
    }

    /// Removes the named launches; `"*"` clears the wildcard but keeps
    /// explicit subscriptions.
    pub fn unsubscribe(&mut self, raw: &[String]) -> SubscriptionChange {
        let (applied, rejected, wildcard) = split_ids(raw);
        if wildcard {
            self.wildcard = false;
        }
        for id in &applied {
            self.launch_ids.remove(id);
        }
        self.change(applied, rejected)
    }

    /// Whether `event` should be forwarded to this connection.
    #[must_use]
    pub fn matches(&self, event: &LaunchEvent) -> bool {
        self.wildcard || self.launch_ids.contains(event.launch_id())
    }

    fn change(&self, applied: Vec<LaunchId>, rejected: Vec<String>) -> SubscriptionChange {
        SubscriptionChange {
            applied,
            rejected,
            count: self.launch_ids.len(),
            wildcard: self.wildcard,
        }
    }
}

fn split_ids(raw: &[String]) -> (Vec<LaunchId>, Vec<String>, bool) {
    let mut applied = Vec::new();
    let mut rejected = Vec::new();
    let mut wildcard = false;
    for entry in raw {
        if entry == WILDCARD {
            wildcard = true;
        } else {
            match LaunchId::parse(entry.as_str()) {
                Ok(id) => applied.push(id),
                Err(_) => rejected.push(entry.clone()),
            }
        }
    }
    (applied, rejected, wildcard)
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn created(id: &str) -> LaunchEvent {
        let Ok(launch_id) = LaunchId::parse(id) else {
            panic!("valid id");
        };
        LaunchEvent::LaunchCreated {
            launch_id,
            name: "Grok".to_string(),
            symbol: "GROK".to_string(),
            creator: "creator".to_string(),
            timestamp: Utc::now(),
        }
    }

    fn raw(ids: &[&str]) -> Vec<String> {
        ids.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn empty_matches_nothing() {
        assert!(!SubscriptionManager::new().matches(&created("a")));
    }

    #[test]
    fn explicit_subscription_filters_by_launch() {
        let mut mgr = SubscriptionManager::new();
        let change = mgr.subscribe(&raw(&["a"]));
        assert_eq!(change.count, 1);
        assert!(!change.wildcard);
        assert!(mgr.matches(&created("a")));
        assert!(!mgr.matches(&created("b")));
    }

    #[test]
    fn invalid_ids_are_reported_and_skipped() {
        let mut mgr = SubscriptionManager::new();
        let change = mgr.subscribe(&raw(&["a", "", "has space"]));
        assert_eq!(change.applied.len(), 1);
        assert_eq!(change.rejected, raw(&["", "has space"]));
        assert_eq!(change.count, 1);
    }

    #[test]
    fn unsubscribing_wildcard_keeps_explicit_ids() {
        let mut mgr = SubscriptionManager::new();
        mgr.subscribe(&raw(&["*", "a"]));
        assert!(mgr.matches(&created("b")));

        let change = mgr.unsubscribe(&raw(&["*"]));
        assert!(!change.wildcard);
        assert_eq!(change.count, 1);
        assert!(mgr.matches(&created("a")));
        assert!(!mgr.matches(&created("b")));
    }

    #[test]
    fn unsubscribe_removes_launch() {
        let mut mgr = SubscriptionManager::new();
        mgr.subscribe(&raw(&["a", "b"]));
        let change = mgr.unsubscribe(&raw(&["a"]));
        assert_eq!(change.count, 1);
        assert!(!mgr.matches(&created("a")));
        assert!(mgr.matches(&created("b")));
    }
}
