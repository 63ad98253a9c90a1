//! Service layer: business logic orchestration.
//!
//! [`LaunchService`] coordinates launch operations, delegates state
//! changes to the [`crate::domain::LaunchLedger`], and emits events
//! through the [`super::domain::EventBus`].

pub mod launch_service;

pub use launch_service::{InitialBuy, LaunchService};
