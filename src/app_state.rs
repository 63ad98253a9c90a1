//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::domain::EventBus;
use crate::service::LaunchService;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Launch service for all business logic.
    pub launch_service: Arc<LaunchService>,
    /// Event bus for WebSocket subscriptions.
    pub event_bus: EventBus,
}

impl AppState {
    /// Builds the state around a service, sharing its event bus.
    #[must_use]
    pub fn new(launch_service: Arc<LaunchService>) -> Self {
        let event_bus = launch_service.event_bus().clone();
        Self {
            launch_service,
            event_bus,
        }
    }
}
