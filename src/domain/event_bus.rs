//! Fan-out of launch events to WebSocket clients.
//!
//! The service publishes after every committed ledger change; each open
//! WebSocket holds one receiver and filters by its own subscriptions.

use tokio::sync::broadcast;

use super::LaunchEvent;

/// Broadcast bus for [`LaunchEvent`]s.
///
/// Receivers that fall more than `capacity` events behind lose the oldest
/// ones and observe a lag.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<LaunchEvent>,
}

impl EventBus {
    /// Creates a new `EventBus` with the given channel capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publishes `event` and returns how many receivers got it. With no
    /// receivers the event is dropped.
    pub fn publish(&self, event: LaunchEvent) -> usize {
        let event_type = event.event_type_str();
        let launch_id = event.launch_id().clone();
        let delivered = self.sender.send(event).unwrap_or(0);
        tracing::trace!(%launch_id, event_type, delivered, "launch event published");
        delivered
    }

    /// Receiver for every event published from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<LaunchEvent> {
        self.sender.subscribe()
    }

    /// Open receivers, one per live WebSocket connection.
    #[must_use]
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::LaunchId;
    use chrono::Utc;

    fn make_event(launch_id: LaunchId) -> LaunchEvent {
        LaunchEvent::LaunchCreated {
            launch_id,
            name: "Grok".to_string(),
            symbol: "GROK".to_string(),
            creator: "creator".to_string(),
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn publish_without_receivers_returns_zero() {
        let bus = EventBus::new(100);
        assert_eq!(bus.publish(make_event(LaunchId::generate())), 0);
    }

    #[tokio::test]
    async fn subscriber_receives_event() {
        let bus = EventBus::new(100);
        let mut rx = bus.subscribe();

        let id = LaunchId::generate();
        bus.publish(make_event(id.clone()));

        let Ok(event) = rx.recv().await else {
            panic!("expected to receive event");
        };
        assert_eq!(event.launch_id(), &id);
    }

    #[tokio::test]
    async fn multiple_subscribers_receive_same_event() {
        let bus = EventBus::new(100);
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        let count = bus.publish(make_event(LaunchId::generate()));
        assert_eq!(count, 2);

        let (Ok(e1), Ok(e2)) = (rx1.recv().await, rx2.recv().await) else {
            panic!("both receivers should get the event");
        };
        assert_eq!(e1.launch_id(), e2.launch_id());
    }

    #[test]
    fn receiver_count_tracks_subscribers() {
        let bus = EventBus::new(100);
        assert_eq!(bus.receiver_count(), 0);

        let rx1 = bus.subscribe();
        let _rx2 = bus.subscribe();
        assert_eq!(bus.receiver_count(), 2);

        drop(rx1);
        assert_eq!(bus.receiver_count(), 1);
    }
}
