//! Best-effort fan-out of parking events to connected consumers.
//!
//! Gate events publish onto a broadcast channel; listeners (operator
//! screens, dashboards) subscribe and may lag or disconnect without
//! affecting the request path.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::trace;

use crate::api::models::sessions::SessionResponse;

const CHANNEL_CAPACITY: usize = 256;

/// An event published to listeners.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ParkEvent {
    /// A vehicle entered; listeners should refresh their session lists
    Refresh,
    /// A vehicle reached an exit gate and awaits payment
    VehiclePending { session: SessionResponse },
    /// An operator logged out; zone counters were reset
    OccupancyReset { park_zone: String },
}

/// Handle for publishing and subscribing to park events.
#[derive(Debug, Clone)]
pub struct ParkNotifier {
    sender: broadcast::Sender<ParkEvent>,
}

impl ParkNotifier {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    /// Publish an event. Delivery is best-effort; a send with no
    /// subscribers is not an error.
    pub fn publish(&self, event: ParkEvent) {
        match self.sender.send(event) {
            Ok(n) => trace!(receivers = n, "published park event"),
            Err(_) => trace!("no park event subscribers"),
        }
    }

    /// Subscribe to events published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<ParkEvent> {
        self.sender.subscribe()
    }
}

impl Default for ParkNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_subscriber_receives_events() {
        let notifier = ParkNotifier::new();
        let mut rx = notifier.subscribe();

        notifier.publish(ParkEvent::OccupancyReset {
            park_zone: "P4".into(),
        });

        match rx.recv().await.unwrap() {
            ParkEvent::OccupancyReset { park_zone } => assert_eq!(park_zone, "P4"),
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_is_ok() {
        let notifier = ParkNotifier::new();
        // Must not panic or error
        notifier.publish(ParkEvent::Refresh);
    }

    #[tokio::test]
    async fn test_late_subscriber_misses_earlier_events() {
        let notifier = ParkNotifier::new();
        notifier.publish(ParkEvent::Refresh);

        let mut rx = notifier.subscribe();
        notifier.publish(ParkEvent::OccupancyReset {
            park_zone: "P1".into(),
        });

        // Only the event published after subscribing arrives
        assert!(matches!(
            rx.recv().await.unwrap(),
            ParkEvent::OccupancyReset { .. }
        ));
        assert!(rx.try_recv().is_err());
    }
}
