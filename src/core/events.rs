//! Store change events for push-based view refresh
//!
//! The EventBus uses `tokio::sync::broadcast` to decouple the mutation
//! gateways from whoever needs to recompute views after a change.
//!
//! # Architecture
//!
//! ```text
//! MutationGateway<Customer> ──┐
//!                             ├──▶ EventBus::publish() ──▶ broadcast channel ──▶ view refreshers
//! MutationGateway<Product>  ──┘                                              ──▶ notification feed
//! ```
//!
//! Each gateway applies its mutations one at a time and publishes after the
//! snapshot swap, so events for one collection arrive in apply order.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// One applied mutation, as seen by subscribers
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum RecordEvent {
    /// A record was created
    Created {
        collection: String,
        record_id: String,
        data: serde_json::Value,
    },
    /// A record was updated
    Updated {
        collection: String,
        record_id: String,
        data: serde_json::Value,
    },
    /// A record was deleted
    Deleted {
        collection: String,
        record_id: String,
    },
}

impl RecordEvent {
    pub fn collection(&self) -> &str {
        match self {
            RecordEvent::Created { collection, .. }
            | RecordEvent::Updated { collection, .. }
            | RecordEvent::Deleted { collection, .. } => collection,
        }
    }

    pub fn record_id(&self) -> &str {
        match self {
            RecordEvent::Created { record_id, .. }
            | RecordEvent::Updated { record_id, .. }
            | RecordEvent::Deleted { record_id, .. } => record_id,
        }
    }

    /// "created", "updated" or "deleted"
    pub fn action(&self) -> &str {
        match self {
            RecordEvent::Created { .. } => "created",
            RecordEvent::Updated { .. } => "updated",
            RecordEvent::Deleted { .. } => "deleted",
        }
    }
}

/// A record event stamped with the snapshot version it produced
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    /// Snapshot version installed by the mutation
    pub version: u64,
    pub event: RecordEvent,
}

impl EventEnvelope {
    pub fn new(event: RecordEvent, version: u64) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            version,
            event,
        }
    }
}

/// Broadcast-based event bus
///
/// The bus is cheap to clone (Arc internally) and can be shared across
/// gateways of different record types.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<EventEnvelope>,
}

impl EventBus {
    /// Bus buffering up to `capacity` envelopes per lagging subscriber
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Returns how many subscribers will see the event; zero drops it
    pub fn publish(&self, event: RecordEvent, version: u64) -> usize {
        let envelope = EventEnvelope::new(event, version);
        self.sender.send(envelope).unwrap_or(0)
    }

    /// Only events published after this call are delivered
    pub fn subscribe(&self) -> broadcast::Receiver<EventEnvelope> {
        self.sender.subscribe()
    }

    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(1024)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_event_created() {
        let event = RecordEvent::Created {
            collection: "orders".to_string(),
            record_id: "1".to_string(),
            data: json!({"customer": "Robert Lewis"}),
        };

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["action"], "created");
        assert_eq!(json["collection"], "orders");
        assert_eq!(event.record_id(), "1");
    }

    #[test]
    fn test_record_event_accessors() {
        let event = RecordEvent::Deleted {
            collection: "products".to_string(),
            record_id: "3".to_string(),
        };
        assert_eq!(event.collection(), "products");
        assert_eq!(event.action(), "deleted");
    }

    #[test]
    fn test_event_envelope_has_metadata() {
        let event = RecordEvent::Updated {
            collection: "customers".to_string(),
            record_id: "2".to_string(),
            data: json!({}),
        };

        let envelope = EventEnvelope::new(event, 7);
        assert!(!envelope.id.is_nil());
        assert_eq!(envelope.version, 7);
        assert!(envelope.timestamp <= Utc::now());
    }

    #[tokio::test]
    async fn test_event_bus_publish_subscribe() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();

        let receivers = bus.publish(
            RecordEvent::Created {
                collection: "orders".to_string(),
                record_id: "42".to_string(),
                data: json!({"status": "pending"}),
            },
            3,
        );
        assert_eq!(receivers, 1);

        let received = rx.recv().await.unwrap();
        assert_eq!(received.event.record_id(), "42");
        assert_eq!(received.version, 3);
    }

    #[tokio::test]
    async fn test_event_bus_multiple_subscribers() {
        let bus = EventBus::new(16);
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();
        assert_eq!(bus.receiver_count(), 2);

        bus.publish(
            RecordEvent::Deleted {
                collection: "orders".to_string(),
                record_id: "1".to_string(),
            },
            1,
        );

        let e1 = rx1.recv().await.unwrap();
        let e2 = rx2.recv().await.unwrap();
        assert_eq!(e1.id, e2.id);
    }

    #[test]
    fn test_event_bus_publish_without_subscribers() {
        let bus = EventBus::default();
        let receivers = bus.publish(
            RecordEvent::Deleted {
                collection: "orders".to_string(),
                record_id: "1".to_string(),
            },
            1,
        );
        assert_eq!(receivers, 0);
    }
}
