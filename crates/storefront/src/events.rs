//! Live product updates.
//!
//! Product creations and deletions made through the API are published on a
//! broadcast channel and fanned out to every open event stream. Events are
//! notifications only; listeners re-read the collection for truth.

use serde::Serialize;
use tokio::sync::broadcast;
use tracing::debug;

use emporium_core::{Product, ProductId};

/// A change to the product collection.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ProductEvent {
    ProductAdded(Product),
    ProductDeleted(ProductId),
}

impl ProductEvent {
    /// Event name as sent to listeners.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::ProductAdded(_) => "productAdded",
            Self::ProductDeleted(_) => "productDeleted",
        }
    }
}

/// Broadcast hub for [`ProductEvent`]s.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<ProductEvent>,
}

impl EventBus {
    /// Create a bus buffering up to `capacity` events per listener.
    ///
    /// A listener that falls further behind skips the oldest events.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Send an event to every current listener.
    ///
    /// Having no listeners is not an error.
    pub fn publish(&self, event: ProductEvent) {
        let name = event.name();
        let delivered = self.sender.send(event).unwrap_or(0);
        debug!(event = name, listeners = delivered, "Product event published");
    }

    /// Start listening for events published from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ProductEvent> {
        self.sender.subscribe()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_event_serialization() {
        let event = ProductEvent::ProductDeleted(ProductId::new(3));
        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            json!({ "event": "productDeleted", "data": 3 })
        );
        assert_eq!(event.name(), "productDeleted");
    }

    #[tokio::test]
    async fn test_publish_reaches_every_subscriber() {
        let bus = EventBus::new(8);
        let mut first = bus.subscribe();
        let mut second = bus.subscribe();

        bus.publish(ProductEvent::ProductDeleted(ProductId::new(1)));

        assert_eq!(
            first.recv().await.unwrap(),
            ProductEvent::ProductDeleted(ProductId::new(1))
        );
        assert_eq!(
            second.recv().await.unwrap(),
            ProductEvent::ProductDeleted(ProductId::new(1))
        );
    }

    #[test]
    fn test_publish_without_listeners() {
        let bus = EventBus::new(8);
        bus.publish(ProductEvent::ProductDeleted(ProductId::new(1)));
    }
}
