//! Event system infrastructure for the cashew marketplace.
//!
//! Domain operations emit a [`DomainEvent`] once their database work has
//! committed. Infrastructure concerns (today only real-time SSE delivery)
//! subscribe by implementing [`EventHandler`] and registering with an
//! [`EventPublisher`].
//!
//! This crate has no dependencies on internal crates (entity, domain, etc.),
//! avoiding circular dependencies. Entity data is carried as serialized JSON values.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

/// A type alias that represents any Entity's internal id field data type.
/// This matches the definition in the entity crate to maintain compatibility.
pub type Id = Uuid;

/// Business-level changes that other parts of the system may react to.
#[derive(Debug, Clone)]
pub enum DomainEvent {
    /// An auction's terms were edited while it was open.
    AuctionUpdated { auction_id: Id, auction: Value },
    /// An auction left the `open` state (closed by its seller, cancelled, or
    /// closed as part of accepting a bid).
    AuctionClosed { auction_id: Id, auction: Value },
    /// A new bid was placed on an auction.
    BidPlaced { auction_id: Id, bid: Value },
    /// A bid was accepted. `rejected_bids` holds every sibling bid that was
    /// rejected in the same transaction.
    BidAccepted {
        auction_id: Id,
        accepted_bid: Value,
        rejected_bids: Vec<Value>,
    },
    /// A quality inspection for an auctioned lot was certified.
    InspectionCertified { auction_id: Id, inspection: Value },
    /// A notification row was persisted for `user_id`.
    NotificationCreated { user_id: Id, notification: Value },
}

/// Trait for handling domain events.
/// Implementations can perform side effects like sending notifications,
/// updating caches, logging, etc.
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn handle(&self, event: &DomainEvent);
}

/// Publishes domain events to registered handlers.
/// Handlers are called sequentially in registration order.
#[derive(Clone)]
pub struct EventPublisher {
    handlers: Arc<Vec<Arc<dyn EventHandler>>>,
}

impl EventPublisher {
    pub fn new() -> Self {
        Self {
            handlers: Arc::new(Vec::new()),
        }
    }

    /// Register a new event handler.
    /// Note: This creates a new publisher instance with the additional handler.
    /// Store the returned publisher in your application state.
    pub fn with_handler(mut self, handler: Arc<dyn EventHandler>) -> Self {
        let mut handlers = (*self.handlers).clone();
        handlers.push(handler);
        self.handlers = Arc::new(handlers);
        self
    }

    /// Publish an event to all registered handlers.
    pub async fn publish(&self, event: DomainEvent) {
        for handler in self.handlers.iter() {
            handler.handle(&event).await;
        }
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }
}

impl Default for EventPublisher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl EventHandler for Recorder {
        async fn handle(&self, event: &DomainEvent) {
            let label = match event {
                DomainEvent::BidPlaced { .. } => "bid_placed",
                DomainEvent::NotificationCreated { .. } => "notification_created",
                _ => "other",
            };
            self.seen.lock().unwrap().push(label.to_string());
        }
    }

    #[tokio::test]
    async fn publish_reaches_every_registered_handler_in_order() {
        let first = Arc::new(Recorder::default());
        let second = Arc::new(Recorder::default());
        let publisher = EventPublisher::new()
            .with_handler(first.clone())
            .with_handler(second.clone());

        publisher
            .publish(DomainEvent::BidPlaced {
                auction_id: Id::new_v4(),
                bid: json!({"amount": 1200}),
            })
            .await;
        publisher
            .publish(DomainEvent::NotificationCreated {
                user_id: Id::new_v4(),
                notification: json!({}),
            })
            .await;

        assert_eq!(publisher.handler_count(), 2);
        for recorder in [first, second] {
            assert_eq!(
                *recorder.seen.lock().unwrap(),
                vec!["bid_placed".to_string(), "notification_created".to_string()]
            );
        }
    }

    #[tokio::test]
    async fn with_handler_leaves_the_original_publisher_untouched() {
        let base = EventPublisher::new();
        let extended = base.clone().with_handler(Arc::new(Recorder::default()));

        assert_eq!(base.handler_count(), 0);
        assert_eq!(extended.handler_count(), 1);
    }
}
