use crate::message::{Event as SseEvent, Message as SseMessage};
use crate::topic::Topic;
use crate::Manager;
use async_trait::async_trait;
use events::{DomainEvent, EventHandler};
use log::*;
use std::sync::Arc;

/// Handles domain events by converting them to SSE messages on the right topic.
///
/// Auction-scoped events go to everyone watching the auction. Notifications
/// go to the single user they were created for. The domain layer decides who
/// gets a notification; this handler only routes.
pub struct SseDomainEventHandler {
    sse_manager: Arc<Manager>,
}

impl SseDomainEventHandler {
    pub fn new(sse_manager: Arc<Manager>) -> Self {
        Self { sse_manager }
    }

    async fn send(&self, event: SseEvent, topic: Topic) {
        debug!("Routing SSE event to {topic}");
        self.sse_manager
            .send_message(SseMessage { event, topic })
            .await;
    }
}

#[async_trait]
impl EventHandler for SseDomainEventHandler {
    async fn handle(&self, event: &DomainEvent) {
        match event {
            DomainEvent::AuctionUpdated {
                auction_id,
                auction,
            } => {
                let sse_event = SseEvent::AuctionUpdated {
                    auction_id: auction_id.to_string(),
                    auction: auction.clone(),
                };
                self.send(sse_event, Topic::auction(auction_id)).await;
            }

            DomainEvent::AuctionClosed {
                auction_id,
                auction,
            } => {
                let sse_event = SseEvent::AuctionClosed {
                    auction_id: auction_id.to_string(),
                    auction: auction.clone(),
                };
                self.send(sse_event, Topic::auction(auction_id)).await;
            }

            DomainEvent::BidPlaced { auction_id, bid } => {
                let sse_event = SseEvent::BidPlaced {
                    auction_id: auction_id.to_string(),
                    bid: bid.clone(),
                };
                self.send(sse_event, Topic::auction(auction_id)).await;
            }

            DomainEvent::BidAccepted {
                auction_id,
                accepted_bid,
                rejected_bids,
            } => {
                debug!(
                    "Handling BidAccepted for auction {auction_id} ({} rejected)",
                    rejected_bids.len()
                );
                let sse_event = SseEvent::BidAccepted {
                    auction_id: auction_id.to_string(),
                    accepted_bid: accepted_bid.clone(),
                    rejected_bids: rejected_bids.clone(),
                };
                self.send(sse_event, Topic::auction(auction_id)).await;
            }

            DomainEvent::InspectionCertified {
                auction_id,
                inspection,
            } => {
                let sse_event = SseEvent::InspectionCertified {
                    auction_id: auction_id.to_string(),
                    inspection: inspection.clone(),
                };
                self.send(sse_event, Topic::auction(auction_id)).await;
            }

            DomainEvent::NotificationCreated {
                user_id,
                notification,
            } => {
                let sse_event = SseEvent::Notification {
                    notification: notification.clone(),
                };
                self.send(sse_event, Topic::user(user_id)).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topic::PresenceRole;
    use events::{EventPublisher, Id};
    use serde_json::json;

    #[tokio::test]
    async fn notification_events_reach_the_users_stream() {
        let manager = Arc::new(Manager::default());
        let user_id = Id::new_v4();
        let mut subscription = manager
            .subscribe(Topic::user(user_id), user_id.to_string(), PresenceRole::Subscriber)
            .await
            .unwrap();
        let publisher = EventPublisher::new()
            .with_handler(Arc::new(SseDomainEventHandler::new(Arc::clone(&manager))));

        publisher
            .publish(DomainEvent::NotificationCreated {
                user_id,
                notification: json!({"title": "Your bid was accepted"}),
            })
            .await;

        let frame = format!("{:?}", subscription.recv().await.unwrap());
        assert!(frame.contains("event: notification"));
        assert!(frame.contains("Your bid was accepted"));
    }

    #[tokio::test]
    async fn auction_events_go_to_the_auction_topic_only() {
        let manager = Arc::new(Manager::default());
        let auction_id = Id::new_v4();
        let mut watcher = manager
            .subscribe(Topic::auction(auction_id), "watcher", PresenceRole::Visitor)
            .await
            .unwrap();
        let bystander = manager
            .subscribe(Topic::auction(Id::new_v4()), "bystander", PresenceRole::Visitor)
            .await
            .unwrap();
        let handler = SseDomainEventHandler::new(Arc::clone(&manager));

        handler
            .handle(&DomainEvent::BidPlaced {
                auction_id,
                bid: json!({"amount": 2500}),
            })
            .await;

        let frame = format!("{:?}", watcher.recv().await.unwrap());
        assert!(frame.contains("event: bid_placed"));
        let (_, mut receiver, _guard) = bystander.into_parts();
        assert!(receiver.try_recv().is_err());
    }
}
