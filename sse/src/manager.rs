use crate::bus::Bus;
use crate::connection::{ConnectionId, ConnectionInfo, ConnectionRegistry};
use crate::error::Error;
use crate::lifecycle::{Cleanup, CloseReason, ConnectionGuard};
use crate::message::{Envelope, Message as SseMessage};
use crate::presence::{Presence, PresenceStore};
use crate::topic::{ParticipantKey, PresenceRole, PresenceSet, Topic};
use axum::response::sse::Event;
use log::*;
use std::collections::HashSet;
use std::convert::Infallible;
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver};

/// Resource bounds applied to new subscriptions.
#[derive(Debug, Clone, Copy, Default)]
pub struct Limits {
    /// Maximum connections a single topic may hold on this instance.
    pub max_connections_per_topic: Option<usize>,
}

pub struct Manager {
    registry: Arc<ConnectionRegistry>,
    presence: Presence,
    bus: Option<Arc<dyn Bus>>,
    limits: Limits,
}

/// One registered connection: the receiving half of its event channel and
/// the guard that cleans up after it.
pub struct Subscription {
    pub connection_id: ConnectionId,
    receiver: UnboundedReceiver<Result<Event, Infallible>>,
    guard: ConnectionGuard,
}

impl Subscription {
    pub async fn recv(&mut self) -> Option<Event> {
        self.receiver.recv().await.and_then(Result::ok)
    }

    pub fn into_parts(
        self,
    ) -> (
        ConnectionId,
        UnboundedReceiver<Result<Event, Infallible>>,
        ConnectionGuard,
    ) {
        (self.connection_id, self.receiver, self.guard)
    }
}

impl Manager {
    pub fn new(presence: Arc<dyn PresenceStore>, bus: Option<Arc<dyn Bus>>, limits: Limits) -> Self {
        Self {
            registry: Arc::new(ConnectionRegistry::new()),
            presence: Presence::new(presence),
            bus,
            limits,
        }
    }

    /// Single-instance manager: in-memory presence and no bus.
    pub fn local(limits: Limits) -> Self {
        Self {
            registry: Arc::new(ConnectionRegistry::new()),
            presence: Presence::default(),
            bus: None,
            limits,
        }
    }

    pub fn has_bus(&self) -> bool {
        self.bus.is_some()
    }

    /// Register a new connection on `topic` and record the participant's
    /// presence. Fails only when the topic is at its connection limit.
    pub async fn subscribe(
        &self,
        topic: Topic,
        participant: impl Into<ParticipantKey>,
        role: PresenceRole,
    ) -> Result<Subscription, Error> {
        let participant = participant.into();
        let (sender, receiver) = mpsc::unbounded_channel();
        let connection = ConnectionInfo::new(participant.clone(), role, sender);

        let connection_id = self.registry.register_with_limit(
            topic.clone(),
            connection,
            self.limits.max_connections_per_topic,
        )?;

        // Guard first: if this future is dropped mid-await the connection is still released.
        let guard = ConnectionGuard::new(Cleanup::new(
            Arc::clone(&self.registry),
            self.presence.clone(),
            topic.clone(),
            connection_id.clone(),
            participant.clone(),
            role,
        ));

        self.presence.add(&topic, role, &participant).await;

        info!(
            "Registered SSE connection {} for {participant} on {topic}",
            connection_id.as_str()
        );

        Ok(Subscription {
            connection_id,
            receiver,
            guard,
        })
    }

    /// Deliver an envelope to every connection this instance holds for
    /// `topic`, in registration order. A connection whose receiver is gone is
    /// removed and delivery continues with the rest. Returns how many
    /// connections received the event.
    pub fn publish(&self, topic: &Topic, envelope: &Envelope) -> usize {
        let connections = self.registry.connections(topic);
        if connections.is_empty() {
            trace!("No local SSE connections for {topic}");
            return 0;
        }

        let frame = envelope.to_frame();
        let mut delivered = 0;

        for connection in connections {
            match connection.sender.send(Ok(frame.clone())) {
                Ok(()) => delivered += 1,
                Err(_) => {
                    warn!(
                        "Dropping SSE connection {} for {} on {topic}: client is gone",
                        connection.id.as_str(),
                        connection.participant
                    );
                    self.registry.unregister(topic, &connection.id);
                }
            }
        }

        debug!(
            "Delivered {} to {delivered} connection(s) on {topic}",
            envelope.event_name
        );
        delivered
    }

    /// Route a domain-level message. With a bus configured the message goes
    /// to the bus only, and every instance (this one included) fans it out
    /// through its relay. Without a bus, or if the bus publish fails, it is
    /// delivered to local connections directly.
    pub async fn send_message(&self, message: SseMessage) {
        let envelope = match message.envelope() {
            Ok(envelope) => envelope,
            Err(e) => {
                error!("Failed to serialize SSE event for {}: {e}", message.topic);
                return;
            }
        };

        let Some(bus) = &self.bus else {
            self.publish(&message.topic, &envelope);
            return;
        };

        let channel = message.topic.channel();
        let published = match envelope.encode() {
            Ok(payload) => bus.publish(&channel, payload).await,
            Err(e) => Err(e),
        };

        if let Err(e) = published {
            warn!("Bus publish to {channel} failed, delivering locally only: {e}");
            self.publish(&message.topic, &envelope);
        }
    }

    /// Close every connection `participant` holds on `topic` and remove them
    /// from both presence roles. Returns the number of connections closed.
    pub async fn disconnect(&self, topic: &Topic, participant: &str) -> usize {
        let removed = self.registry.unregister_participant(topic, participant);

        let roles: &[PresenceRole] = match topic {
            Topic::Auction(_) => &[PresenceRole::Visitor, PresenceRole::Subscriber],
            Topic::User(_) => &[PresenceRole::Subscriber],
        };
        for role in roles {
            self.presence.remove(topic, *role, participant).await;
        }

        info!(
            "Closed {} SSE connection(s) for {participant} on {topic}: {}",
            removed.len(),
            CloseReason::Completed
        );
        removed.len()
    }

    pub async fn members(&self, set: &PresenceSet) -> HashSet<ParticipantKey> {
        self.presence.members(set).await
    }

    pub fn connection_count(&self, topic: &Topic) -> usize {
        self.registry.connection_count(topic)
    }

    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.registry
    }

    pub fn presence(&self) -> &Presence {
        &self.presence
    }
}

impl Default for Manager {
    fn default() -> Self {
        Self::local(Limits::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SseErrorKind;
    use crate::message::Event as SseEvent;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    fn bid_placed() -> Envelope {
        Envelope::new("bid_placed", json!({"amount": 1200}))
    }

    #[tokio::test]
    async fn visitor_presence_follows_the_connection() {
        let manager = Manager::default();
        let topic = Topic::auction(42);
        let visitors = PresenceSet::AuctionVisitors("42".to_string());

        let subscription = manager
            .subscribe(topic.clone(), "client-a", PresenceRole::Visitor)
            .await
            .unwrap();
        assert!(manager.members(&visitors).await.contains("client-a"));

        let (_, _, guard) = subscription.into_parts();
        guard.close(CloseReason::Disconnected).unwrap().await.unwrap();

        assert!(!manager.members(&visitors).await.contains("client-a"));
        assert_eq!(manager.connection_count(&topic), 0);
    }

    #[tokio::test]
    async fn publish_reaches_every_connection_on_the_topic() {
        let manager = Manager::default();
        let topic = Topic::auction(7);
        let mut first = manager
            .subscribe(topic.clone(), "a", PresenceRole::Visitor)
            .await
            .unwrap();
        let mut second = manager
            .subscribe(topic.clone(), "b", PresenceRole::Subscriber)
            .await
            .unwrap();
        let mut elsewhere = manager
            .subscribe(Topic::auction(8), "c", PresenceRole::Visitor)
            .await
            .unwrap();

        assert_eq!(manager.publish(&topic, &bid_placed()), 2);

        assert!(first.recv().await.is_some());
        assert!(second.recv().await.is_some());
        assert!(elsewhere.receiver.try_recv().is_err());
    }

    #[tokio::test]
    async fn failed_write_on_third_connection_leaves_the_first_two_served() {
        let manager = Manager::default();
        let topic = Topic::auction(99);
        let mut first = manager
            .subscribe(topic.clone(), "a", PresenceRole::Visitor)
            .await
            .unwrap();
        let mut second = manager
            .subscribe(topic.clone(), "b", PresenceRole::Visitor)
            .await
            .unwrap();
        let (third_id, third_receiver, _third_guard) = manager
            .subscribe(topic.clone(), "c", PresenceRole::Visitor)
            .await
            .unwrap()
            .into_parts();
        drop(third_receiver);

        let delivered = manager.publish(&topic, &bid_placed());

        assert_eq!(delivered, 2);
        let frame = format!("{:?}", first.recv().await.unwrap());
        assert!(frame.contains("event: bid_placed"));
        assert!(second.recv().await.is_some());
        assert!(!manager.registry().contains(&topic, &third_id));
        assert_eq!(manager.connection_count(&topic), 2);
    }

    #[tokio::test]
    async fn publish_to_unknown_topic_delivers_nothing() {
        let manager = Manager::default();
        assert_eq!(manager.publish(&Topic::user("nobody"), &bid_placed()), 0);
    }

    #[tokio::test]
    async fn subscribe_beyond_the_limit_is_refused() {
        let manager = Manager::local(Limits {
            max_connections_per_topic: Some(1),
        });
        let topic = Topic::auction(1);

        let _first = manager
            .subscribe(topic.clone(), "a", PresenceRole::Visitor)
            .await
            .unwrap();
        let refused = manager
            .subscribe(topic.clone(), "b", PresenceRole::Visitor)
            .await;

        assert!(matches!(
            refused.map(|_| ()).unwrap_err().error_kind,
            SseErrorKind::ConnectionLimit { limit: 1, .. }
        ));
        assert!(!manager
            .members(&PresenceSet::AuctionVisitors("1".to_string()))
            .await
            .contains("b"));
    }

    #[tokio::test]
    async fn disconnect_ends_the_participant_streams() {
        let manager = Manager::default();
        let topic = Topic::auction(5);
        let mut subscription = manager
            .subscribe(topic.clone(), "a", PresenceRole::Subscriber)
            .await
            .unwrap();

        assert_eq!(manager.disconnect(&topic, "a").await, 1);

        assert!(subscription.recv().await.is_none());
        assert!(manager
            .members(&PresenceSet::AuctionSubscribers("5".to_string()))
            .await
            .is_empty());
    }

    #[derive(Default)]
    struct RecordingBus {
        published: Mutex<Vec<(String, String)>>,
        fail: bool,
    }

    #[async_trait]
    impl Bus for RecordingBus {
        async fn publish(&self, channel: &str, payload: String) -> Result<(), Error> {
            if self.fail {
                return Err(Error {
                    source: None,
                    error_kind: SseErrorKind::Bus,
                });
            }
            self.published
                .lock()
                .unwrap()
                .push((channel.to_string(), payload));
            Ok(())
        }
    }

    fn notification_for(user: &str) -> SseMessage {
        SseMessage {
            event: SseEvent::Notification {
                notification: json!({"title": "Outbid"}),
            },
            topic: Topic::user(user),
        }
    }

    #[tokio::test]
    async fn send_message_with_a_bus_publishes_only_to_the_bus() {
        let bus = Arc::new(RecordingBus::default());
        let manager = Manager::new(
            Arc::new(crate::presence::MemoryPresenceStore::new()),
            Some(bus.clone() as Arc<dyn Bus>),
            Limits::default(),
        );
        let mut subscription = manager
            .subscribe(Topic::user("u7"), "u7", PresenceRole::Subscriber)
            .await
            .unwrap();

        manager.send_message(notification_for("u7")).await;

        let published = bus.published.lock().unwrap().clone();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].0, "notifications:user:u7");
        let envelope = Envelope::decode(&published[0].1).unwrap();
        assert_eq!(envelope.event_name, "notification");
        assert!(subscription.receiver.try_recv().is_err());
    }

    #[tokio::test]
    async fn send_message_falls_back_to_local_delivery_when_the_bus_fails() {
        let bus = Arc::new(RecordingBus {
            fail: true,
            ..Default::default()
        });
        let manager = Manager::new(
            Arc::new(crate::presence::MemoryPresenceStore::new()),
            Some(bus as Arc<dyn Bus>),
            Limits::default(),
        );
        let mut subscription = manager
            .subscribe(Topic::user("u7"), "u7", PresenceRole::Subscriber)
            .await
            .unwrap();

        manager.send_message(notification_for("u7")).await;

        assert!(subscription.recv().await.is_some());
    }

    #[tokio::test]
    async fn send_message_without_a_bus_delivers_locally() {
        let manager = Manager::default();
        let mut subscription = manager
            .subscribe(Topic::user("u7"), "u7", PresenceRole::Subscriber)
            .await
            .unwrap();

        manager.send_message(notification_for("u7")).await;

        let frame = format!("{:?}", subscription.recv().await.unwrap());
        assert!(frame.contains("event: notification"));
    }

    #[tokio::test]
    async fn reloading_the_page_keeps_the_visitor_present() {
        let manager = Manager::default();
        let topic = Topic::auction(42);
        let visitors = PresenceSet::AuctionVisitors("42".to_string());

        let before_reload = manager
            .subscribe(topic.clone(), "alice", PresenceRole::Visitor)
            .await
            .unwrap();
        let (_, _, guard) = before_reload.into_parts();
        let removal = guard.close(CloseReason::Disconnected);
        let _after_reload = manager
            .subscribe(topic.clone(), "alice", PresenceRole::Visitor)
            .await
            .unwrap();
        if let Some(removal) = removal {
            removal.await.unwrap();
        }
        tokio::task::yield_now().await;

        assert_eq!(manager.connection_count(&topic), 1);
        assert!(manager.members(&visitors).await.contains("alice"));
    }
}
