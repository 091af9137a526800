use crate::error::{Error, SseErrorKind};
use crate::topic::{ParticipantKey, PresenceRole, Topic};
use axum::response::sse::Event;
use dashmap::DashMap;
use log::*;
use std::convert::Infallible;
use tokio::sync::mpsc::UnboundedSender;

pub type EventSender = UnboundedSender<Result<Event, Infallible>>;

/// Unique identifier for a connection (server-generated)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConnectionId(String);

impl ConnectionId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

/// One open streaming response held by this process.
#[derive(Debug, Clone)]
pub struct ConnectionInfo {
    pub id: ConnectionId,
    pub participant: ParticipantKey,
    pub role: PresenceRole,
    pub sender: EventSender,
}

impl ConnectionInfo {
    pub fn new(participant: impl Into<ParticipantKey>, role: PresenceRole, sender: EventSender) -> Self {
        Self {
            id: ConnectionId::new(),
            participant: participant.into(),
            role,
            sender,
        }
    }
}

/// Per-topic lists of live connections on this process.
///
/// Each topic's list sits behind its own DashMap shard lock, so request tasks
/// registering on different auctions never contend with each other or with the
/// relay task fanning out to a third topic. Lists keep registration order.
pub struct ConnectionRegistry {
    topics: DashMap<Topic, Vec<ConnectionInfo>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self {
            topics: DashMap::new(),
        }
    }

    /// Append a connection to the topic's list, creating the list if absent.
    pub fn register(&self, topic: Topic, connection: ConnectionInfo) -> ConnectionId {
        let connection_id = connection.id.clone();
        self.topics.entry(topic).or_default().push(connection);
        connection_id
    }

    /// Like [`register`](Self::register), but refuses the connection when the
    /// topic already holds `limit` connections. The check and the append
    /// happen under the same entry lock.
    pub fn register_with_limit(
        &self,
        topic: Topic,
        connection: ConnectionInfo,
        limit: Option<usize>,
    ) -> Result<ConnectionId, Error> {
        let Some(limit) = limit else {
            return Ok(self.register(topic, connection));
        };

        let topic_name = topic.to_string();
        let mut entry = self.topics.entry(topic).or_default();
        if entry.len() >= limit {
            warn!("Refusing SSE connection for {topic_name}: limit of {limit} reached");
            return Err(Error {
                source: None,
                error_kind: SseErrorKind::ConnectionLimit {
                    topic: topic_name,
                    limit,
                },
            });
        }
        let connection_id = connection.id.clone();
        entry.push(connection);
        Ok(connection_id)
    }

    /// Remove a connection. Unknown topics and already-removed connections
    /// are a no-op, so the lifecycle hooks and the publisher's failure path
    /// may both call this for the same connection.
    pub fn unregister(&self, topic: &Topic, connection_id: &ConnectionId) -> Option<ConnectionInfo> {
        let removed = {
            let mut entry = self.topics.get_mut(topic)?;
            let position = entry.iter().position(|c| &c.id == connection_id)?;
            entry.remove(position)
        };

        // Guard released above; drop the topic only if nobody re-registered meanwhile.
        self.topics.remove_if(topic, |_, connections| connections.is_empty());

        Some(removed)
    }

    /// Remove every connection `participant` holds on `topic`.
    pub fn unregister_participant(&self, topic: &Topic, participant: &str) -> Vec<ConnectionInfo> {
        let removed = match self.topics.get_mut(topic) {
            Some(mut entry) => {
                let (removed, kept): (Vec<_>, Vec<_>) = entry
                    .drain(..)
                    .partition(|c| c.participant == participant);
                *entry = kept;
                removed
            }
            None => return Vec::new(),
        };

        self.topics.remove_if(topic, |_, connections| connections.is_empty());

        removed
    }

    /// Snapshot of the topic's connections; empty for unknown topics.
    /// The snapshot is detached from the registry so callers can iterate
    /// while other tasks register or unregister.
    pub fn connections(&self, topic: &Topic) -> Vec<ConnectionInfo> {
        self.topics
            .get(topic)
            .map(|entry| entry.value().clone())
            .unwrap_or_default()
    }

    pub fn contains(&self, topic: &Topic, connection_id: &ConnectionId) -> bool {
        self.topics
            .get(topic)
            .is_some_and(|entry| entry.iter().any(|c| &c.id == connection_id))
    }

    /// Whether `participant` still has a connection on `topic` in `role`.
    pub fn has_participant(&self, topic: &Topic, participant: &str, role: PresenceRole) -> bool {
        self.topics.get(topic).is_some_and(|entry| {
            entry
                .iter()
                .any(|c| c.participant == participant && c.role == role)
        })
    }

    pub fn connection_count(&self, topic: &Topic) -> usize {
        self.topics.get(topic).map(|entry| entry.len()).unwrap_or(0)
    }

    pub fn topic_count(&self) -> usize {
        self.topics.len()
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tokio::sync::mpsc;

    fn connection(participant: &str) -> ConnectionInfo {
        let (tx, _rx) = mpsc::unbounded_channel();
        ConnectionInfo::new(participant, PresenceRole::Visitor, tx)
    }

    #[test]
    fn register_then_unregister_removes_the_connection() {
        let registry = ConnectionRegistry::new();
        let topic = Topic::auction(1);

        let id = registry.register(topic.clone(), connection("a"));
        assert!(registry.contains(&topic, &id));

        let removed = registry.unregister(&topic, &id);

        assert!(removed.is_some());
        assert!(!registry.contains(&topic, &id));
        assert!(registry.connections(&topic).is_empty());
        assert_eq!(registry.topic_count(), 0);
    }

    #[test]
    fn unregister_is_a_no_op_for_unknown_topics_and_repeated_calls() {
        let registry = ConnectionRegistry::new();
        let topic = Topic::auction(1);
        let id = registry.register(topic.clone(), connection("a"));

        assert!(registry.unregister(&Topic::auction(2), &id).is_none());
        assert!(registry.unregister(&topic, &id).is_some());
        assert!(registry.unregister(&topic, &id).is_none());
    }

    #[test]
    fn connections_is_empty_for_unknown_topic() {
        let registry = ConnectionRegistry::new();
        assert!(registry.connections(&Topic::user("nobody")).is_empty());
        assert_eq!(registry.connection_count(&Topic::user("nobody")), 0);
    }

    #[test]
    fn connections_preserve_registration_order() {
        let registry = ConnectionRegistry::new();
        let topic = Topic::auction(7);
        let ids: Vec<_> = ["a", "b", "c"]
            .iter()
            .map(|p| registry.register(topic.clone(), connection(p)))
            .collect();

        let listed: Vec<_> = registry
            .connections(&topic)
            .into_iter()
            .map(|c| c.id)
            .collect();

        assert_eq!(listed, ids);
    }

    #[test]
    fn snapshot_is_unaffected_by_later_removal() {
        let registry = ConnectionRegistry::new();
        let topic = Topic::auction(7);
        let id = registry.register(topic.clone(), connection("a"));

        let snapshot = registry.connections(&topic);
        registry.unregister(&topic, &id);

        assert_eq!(snapshot.len(), 1);
        assert_eq!(registry.connection_count(&topic), 0);
    }

    #[test]
    fn register_with_limit_refuses_connections_beyond_the_cap() {
        let registry = ConnectionRegistry::new();
        let topic = Topic::auction(3);

        registry
            .register_with_limit(topic.clone(), connection("a"), Some(2))
            .unwrap();
        registry
            .register_with_limit(topic.clone(), connection("b"), Some(2))
            .unwrap();
        let refused = registry
            .register_with_limit(topic.clone(), connection("c"), Some(2))
            .unwrap_err();

        assert_eq!(
            refused.error_kind,
            SseErrorKind::ConnectionLimit {
                topic: "auction-3".to_string(),
                limit: 2
            }
        );
        assert_eq!(registry.connection_count(&topic), 2);
    }

    #[test]
    fn unregister_participant_only_removes_that_participant() {
        let registry = ConnectionRegistry::new();
        let topic = Topic::auction(5);
        registry.register(topic.clone(), connection("a"));
        registry.register(topic.clone(), connection("b"));
        registry.register(topic.clone(), connection("a"));

        let removed = registry.unregister_participant(&topic, "a");

        assert_eq!(removed.len(), 2);
        assert_eq!(registry.connection_count(&topic), 1);
        assert!(registry.has_participant(&topic, "b", PresenceRole::Visitor));
        assert!(!registry.has_participant(&topic, "a", PresenceRole::Visitor));
    }

    #[test]
    fn concurrent_registration_and_removal_leaves_a_consistent_registry() {
        let registry = Arc::new(ConnectionRegistry::new());
        let topic = Topic::auction(11);

        let handles: Vec<_> = (0..8)
            .map(|worker| {
                let registry = Arc::clone(&registry);
                let topic = topic.clone();
                std::thread::spawn(move || {
                    for i in 0..200 {
                        let id = registry.register(topic.clone(), connection(&format!("{worker}-{i}")));
                        // Iterate while other workers mutate.
                        let _ = registry.connections(&topic).len();
                        if i % 2 == 0 {
                            registry.unregister(&topic, &id);
                        }
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(registry.connection_count(&topic), 8 * 100);
    }
}
