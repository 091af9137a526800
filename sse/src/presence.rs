//! Shared "who is watching" sets.
//!
//! Presence is informational only: message delivery never consults it. Every
//! call through [`Presence`] logs and swallows store failures so an outage of
//! the shared store cannot break an open stream or the request that opened it.
use crate::error::Error;
use crate::topic::{ParticipantKey, PresenceRole, PresenceSet, Topic};
use async_trait::async_trait;
use dashmap::DashMap;
use log::*;
use redis::{aio::ConnectionManager, AsyncCommands};
use std::collections::HashSet;
use std::sync::Arc;

/// A store of named participant sets. Adds and removes are idempotent.
#[async_trait]
pub trait PresenceStore: Send + Sync {
    async fn add(&self, set: &PresenceSet, participant: &str) -> Result<(), Error>;
    async fn remove(&self, set: &PresenceSet, participant: &str) -> Result<(), Error>;
    async fn members(&self, set: &PresenceSet) -> Result<HashSet<ParticipantKey>, Error>;
}

/// Presence sets kept in Redis, shared by every backend instance.
#[derive(Clone)]
pub struct RedisPresenceStore {
    connection: ConnectionManager,
}

impl RedisPresenceStore {
    pub fn new(connection: ConnectionManager) -> Self {
        Self { connection }
    }
}

#[async_trait]
impl PresenceStore for RedisPresenceStore {
    async fn add(&self, set: &PresenceSet, participant: &str) -> Result<(), Error> {
        let mut conn = self.connection.clone();
        let _: i64 = conn
            .sadd(set.key(), participant)
            .await
            .map_err(Error::store)?;
        Ok(())
    }

    async fn remove(&self, set: &PresenceSet, participant: &str) -> Result<(), Error> {
        let mut conn = self.connection.clone();
        let _: i64 = conn
            .srem(set.key(), participant)
            .await
            .map_err(Error::store)?;
        Ok(())
    }

    async fn members(&self, set: &PresenceSet) -> Result<HashSet<ParticipantKey>, Error> {
        let mut conn = self.connection.clone();
        let members: HashSet<String> = conn.smembers(set.key()).await.map_err(Error::store)?;
        Ok(members)
    }
}

/// Process-local presence sets, used when no Redis URL is configured.
#[derive(Default)]
pub struct MemoryPresenceStore {
    sets: DashMap<String, HashSet<ParticipantKey>>,
}

impl MemoryPresenceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PresenceStore for MemoryPresenceStore {
    async fn add(&self, set: &PresenceSet, participant: &str) -> Result<(), Error> {
        self.sets
            .entry(set.key())
            .or_default()
            .insert(participant.to_string());
        Ok(())
    }

    async fn remove(&self, set: &PresenceSet, participant: &str) -> Result<(), Error> {
        let key = set.key();
        if let Some(mut members) = self.sets.get_mut(&key) {
            members.remove(participant);
        }
        self.sets.remove_if(&key, |_, members| members.is_empty());
        Ok(())
    }

    async fn members(&self, set: &PresenceSet) -> Result<HashSet<ParticipantKey>, Error> {
        Ok(self
            .sets
            .get(&set.key())
            .map(|members| members.value().clone())
            .unwrap_or_default())
    }
}

/// Best-effort front for a [`PresenceStore`].
#[derive(Clone)]
pub struct Presence {
    store: Arc<dyn PresenceStore>,
}

impl Presence {
    pub fn new(store: Arc<dyn PresenceStore>) -> Self {
        Self { store }
    }

    pub async fn add(&self, topic: &Topic, role: PresenceRole, participant: &str) {
        let set = topic.presence_set(role);
        match self.store.add(&set, participant).await {
            Ok(()) => debug!("Added {participant} to presence set {}", set.key()),
            Err(e) => warn!(
                "Failed to add {participant} to presence set {} for {topic}: {e}",
                set.key()
            ),
        }
    }

    pub async fn remove(&self, topic: &Topic, role: PresenceRole, participant: &str) {
        let set = topic.presence_set(role);
        match self.store.remove(&set, participant).await {
            Ok(()) => debug!("Removed {participant} from presence set {}", set.key()),
            Err(e) => warn!(
                "Failed to remove {participant} from presence set {} for {topic}: {e}",
                set.key()
            ),
        }
    }

    /// Current members, or an empty set when the store is unavailable.
    pub async fn members(&self, set: &PresenceSet) -> HashSet<ParticipantKey> {
        match self.store.members(set).await {
            Ok(members) => members,
            Err(e) => {
                warn!("Failed to read presence set {}: {e}", set.key());
                HashSet::new()
            }
        }
    }
}

impl Default for Presence {
    fn default() -> Self {
        Self::new(Arc::new(MemoryPresenceStore::new()))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::SseErrorKind;

    /// A store whose every call fails, standing in for an unreachable Redis.
    pub(crate) struct UnreachableStore;

    fn unreachable() -> Error {
        Error {
            source: Some("connection refused".into()),
            error_kind: SseErrorKind::Store,
        }
    }

    #[async_trait]
    impl PresenceStore for UnreachableStore {
        async fn add(&self, _: &PresenceSet, _: &str) -> Result<(), Error> {
            Err(unreachable())
        }

        async fn remove(&self, _: &PresenceSet, _: &str) -> Result<(), Error> {
            Err(unreachable())
        }

        async fn members(&self, _: &PresenceSet) -> Result<HashSet<ParticipantKey>, Error> {
            Err(unreachable())
        }
    }

    #[tokio::test]
    async fn added_participant_is_a_member() {
        let presence = Presence::default();
        let topic = Topic::auction(42);

        presence.add(&topic, PresenceRole::Visitor, "alice").await;

        let members = presence
            .members(&topic.presence_set(PresenceRole::Visitor))
            .await;
        assert!(members.contains("alice"));
        assert!(presence
            .members(&topic.presence_set(PresenceRole::Subscriber))
            .await
            .is_empty());
    }

    #[tokio::test]
    async fn add_and_remove_are_idempotent() {
        let presence = Presence::default();
        let topic = Topic::auction(42);
        let set = topic.presence_set(PresenceRole::Subscriber);

        presence.add(&topic, PresenceRole::Subscriber, "bob").await;
        presence.add(&topic, PresenceRole::Subscriber, "bob").await;
        assert_eq!(presence.members(&set).await.len(), 1);

        presence.remove(&topic, PresenceRole::Subscriber, "bob").await;
        presence.remove(&topic, PresenceRole::Subscriber, "bob").await;
        assert!(presence.members(&set).await.is_empty());
    }

    #[tokio::test]
    async fn notification_topics_share_one_flat_set() {
        let presence = Presence::default();

        presence
            .add(&Topic::user("u1"), PresenceRole::Visitor, "u1")
            .await;
        presence
            .add(&Topic::user("u2"), PresenceRole::Subscriber, "u2")
            .await;

        let members = presence.members(&PresenceSet::NotificationSubscribers).await;
        assert_eq!(members.len(), 2);
    }

    #[tokio::test]
    async fn unreachable_store_degrades_to_empty_membership() {
        let presence = Presence::new(Arc::new(UnreachableStore));
        let topic = Topic::auction(42);

        presence.add(&topic, PresenceRole::Visitor, "alice").await;
        presence.remove(&topic, PresenceRole::Visitor, "alice").await;

        assert!(presence
            .members(&topic.presence_set(PresenceRole::Visitor))
            .await
            .is_empty());
    }
}
