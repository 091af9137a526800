//! Connection end-of-life handling.
//!
//! A stream can end because the server completed it, because it sat idle past
//! the configured timeout, or because the client went away. All three paths
//! run the same [`Cleanup`], which is idempotent.
use crate::connection::{ConnectionId, ConnectionRegistry};
use crate::presence::Presence;
use crate::topic::{ParticipantKey, PresenceRole, Topic};
use log::*;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    /// The server finished the stream, e.g. after an explicit unsubscribe.
    Completed,
    IdleTimeout,
    /// The client disconnected or the transport failed.
    Disconnected,
}

impl fmt::Display for CloseReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CloseReason::Completed => write!(f, "completed"),
            CloseReason::IdleTimeout => write!(f, "idle timeout"),
            CloseReason::Disconnected => write!(f, "disconnected"),
        }
    }
}

struct CleanupInner {
    done: AtomicBool,
    registry: Arc<ConnectionRegistry>,
    presence: Presence,
    topic: Topic,
    connection_id: ConnectionId,
    participant: ParticipantKey,
    role: PresenceRole,
}

/// Removes one connection from the registry and its participant from the
/// presence set. Clones share state, so only the first `run` does any work.
#[derive(Clone)]
pub struct Cleanup {
    inner: Arc<CleanupInner>,
}

impl Cleanup {
    pub fn new(
        registry: Arc<ConnectionRegistry>,
        presence: Presence,
        topic: Topic,
        connection_id: ConnectionId,
        participant: ParticipantKey,
        role: PresenceRole,
    ) -> Self {
        Self {
            inner: Arc::new(CleanupInner {
                done: AtomicBool::new(false),
                registry,
                presence,
                topic,
                connection_id,
                participant,
                role,
            }),
        }
    }

    pub fn is_done(&self) -> bool {
        self.inner.done.load(Ordering::Acquire)
    }

    /// Runs the cleanup once. Presence removal is asynchronous; the returned
    /// handle lets callers await it. `None` means there was nothing to remove
    /// from presence (already cleaned up, the participant still has another
    /// connection here, or no runtime is available).
    pub fn run(&self, reason: CloseReason) -> Option<JoinHandle<()>> {
        if self.inner.done.swap(true, Ordering::AcqRel) {
            return None;
        }

        let inner = &self.inner;
        inner.registry.unregister(&inner.topic, &inner.connection_id);
        info!(
            "SSE connection {} for {} on {} closed: {reason}",
            inner.connection_id.as_str(),
            inner.participant,
            inner.topic
        );

        if inner
            .registry
            .has_participant(&inner.topic, &inner.participant, inner.role)
        {
            debug!(
                "{} still connected to {}, keeping presence entry",
                inner.participant, inner.topic
            );
            return None;
        }

        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => Some(runtime.spawn(release_presence(Arc::clone(inner)))),
            Err(_) => {
                warn!(
                    "No runtime to remove {} from presence on {}",
                    inner.participant, inner.topic
                );
                None
            }
        }
    }
}

/// Removes the participant from presence unless they have reconnected.
///
/// A reconnect may register between the check and the store call, and its
/// own add may reach the store before this remove. The registry is checked
/// again afterwards and the entry restored, so presence ends up matching the
/// open connections whichever write lands last.
async fn release_presence(inner: Arc<CleanupInner>) {
    let CleanupInner {
        registry,
        presence,
        topic,
        participant,
        role,
        ..
    } = inner.as_ref();

    if registry.has_participant(topic, participant, *role) {
        debug!("{participant} reconnected to {topic}, keeping presence entry");
        return;
    }

    presence.remove(topic, *role, participant).await;

    if registry.has_participant(topic, participant, *role) {
        debug!("{participant} reconnected to {topic} during removal, restoring presence entry");
        presence.add(topic, *role, participant).await;
    }
}

/// Runs its [`Cleanup`] when dropped. The web layer moves the guard into the
/// response stream, so a client disconnect drops the stream and the guard.
pub struct ConnectionGuard {
    cleanup: Cleanup,
}

impl ConnectionGuard {
    pub fn new(cleanup: Cleanup) -> Self {
        Self { cleanup }
    }

    pub fn close(self, reason: CloseReason) -> Option<JoinHandle<()>> {
        self.cleanup.run(reason)
    }

    pub fn cleanup(&self) -> &Cleanup {
        &self.cleanup
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.cleanup.run(CloseReason::Disconnected);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::ConnectionInfo;
    use crate::error::Error;
    use crate::presence::tests::UnreachableStore;
    use crate::presence::{MemoryPresenceStore, PresenceStore};
    use crate::topic::PresenceSet;
    use async_trait::async_trait;
    use std::collections::HashSet;
    use tokio::sync::mpsc;

    async fn connected(
        registry: &Arc<ConnectionRegistry>,
        presence: &Presence,
        topic: &Topic,
        participant: &str,
    ) -> Cleanup {
        let (tx, _rx) = mpsc::unbounded_channel();
        let id = registry.register(
            topic.clone(),
            ConnectionInfo::new(participant, PresenceRole::Visitor, tx),
        );
        presence.add(topic, PresenceRole::Visitor, participant).await;
        Cleanup::new(
            Arc::clone(registry),
            presence.clone(),
            topic.clone(),
            id,
            participant.to_string(),
            PresenceRole::Visitor,
        )
    }

    #[tokio::test]
    async fn cleanup_removes_connection_and_presence() {
        let registry = Arc::new(ConnectionRegistry::new());
        let presence = Presence::default();
        let topic = Topic::auction(42);
        let cleanup = connected(&registry, &presence, &topic, "alice").await;

        cleanup.run(CloseReason::Completed).unwrap().await.unwrap();

        assert_eq!(registry.connection_count(&topic), 0);
        assert!(presence
            .members(&topic.presence_set(PresenceRole::Visitor))
            .await
            .is_empty());
    }

    #[tokio::test]
    async fn running_cleanup_twice_matches_running_it_once() {
        let registry = Arc::new(ConnectionRegistry::new());
        let presence = Presence::default();
        let topic = Topic::auction(42);
        let _other = connected(&registry, &presence, &topic, "bob").await;
        let cleanup = connected(&registry, &presence, &topic, "alice").await;

        let timeout = cleanup.clone();
        if let Some(handle) = timeout.run(CloseReason::IdleTimeout) {
            handle.await.unwrap();
        }
        let after_once = registry.connections(&topic).len();

        assert!(cleanup.run(CloseReason::Disconnected).is_none());
        assert!(cleanup.is_done());
        assert_eq!(registry.connections(&topic).len(), after_once);
        assert_eq!(after_once, 1);
    }

    #[tokio::test]
    async fn presence_is_kept_while_another_connection_remains() {
        let registry = Arc::new(ConnectionRegistry::new());
        let presence = Presence::default();
        let topic = Topic::auction(42);
        let first_tab = connected(&registry, &presence, &topic, "alice").await;
        let _second_tab = connected(&registry, &presence, &topic, "alice").await;

        assert!(first_tab.run(CloseReason::Disconnected).is_none());

        assert!(presence
            .members(&topic.presence_set(PresenceRole::Visitor))
            .await
            .contains("alice"));
    }

    #[tokio::test]
    async fn dropping_the_guard_runs_cleanup() {
        let registry = Arc::new(ConnectionRegistry::new());
        let presence = Presence::default();
        let topic = Topic::user("u7");
        let cleanup = connected(&registry, &presence, &topic, "u7").await;

        let guard = ConnectionGuard::new(cleanup.clone());
        drop(guard);

        assert!(cleanup.is_done());
        assert_eq!(registry.connection_count(&topic), 0);
    }

    #[tokio::test]
    async fn presence_store_errors_during_cleanup_are_swallowed() {
        let registry = Arc::new(ConnectionRegistry::new());
        let presence = Presence::new(Arc::new(UnreachableStore));
        let topic = Topic::auction(1);
        let cleanup = connected(&registry, &presence, &topic, "alice").await;

        let handle = cleanup.run(CloseReason::Disconnected).unwrap();

        assert!(handle.await.is_ok());
        assert_eq!(registry.connection_count(&topic), 0);
    }

    #[tokio::test]
    async fn reconnect_before_presence_removal_keeps_the_participant() {
        let registry = Arc::new(ConnectionRegistry::new());
        let presence = Presence::default();
        let topic = Topic::auction(42);
        let old_stream = connected(&registry, &presence, &topic, "alice").await;

        // Page reload: the old stream closes and the new one subscribes
        // before the spawned removal has had a chance to run.
        let removal = old_stream.run(CloseReason::Disconnected).unwrap();
        let _new_stream = connected(&registry, &presence, &topic, "alice").await;
        removal.await.unwrap();

        assert_eq!(registry.connection_count(&topic), 1);
        assert!(presence
            .members(&topic.presence_set(PresenceRole::Visitor))
            .await
            .contains("alice"));
    }

    /// Lets a reconnect register and write its presence entry while a
    /// removal is in flight, with the removal reaching the store last.
    struct ReconnectDuringRemove {
        sets: MemoryPresenceStore,
        registry: Arc<ConnectionRegistry>,
        topic: Topic,
    }

    #[async_trait]
    impl PresenceStore for ReconnectDuringRemove {
        async fn add(&self, set: &PresenceSet, participant: &str) -> Result<(), Error> {
            self.sets.add(set, participant).await
        }

        async fn remove(&self, set: &PresenceSet, participant: &str) -> Result<(), Error> {
            let (tx, _rx) = mpsc::unbounded_channel();
            self.registry.register(
                self.topic.clone(),
                ConnectionInfo::new(participant, PresenceRole::Visitor, tx),
            );
            self.sets.add(set, participant).await?;
            self.sets.remove(set, participant).await
        }

        async fn members(&self, set: &PresenceSet) -> Result<HashSet<ParticipantKey>, Error> {
            self.sets.members(set).await
        }
    }

    #[tokio::test]
    async fn reconnect_during_presence_removal_restores_the_participant() {
        let registry = Arc::new(ConnectionRegistry::new());
        let topic = Topic::auction(42);
        let presence = Presence::new(Arc::new(ReconnectDuringRemove {
            sets: MemoryPresenceStore::new(),
            registry: Arc::clone(&registry),
            topic: topic.clone(),
        }));
        let old_stream = connected(&registry, &presence, &topic, "alice").await;

        old_stream
            .run(CloseReason::Disconnected)
            .unwrap()
            .await
            .unwrap();

        assert_eq!(registry.connection_count(&topic), 1);
        assert!(presence
            .members(&topic.presence_set(PresenceRole::Visitor))
            .await
            .contains("alice"));
    }
}
