//! Server-Sent Events (SSE) infrastructure for live auction and notification
//! updates.
//!
//! # Architecture
//!
//! - **Topic-keyed registry**: every open stream belongs to one topic, either
//!   an auction page or one user's notification feed. The registry is a
//!   sharded `DashMap` of per-topic connection lists, so request tasks and
//!   the relay task never serialize on a global lock.
//! - **Presence sets**: who is watching an auction (visitors and
//!   subscribers) and who has a notification stream open is kept in Redis
//!   sets shared by every instance. Presence is informational and
//!   best-effort; it never decides delivery.
//! - **Cross-instance relay**: with Redis configured, events are published
//!   to a per-topic channel and every instance's relay fans them out to its
//!   own connections. Without Redis, events are delivered locally.
//! - **Ephemeral messages**: a client that is not connected misses the
//!   event and reloads fresh data on reconnect. Nothing is queued or
//!   replayed.
//!
//! # Message Flow
//!
//! 1. A client opens `/auctions/:id/events` or `/notifications/events`
//! 2. The web layer calls [`Manager::subscribe`], which registers the
//!    connection and adds the caller to the presence set
//! 3. A domain operation (bid placed, bid accepted, ...) publishes a
//!    `DomainEvent`; [`SseDomainEventHandler`] maps it to a topic and calls
//!    [`Manager::send_message`]
//! 4. The message goes to the Redis channel for the topic, or straight to
//!    local connections in single-instance mode
//! 5. Each instance's [`Relay`] receives the channel message and calls
//!    [`Manager::publish`], which writes to each local connection and drops
//!    the ones whose client has gone away
//! 6. When a stream ends (completed, idle timeout, disconnect) its
//!    [`ConnectionGuard`] removes it from the registry and from presence
//!
//! # Example: subscribing
//!
//! ```rust,ignore
//! let subscription = app_state
//!     .sse_manager
//!     .subscribe(Topic::auction(auction_id), user.id.to_string(), PresenceRole::Visitor)
//!     .await?;
//! ```
//!
//! # Modules
//!
//! - `topic`: topic keys, presence set names and bus channel names
//! - `connection`: ConnectionRegistry and the type-safe ConnectionId
//! - `presence`: PresenceStore trait with Redis and in-memory stores
//! - `message`: typed events and the wire envelope
//! - `manager`: subscribe, local fan-out and bus routing
//! - `bus`: publishing side of the cross-instance bus
//! - `relay`: subscribing side of the cross-instance bus
//! - `lifecycle`: idempotent connection cleanup

pub mod bus;
pub mod connection;
pub mod domain_event_handler;
pub mod error;
pub mod lifecycle;
pub mod manager;
pub mod message;
pub mod presence;
pub mod relay;
pub mod topic;

pub use domain_event_handler::SseDomainEventHandler;
pub use lifecycle::{CloseReason, ConnectionGuard};
pub use manager::{Limits, Manager, Subscription};
pub use relay::Relay;
pub use topic::{PresenceRole, PresenceSet, Topic};
