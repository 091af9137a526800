//! Topic keys, presence set names and bus channel names.
//!
//! A [`Topic`] scopes one broadcast channel: an auction page, or the
//! notification stream of a single user. The web layer converts entity ids to
//! strings before they reach this crate.
use std::fmt;

/// Identifier of whoever holds a connection (a user id, as a string).
pub type ParticipantKey = String;

pub const AUCTION_CHANNEL_PREFIX: &str = "auctions:auction:";
pub const NOTIFICATION_CHANNEL_PREFIX: &str = "notifications:user:";

const AUCTION_VISITORS_PREFIX: &str = "auction-visitors:";
const AUCTION_SUBSCRIBERS_PREFIX: &str = "auction-subscribers:";
const NOTIFICATION_SUBSCRIBERS_KEY: &str = "notification-subscribers";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Topic {
    Auction(String),
    User(String),
}

/// How a participant is attached to an auction topic. Notification topics
/// have a single flat presence set and ignore the role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PresenceRole {
    #[default]
    Visitor,
    Subscriber,
}

impl From<&str> for PresenceRole {
    fn from(value: &str) -> Self {
        match value {
            "subscriber" => PresenceRole::Subscriber,
            _ => PresenceRole::Visitor,
        }
    }
}

/// A named set in the shared presence store.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PresenceSet {
    AuctionVisitors(String),
    AuctionSubscribers(String),
    NotificationSubscribers,
}

impl PresenceSet {
    pub fn key(&self) -> String {
        match self {
            PresenceSet::AuctionVisitors(id) => format!("{AUCTION_VISITORS_PREFIX}{id}"),
            PresenceSet::AuctionSubscribers(id) => format!("{AUCTION_SUBSCRIBERS_PREFIX}{id}"),
            PresenceSet::NotificationSubscribers => NOTIFICATION_SUBSCRIBERS_KEY.to_string(),
        }
    }
}

impl Topic {
    pub fn auction(id: impl ToString) -> Self {
        Topic::Auction(id.to_string())
    }

    pub fn user(id: impl ToString) -> Self {
        Topic::User(id.to_string())
    }

    /// The bus channel on which events for this topic are relayed.
    pub fn channel(&self) -> String {
        match self {
            Topic::Auction(id) => format!("{AUCTION_CHANNEL_PREFIX}{id}"),
            Topic::User(id) => format!("{NOTIFICATION_CHANNEL_PREFIX}{id}"),
        }
    }

    /// Recovers the topic from a concrete bus channel name.
    pub fn from_channel(channel: &str) -> Option<Topic> {
        if let Some(id) = channel.strip_prefix(AUCTION_CHANNEL_PREFIX) {
            return (!id.is_empty()).then(|| Topic::Auction(id.to_string()));
        }
        if let Some(id) = channel.strip_prefix(NOTIFICATION_CHANNEL_PREFIX) {
            return (!id.is_empty()).then(|| Topic::User(id.to_string()));
        }
        None
    }

    /// Wildcard patterns covering every channel `channel()` can produce.
    pub fn channel_patterns() -> Vec<String> {
        vec![
            format!("{AUCTION_CHANNEL_PREFIX}*"),
            format!("{NOTIFICATION_CHANNEL_PREFIX}*"),
        ]
    }

    pub fn presence_set(&self, role: PresenceRole) -> PresenceSet {
        match (self, role) {
            (Topic::Auction(id), PresenceRole::Visitor) => PresenceSet::AuctionVisitors(id.clone()),
            (Topic::Auction(id), PresenceRole::Subscriber) => {
                PresenceSet::AuctionSubscribers(id.clone())
            }
            (Topic::User(_), _) => PresenceSet::NotificationSubscribers,
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Topic::Auction(id) => write!(f, "auction-{id}"),
            Topic::User(id) => write!(f, "user-{id}"),
        }
    }
}
