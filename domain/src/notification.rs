use crate::error::Error;
use crate::{notifications::Model, to_payload, Id};
use events::{DomainEvent, EventPublisher};
use log::*;
use sea_orm::DatabaseConnection;

pub use entity_api::notification::{find_by_id, find_by_user};

pub const BID_PLACED: &str = "bid_placed";
pub const BID_ACCEPTED: &str = "bid_accepted";
pub const BID_REJECTED: &str = "bid_rejected";
pub const OFFER_RECEIVED: &str = "offer_received";
pub const OFFER_STATUS_CHANGED: &str = "offer_status_changed";
pub const INSPECTION_CERTIFIED: &str = "inspection_certified";

/// Persist a notification for `user_id` and push it to the user's live feed.
pub async fn notify(
    db: &DatabaseConnection,
    event_publisher: &EventPublisher,
    user_id: Id,
    kind: &str,
    title: String,
    body: Option<String>,
) -> Result<Model, Error> {
    let notification =
        entity_api::notification::create(db, user_id, kind, title, body).await?;

    event_publisher
        .publish(DomainEvent::NotificationCreated {
            user_id,
            notification: to_payload(&notification),
        })
        .await;

    Ok(notification)
}

/// Like [`notify`], for side notifications of an operation that has already
/// committed. A failure is logged and otherwise ignored.
pub(crate) async fn notify_quietly(
    db: &DatabaseConnection,
    event_publisher: &EventPublisher,
    user_id: Id,
    kind: &str,
    title: String,
    body: Option<String>,
) {
    if let Err(e) = notify(db, event_publisher, user_id, kind, title, body).await {
        warn!("Failed to notify user {user_id} ({kind}): {e}");
    }
}

/// Mark one of the caller's notifications as read.
pub async fn mark_read(db: &DatabaseConnection, user_id: Id, id: Id) -> Result<Model, Error> {
    let notification = find_by_id(db, id).await?;
    if notification.user_id != user_id {
        return Err(Error::forbidden("notification belongs to another user"));
    }
    Ok(entity_api::notification::mark_read(db, notification).await?)
}
