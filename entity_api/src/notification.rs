use super::error::{EntityApiErrorKind, Error};
use chrono::Utc;
use entity::{notifications::*, Id};
use sea_orm::{entity::prelude::*, ActiveValue::Set, ConnectionTrait, QueryOrder};

use log::*;

pub async fn create(
    db: &impl ConnectionTrait,
    user_id: Id,
    kind: &str,
    title: String,
    body: Option<String>,
) -> Result<Model, Error> {
    debug!("New Notification for user {user_id}: {kind}");

    let notification_active_model: ActiveModel = ActiveModel {
        user_id: Set(user_id),
        kind: Set(kind.to_owned()),
        title: Set(title),
        body: Set(body),
        read: Set(false),
        created_at: Set(Utc::now().into()),
        ..Default::default()
    };

    Ok(notification_active_model.insert(db).await?)
}

pub async fn find_by_id(db: &impl ConnectionTrait, id: Id) -> Result<Model, Error> {
    Entity::find_by_id(id).one(db).await?.ok_or_else(|| Error {
        source: None,
        error_kind: EntityApiErrorKind::RecordNotFound,
    })
}

/// A user's notifications, newest first.
pub async fn find_by_user(db: &impl ConnectionTrait, user_id: Id) -> Result<Vec<Model>, Error> {
    Ok(Entity::find()
        .filter(Column::UserId.eq(user_id))
        .order_by_desc(Column::CreatedAt)
        .all(db)
        .await?)
}

pub async fn mark_read(db: &impl ConnectionTrait, notification: Model) -> Result<Model, Error> {
    if notification.read {
        return Ok(notification);
    }

    let mut active_model: ActiveModel = notification.into();
    active_model.read = Set(true);
    Ok(active_model.update(db).await?)
}
