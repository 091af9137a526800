use super::error::{EntityApiErrorKind, Error};
use chrono::Utc;
use entity::{news::*, Id};
use sea_orm::{
    entity::prelude::*, ActiveValue::Set, ActiveValue::Unchanged, ConnectionTrait, QueryOrder,
    TryIntoModel,
};

use log::*;

pub async fn create(
    db: &impl ConnectionTrait,
    author_id: Id,
    article_model: Model,
) -> Result<Model, Error> {
    debug!("New News Model to be inserted: {:?}", article_model.title);

    let now = Utc::now();

    let article_active_model: ActiveModel = ActiveModel {
        author_id: Set(author_id),
        title: Set(article_model.title),
        body: Set(article_model.body),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
        ..Default::default()
    };

    Ok(article_active_model.insert(db).await?)
}

pub async fn update(db: &impl ConnectionTrait, id: Id, model: Model) -> Result<Model, Error> {
    let article = find_by_id(db, id).await?;

    let active_model: ActiveModel = ActiveModel {
        id: Unchanged(article.id),
        author_id: Unchanged(article.author_id),
        title: Set(model.title),
        body: Set(model.body),
        created_at: Unchanged(article.created_at),
        updated_at: Set(Utc::now().into()),
    };
    Ok(active_model.update(db).await?.try_into_model()?)
}

pub async fn delete_by_id(db: &impl ConnectionTrait, id: Id) -> Result<(), Error> {
    let article = find_by_id(db, id).await?;
    article.delete(db).await?;
    Ok(())
}

/// All articles, newest first.
pub async fn find_all(db: &impl ConnectionTrait) -> Result<Vec<Model>, Error> {
    Ok(Entity::find()
        .order_by_desc(Column::CreatedAt)
        .all(db)
        .await?)
}

pub async fn find_by_id(db: &impl ConnectionTrait, id: Id) -> Result<Model, Error> {
    Entity::find_by_id(id).one(db).await?.ok_or_else(|| Error {
        source: None,
        error_kind: EntityApiErrorKind::RecordNotFound,
    })
}
