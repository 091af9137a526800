use super::error::{EntityApiErrorKind, Error};
use chrono::Utc;
use entity::{cooperatives::*, Id};
use sea_orm::{
    entity::prelude::*, ActiveValue::Set, ActiveValue::Unchanged, ConnectionTrait, QueryOrder,
    TryIntoModel,
};

use log::*;

pub async fn create(db: &impl ConnectionTrait, cooperative_model: Model) -> Result<Model, Error> {
    debug!(
        "New Cooperative Model to be inserted: {:?}",
        cooperative_model
    );

    let now = Utc::now();

    let cooperative_active_model: ActiveModel = ActiveModel {
        name: Set(cooperative_model.name),
        region: Set(cooperative_model.region),
        description: Set(cooperative_model.description),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
        ..Default::default()
    };

    Ok(cooperative_active_model.insert(db).await?)
}

pub async fn update(db: &impl ConnectionTrait, id: Id, model: Model) -> Result<Model, Error> {
    let cooperative = find_by_id(db, id).await?;

    let active_model: ActiveModel = ActiveModel {
        id: Unchanged(cooperative.id),
        name: Set(model.name),
        region: Set(model.region),
        description: Set(model.description),
        created_at: Unchanged(cooperative.created_at),
        updated_at: Set(Utc::now().into()),
    };
    Ok(active_model.update(db).await?.try_into_model()?)
}

pub async fn delete_by_id(db: &impl ConnectionTrait, id: Id) -> Result<(), Error> {
    let cooperative_model = find_by_id(db, id).await?;
    cooperative_model.delete(db).await?;
    Ok(())
}

pub async fn find_all(db: &impl ConnectionTrait) -> Result<Vec<Model>, Error> {
    Ok(Entity::find().order_by_asc(Column::Name).all(db).await?)
}

pub async fn find_by_id(db: &impl ConnectionTrait, id: Id) -> Result<Model, Error> {
    Entity::find_by_id(id).one(db).await?.ok_or_else(|| Error {
        source: None,
        error_kind: EntityApiErrorKind::RecordNotFound,
    })
}
