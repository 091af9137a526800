use super::error::{EntityApiErrorKind, Error};
use chrono::Utc;
use entity::{contract_offers::*, offer_status::OfferStatus, Id};
use sea_orm::{
    entity::prelude::*, sea_query::Condition, ActiveValue::Set, ActiveValue::Unchanged,
    ConnectionTrait, QueryOrder, TryIntoModel,
};

use log::*;

pub async fn create(
    db: &impl ConnectionTrait,
    sender_id: Id,
    offer_model: Model,
) -> Result<Model, Error> {
    debug!("New Contract Offer Model to be inserted: {:?}", offer_model);

    let now = Utc::now();

    let offer_active_model: ActiveModel = ActiveModel {
        sender_id: Set(sender_id),
        recipient_id: Set(offer_model.recipient_id),
        product: Set(offer_model.product),
        quantity_kg: Set(offer_model.quantity_kg),
        price_per_kg: Set(offer_model.price_per_kg),
        delivery_date: Set(offer_model.delivery_date),
        message: Set(offer_model.message),
        status: Set(OfferStatus::Pending),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
        ..Default::default()
    };

    Ok(offer_active_model.insert(db).await?)
}

/// Replaces the offer's terms. Parties and status are left untouched.
pub async fn update_terms(db: &impl ConnectionTrait, id: Id, model: Model) -> Result<Model, Error> {
    let offer = find_by_id(db, id).await?;

    let active_model: ActiveModel = ActiveModel {
        id: Unchanged(offer.id),
        sender_id: Unchanged(offer.sender_id),
        recipient_id: Unchanged(offer.recipient_id),
        product: Set(model.product),
        quantity_kg: Set(model.quantity_kg),
        price_per_kg: Set(model.price_per_kg),
        delivery_date: Set(model.delivery_date),
        message: Set(model.message),
        status: Unchanged(offer.status),
        created_at: Unchanged(offer.created_at),
        updated_at: Set(Utc::now().into()),
    };
    Ok(active_model.update(db).await?.try_into_model()?)
}

pub async fn set_status(
    db: &impl ConnectionTrait,
    offer: Model,
    status: OfferStatus,
) -> Result<Model, Error> {
    debug!("Setting contract offer {} status to {status}", offer.id);

    let mut active_model: ActiveModel = offer.into();
    active_model.status = Set(status);
    active_model.updated_at = Set(Utc::now().into());
    Ok(active_model.update(db).await?)
}

pub async fn find_by_id(db: &impl ConnectionTrait, id: Id) -> Result<Model, Error> {
    Entity::find_by_id(id).one(db).await?.ok_or_else(|| Error {
        source: None,
        error_kind: EntityApiErrorKind::RecordNotFound,
    })
}

/// Offers the user sent or received, newest first.
pub async fn find_by_participant(
    db: &impl ConnectionTrait,
    user_id: Id,
) -> Result<Vec<Model>, Error> {
    Ok(Entity::find()
        .filter(
            Condition::any()
                .add(Column::SenderId.eq(user_id))
                .add(Column::RecipientId.eq(user_id)),
        )
        .order_by_desc(Column::CreatedAt)
        .all(db)
        .await?)
}

pub async fn find_by_participant_and_status(
    db: &impl ConnectionTrait,
    user_id: Id,
    status: OfferStatus,
) -> Result<Vec<Model>, Error> {
    Ok(Entity::find()
        .filter(
            Condition::any()
                .add(Column::SenderId.eq(user_id))
                .add(Column::RecipientId.eq(user_id)),
        )
        .filter(Column::Status.eq(status))
        .order_by_desc(Column::CreatedAt)
        .all(db)
        .await?)
}
