use super::error::{EntityApiErrorKind, Error};
use chrono::Utc;
use entity::{auction_status::AuctionStatus, auctions::*, Id};
use sea_orm::{
    entity::prelude::*, ActiveValue::Set, ActiveValue::Unchanged, ConnectionTrait, QueryOrder,
    TryIntoModel,
};

use log::*;

pub async fn create(
    db: &impl ConnectionTrait,
    seller_id: Id,
    auction_model: Model,
) -> Result<Model, Error> {
    debug!("New Auction Model to be inserted: {:?}", auction_model);

    let now = Utc::now();

    let auction_active_model: ActiveModel = ActiveModel {
        seller_id: Set(seller_id),
        title: Set(auction_model.title),
        description: Set(auction_model.description),
        origin: Set(auction_model.origin),
        quantity_kg: Set(auction_model.quantity_kg),
        starting_price: Set(auction_model.starting_price),
        status: Set(AuctionStatus::Open),
        ends_at: Set(auction_model.ends_at),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
        ..Default::default()
    };

    Ok(auction_active_model.insert(db).await?)
}

/// Updates the lot's terms. Seller and status are left untouched.
pub async fn update(db: &impl ConnectionTrait, id: Id, model: Model) -> Result<Model, Error> {
    let auction = find_by_id(db, id).await?;

    let active_model: ActiveModel = ActiveModel {
        id: Unchanged(auction.id),
        seller_id: Unchanged(auction.seller_id),
        title: Set(model.title),
        description: Set(model.description),
        origin: Set(model.origin),
        quantity_kg: Set(model.quantity_kg),
        starting_price: Set(model.starting_price),
        status: Unchanged(auction.status),
        ends_at: Set(model.ends_at),
        created_at: Unchanged(auction.created_at),
        updated_at: Set(Utc::now().into()),
    };
    Ok(active_model.update(db).await?.try_into_model()?)
}

pub async fn set_status(
    db: &impl ConnectionTrait,
    auction: Model,
    status: AuctionStatus,
) -> Result<Model, Error> {
    debug!("Setting auction {} status to {status}", auction.id);

    let mut active_model: ActiveModel = auction.into();
    active_model.status = Set(status);
    active_model.updated_at = Set(Utc::now().into());
    Ok(active_model.update(db).await?)
}

pub async fn delete_by_id(db: &impl ConnectionTrait, id: Id) -> Result<(), Error> {
    let auction_model = find_by_id(db, id).await?;
    auction_model.delete(db).await?;
    Ok(())
}

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

pub async fn find_by_status(
    db: &impl ConnectionTrait,
    status: AuctionStatus,
) -> Result<Vec<Model>, Error> {
    Ok(Entity::find()
        .filter(Column::Status.eq(status))
        .order_by_desc(Column::CreatedAt)
        .all(db)
        .await?)
}

#[cfg(test)]
// We need to gate seaORM's mock feature behind conditional compilation because
// the feature removes the Clone trait implementation from seaORM's DatabaseConnection.
// see https://github.com/SeaQL/sea-orm/issues/830
#[cfg(feature = "mock")]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn auction_model(status: AuctionStatus) -> Model {
        let now = Utc::now();
        Model {
            id: Id::new_v4(),
            seller_id: Id::new_v4(),
            title: "12 tonnes RCN".to_owned(),
            description: None,
            origin: Some("Korhogo".to_owned()),
            quantity_kg: 12_000,
            starting_price: 5_000_000,
            status,
            ends_at: None,
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    #[tokio::test]
    async fn create_opens_the_auction_for_the_seller() -> Result<(), Error> {
        let seller_id = Id::new_v4();
        let mut stored = auction_model(AuctionStatus::Open);
        stored.seller_id = seller_id;

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[stored.clone()]])
            .into_connection();

        // Status and seller supplied by the client are ignored.
        let mut submitted = auction_model(AuctionStatus::Closed);
        submitted.seller_id = Id::new_v4();
        let created = create(&db, seller_id, submitted).await?;

        assert_eq!(created.seller_id, seller_id);
        assert_eq!(created.status, AuctionStatus::Open);

        Ok(())
    }

    #[tokio::test]
    async fn set_status_returns_the_updated_auction() -> Result<(), Error> {
        let auction = auction_model(AuctionStatus::Open);
        let mut closed = auction.clone();
        closed.status = AuctionStatus::Closed;

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[closed.clone()]])
            .into_connection();

        let result = set_status(&db, auction, AuctionStatus::Closed).await?;

        assert_eq!(result.status, AuctionStatus::Closed);

        Ok(())
    }

    #[tokio::test]
    async fn find_by_id_returns_record_not_found_when_missing() -> Result<(), Error> {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<Model>::new()])
            .into_connection();

        let result = find_by_id(&db, Id::new_v4()).await;

        assert_eq!(
            result.unwrap_err().error_kind,
            EntityApiErrorKind::RecordNotFound
        );

        Ok(())
    }
}
