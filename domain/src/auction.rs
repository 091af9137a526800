use crate::auction_status::AuctionStatus;
use crate::auctions::{self, Model};
use crate::error::Error;
use crate::{to_payload, users, Id, QueryFilterMap};
use entity_api::query;
use events::{DomainEvent, EventPublisher};
use log::*;
use sea_orm::DatabaseConnection;

pub use entity_api::auction::{create, delete_by_id, find_all, find_by_id, find_by_status};

/// Auctions matching an optional status and the plain column filters in
/// `params` (e.g. `seller_id`).
pub async fn find_by(
    db: &DatabaseConnection,
    status: Option<AuctionStatus>,
    params: QueryFilterMap,
) -> Result<Vec<Model>, Error> {
    let auctions = match (status, params.is_empty()) {
        (Some(status), true) => find_by_status(db, status).await?,
        (None, true) => find_all(db).await?,
        (status, false) => query::find_by::<auctions::Entity, auctions::Column>(db, params)
            .await?
            .into_iter()
            .filter(|auction| status.as_ref().map_or(true, |s| &auction.status == s))
            .collect(),
    };

    Ok(auctions)
}

pub fn ensure_open(auction: &Model) -> Result<(), Error> {
    if auction.status == AuctionStatus::Open {
        Ok(())
    } else {
        Err(Error::conflict(format!(
            "auction {} is {}",
            auction.id, auction.status
        )))
    }
}

pub fn ensure_seller_or_admin(auction: &Model, actor: &users::Model) -> Result<(), Error> {
    if auction.seller_id == actor.id || actor.is_admin() {
        Ok(())
    } else {
        Err(Error::forbidden("only the seller may change this auction"))
    }
}

/// Update the terms of an open auction and tell everyone watching it.
pub async fn update(
    db: &DatabaseConnection,
    event_publisher: &EventPublisher,
    id: Id,
    model: Model,
) -> Result<Model, Error> {
    let auction = find_by_id(db, id).await?;
    ensure_open(&auction)?;

    let auction = entity_api::auction::update(db, id, model).await?;

    event_publisher
        .publish(DomainEvent::AuctionUpdated {
            auction_id: auction.id,
            auction: to_payload(&auction),
        })
        .await;

    Ok(auction)
}

/// Move an open auction to `Closed` or `Cancelled`.
pub async fn close(
    db: &DatabaseConnection,
    event_publisher: &EventPublisher,
    id: Id,
    status: AuctionStatus,
) -> Result<Model, Error> {
    if status == AuctionStatus::Open {
        return Err(Error::invalid("an auction can only be closed or cancelled"));
    }

    let auction = find_by_id(db, id).await?;
    ensure_open(&auction)?;

    let auction = entity_api::auction::set_status(db, auction, status).await?;
    info!("Auction {} is now {}", auction.id, auction.status);

    event_publisher
        .publish(DomainEvent::AuctionClosed {
            auction_id: auction.id,
            auction: to_payload(&auction),
        })
        .await;

    Ok(auction)
}
