use super::error::{EntityApiErrorKind, Error};
use crate::auction;
use chrono::Utc;
use entity::{auction_status::AuctionStatus, auctions, bid_status::BidStatus, bids::*, Id};
use sea_orm::{
    entity::prelude::*, ActiveValue::Set, ConnectionTrait, QueryOrder, QuerySelect,
    TransactionTrait,
};

use log::*;

/// The rows written by [`accept`].
#[derive(Debug, Clone, PartialEq)]
pub struct Acceptance {
    pub accepted: Model,
    pub rejected: Vec<Model>,
    pub auction: auctions::Model,
}

pub async fn create(
    db: &impl ConnectionTrait,
    bidder_id: Id,
    bid_model: Model,
) -> Result<Model, Error> {
    debug!("New Bid Model to be inserted: {:?}", bid_model);

    let now = Utc::now();

    let bid_active_model: ActiveModel = ActiveModel {
        auction_id: Set(bid_model.auction_id),
        bidder_id: Set(bidder_id),
        amount: Set(bid_model.amount),
        status: Set(BidStatus::Pending),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
        ..Default::default()
    };

    Ok(bid_active_model.insert(db).await?)
}

pub async fn find_by_id(db: &impl ConnectionTrait, id: Id) -> Result<Model, Error> {
    Entity::find_by_id(id).one(db).await?.ok_or_else(|| Error {
        source: None,
        error_kind: EntityApiErrorKind::RecordNotFound,
    })
}

/// All bids on an auction, highest first.
pub async fn find_by_auction(
    db: &impl ConnectionTrait,
    auction_id: Id,
) -> Result<Vec<Model>, Error> {
    Ok(Entity::find()
        .filter(Column::AuctionId.eq(auction_id))
        .order_by_desc(Column::Amount)
        .all(db)
        .await?)
}

pub async fn find_highest_pending(
    db: &impl ConnectionTrait,
    auction_id: Id,
) -> Result<Option<Model>, Error> {
    Ok(Entity::find()
        .filter(Column::AuctionId.eq(auction_id))
        .filter(Column::Status.eq(BidStatus::Pending))
        .order_by_desc(Column::Amount)
        .one(db)
        .await?)
}

pub async fn set_status(
    db: &impl ConnectionTrait,
    bid: Model,
    status: BidStatus,
) -> Result<Model, Error> {
    let mut active_model: ActiveModel = bid.into();
    active_model.status = Set(status);
    active_model.updated_at = Set(Utc::now().into());
    Ok(active_model.update(db).await?)
}

/// Accepts `bid_id` in a single transaction: the bid becomes `accepted`,
/// every other pending bid on the same auction becomes `rejected`, and the
/// auction is closed. Nothing is written if any step fails.
///
/// The auction row is locked first and then the bid row, so concurrent
/// acceptances on one auction run one after the other. The later one sees
/// the closed auction and is refused with `RecordConflict`.
pub async fn accept(db: &impl TransactionTrait, bid_id: Id) -> Result<Acceptance, Error> {
    let txn = db.begin().await?;

    let auction_id = find_by_id(&txn, bid_id).await?.auction_id;

    let auction = auctions::Entity::find_by_id(auction_id)
        .lock_exclusive()
        .one(&txn)
        .await?
        .ok_or_else(|| Error {
            source: None,
            error_kind: EntityApiErrorKind::RecordNotFound,
        })?;
    if auction.status != AuctionStatus::Open {
        warn!("Refusing to accept bid {bid_id}: auction {auction_id} is {}", auction.status);
        return Err(conflict());
    }

    let bid = Entity::find_by_id(bid_id)
        .lock_exclusive()
        .one(&txn)
        .await?
        .ok_or_else(|| Error {
            source: None,
            error_kind: EntityApiErrorKind::RecordNotFound,
        })?;
    if bid.status != BidStatus::Pending {
        warn!("Refusing to accept bid {bid_id} in status {}", bid.status);
        return Err(conflict());
    }

    let accepted = set_status(&txn, bid, BidStatus::Accepted).await?;

    let siblings = Entity::find()
        .filter(Column::AuctionId.eq(auction_id))
        .filter(Column::Status.eq(BidStatus::Pending))
        .filter(Column::Id.ne(bid_id))
        .all(&txn)
        .await?;

    let mut rejected = Vec::with_capacity(siblings.len());
    for sibling in siblings {
        rejected.push(set_status(&txn, sibling, BidStatus::Rejected).await?);
    }

    let auction = auction::set_status(&txn, auction, AuctionStatus::Closed).await?;

    txn.commit().await?;

    info!(
        "Accepted bid {bid_id} on auction {auction_id}, rejected {} other bid(s)",
        rejected.len()
    );

    Ok(Acceptance {
        accepted,
        rejected,
        auction,
    })
}

fn conflict() -> Error {
    Error {
        source: None,
        error_kind: EntityApiErrorKind::RecordConflict,
    }
}
