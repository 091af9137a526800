use crate::auction::{self, ensure_open};
use crate::bid_status::BidStatus;
use crate::bids::{self, Model};
use crate::error::Error;
use crate::notification::{self, notify_quietly};
use crate::{to_payload, Id, QueryFilterMap};
use entity_api::query;
use events::{DomainEvent, EventPublisher};
use log::*;
use sea_orm::DatabaseConnection;
use std::collections::HashSet;

pub use entity_api::bid::{find_by_auction, find_by_id, find_highest_pending, Acceptance};

pub async fn find_by(db: &DatabaseConnection, params: QueryFilterMap) -> Result<Vec<Model>, Error> {
    Ok(query::find_by::<bids::Entity, bids::Column>(db, params).await?)
}

/// Place a bid on an open auction.
///
/// The amount has to reach the starting price and beat the highest pending
/// bid. Sellers cannot bid on their own lots. The seller is notified.
pub async fn place(
    db: &DatabaseConnection,
    event_publisher: &EventPublisher,
    bidder_id: Id,
    model: Model,
) -> Result<Model, Error> {
    let auction = auction::find_by_id(db, model.auction_id).await?;
    ensure_open(&auction)?;

    if auction.seller_id == bidder_id {
        return Err(Error::forbidden("sellers cannot bid on their own auction"));
    }
    if model.amount < auction.starting_price {
        return Err(Error::invalid(format!(
            "bid must be at least the starting price of {}",
            auction.starting_price
        )));
    }
    if let Some(highest) = find_highest_pending(db, auction.id).await? {
        if model.amount <= highest.amount {
            return Err(Error::invalid(format!(
                "bid must be higher than the current highest bid of {}",
                highest.amount
            )));
        }
    }

    let bid = entity_api::bid::create(db, bidder_id, model).await?;
    debug!("Bid {} placed on auction {}", bid.id, auction.id);

    event_publisher
        .publish(DomainEvent::BidPlaced {
            auction_id: auction.id,
            bid: to_payload(&bid),
        })
        .await;

    notify_quietly(
        db,
        event_publisher,
        auction.seller_id,
        notification::BID_PLACED,
        format!("New bid on {}", auction.title),
        Some(format!("A bid of {} was placed", bid.amount)),
    )
    .await;

    Ok(bid)
}

/// Accept a pending bid on behalf of the auction's seller.
///
/// The accepted bid, the rejection of every other pending bid and the
/// closing of the auction are written in one transaction. The winner and
/// each outbid bidder get a notification afterwards.
pub async fn accept(
    db: &DatabaseConnection,
    event_publisher: &EventPublisher,
    actor_id: Id,
    bid_id: Id,
) -> Result<Acceptance, Error> {
    let bid = find_by_id(db, bid_id).await?;
    let auction = auction::find_by_id(db, bid.auction_id).await?;

    if auction.seller_id != actor_id {
        return Err(Error::forbidden("only the seller may accept a bid"));
    }
    ensure_open(&auction)?;
    if bid.status != BidStatus::Pending {
        return Err(Error::conflict(format!("bid {bid_id} is {}", bid.status)));
    }

    let acceptance = entity_api::bid::accept(db, bid_id).await?;

    event_publisher
        .publish(DomainEvent::BidAccepted {
            auction_id: acceptance.auction.id,
            accepted_bid: to_payload(&acceptance.accepted),
            rejected_bids: acceptance.rejected.iter().map(to_payload).collect(),
        })
        .await;
    event_publisher
        .publish(DomainEvent::AuctionClosed {
            auction_id: acceptance.auction.id,
            auction: to_payload(&acceptance.auction),
        })
        .await;

    let winner_id = acceptance.accepted.bidder_id;
    notify_quietly(
        db,
        event_publisher,
        winner_id,
        notification::BID_ACCEPTED,
        format!("Your bid on {} was accepted", auction.title),
        Some(format!("Accepted amount: {}", acceptance.accepted.amount)),
    )
    .await;

    let mut outbid = HashSet::new();
    for rejected in &acceptance.rejected {
        if rejected.bidder_id == winner_id || !outbid.insert(rejected.bidder_id) {
            continue;
        }
        notify_quietly(
            db,
            event_publisher,
            rejected.bidder_id,
            notification::BID_REJECTED,
            format!("Your bid on {} was not accepted", auction.title),
            None,
        )
        .await;
    }

    Ok(acceptance)
}

#[cfg(test)]
// We need to gate seaORM's mock feature behind conditional compilation because
// the feature removes the Clone trait implementation from seaORM's DatabaseConnection.
// see https://github.com/SeaQL/sea-orm/issues/830
#[cfg(feature = "mock")]
mod tests {
    use super::*;
    use crate::auction_status::AuctionStatus;
    use crate::auctions;
    use crate::error::{DomainErrorKind, RuleErrorKind};
    use crate::test_support::{auction_model, bid_model, notification_model, Recorder};
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn with_status(bid: &Model, status: BidStatus) -> Model {
        Model {
            status,
            ..bid.clone()
        }
    }

    #[tokio::test]
    async fn place_refuses_a_bid_below_the_starting_price() {
        let auction = auction_model(Id::new_v4(), AuctionStatus::Open);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[auction.clone()]])
            .into_connection();
        let (publisher, recorder) = Recorder::publisher();

        let result = place(
            &db,
            &publisher,
            Id::new_v4(),
            bid_model(auction.id, 1_500, BidStatus::Pending),
        )
        .await;

        assert!(matches!(
            result.unwrap_err().error_kind,
            DomainErrorKind::Rule(RuleErrorKind::Invalid(_))
        ));
        assert!(recorder.names().is_empty());
    }

    #[tokio::test]
    async fn place_refuses_the_seller() {
        let seller_id = Id::new_v4();
        let auction = auction_model(seller_id, AuctionStatus::Open);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[auction.clone()]])
            .into_connection();
        let (publisher, _recorder) = Recorder::publisher();

        let result = place(
            &db,
            &publisher,
            seller_id,
            bid_model(auction.id, 5_000, BidStatus::Pending),
        )
        .await;

        assert!(matches!(
            result.unwrap_err().error_kind,
            DomainErrorKind::Rule(RuleErrorKind::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn place_must_beat_the_highest_pending_bid() {
        let auction = auction_model(Id::new_v4(), AuctionStatus::Open);
        let highest = bid_model(auction.id, 3_000, BidStatus::Pending);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[auction.clone()]])
            .append_query_results([[highest]])
            .into_connection();
        let (publisher, _recorder) = Recorder::publisher();

        let result = place(
            &db,
            &publisher,
            Id::new_v4(),
            bid_model(auction.id, 3_000, BidStatus::Pending),
        )
        .await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn place_publishes_the_bid_and_notifies_the_seller() -> Result<(), Error> {
        let auction = auction_model(Id::new_v4(), AuctionStatus::Open);
        let bid = bid_model(auction.id, 2_500, BidStatus::Pending);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[auction.clone()]])
            .append_query_results([Vec::<Model>::new()])
            .append_query_results([[bid.clone()]])
            .append_query_results([[notification_model(
                auction.seller_id,
                notification::BID_PLACED,
            )]])
            .into_connection();
        let (publisher, recorder) = Recorder::publisher();

        let placed = place(&db, &publisher, bid.bidder_id, bid.clone()).await?;

        assert_eq!(placed.id, bid.id);
        assert_eq!(recorder.names(), ["bid_placed", "notification_created"]);
        assert!(matches!(
            recorder.events().last(),
            Some(DomainEvent::NotificationCreated { user_id, .. }) if *user_id == auction.seller_id
        ));

        Ok(())
    }

    #[tokio::test]
    async fn accept_refuses_anyone_but_the_seller() {
        let auction = auction_model(Id::new_v4(), AuctionStatus::Open);
        let bid = bid_model(auction.id, 2_500, BidStatus::Pending);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[bid.clone()]])
            .append_query_results([[auction.clone()]])
            .into_connection();
        let (publisher, _recorder) = Recorder::publisher();

        let result = accept(&db, &publisher, bid.bidder_id, bid.id).await;

        assert!(matches!(
            result.unwrap_err().error_kind,
            DomainErrorKind::Rule(RuleErrorKind::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn accept_on_a_closed_auction_is_a_conflict() {
        let auction = auction_model(Id::new_v4(), AuctionStatus::Closed);
        let bid = bid_model(auction.id, 2_500, BidStatus::Pending);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[bid.clone()]])
            .append_query_results([[auction.clone()]])
            .into_connection();
        let (publisher, _recorder) = Recorder::publisher();

        let result = accept(&db, &publisher, auction.seller_id, bid.id).await;

        assert!(matches!(
            result.unwrap_err().error_kind,
            DomainErrorKind::Rule(RuleErrorKind::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn accept_loses_to_a_concurrent_acceptance_as_a_conflict() {
        let auction = auction_model(Id::new_v4(), AuctionStatus::Open);
        let closed = auctions::Model {
            status: AuctionStatus::Closed,
            ..auction.clone()
        };
        let bid = bid_model(auction.id, 2_500, BidStatus::Pending);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[bid.clone()]])
            .append_query_results([[auction.clone()]])
            // the locked read inside the transaction sees the other acceptance
            .append_query_results([[bid.clone()]])
            .append_query_results([[closed]])
            .into_connection();
        let (publisher, recorder) = Recorder::publisher();

        let result = accept(&db, &publisher, auction.seller_id, bid.id).await;

        assert!(matches!(
            result.unwrap_err().error_kind,
            DomainErrorKind::Rule(RuleErrorKind::Conflict(_))
        ));
        assert!(recorder.names().is_empty());
    }

    #[tokio::test]
    async fn accept_publishes_and_notifies_winner_and_outbid_bidders() -> Result<(), Error> {
        let auction = auction_model(Id::new_v4(), AuctionStatus::Open);
        let closed = auctions::Model {
            status: AuctionStatus::Closed,
            ..auction.clone()
        };
        let winner = bid_model(auction.id, 3_000, BidStatus::Pending);
        let loser = bid_model(auction.id, 2_500, BidStatus::Pending);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[winner.clone()]])
            .append_query_results([[auction.clone()]])
            // inside the transaction
            .append_query_results([[winner.clone()]])
            .append_query_results([[auction.clone()]])
            .append_query_results([[winner.clone()]])
            .append_query_results([[with_status(&winner, BidStatus::Accepted)]])
            .append_query_results([[loser.clone()]])
            .append_query_results([[with_status(&loser, BidStatus::Rejected)]])
            .append_query_results([[closed]])
            // notifications
            .append_query_results([[notification_model(
                winner.bidder_id,
                notification::BID_ACCEPTED,
            )]])
            .append_query_results([[notification_model(
                loser.bidder_id,
                notification::BID_REJECTED,
            )]])
            .into_connection();
        let (publisher, recorder) = Recorder::publisher();

        let acceptance = accept(&db, &publisher, auction.seller_id, winner.id).await?;

        assert_eq!(acceptance.accepted.status, BidStatus::Accepted);
        assert_eq!(acceptance.rejected.len(), 1);
        assert_eq!(acceptance.auction.status, AuctionStatus::Closed);
        assert_eq!(
            recorder.names(),
            [
                "bid_accepted",
                "auction_closed",
                "notification_created",
                "notification_created"
            ]
        );

        Ok(())
    }
}
