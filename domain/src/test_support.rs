//! Builders and a recording event handler shared by the unit tests.
#![allow(dead_code)]
use crate::auction_status::AuctionStatus;
use crate::bid_status::BidStatus;
use crate::events::{DomainEvent, EventHandler, EventPublisher};
use crate::{auctions, bids, notifications, Id};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::{Arc, Mutex};

#[derive(Default)]
pub(crate) struct Recorder(Mutex<Vec<DomainEvent>>);

impl Recorder {
    pub(crate) fn publisher() -> (EventPublisher, Arc<Recorder>) {
        let recorder = Arc::new(Recorder::default());
        let publisher = EventPublisher::new().with_handler(recorder.clone());
        (publisher, recorder)
    }

    pub(crate) fn events(&self) -> Vec<DomainEvent> {
        self.0.lock().unwrap().clone()
    }

    pub(crate) fn names(&self) -> Vec<&'static str> {
        self.events()
            .iter()
            .map(|event| match event {
                DomainEvent::AuctionUpdated { .. } => "auction_updated",
                DomainEvent::AuctionClosed { .. } => "auction_closed",
                DomainEvent::BidPlaced { .. } => "bid_placed",
                DomainEvent::BidAccepted { .. } => "bid_accepted",
                DomainEvent::InspectionCertified { .. } => "inspection_certified",
                DomainEvent::NotificationCreated { .. } => "notification_created",
            })
            .collect()
    }
}

#[async_trait]
impl EventHandler for Recorder {
    async fn handle(&self, event: &DomainEvent) {
        self.0.lock().unwrap().push(event.clone());
    }
}

pub(crate) fn auction_model(seller_id: Id, status: AuctionStatus) -> auctions::Model {
    let now = Utc::now();
    auctions::Model {
        id: Id::new_v4(),
        seller_id,
        title: "Raw cashew nuts, Bouaké".to_owned(),
        description: None,
        origin: Some("Gbêkê".to_owned()),
        quantity_kg: 20_000,
        starting_price: 2_000,
        status,
        ends_at: None,
        created_at: now.into(),
        updated_at: now.into(),
    }
}

pub(crate) fn bid_model(auction_id: Id, amount: i64, status: BidStatus) -> bids::Model {
    let now = Utc::now();
    bids::Model {
        id: Id::new_v4(),
        auction_id,
        bidder_id: Id::new_v4(),
        amount,
        status,
        created_at: now.into(),
        updated_at: now.into(),
    }
}

pub(crate) fn notification_model(user_id: Id, kind: &str) -> notifications::Model {
    notifications::Model {
        id: Id::new_v4(),
        user_id,
        kind: kind.to_owned(),
        title: kind.to_owned(),
        body: None,
        read: false,
        created_at: Utc::now().into(),
    }
}
