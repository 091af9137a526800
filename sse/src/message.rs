use crate::error::Error;
use crate::topic::Topic;
use axum::response::sse::Event as SseFrame;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Trait for getting the SSE event type name
pub trait EventType {
    fn event_type(&self) -> &'static str;
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum Event {
    // Auctions (auction-scoped)
    #[serde(rename = "auction_updated")]
    AuctionUpdated { auction_id: String, auction: Value },
    #[serde(rename = "auction_closed")]
    AuctionClosed { auction_id: String, auction: Value },

    // Bids (auction-scoped)
    #[serde(rename = "bid_placed")]
    BidPlaced { auction_id: String, bid: Value },
    #[serde(rename = "bid_accepted")]
    BidAccepted {
        auction_id: String,
        accepted_bid: Value,
        rejected_bids: Vec<Value>,
    },

    // Quality control (auction-scoped)
    #[serde(rename = "inspection_certified")]
    InspectionCertified { auction_id: String, inspection: Value },

    // Notifications (user-scoped)
    #[serde(rename = "notification")]
    Notification { notification: Value },
}

impl EventType for Event {
    fn event_type(&self) -> &'static str {
        match self {
            Event::AuctionUpdated { .. } => "auction_updated",
            Event::AuctionClosed { .. } => "auction_closed",
            Event::BidPlaced { .. } => "bid_placed",
            Event::BidAccepted { .. } => "bid_accepted",
            Event::InspectionCertified { .. } => "inspection_certified",
            Event::Notification { .. } => "notification",
        }
    }
}

/// A typed event addressed to one topic.
#[derive(Debug, Clone)]
pub struct Message {
    pub event: Event,
    pub topic: Topic,
}

impl Message {
    pub fn envelope(&self) -> Result<Envelope, Error> {
        Ok(Envelope {
            event_name: self.event.event_type().to_string(),
            data: serde_json::to_value(&self.event)?,
        })
    }
}

/// The `(event name, payload)` pair pushed to clients and carried across
/// instances on the bus as `{"eventName": ..., "data": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    pub event_name: String,
    pub data: Value,
}

impl Envelope {
    pub fn new(event_name: impl Into<String>, data: Value) -> Self {
        Self {
            event_name: event_name.into(),
            data,
        }
    }

    pub fn encode(&self) -> Result<String, Error> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decodes a bus payload. Event names travel in the SSE `event:` field,
    /// which cannot hold line breaks, so such names are rejected here.
    pub fn decode(payload: &str) -> Result<Self, Error> {
        let envelope: Envelope = serde_json::from_str(payload)?;
        if envelope.event_name.is_empty() {
            return Err(Error::decode("envelope has an empty eventName"));
        }
        if envelope.event_name.contains(['\n', '\r']) {
            return Err(Error::decode("envelope eventName contains a line break"));
        }
        Ok(envelope)
    }

    pub fn to_frame(&self) -> SseFrame {
        SseFrame::default()
            .event(&self.event_name)
            .data(self.data.to_string())
    }
}
