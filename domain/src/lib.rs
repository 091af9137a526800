//! Business rules of the marketplace.
//!
//! Controllers in `web` call into this crate rather than `entity_api`. Plain
//! reads and writes are re-exported as they are; operations that move a
//! record through its lifecycle (closing an auction, accepting a bid,
//! answering a contract offer, certifying an inspection) check the rules
//! here and then emit a [`events::DomainEvent`] once the database work is
//! done.
use log::*;
use serde::Serialize;

pub use entity_api::{IntoQueryFilterMap, QueryFilterMap};

// Re-exports from `entity` crate via `entity_api`
pub use entity_api::{
    auction_status, auctions, bid_status, bids, contract_offers, cooperatives, news,
    notifications, offer_status, quality_inspections, roles, users, Id,
};

pub use events;

pub mod auction;
pub mod bid;
pub mod contract_offer;
pub mod cooperative;
pub mod error;
pub mod news_article;
pub mod notification;
pub mod quality_inspection;
pub mod user;

/// Serialize a model for an event payload. Events are best-effort, so a
/// failure is logged and the payload left as `null`.
pub(crate) fn to_payload<T: Serialize>(model: &T) -> serde_json::Value {
    serde_json::to_value(model).unwrap_or_else(|e| {
        warn!("Failed to serialize event payload: {e}");
        serde_json::Value::Null
    })
}

#[cfg(test)]
mod test_support;
