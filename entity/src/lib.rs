use uuid::Uuid;

pub mod prelude;

// Enumerated column types
pub mod auction_status;
pub mod bid_status;
pub mod offer_status;
pub mod roles;

// Core entities
pub mod auctions;
pub mod bids;
pub mod contract_offers;
pub mod cooperatives;
pub mod news;
pub mod notifications;
pub mod quality_inspections;
pub mod users;

/// A type alias that represents any Entity's internal id field data type.
/// Aliased so that it's easy to change the underlying type if necessary.
pub type Id = Uuid;
