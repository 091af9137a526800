pub use super::auctions::Entity as Auctions;
pub use super::bids::Entity as Bids;
pub use super::contract_offers::Entity as ContractOffers;
pub use super::cooperatives::Entity as Cooperatives;
pub use super::news::Entity as News;
pub use super::notifications::Entity as Notifications;
pub use super::quality_inspections::Entity as QualityInspections;
pub use super::users::Entity as Users;
