//! SeaORM Entity for the auctions table.
//! A producer (or cooperative) lists a lot of raw cashew nuts and buyers bid on it.

use crate::auction_status::AuctionStatus;
use crate::Id;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize, ToSchema)]
#[schema(as = entity::auctions::Model)]
#[sea_orm(schema_name = "cashew_market", table_name = "auctions")]
pub struct Model {
    #[serde(skip_deserializing)]
    #[sea_orm(primary_key)]
    pub id: Id,
    #[serde(skip_deserializing)]
    pub seller_id: Id,
    pub title: String,
    pub description: Option<String>,
    /// Origin region of the lot
    pub origin: Option<String>,
    /// Lot size in kilograms
    pub quantity_kg: i32,
    /// Minimum acceptable bid, in the smallest currency unit
    pub starting_price: i64,
    #[serde(default)]
    pub status: AuctionStatus,
    #[schema(value_type = Option<String>, format = DateTime)]
    pub ends_at: Option<DateTimeWithTimeZone>,
    #[serde(skip_deserializing)]
    #[schema(value_type = String, format = DateTime)]
    pub created_at: DateTimeWithTimeZone,
    #[serde(skip_deserializing)]
    #[schema(value_type = String, format = DateTime)]
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::SellerId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Users,
    #[sea_orm(has_many = "super::bids::Entity")]
    Bids,
    #[sea_orm(has_many = "super::quality_inspections::Entity")]
    QualityInspections,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl Related<super::bids::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Bids.def()
    }
}

impl Related<super::quality_inspections::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::QualityInspections.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
