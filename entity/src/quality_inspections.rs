//! SeaORM Entity for quality_inspections.
//! Results of a quality inspector's sampling of an auctioned lot.

use crate::Id;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize, ToSchema)]
#[schema(as = entity::quality_inspections::Model)]
#[sea_orm(schema_name = "cashew_market", table_name = "quality_inspections")]
pub struct Model {
    #[serde(skip_deserializing)]
    #[sea_orm(primary_key)]
    pub id: Id,
    #[schema(value_type = String, format = Uuid)]
    pub auction_id: Id,
    #[serde(skip_deserializing)]
    pub inspector_id: Id,
    /// Commercial grade, e.g. "W240" or "W320"
    pub grade: String,
    /// Moisture content in per mille
    pub moisture_per_mille: i32,
    /// Kernel outturn ratio, in lbs per 80kg bag
    pub kor_lbs: i32,
    pub notes: Option<String>,
    #[serde(skip_deserializing)]
    pub certified: bool,
    #[serde(skip_deserializing)]
    #[schema(value_type = Option<String>, format = DateTime)]
    pub certified_at: Option<DateTimeWithTimeZone>,
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
        belongs_to = "super::auctions::Entity",
        from = "Column::AuctionId",
        to = "super::auctions::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Auctions,
}

impl Related<super::auctions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Auctions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
