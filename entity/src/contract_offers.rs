//! SeaORM Entity for contract_offers.
//! A direct, off-auction proposal from one trader to another for a future delivery.

use crate::offer_status::OfferStatus;
use crate::Id;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize, ToSchema)]
#[schema(as = entity::contract_offers::Model)]
#[sea_orm(schema_name = "cashew_market", table_name = "contract_offers")]
pub struct Model {
    #[serde(skip_deserializing)]
    #[sea_orm(primary_key)]
    pub id: Id,
    #[serde(skip_deserializing)]
    pub sender_id: Id,
    #[schema(value_type = String, format = Uuid)]
    pub recipient_id: Id,
    pub product: String,
    pub quantity_kg: i32,
    /// Price per kilogram, in the smallest currency unit
    pub price_per_kg: i64,
    #[schema(value_type = Option<String>, format = Date)]
    pub delivery_date: Option<Date>,
    pub message: Option<String>,
    #[serde(skip_deserializing)]
    pub status: OfferStatus,
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
        from = "Column::SenderId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Sender,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::RecipientId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Recipient,
}

impl ActiveModelBehavior for ActiveModel {}
