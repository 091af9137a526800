use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Status of a contract offer. `Pending` is the only non-terminal state.
#[derive(
    Debug,
    Clone,
    Eq,
    PartialEq,
    EnumIter,
    Deserialize,
    Default,
    Serialize,
    DeriveActiveEnum,
    ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "offer_status")]
pub enum OfferStatus {
    #[sea_orm(string_value = "pending")]
    #[default]
    Pending,
    #[sea_orm(string_value = "accepted")]
    Accepted,
    #[sea_orm(string_value = "rejected")]
    Rejected,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

impl OfferStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, OfferStatus::Pending)
    }
}

impl From<&str> for OfferStatus {
    fn from(value: &str) -> Self {
        match value {
            "accepted" => OfferStatus::Accepted,
            "rejected" => OfferStatus::Rejected,
            "cancelled" => OfferStatus::Cancelled,
            _ => OfferStatus::Pending,
        }
    }
}

impl std::fmt::Display for OfferStatus {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OfferStatus::Pending => write!(fmt, "pending"),
            OfferStatus::Accepted => write!(fmt, "accepted"),
            OfferStatus::Rejected => write!(fmt, "rejected"),
            OfferStatus::Cancelled => write!(fmt, "cancelled"),
        }
    }
}
