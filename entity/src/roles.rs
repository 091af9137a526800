use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// The trade a user takes part in on the marketplace.
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
#[serde(rename_all = "snake_case")]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "role")]
pub enum Role {
    #[sea_orm(string_value = "producer")]
    #[default]
    Producer,
    #[sea_orm(string_value = "transformer")]
    Transformer,
    #[sea_orm(string_value = "exporter")]
    Exporter,
    #[sea_orm(string_value = "carrier")]
    Carrier,
    #[sea_orm(string_value = "quality_inspector")]
    QualityInspector,
    #[sea_orm(string_value = "admin")]
    Admin,
}

impl std::fmt::Display for Role {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Producer => write!(fmt, "producer"),
            Role::Transformer => write!(fmt, "transformer"),
            Role::Exporter => write!(fmt, "exporter"),
            Role::Carrier => write!(fmt, "carrier"),
            Role::QualityInspector => write!(fmt, "quality_inspector"),
            Role::Admin => write!(fmt, "admin"),
        }
    }
}
