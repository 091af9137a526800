//! This module holds typed parameters for various endpoint inputs.
//!
//! The purpose of this module is to define and manage the parameters that are used as inputs
//! for different endpoints in the web application. By using typed parameters, we can ensure
//! that the inputs are validated (by type) and correctly formatted before they are processed by the
//! application logic.

pub(crate) mod auction;
pub(crate) mod bid;
pub(crate) mod contract_offer;
pub(crate) mod events;
pub(crate) mod quality_inspection;
pub(crate) mod user;

use domain::{Id, QueryFilterMap};
use sea_orm::Value;

/// Insert `id` under `key` when present.
pub(crate) fn insert_id(query_filter_map: &mut QueryFilterMap, key: &str, id: Option<Id>) {
    if let Some(id) = id {
        query_filter_map.insert(key.to_string(), Some(Value::Uuid(Some(Box::new(id)))));
    }
}
