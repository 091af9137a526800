use super::insert_id;
use domain::{offer_status::OfferStatus, Id, IntoQueryFilterMap, QueryFilterMap};
use serde::Deserialize;
use utoipa::IntoParams;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub(crate) struct IndexParams {
    #[param(value_type = Option<String>, format = Uuid)]
    pub(crate) sender_id: Option<Id>,
    #[param(value_type = Option<String>, format = Uuid)]
    pub(crate) recipient_id: Option<Id>,
    pub(crate) status: Option<OfferStatus>,
}

impl IndexParams {
    /// At least one party filter was given.
    pub(crate) fn has_party_filter(&self) -> bool {
        self.sender_id.is_some() || self.recipient_id.is_some()
    }

    /// The requested parties include the caller.
    pub(crate) fn involves(&self, user_id: Id) -> bool {
        self.sender_id == Some(user_id) || self.recipient_id == Some(user_id)
    }
}

impl IntoQueryFilterMap for IndexParams {
    fn into_query_filter_map(self) -> QueryFilterMap {
        let mut query_filter_map = QueryFilterMap::new();
        insert_id(&mut query_filter_map, "sender_id", self.sender_id);
        insert_id(&mut query_filter_map, "recipient_id", self.recipient_id);

        query_filter_map
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub(crate) struct StatusParams {
    pub(crate) value: OfferStatus,
}
