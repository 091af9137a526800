use super::insert_id;
use domain::{auction_status::AuctionStatus, Id, IntoQueryFilterMap, QueryFilterMap};
use serde::Deserialize;
use utoipa::IntoParams;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub(crate) struct IndexParams {
    pub(crate) status: Option<AuctionStatus>,
    #[param(value_type = Option<String>, format = Uuid)]
    pub(crate) seller_id: Option<Id>,
}

impl IntoQueryFilterMap for IndexParams {
    fn into_query_filter_map(self) -> QueryFilterMap {
        let mut query_filter_map = QueryFilterMap::new();
        insert_id(&mut query_filter_map, "seller_id", self.seller_id);

        query_filter_map
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub(crate) struct CloseParams {
    /// Cancel the auction instead of closing it.
    #[serde(default)]
    pub(crate) cancel: bool,
}

impl CloseParams {
    pub(crate) fn status(&self) -> AuctionStatus {
        if self.cancel {
            AuctionStatus::Cancelled
        } else {
            AuctionStatus::Closed
        }
    }
}
