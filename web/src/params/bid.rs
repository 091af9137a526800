use super::insert_id;
use domain::{Id, IntoQueryFilterMap, QueryFilterMap};
use serde::Deserialize;
use utoipa::IntoParams;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub(crate) struct IndexParams {
    #[param(value_type = String, format = Uuid)]
    pub(crate) auction_id: Id,
    #[param(value_type = Option<String>, format = Uuid)]
    pub(crate) bidder_id: Option<Id>,
}

impl IntoQueryFilterMap for IndexParams {
    fn into_query_filter_map(self) -> QueryFilterMap {
        let mut query_filter_map = QueryFilterMap::new();
        insert_id(&mut query_filter_map, "auction_id", Some(self.auction_id));
        insert_id(&mut query_filter_map, "bidder_id", self.bidder_id);

        query_filter_map
    }
}
