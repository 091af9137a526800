use chrono::Utc;
use password_auth::generate_hash;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set, Value};
use std::collections::HashMap;

pub use entity::{
    auction_status, auctions, bid_status, bids, contract_offers, cooperatives, news,
    notifications, offer_status, quality_inspections, roles, users, Id,
};

pub mod auction;
pub mod bid;
pub mod contract_offer;
pub mod cooperative;
pub mod error;
pub mod news_article;
pub mod notification;
pub mod quality_inspection;
pub mod query;
pub mod user;

pub(crate) fn uuid_parse_str(uuid_str: &str) -> Result<Id, error::Error> {
    Id::parse_str(uuid_str).map_err(|_| error::Error {
        source: None,
        error_kind: error::EntityApiErrorKind::InvalidQueryTerm,
    })
}

/// `QueryFilterMap` is a data structure that serves as a bridge for translating filter parameters
/// between different layers of the application. It is essentially a wrapper around a `HashMap`
/// where the keys are filter parameter names (as `String`) and the values are optional `Value` types
/// from `sea_orm`.
///
/// Only plain columns (ids, text) belong here. Postgres enum columns such as
/// `status` need a typed cast and are filtered by dedicated functions instead.
///
/// # Example
///
/// ```
/// use sea_orm::Value;
/// use entity_api::{Id, QueryFilterMap};
///
/// let mut query_filter_map = QueryFilterMap::new();
/// query_filter_map.insert("auction_id".to_string(), Some(Value::Uuid(Some(Box::new(Id::new_v4())))));
/// let filter_value = query_filter_map.get("auction_id");
/// ```
pub struct QueryFilterMap {
    map: HashMap<String, Option<Value>>,
}

impl QueryFilterMap {
    pub fn new() -> Self {
        Self {
            map: HashMap::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        // HashMap.get returns an Option and so we need to "flatten" this to a single Option
        self.map
            .get(key)
            .and_then(|inner_option| inner_option.clone())
    }

    pub fn insert(&mut self, key: String, value: Option<Value>) {
        self.map.insert(key, value);
    }

    /// Insert a uuid filter given in its string form, rejecting malformed ids.
    pub fn insert_uuid_str(&mut self, key: &str, uuid_str: &str) -> Result<(), error::Error> {
        let id = uuid_parse_str(uuid_str)?;
        self.insert(key.to_string(), Some(Value::Uuid(Some(Box::new(id)))));
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.map.values().all(Option::is_none)
    }
}

impl Default for QueryFilterMap {
    fn default() -> Self {
        Self::new()
    }
}

/// `IntoQueryFilterMap` is a trait that provides a method for converting a struct into a `QueryFilterMap`.
/// This is particularly useful for translating data between different layers of the application,
/// such as from web request parameters to database query filters.
pub trait IntoQueryFilterMap {
    fn into_query_filter_map(self) -> QueryFilterMap;
}

/// Seeds a development database with a cooperative, one user per role and an
/// open auction with a couple of bids.
pub async fn seed_database(db: &DatabaseConnection) -> Result<(), error::Error> {
    let now = Utc::now();

    let cooperative = cooperatives::ActiveModel {
        name: Set("Coopérative Anacarde de Bouaké".to_owned()),
        region: Set("Gbêkê".to_owned()),
        description: Set(Some("Raw cashew nut producers of the Gbêkê region".to_owned())),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    let seed_user = |email: &str, first: &str, last: &str, role: roles::Role| users::ActiveModel {
        email: Set(email.to_owned()),
        first_name: Set(first.to_owned()),
        last_name: Set(last.to_owned()),
        display_name: Set(Some(format!("{first} {last}"))),
        phone: Set(None),
        password: Set(generate_hash("password")),
        role: Set(role),
        cooperative_id: Set(None),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
        ..Default::default()
    };

    let _admin = seed_user("admin@cashew.market", "Admin", "User", roles::Role::Admin)
        .insert(db)
        .await?;

    let mut producer = seed_user("awa.kone@cashew.market", "Awa", "Koné", roles::Role::Producer);
    producer.cooperative_id = Set(Some(cooperative.id));
    let producer = producer.insert(db).await?;

    let transformer = seed_user(
        "yao.kouassi@cashew.market",
        "Yao",
        "Kouassi",
        roles::Role::Transformer,
    )
    .insert(db)
    .await?;

    let exporter = seed_user(
        "mariam.traore@cashew.market",
        "Mariam",
        "Traoré",
        roles::Role::Exporter,
    )
    .insert(db)
    .await?;

    let _carrier = seed_user("ibrahim.diallo@cashew.market", "Ibrahim", "Diallo", roles::Role::Carrier)
        .insert(db)
        .await?;

    let _inspector = seed_user(
        "fatou.bamba@cashew.market",
        "Fatou",
        "Bamba",
        roles::Role::QualityInspector,
    )
    .insert(db)
    .await?;

    let auction = auctions::ActiveModel {
        seller_id: Set(producer.id),
        title: Set("20 tonnes RCN, 2026 harvest".to_owned()),
        description: Set(Some("Sun dried, bagged in jute".to_owned())),
        origin: Set(Some("Bouaké".to_owned())),
        quantity_kg: Set(20_000),
        starting_price: Set(8_000_000),
        status: Set(auction_status::AuctionStatus::Open),
        ends_at: Set(None),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    for (bidder, amount) in [(transformer.id, 8_200_000), (exporter.id, 8_450_000)] {
        bids::ActiveModel {
            auction_id: Set(auction.id),
            bidder_id: Set(bidder),
            amount: Set(amount),
            status: Set(bid_status::BidStatus::Pending),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            ..Default::default()
        }
        .insert(db)
        .await?;
    }

    Ok(())
}
