use crate::controller::ApiResponse;
use crate::extractors::{
    authenticated_user::AuthenticatedUser, compare_api_version::CompareApiVersion,
};
use crate::params::bid::IndexParams;
use crate::{AppState, Error};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use domain::{bid as BidApi, bids, Id, IntoQueryFilterMap};
use serde_json::json;
use service::config::ApiVersion;

use log::*;

/// POST place a Bid on an open Auction.
#[utoipa::path(
    post,
    path = "/bids",
    params(ApiVersion),
    request_body = bids::Model,
    responses(
        (status = 201, description = "Successfully placed a Bid", body = bids::Model),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Sellers cannot bid on their own auction"),
        (status = 404, description = "Auction not found"),
        (status = 409, description = "Auction is no longer open"),
        (status = 422, description = "Amount is too low")
    ),
    security(
        ("cookie_auth" = [])
    )
)]
pub async fn create(
    CompareApiVersion(_v): CompareApiVersion,
    AuthenticatedUser(user): AuthenticatedUser,
    State(app_state): State<AppState>,
    Json(bid_model): Json<bids::Model>,
) -> Result<impl IntoResponse, Error> {
    debug!("POST Place a Bid from: {bid_model:?}");

    let bid = BidApi::place(
        app_state.db_conn_ref(),
        app_state.event_publisher.as_ref(),
        user.id,
        bid_model,
    )
    .await?;

    Ok(Json(ApiResponse::new(StatusCode::CREATED.into(), bid)))
}

/// GET the Bids of an Auction.
#[utoipa::path(
    get,
    path = "/bids",
    params(ApiVersion, IndexParams),
    responses(
        (status = 200, description = "Successfully retrieved the Bids", body = [bids::Model]),
        (status = 401, description = "Unauthorized"),
        (status = 405, description = "Method not allowed")
    ),
    security(
        ("cookie_auth" = [])
    )
)]
pub async fn index(
    CompareApiVersion(_v): CompareApiVersion,
    AuthenticatedUser(_user): AuthenticatedUser,
    State(app_state): State<AppState>,
    Query(params): Query<IndexParams>,
) -> Result<impl IntoResponse, Error> {
    debug!("GET Bids, filter params: {params:?}");

    let bids = BidApi::find_by(app_state.db_conn_ref(), params.into_query_filter_map()).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), bids)))
}

/// GET a particular Bid specified by its id.
#[utoipa::path(
    get,
    path = "/bids/{id}",
    params(
        ApiVersion,
        ("id" = Uuid, Path, description = "Bid id to retrieve")
    ),
    responses(
        (status = 200, description = "Successfully retrieved a Bid", body = bids::Model),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Bid not found")
    ),
    security(
        ("cookie_auth" = [])
    )
)]
pub async fn read(
    CompareApiVersion(_v): CompareApiVersion,
    AuthenticatedUser(_user): AuthenticatedUser,
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
) -> Result<impl IntoResponse, Error> {
    debug!("GET Bid by id: {id}");

    let bid = BidApi::find_by_id(app_state.db_conn_ref(), id).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), bid)))
}

/// PUT accept a Bid. Every other pending bid on the auction is rejected and
/// the auction is closed.
#[utoipa::path(
    put,
    path = "/bids/{id}/accept",
    params(
        ApiVersion,
        ("id" = Uuid, Path, description = "Id of the bid to accept"),
    ),
    responses(
        (status = 200, description = "Successfully accepted the Bid"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Only the seller may accept a bid"),
        (status = 404, description = "Bid not found"),
        (status = 409, description = "Auction is closed or the bid is not pending")
    ),
    security(
        ("cookie_auth" = [])
    )
)]
pub async fn accept(
    CompareApiVersion(_v): CompareApiVersion,
    AuthenticatedUser(user): AuthenticatedUser,
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
) -> Result<impl IntoResponse, Error> {
    info!("PUT Accept Bid {id} by {}", user.id);

    let acceptance = BidApi::accept(
        app_state.db_conn_ref(),
        app_state.event_publisher.as_ref(),
        user.id,
        id,
    )
    .await?;

    Ok(Json(ApiResponse::new(
        StatusCode::OK.into(),
        json!({
            "accepted": acceptance.accepted,
            "rejected": acceptance.rejected,
            "auction": acceptance.auction,
        }),
    )))
}
