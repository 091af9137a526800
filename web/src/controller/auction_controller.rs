use crate::controller::ApiResponse;
use crate::extractors::{
    authenticated_user::AuthenticatedUser, compare_api_version::CompareApiVersion,
};
use crate::params::auction::{CloseParams, IndexParams};
use crate::{AppState, Error};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use domain::{auction as AuctionApi, auctions, Id, IntoQueryFilterMap};
use service::config::ApiVersion;

use log::*;

/// POST create a new Auction. The caller becomes its seller.
#[utoipa::path(
    post,
    path = "/auctions",
    params(ApiVersion),
    request_body = auctions::Model,
    responses(
        (status = 201, description = "Successfully created a new Auction", body = auctions::Model),
        (status = 401, description = "Unauthorized"),
        (status = 422, description = "Unprocessable Entity"),
        (status = 405, description = "Method not allowed")
    ),
    security(
        ("cookie_auth" = [])
    )
)]
pub async fn create(
    CompareApiVersion(_v): CompareApiVersion,
    AuthenticatedUser(user): AuthenticatedUser,
    State(app_state): State<AppState>,
    Json(auction_model): Json<auctions::Model>,
) -> Result<impl IntoResponse, Error> {
    debug!("POST Create a new Auction from: {auction_model:?}");

    let auction = AuctionApi::create(app_state.db_conn_ref(), user.id, auction_model).await?;

    info!("New Auction {} by seller {}", auction.id, user.id);

    Ok(Json(ApiResponse::new(StatusCode::CREATED.into(), auction)))
}

/// GET all Auctions, optionally filtered by status or seller.
#[utoipa::path(
    get,
    path = "/auctions",
    params(ApiVersion, IndexParams),
    responses(
        (status = 200, description = "Successfully retrieved all Auctions", body = [auctions::Model]),
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
    debug!("GET all Auctions, filter params: {params:?}");

    let status = params.status.clone();
    let auctions =
        AuctionApi::find_by(app_state.db_conn_ref(), status, params.into_query_filter_map())
            .await?;

    debug!("Found {} Auctions", auctions.len());

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), auctions)))
}

/// GET a particular Auction specified by its id.
#[utoipa::path(
    get,
    path = "/auctions/{id}",
    params(
        ApiVersion,
        ("id" = Uuid, Path, description = "Auction id to retrieve")
    ),
    responses(
        (status = 200, description = "Successfully retrieved an Auction", body = auctions::Model),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Auction not found")
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
    debug!("GET Auction by id: {id}");

    let auction = AuctionApi::find_by_id(app_state.db_conn_ref(), id).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), auction)))
}

/// PUT update the terms of an open Auction.
#[utoipa::path(
    put,
    path = "/auctions/{id}",
    params(
        ApiVersion,
        ("id" = Uuid, Path, description = "Id of auction to update"),
    ),
    request_body = auctions::Model,
    responses(
        (status = 200, description = "Successfully updated the Auction", body = auctions::Model),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Auction not found"),
        (status = 409, description = "Auction is no longer open")
    ),
    security(
        ("cookie_auth" = [])
    )
)]
pub async fn update(
    CompareApiVersion(_v): CompareApiVersion,
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
    Json(auction_model): Json<auctions::Model>,
) -> Result<impl IntoResponse, Error> {
    debug!("PUT Update Auction with id: {id}");

    let auction = AuctionApi::update(
        app_state.db_conn_ref(),
        app_state.event_publisher.as_ref(),
        id,
        auction_model,
    )
    .await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), auction)))
}

/// PUT close an Auction, or cancel it with `?cancel=true`.
#[utoipa::path(
    put,
    path = "/auctions/{id}/close",
    params(
        ApiVersion,
        ("id" = Uuid, Path, description = "Id of auction to close"),
        CloseParams
    ),
    responses(
        (status = 200, description = "Successfully closed the Auction", body = auctions::Model),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Auction not found"),
        (status = 409, description = "Auction is no longer open")
    ),
    security(
        ("cookie_auth" = [])
    )
)]
pub async fn close(
    CompareApiVersion(_v): CompareApiVersion,
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
    Query(params): Query<CloseParams>,
) -> Result<impl IntoResponse, Error> {
    info!("PUT Close Auction {id} as {}", params.status());

    let auction = AuctionApi::close(
        app_state.db_conn_ref(),
        app_state.event_publisher.as_ref(),
        id,
        params.status(),
    )
    .await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), auction)))
}

/// DELETE an Auction specified by its id.
#[utoipa::path(
    delete,
    path = "/auctions/{id}",
    params(
        ApiVersion,
        ("id" = Uuid, Path, description = "Auction id to delete")
    ),
    responses(
        (status = 200, description = "Successfully deleted the Auction"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("cookie_auth" = [])
    )
)]
pub async fn delete(
    CompareApiVersion(_v): CompareApiVersion,
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
) -> Result<impl IntoResponse, Error> {
    info!("DELETE Auction by id: {id}");

    AuctionApi::delete_by_id(app_state.db_conn_ref(), id).await?;

    Ok(Json(ApiResponse::<()>::no_content(StatusCode::NO_CONTENT.into())))
}
