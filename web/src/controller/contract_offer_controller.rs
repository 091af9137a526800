use crate::controller::ApiResponse;
use crate::extractors::{
    authenticated_user::AuthenticatedUser, compare_api_version::CompareApiVersion,
};
use crate::params::contract_offer::{IndexParams, StatusParams};
use crate::{AppState, Error};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use domain::error::Error as DomainError;
use domain::{contract_offer as ContractOfferApi, contract_offers, Id, IntoQueryFilterMap};
use service::config::ApiVersion;

use log::*;

/// POST send a new Contract Offer to another user.
#[utoipa::path(
    post,
    path = "/contract_offers",
    params(ApiVersion),
    request_body = contract_offers::Model,
    responses(
        (status = 201, description = "Successfully sent a Contract Offer", body = contract_offers::Model),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Recipient not found"),
        (status = 422, description = "Unprocessable Entity")
    ),
    security(
        ("cookie_auth" = [])
    )
)]
pub async fn create(
    CompareApiVersion(_v): CompareApiVersion,
    AuthenticatedUser(user): AuthenticatedUser,
    State(app_state): State<AppState>,
    Json(offer_model): Json<contract_offers::Model>,
) -> Result<impl IntoResponse, Error> {
    debug!("POST Create a new Contract Offer from: {offer_model:?}");

    let offer = ContractOfferApi::create(
        app_state.db_conn_ref(),
        app_state.event_publisher.as_ref(),
        user.id,
        offer_model,
    )
    .await?;

    Ok(Json(ApiResponse::new(StatusCode::CREATED.into(), offer)))
}

/// GET Contract Offers. Without a party filter this returns the caller's own
/// offers; only admins may look at offers between other users.
#[utoipa::path(
    get,
    path = "/contract_offers",
    params(ApiVersion, IndexParams),
    responses(
        (status = 200, description = "Successfully retrieved Contract Offers", body = [contract_offers::Model]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("cookie_auth" = [])
    )
)]
pub async fn index(
    CompareApiVersion(_v): CompareApiVersion,
    AuthenticatedUser(user): AuthenticatedUser,
    State(app_state): State<AppState>,
    Query(params): Query<IndexParams>,
) -> Result<impl IntoResponse, Error> {
    debug!("GET Contract Offers, filter params: {params:?}");

    let offers = if !params.has_party_filter() {
        ContractOfferApi::find_for_participant(app_state.db_conn_ref(), user.id, params.status)
            .await?
    } else if params.involves(user.id) || user.is_admin() {
        let status = params.status.clone();
        ContractOfferApi::find_by(app_state.db_conn_ref(), status, params.into_query_filter_map())
            .await?
    } else {
        return Err(DomainError::forbidden("offers between other users are private").into());
    };

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), offers)))
}

/// GET a particular Contract Offer specified by its id.
#[utoipa::path(
    get,
    path = "/contract_offers/{id}",
    params(
        ApiVersion,
        ("id" = Uuid, Path, description = "Contract Offer id to retrieve")
    ),
    responses(
        (status = 200, description = "Successfully retrieved a Contract Offer", body = contract_offers::Model),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Contract Offer not found")
    ),
    security(
        ("cookie_auth" = [])
    )
)]
pub async fn read(
    CompareApiVersion(_v): CompareApiVersion,
    AuthenticatedUser(user): AuthenticatedUser,
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
) -> Result<impl IntoResponse, Error> {
    debug!("GET Contract Offer by id: {id}");

    let offer = ContractOfferApi::find_by_id(app_state.db_conn_ref(), id).await?;
    if offer.sender_id != user.id && offer.recipient_id != user.id && !user.is_admin() {
        return Err(DomainError::forbidden("offers between other users are private").into());
    }

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), offer)))
}

/// PUT update the terms of a pending Contract Offer.
#[utoipa::path(
    put,
    path = "/contract_offers/{id}",
    params(
        ApiVersion,
        ("id" = Uuid, Path, description = "Id of contract offer to update"),
    ),
    request_body = contract_offers::Model,
    responses(
        (status = 200, description = "Successfully updated the Contract Offer", body = contract_offers::Model),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Only the sender may edit an offer"),
        (status = 409, description = "Offer is no longer pending")
    ),
    security(
        ("cookie_auth" = [])
    )
)]
pub async fn update(
    CompareApiVersion(_v): CompareApiVersion,
    AuthenticatedUser(user): AuthenticatedUser,
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
    Json(offer_model): Json<contract_offers::Model>,
) -> Result<impl IntoResponse, Error> {
    debug!("PUT Update Contract Offer with id: {id}");

    let offer =
        ContractOfferApi::update_terms(app_state.db_conn_ref(), user.id, id, offer_model).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), offer)))
}

/// PUT accept, reject or cancel a Contract Offer.
#[utoipa::path(
    put,
    path = "/contract_offers/{id}/status",
    params(
        ApiVersion,
        ("id" = Uuid, Path, description = "Id of contract offer to update"),
        ("value" = domain::offer_status::OfferStatus, Query, description = "accepted, rejected or cancelled")
    ),
    responses(
        (status = 200, description = "Successfully changed the offer's status", body = contract_offers::Model),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Caller may not make this change"),
        (status = 409, description = "Offer is no longer pending"),
        (status = 422, description = "Unprocessable Entity")
    ),
    security(
        ("cookie_auth" = [])
    )
)]
pub async fn update_status(
    CompareApiVersion(_v): CompareApiVersion,
    AuthenticatedUser(user): AuthenticatedUser,
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
    Query(params): Query<StatusParams>,
) -> Result<impl IntoResponse, Error> {
    info!("PUT Contract Offer {id} status to {} by {}", params.value, user.id);

    let offer = ContractOfferApi::update_status(
        app_state.db_conn_ref(),
        app_state.event_publisher.as_ref(),
        user.id,
        id,
        params.value,
    )
    .await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), offer)))
}
