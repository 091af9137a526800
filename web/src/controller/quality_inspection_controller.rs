use crate::controller::ApiResponse;
use crate::extractors::{
    authenticated_user::AuthenticatedUser, compare_api_version::CompareApiVersion,
};
use crate::params::quality_inspection::IndexParams;
use crate::{AppState, Error};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use domain::{quality_inspection as QualityInspectionApi, quality_inspections, Id};
use service::config::ApiVersion;

use log::*;

/// POST record a Quality Inspection of an auctioned lot.
#[utoipa::path(
    post,
    path = "/quality_inspections",
    params(ApiVersion),
    request_body = quality_inspections::Model,
    responses(
        (status = 201, description = "Successfully recorded a Quality Inspection", body = quality_inspections::Model),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Auction not found"),
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
    Json(inspection_model): Json<quality_inspections::Model>,
) -> Result<impl IntoResponse, Error> {
    debug!("POST Create a new Quality Inspection from: {inspection_model:?}");

    let inspection =
        QualityInspectionApi::create(app_state.db_conn_ref(), user.id, inspection_model).await?;

    Ok(Json(ApiResponse::new(StatusCode::CREATED.into(), inspection)))
}

/// GET the Quality Inspections of an Auction.
#[utoipa::path(
    get,
    path = "/quality_inspections",
    params(ApiVersion, IndexParams),
    responses(
        (status = 200, description = "Successfully retrieved Quality Inspections", body = [quality_inspections::Model]),
        (status = 401, description = "Unauthorized")
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
    debug!("GET Quality Inspections for auction {}", params.auction_id);

    let inspections =
        QualityInspectionApi::find_by_auction(app_state.db_conn_ref(), params.auction_id).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), inspections)))
}

/// GET a particular Quality Inspection specified by its id.
#[utoipa::path(
    get,
    path = "/quality_inspections/{id}",
    params(
        ApiVersion,
        ("id" = Uuid, Path, description = "Quality Inspection id to retrieve")
    ),
    responses(
        (status = 200, description = "Successfully retrieved a Quality Inspection", body = quality_inspections::Model),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Quality Inspection not found")
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
    debug!("GET Quality Inspection by id: {id}");

    let inspection = QualityInspectionApi::find_by_id(app_state.db_conn_ref(), id).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), inspection)))
}

/// PUT update an uncertified Quality Inspection.
#[utoipa::path(
    put,
    path = "/quality_inspections/{id}",
    params(
        ApiVersion,
        ("id" = Uuid, Path, description = "Id of quality inspection to update"),
    ),
    request_body = quality_inspections::Model,
    responses(
        (status = 200, description = "Successfully updated the Quality Inspection", body = quality_inspections::Model),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 409, description = "Inspection is already certified"),
        (status = 422, description = "Unprocessable Entity")
    ),
    security(
        ("cookie_auth" = [])
    )
)]
pub async fn update(
    CompareApiVersion(_v): CompareApiVersion,
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
    Json(inspection_model): Json<quality_inspections::Model>,
) -> Result<impl IntoResponse, Error> {
    debug!("PUT Update Quality Inspection with id: {id}");

    let inspection =
        QualityInspectionApi::update(app_state.db_conn_ref(), id, inspection_model).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), inspection)))
}

/// PUT certify a Quality Inspection. The auction seller is notified.
#[utoipa::path(
    put,
    path = "/quality_inspections/{id}/certify",
    params(
        ApiVersion,
        ("id" = Uuid, Path, description = "Id of quality inspection to certify"),
    ),
    responses(
        (status = 200, description = "Successfully certified the Quality Inspection", body = quality_inspections::Model),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 409, description = "Inspection is already certified")
    ),
    security(
        ("cookie_auth" = [])
    )
)]
pub async fn certify(
    CompareApiVersion(_v): CompareApiVersion,
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
) -> Result<impl IntoResponse, Error> {
    info!("PUT Certify Quality Inspection {id}");

    let inspection = QualityInspectionApi::certify(
        app_state.db_conn_ref(),
        app_state.event_publisher.as_ref(),
        id,
    )
    .await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), inspection)))
}
