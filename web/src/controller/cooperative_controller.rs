use crate::controller::ApiResponse;
use crate::extractors::{
    authenticated_user::AuthenticatedUser, compare_api_version::CompareApiVersion,
};
use crate::{AppState, Error};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use domain::{cooperative as CooperativeApi, cooperatives, Id};
use service::config::ApiVersion;

use log::*;

/// GET all Cooperatives
#[utoipa::path(
    get,
    path = "/cooperatives",
    params(ApiVersion),
    responses(
        (status = 200, description = "Successfully retrieved all Cooperatives", body = [cooperatives::Model]),
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
) -> Result<impl IntoResponse, Error> {
    debug!("GET all Cooperatives");

    let cooperatives = CooperativeApi::find_all(app_state.db_conn_ref()).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), cooperatives)))
}

/// GET a particular Cooperative specified by its id.
#[utoipa::path(
    get,
    path = "/cooperatives/{id}",
    params(
        ApiVersion,
        ("id" = Uuid, Path, description = "Cooperative id to retrieve")
    ),
    responses(
        (status = 200, description = "Successfully retrieved a Cooperative", body = cooperatives::Model),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Cooperative not found")
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
    debug!("GET Cooperative by id: {id}");

    let cooperative = CooperativeApi::find_by_id(app_state.db_conn_ref(), id).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), cooperative)))
}

/// POST create a new Cooperative
#[utoipa::path(
    post,
    path = "/cooperatives",
    params(ApiVersion),
    request_body = cooperatives::Model,
    responses(
        (status = 201, description = "Successfully created a new Cooperative", body = cooperatives::Model),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 422, description = "Unprocessable Entity")
    ),
    security(
        ("cookie_auth" = [])
    )
)]
pub async fn create(
    CompareApiVersion(_v): CompareApiVersion,
    State(app_state): State<AppState>,
    Json(cooperative_model): Json<cooperatives::Model>,
) -> Result<impl IntoResponse, Error> {
    debug!("POST Create a new Cooperative from: {cooperative_model:?}");

    let cooperative = CooperativeApi::create(app_state.db_conn_ref(), cooperative_model).await?;

    Ok(Json(ApiResponse::new(StatusCode::CREATED.into(), cooperative)))
}

/// PUT update a Cooperative
#[utoipa::path(
    put,
    path = "/cooperatives/{id}",
    params(
        ApiVersion,
        ("id" = Uuid, Path, description = "Id of cooperative to update"),
    ),
    request_body = cooperatives::Model,
    responses(
        (status = 200, description = "Successfully updated the Cooperative", body = cooperatives::Model),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Cooperative not found")
    ),
    security(
        ("cookie_auth" = [])
    )
)]
pub async fn update(
    CompareApiVersion(_v): CompareApiVersion,
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
    Json(cooperative_model): Json<cooperatives::Model>,
) -> Result<impl IntoResponse, Error> {
    debug!("PUT Update Cooperative with id: {id}");

    let cooperative = CooperativeApi::update(app_state.db_conn_ref(), id, cooperative_model).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), cooperative)))
}

/// DELETE a Cooperative specified by its id.
#[utoipa::path(
    delete,
    path = "/cooperatives/{id}",
    params(
        ApiVersion,
        ("id" = Uuid, Path, description = "Cooperative id to delete")
    ),
    responses(
        (status = 200, description = "Successfully deleted the Cooperative"),
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
    info!("DELETE Cooperative by id: {id}");

    CooperativeApi::delete_by_id(app_state.db_conn_ref(), id).await?;

    Ok(Json(ApiResponse::<()>::no_content(StatusCode::NO_CONTENT.into())))
}
