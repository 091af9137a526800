use crate::controller::ApiResponse;
use crate::extractors::{
    authenticated_user::AuthenticatedUser, compare_api_version::CompareApiVersion,
};
use crate::params::user::{IndexParams, UpdateRoleParams};
use crate::{AppState, Error};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use domain::{user as UserApi, users, Id};
use service::config::ApiVersion;

use log::*;

/// POST register a new User. Open to anyone; admins are created by other admins.
#[utoipa::path(
    post,
    path = "/users",
    params(ApiVersion),
    request_body = users::Model,
    responses(
        (status = 201, description = "Successfully registered a new User", body = users::Model),
        (status = 403, description = "Forbidden"),
        (status = 409, description = "Email is already registered"),
        (status = 422, description = "Unprocessable Entity"),
        (status = 405, description = "Method not allowed")
    )
)]
pub async fn create(
    CompareApiVersion(_v): CompareApiVersion,
    State(app_state): State<AppState>,
    Json(user_model): Json<users::Model>,
) -> Result<impl IntoResponse, Error> {
    debug!("POST Register a new User: {:?}", user_model.email);

    let user = UserApi::register(app_state.db_conn_ref(), user_model).await?;

    debug!("New User: {}", user.id);

    Ok(Json(ApiResponse::new(StatusCode::CREATED.into(), user)))
}

/// GET all Users, optionally filtered by role and cooperative.
#[utoipa::path(
    get,
    path = "/users",
    params(ApiVersion, IndexParams),
    responses(
        (status = 200, description = "Successfully retrieved all Users", body = [users::Model]),
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
    debug!("GET all Users, filter params: {params:?}");

    let users = UserApi::find_by(app_state.db_conn_ref(), params.role, params.cooperative_id).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), users)))
}

/// GET a particular User specified by its id.
#[utoipa::path(
    get,
    path = "/users/{id}",
    params(
        ApiVersion,
        ("id" = Uuid, Path, description = "User id to retrieve")
    ),
    responses(
        (status = 200, description = "Successfully retrieved a User", body = users::Model),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "User not found")
    ),
    security(
        ("cookie_auth" = [])
    )
)]
pub async fn read(
    CompareApiVersion(_v): CompareApiVersion,
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
) -> Result<impl IntoResponse, Error> {
    debug!("GET User by id: {id}");

    let user = UserApi::find_by_id(app_state.db_conn_ref(), id).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), user)))
}

/// PUT update a User's profile.
#[utoipa::path(
    put,
    path = "/users/{id}",
    params(
        ApiVersion,
        ("id" = Uuid, Path, description = "Id of user to update"),
    ),
    request_body = users::Model,
    responses(
        (status = 200, description = "Successfully updated User", body = users::Model),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "User not found")
    ),
    security(
        ("cookie_auth" = [])
    )
)]
pub async fn update(
    CompareApiVersion(_v): CompareApiVersion,
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
    Json(user_model): Json<users::Model>,
) -> Result<impl IntoResponse, Error> {
    debug!("PUT Update User with id: {id}");

    let user = UserApi::update(app_state.db_conn_ref(), id, user_model).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), user)))
}

/// PUT change a User's role.
#[utoipa::path(
    put,
    path = "/users/{id}/role",
    params(
        ApiVersion,
        ("id" = Uuid, Path, description = "Id of user to update"),
    ),
    request_body = UpdateRoleParams,
    responses(
        (status = 200, description = "Successfully changed the User's role", body = users::Model),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "User not found")
    ),
    security(
        ("cookie_auth" = [])
    )
)]
pub async fn update_role(
    CompareApiVersion(_v): CompareApiVersion,
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
    Json(params): Json<UpdateRoleParams>,
) -> Result<impl IntoResponse, Error> {
    info!("PUT Update role of User {id} to {}", params.role);

    let user = UserApi::update_role(app_state.db_conn_ref(), id, params.role).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), user)))
}

/// DELETE a User specified by its id.
#[utoipa::path(
    delete,
    path = "/users/{id}",
    params(
        ApiVersion,
        ("id" = Uuid, Path, description = "User id to delete")
    ),
    responses(
        (status = 200, description = "Successfully deleted the User"),
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
    info!("DELETE User by id: {id}");

    UserApi::delete(app_state.db_conn_ref(), id).await?;

    Ok(Json(ApiResponse::<()>::no_content(StatusCode::NO_CONTENT.into())))
}
