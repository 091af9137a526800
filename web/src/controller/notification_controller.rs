use crate::controller::ApiResponse;
use crate::extractors::{
    authenticated_user::AuthenticatedUser, compare_api_version::CompareApiVersion,
};
use crate::{AppState, Error};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use domain::{notification as NotificationApi, notifications, Id};
use service::config::ApiVersion;

use log::*;

/// GET the caller's Notifications, newest first.
#[utoipa::path(
    get,
    path = "/notifications",
    params(ApiVersion),
    responses(
        (status = 200, description = "Successfully retrieved the caller's Notifications", body = [notifications::Model]),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("cookie_auth" = [])
    )
)]
pub async fn index(
    CompareApiVersion(_v): CompareApiVersion,
    AuthenticatedUser(user): AuthenticatedUser,
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, Error> {
    debug!("GET Notifications for user {}", user.id);

    let notifications = NotificationApi::find_by_user(app_state.db_conn_ref(), user.id).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), notifications)))
}

/// PUT mark one of the caller's Notifications as read.
#[utoipa::path(
    put,
    path = "/notifications/{id}/read",
    params(
        ApiVersion,
        ("id" = Uuid, Path, description = "Id of the notification to mark as read"),
    ),
    responses(
        (status = 200, description = "Successfully marked the Notification as read", body = notifications::Model),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Notification belongs to another user"),
        (status = 404, description = "Notification not found")
    ),
    security(
        ("cookie_auth" = [])
    )
)]
pub async fn mark_read(
    CompareApiVersion(_v): CompareApiVersion,
    AuthenticatedUser(user): AuthenticatedUser,
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
) -> Result<impl IntoResponse, Error> {
    debug!("PUT Mark Notification {id} as read");

    let notification = NotificationApi::mark_read(app_state.db_conn_ref(), user.id, id).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), notification)))
}
