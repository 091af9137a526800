use crate::controller::ApiResponse;
use crate::extractors::{
    authenticated_user::AuthenticatedUser, compare_api_version::CompareApiVersion,
};
use crate::{AppState, Error};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use domain::{news, news_article as NewsApi, Id};
use service::config::ApiVersion;

use log::*;

/// POST publish a News article
#[utoipa::path(
    post,
    path = "/news",
    params(ApiVersion),
    request_body = news::Model,
    responses(
        (status = 201, description = "Successfully published a News article", body = news::Model),
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
    AuthenticatedUser(user): AuthenticatedUser,
    State(app_state): State<AppState>,
    Json(article_model): Json<news::Model>,
) -> Result<impl IntoResponse, Error> {
    debug!("POST Create a News article titled: {}", article_model.title);

    let article = NewsApi::create(app_state.db_conn_ref(), user.id, article_model).await?;

    Ok(Json(ApiResponse::new(StatusCode::CREATED.into(), article)))
}

#[utoipa::path(
    get,
    path = "/news",
    params(ApiVersion),
    responses(
        (status = 200, description = "Successfully retrieved all News articles", body = [news::Model]),
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
) -> Result<impl IntoResponse, Error> {
    let articles = NewsApi::find_all(app_state.db_conn_ref()).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), articles)))
}

#[utoipa::path(
    get,
    path = "/news/{id}",
    params(
        ApiVersion,
        ("id" = Uuid, Path, description = "News article id to retrieve")
    ),
    responses(
        (status = 200, description = "Successfully retrieved a News article", body = news::Model),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "News article not found")
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
    debug!("GET News article by id: {id}");

    let article = NewsApi::find_by_id(app_state.db_conn_ref(), id).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), article)))
}

#[utoipa::path(
    put,
    path = "/news/{id}",
    params(
        ApiVersion,
        ("id" = Uuid, Path, description = "Id of news article to update"),
    ),
    request_body = news::Model,
    responses(
        (status = 200, description = "Successfully updated the News article", body = news::Model),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "News article not found")
    ),
    security(
        ("cookie_auth" = [])
    )
)]
pub async fn update(
    CompareApiVersion(_v): CompareApiVersion,
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
    Json(article_model): Json<news::Model>,
) -> Result<impl IntoResponse, Error> {
    debug!("PUT Update News article with id: {id}");

    let article = NewsApi::update(app_state.db_conn_ref(), id, article_model).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), article)))
}

#[utoipa::path(
    delete,
    path = "/news/{id}",
    params(
        ApiVersion,
        ("id" = Uuid, Path, description = "News article id to delete")
    ),
    responses(
        (status = 200, description = "Successfully deleted the News article"),
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
    info!("DELETE News article by id: {id}");

    NewsApi::delete_by_id(app_state.db_conn_ref(), id).await?;

    Ok(Json(ApiResponse::<()>::no_content(StatusCode::NO_CONTENT.into())))
}
