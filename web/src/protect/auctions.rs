use crate::protect::{authorize, Predicate, UserIsAuctionSeller};
use crate::{extractors::authenticated_user::AuthenticatedUser, AppState};
use axum::{
    extract::{Path, Request, State},
    middleware::Next,
    response::IntoResponse,
};
use domain::Id;

/// Checks that the authenticated user is the seller of the auction in the path
/// (or an admin). Guards update, close and delete.
pub(crate) async fn seller(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Id>,
    request: Request,
    next: Next,
) -> impl IntoResponse {
    let checks = vec![Predicate::new(UserIsAuctionSeller, vec![id])];
    authorize(&app_state, user, request, next, checks).await
}
