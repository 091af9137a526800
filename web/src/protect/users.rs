use crate::protect::{authorize, Predicate, UserIsSelfOrAdmin};
use crate::{extractors::authenticated_user::AuthenticatedUser, AppState};
use axum::{
    extract::{Path, Request, State},
    middleware::Next,
    response::IntoResponse,
};
use domain::Id;

/// Checks that the authenticated user is the user in the path, or an admin.
pub(crate) async fn self_or_admin(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Id>,
    request: Request,
    next: Next,
) -> impl IntoResponse {
    let checks = vec![Predicate::new(UserIsSelfOrAdmin, vec![id])];
    authorize(&app_state, user, request, next, checks).await
}
