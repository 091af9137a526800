use crate::protect::{authorize, Predicate, UserHasRole};
use crate::{extractors::authenticated_user::AuthenticatedUser, AppState};
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::IntoResponse,
};
use domain::roles::Role;

/// Recording and certifying inspections is reserved to inspectors and admins.
pub(crate) async fn inspector(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    request: Request,
    next: Next,
) -> impl IntoResponse {
    let checks = vec![Predicate::new(
        UserHasRole(&[Role::QualityInspector, Role::Admin]),
        vec![],
    )];
    authorize(&app_state, user, request, next, checks).await
}
