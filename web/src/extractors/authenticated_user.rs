use crate::middleware::auth::unauthorized;
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Response},
};
use domain::user::AuthSession;
use domain::users;

/// The signed-in participant (producer, exporter, inspector, ...) behind a
/// request. Handlers that take it answer 401 on their own, so they do not
/// depend on being mounted behind `require_auth`.
pub(crate) struct AuthenticatedUser(pub users::Model);

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = AuthSession::from_request_parts(parts, state)
            .await
            .map_err(IntoResponse::into_response)?;

        session.user.map(AuthenticatedUser).ok_or_else(unauthorized)
    }
}

#[cfg(test)]
#[cfg(feature = "mock")]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request, http::StatusCode, routing::get, Router};
    use axum_login::{
        tower_sessions::{MemoryStore, SessionManagerLayer},
        AuthManagerLayerBuilder,
    };
    use domain::user::Backend;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;
    use tower::ServiceExt;

    async fn seller_id(AuthenticatedUser(user): AuthenticatedUser) -> String {
        user.id.to_string()
    }

    #[tokio::test]
    async fn handler_outside_the_gate_still_refuses_anonymous_callers() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let auth_layer = AuthManagerLayerBuilder::new(
            Backend::new(&db),
            SessionManagerLayer::new(MemoryStore::default()),
        )
        .build();
        let app = Router::new()
            .route("/seller", get(seller_id))
            .layer(auth_layer);

        let response = app
            .oneshot(Request::builder().uri("/seller").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
