//! Session gate for the marketplace API.
//!
//! Every route except health, login and registration sits behind
//! [`require_auth`]. Missing or expired sessions get a plain 401, never a
//! redirect, so SSE clients can tell them apart from a dropped stream.
use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use domain::user::AuthSession;
use log::*;

pub(crate) const SIGN_IN_REQUIRED: &str = "sign in to use the marketplace";

pub(crate) fn unauthorized() -> Response {
    (StatusCode::UNAUTHORIZED, SIGN_IN_REQUIRED).into_response()
}

pub async fn require_auth(auth_session: AuthSession, request: Request, next: Next) -> Response {
    let Some(user) = auth_session.user else {
        debug!(
            "No session for {} {}",
            request.method(),
            request.uri().path()
        );
        return unauthorized();
    };

    trace!(
        "{} {} by {} ({})",
        request.method(),
        request.uri().path(),
        user.id,
        user.role
    );
    next.run(request).await
}

#[cfg(test)]
#[cfg(feature = "mock")]
mod tests {
    use super::*;
    use crate::extractors::authenticated_user::AuthenticatedUser;
    use axum::{body::Body, middleware::from_fn, routing::get, Router};
    use axum_login::{
        tower_sessions::{Expiry, MemoryStore, SessionManagerLayer},
        AuthManagerLayerBuilder,
    };
    use chrono::Utc;
    use domain::{roles::Role, user::Backend, users, Id};
    use http_body_util::BodyExt;
    use password_auth::generate_hash;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use service::config::Config;
    use std::sync::Arc;
    use time::Duration;
    use tower::ServiceExt;

    async fn whoami(AuthenticatedUser(user): AuthenticatedUser) -> String {
        user.email
    }

    fn producer() -> users::Model {
        users::Model {
            id: Id::new_v4(),
            email: "ibrahim@cashew.market".to_string(),
            first_name: "Ibrahim".to_string(),
            last_name: "Traoré".to_string(),
            display_name: None,
            phone: None,
            password: generate_hash("kernels"),
            role: Role::Producer,
            cooperative_id: None,
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        }
    }

    /// `/login` in front of a gated `/whoami`, on a mock database that
    /// answers every user lookup with `users`.
    fn app(users: Vec<users::Model>) -> Router {
        let mut db = MockDatabase::new(DatabaseBackend::Postgres);
        for user in users {
            db = db.append_query_results([[user]]);
        }
        let db = Arc::new(db.into_connection());
        let app_state = crate::AppState::new(Config::default(), &db);

        let session_layer = SessionManagerLayer::new(MemoryStore::default())
            .with_secure(false)
            .with_expiry(Expiry::OnInactivity(Duration::days(1)));
        let auth_layer = AuthManagerLayerBuilder::new(Backend::new(&db), session_layer).build();

        Router::new()
            .route(
                "/login",
                axum::routing::post(crate::controller::user_session_controller::login),
            )
            .merge(
                Router::new()
                    .route("/whoami", get(whoami))
                    .route_layer(from_fn(require_auth)),
            )
            .layer(auth_layer)
            .with_state(app_state)
    }

    async fn body_text(response: Response) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn request_without_a_session_is_refused_with_401() {
        let request = Request::builder()
            .uri("/whoami")
            .body(Body::empty())
            .unwrap();

        let response = app(vec![]).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_text(response).await, SIGN_IN_REQUIRED);
    }

    #[tokio::test]
    async fn unknown_session_cookie_is_refused_with_401() {
        let request = Request::builder()
            .uri("/whoami")
            .header("cookie", "id=5f0f8b1e-expired")
            .body(Body::empty())
            .unwrap();

        let response = app(vec![]).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn signed_in_producer_reaches_the_handler() {
        let user = producer();
        // login lookup, then the session user lookup for /whoami
        let app = app(vec![user.clone(), user.clone(), user.clone()]);

        let login = Request::builder()
            .uri("/login")
            .method("POST")
            .header("content-type", "application/x-www-form-urlencoded")
            .body(Body::from("email=ibrahim@cashew.market&password=kernels"))
            .unwrap();
        let login_response = app.clone().oneshot(login).await.unwrap();
        let cookie = login_response
            .headers()
            .get("set-cookie")
            .and_then(|c| c.to_str().ok())
            .expect("login sets a session cookie")
            .to_string();

        let request = Request::builder()
            .uri("/whoami")
            .header("cookie", cookie)
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "ibrahim@cashew.market");
    }
}
