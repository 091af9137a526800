use crate::{
    controller::health_check_controller, middleware::auth::require_auth, params, protect,
    sse::handler, AppState,
};
use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::{delete, get, post, put},
    Router,
};

use crate::controller::{
    auction_controller, bid_controller, contract_offer_controller, cooperative_controller,
    news_controller, notification_controller, quality_inspection_controller, user_controller,
    user_session_controller,
};

use utoipa::{
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_rapidoc::RapiDoc;

// This is the global definition of our OpenAPI spec. To be a part
// of the rendered spec, a path and schema must be listed here.
#[derive(OpenApi)]
#[openapi(
        info(
            title = "Cashew Market API"
        ),
        paths(
            auction_controller::create,
            auction_controller::index,
            auction_controller::read,
            auction_controller::update,
            auction_controller::close,
            auction_controller::delete,
            bid_controller::create,
            bid_controller::index,
            bid_controller::read,
            bid_controller::accept,
            contract_offer_controller::create,
            contract_offer_controller::index,
            contract_offer_controller::read,
            contract_offer_controller::update,
            contract_offer_controller::update_status,
            cooperative_controller::create,
            cooperative_controller::index,
            cooperative_controller::read,
            cooperative_controller::update,
            cooperative_controller::delete,
            health_check_controller::health_check,
            news_controller::create,
            news_controller::index,
            news_controller::read,
            news_controller::update,
            news_controller::delete,
            notification_controller::index,
            notification_controller::mark_read,
            quality_inspection_controller::create,
            quality_inspection_controller::index,
            quality_inspection_controller::read,
            quality_inspection_controller::update,
            quality_inspection_controller::certify,
            user_controller::create,
            user_controller::index,
            user_controller::read,
            user_controller::update,
            user_controller::update_role,
            user_controller::delete,
            user_session_controller::login,
            user_session_controller::logout,
        ),
        components(
            schemas(
                domain::auctions::Model,
                domain::bids::Model,
                domain::contract_offers::Model,
                domain::cooperatives::Model,
                domain::news::Model,
                domain::notifications::Model,
                domain::quality_inspections::Model,
                domain::users::Model,
                domain::user::Credentials,
                domain::roles::Role,
                domain::auction_status::AuctionStatus,
                domain::bid_status::BidStatus,
                domain::offer_status::OfferStatus,
                params::user::UpdateRoleParams,
            )
        ),
        modifiers(&SecurityAddon),
        tags(
            (name = "cashew_market", description = "Cashew Marketplace API")
        )
    )]
struct ApiDoc;

struct SecurityAddon;

// Defines our cookie session based authentication requirement for gaining access to our
// API endpoints for OpenAPI.
impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "cookie_auth",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                    "id",
                    "Session id value returned from successful login via Set-Cookie header",
                ))),
            )
        }
    }
}

pub fn define_routes(app_state: AppState) -> Router {
    Router::new()
        .merge(auction_routes(app_state.clone()))
        .merge(auction_event_routes(app_state.clone()))
        .merge(bid_routes(app_state.clone()))
        .merge(contract_offer_routes(app_state.clone()))
        .merge(cooperative_routes(app_state.clone()))
        .merge(health_routes())
        .merge(news_routes(app_state.clone()))
        .merge(notification_routes(app_state.clone()))
        .merge(quality_inspection_routes(app_state.clone()))
        .merge(user_registration_routes(app_state.clone()))
        .merge(user_routes(app_state.clone()))
        .merge(user_session_routes())
        .merge(user_session_protected_routes(app_state.clone()))
        // **** FIXME: protect the OpenAPI web UI
        .merge(RapiDoc::with_openapi("/api-docs/openapi2.json", ApiDoc::openapi()).path("/rapidoc"))
}

fn health_routes() -> Router {
    Router::new().route("/health", get(health_check_controller::health_check))
}

pub fn user_session_routes() -> Router {
    Router::new().route("/login", post(user_session_controller::login))
}

pub fn user_session_protected_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/logout", get(user_session_controller::logout))
        .route_layer(from_fn(require_auth))
        .with_state(app_state)
}

// POST /users stays public so new traders can sign up.
fn user_registration_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/users", post(user_controller::create))
        .with_state(app_state)
}

pub fn user_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/users", get(user_controller::index))
        .merge(
            // GET, PUT, DELETE /users/:id
            Router::new()
                .route("/users/:id", get(user_controller::read))
                .route("/users/:id", put(user_controller::update))
                .route("/users/:id", delete(user_controller::delete))
                .route_layer(from_fn_with_state(
                    app_state.clone(),
                    protect::users::self_or_admin,
                )),
        )
        .merge(
            // PUT /users/:id/role
            Router::new()
                .route("/users/:id/role", put(user_controller::update_role))
                .route_layer(from_fn_with_state(
                    app_state.clone(),
                    protect::admin::admin_only,
                )),
        )
        .route_layer(from_fn(require_auth))
        .with_state(app_state)
}

fn cooperative_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/cooperatives", get(cooperative_controller::index))
        .route("/cooperatives/:id", get(cooperative_controller::read))
        .merge(
            // POST /cooperatives, PUT and DELETE /cooperatives/:id
            Router::new()
                .route("/cooperatives", post(cooperative_controller::create))
                .route("/cooperatives/:id", put(cooperative_controller::update))
                .route("/cooperatives/:id", delete(cooperative_controller::delete))
                .route_layer(from_fn_with_state(
                    app_state.clone(),
                    protect::admin::admin_only,
                )),
        )
        .route_layer(from_fn(require_auth))
        .with_state(app_state)
}

fn auction_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/auctions", post(auction_controller::create))
        .route("/auctions", get(auction_controller::index))
        .route("/auctions/:id", get(auction_controller::read))
        .merge(
            // PUT, DELETE /auctions/:id and PUT /auctions/:id/close
            Router::new()
                .route("/auctions/:id", put(auction_controller::update))
                .route("/auctions/:id", delete(auction_controller::delete))
                .route("/auctions/:id/close", put(auction_controller::close))
                .route_layer(from_fn_with_state(
                    app_state.clone(),
                    protect::auctions::seller,
                )),
        )
        .route_layer(from_fn(require_auth))
        .with_state(app_state)
}

fn auction_event_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/auctions/:id/events", get(handler::auction_events))
        .route("/auctions/:id/events", delete(handler::auction_unsubscribe))
        .route("/auctions/:id/presence", get(handler::auction_presence))
        .route_layer(from_fn(require_auth))
        .with_state(app_state)
}

fn bid_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/bids", post(bid_controller::create))
        .route("/bids", get(bid_controller::index))
        .route("/bids/:id", get(bid_controller::read))
        // Only the auction's seller may accept; checked against the bid's auction.
        .route("/bids/:id/accept", put(bid_controller::accept))
        .route_layer(from_fn(require_auth))
        .with_state(app_state)
}

fn contract_offer_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/contract_offers", post(contract_offer_controller::create))
        .route("/contract_offers", get(contract_offer_controller::index))
        .route("/contract_offers/:id", get(contract_offer_controller::read))
        .route("/contract_offers/:id", put(contract_offer_controller::update))
        .route(
            "/contract_offers/:id/status",
            put(contract_offer_controller::update_status),
        )
        .route_layer(from_fn(require_auth))
        .with_state(app_state)
}

fn quality_inspection_routes(app_state: AppState) -> Router {
    Router::new()
        .route(
            "/quality_inspections",
            get(quality_inspection_controller::index),
        )
        .route(
            "/quality_inspections/:id",
            get(quality_inspection_controller::read),
        )
        .merge(
            // POST /quality_inspections, PUT /quality_inspections/:id{,/certify}
            Router::new()
                .route(
                    "/quality_inspections",
                    post(quality_inspection_controller::create),
                )
                .route(
                    "/quality_inspections/:id",
                    put(quality_inspection_controller::update),
                )
                .route(
                    "/quality_inspections/:id/certify",
                    put(quality_inspection_controller::certify),
                )
                .route_layer(from_fn_with_state(
                    app_state.clone(),
                    protect::quality_inspections::inspector,
                )),
        )
        .route_layer(from_fn(require_auth))
        .with_state(app_state)
}

fn news_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/news", get(news_controller::index))
        .route("/news/:id", get(news_controller::read))
        .merge(
            // POST /news, PUT and DELETE /news/:id
            Router::new()
                .route("/news", post(news_controller::create))
                .route("/news/:id", put(news_controller::update))
                .route("/news/:id", delete(news_controller::delete))
                .route_layer(from_fn_with_state(
                    app_state.clone(),
                    protect::admin::admin_only,
                )),
        )
        .route_layer(from_fn(require_auth))
        .with_state(app_state)
}

fn notification_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/notifications", get(notification_controller::index))
        .route(
            "/notifications/:id/read",
            put(notification_controller::mark_read),
        )
        .route("/notifications/events", get(handler::notification_events))
        .route(
            "/notifications/presence",
            get(handler::notification_presence),
        )
        .route_layer(from_fn(require_auth))
        .with_state(app_state)
}

#[cfg(test)]
#[cfg(feature = "mock")]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use axum_login::{
        tower_sessions::{Expiry, MemoryStore, SessionManagerLayer},
        AuthManagerLayerBuilder,
    };
    use domain::user::Backend;
    use http_body_util::BodyExt;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use service::config::Config;
    use std::sync::Arc;
    use time::Duration;
    use tower::ServiceExt;

    fn app() -> Router {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let app_state = AppState::new(Config::default(), &db);

        let session_layer = SessionManagerLayer::new(MemoryStore::default())
            .with_secure(false)
            .with_expiry(Expiry::OnInactivity(Duration::days(1)));
        let auth_layer = AuthManagerLayerBuilder::new(Backend::new(&db), session_layer).build();

        define_routes(app_state).layer(auth_layer)
    }

    #[tokio::test]
    async fn health_is_public() {
        let request = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();

        let response = app().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"healthy");
    }

    #[tokio::test]
    async fn streams_require_a_session() {
        for uri in [
            "/auctions/6b1c5f2e-4d44-4a53-9d1b-2b0f3c1d9e11/events",
            "/notifications/events",
            "/notifications/presence",
        ] {
            let request = Request::builder().uri(uri).body(Body::empty()).unwrap();

            let response = app().oneshot(request).await.unwrap();

            assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{uri}");
        }
    }

    #[tokio::test]
    async fn mutations_require_a_session() {
        let request = Request::builder()
            .method("PUT")
            .uri("/bids/6b1c5f2e-4d44-4a53-9d1b-2b0f3c1d9e11/accept")
            .body(Body::empty())
            .unwrap();

        let response = app().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn openapi_lists_the_bid_routes() {
        let openapi = ApiDoc::openapi();

        assert!(openapi.paths.paths.contains_key("/bids"));
        assert!(openapi.paths.paths.contains_key("/bids/{id}/accept"));
    }
}
