//! HTTP surface of the marketplace: session authentication, the REST
//! controllers and the two SSE endpoints.
use axum::http::{
    header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
    HeaderName, HeaderValue, Method,
};
use axum_login::{
    tower_sessions::{Expiry, SessionManagerLayer},
    AuthManagerLayerBuilder,
};
use domain::user::Backend;
use log::*;
use service::config::ApiVersion;
use std::error::Error as StdError;
use time::Duration;
use tower_http::cors::CorsLayer;
use tower_sessions_sqlx_store::PostgresStore;

pub use service::AppState;

mod controller;
mod error;
mod extractors;
mod middleware;
mod params;
mod protect;
mod router;
mod sse;

pub use error::{Error, Result};

const SESSION_SCHEMA: &str = "cashew_market";
const SESSION_TABLE: &str = "authorized_sessions";

pub async fn init_server(app_state: AppState) -> core::result::Result<(), Box<dyn StdError>> {
    // Sessions live in the same Postgres database, in their own table.
    let session_store = PostgresStore::new(
        app_state
            .db_conn_ref()
            .get_postgres_connection_pool()
            .to_owned(),
    )
    .with_schema_name(SESSION_SCHEMA)?
    .with_table_name(SESSION_TABLE)?;

    session_store.migrate().await?;

    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(app_state.config.is_production())
        .with_expiry(Expiry::OnInactivity(Duration::seconds(
            app_state.config.backend_session_expiry_seconds as i64,
        )));

    let backend = Backend::new(&app_state.database_connection);
    let auth_layer = AuthManagerLayerBuilder::new(backend, session_layer).build();

    let cors_layer = CorsLayer::new()
        .allow_methods([Method::DELETE, Method::GET, Method::POST, Method::PUT])
        .allow_credentials(true)
        .allow_headers([
            AUTHORIZATION,
            ACCEPT,
            CONTENT_TYPE,
            HeaderName::from_static(ApiVersion::field_name()),
        ])
        .expose_headers([HeaderName::from_static(ApiVersion::field_name())])
        .allow_origin(allowed_origins(&app_state.config.allowed_origins));

    let interface = app_state
        .config
        .interface
        .clone()
        .unwrap_or_else(|| "127.0.0.1".to_string());
    let server_url = format!("{interface}:{}", app_state.config.port);
    let listener = tokio::net::TcpListener::bind(&server_url).await?;

    info!("Server starting... listening for connections on http://{server_url}");

    axum::serve(
        listener,
        router::define_routes(app_state)
            .layer(auth_layer)
            .layer(cors_layer),
    )
    .await?;

    Ok(())
}

fn allowed_origins(origins: &[String]) -> Vec<HeaderValue> {
    origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Ignoring invalid CORS origin {origin:?}: {e}");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_origins_are_skipped() {
        let origins = vec![
            "http://localhost:3000".to_string(),
            "bad\norigin".to_string(),
        ];

        assert_eq!(
            allowed_origins(&origins),
            vec![HeaderValue::from_static("http://localhost:3000")]
        );
    }
}
