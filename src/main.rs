use events::EventPublisher;
use log::*;
use service::{config::Config, logging::Logger, AppState};
use sse::bus::{self, RedisBus};
use sse::presence::RedisPresenceStore;
use sse::{Manager, Relay, SseDomainEventHandler};
use std::sync::Arc;

#[tokio::main]
async fn main() {
    let config = Config::new();
    Logger::init_logger(&config as &Config);

    info!(
        "Starting cashew market backend [{}] in {} mode",
        config.api_version(),
        config.runtime_env
    );

    let db = match service::init_database(&config).await {
        Ok(db) => Arc::new(db),
        Err(e) => {
            error!("Failed to establish database connection: {e}");
            std::process::exit(1);
        }
    };

    let sse_manager = init_sse_manager(&config).await;

    // Domain events fan out to live streams through a single handler.
    let event_publisher = EventPublisher::new().with_handler(Arc::new(
        SseDomainEventHandler::new(Arc::clone(&sse_manager)),
    ));

    let app_state = AppState::new(config, &db)
        .with_sse_manager(sse_manager)
        .with_event_publisher(event_publisher);

    if let Err(e) = web::init_server(app_state).await {
        error!("Server stopped with error: {e}");
        std::process::exit(1);
    }
}

/// Shared Redis presence and relay when `REDIS_URL` is set and reachable,
/// otherwise a single-instance manager with in-memory presence.
async fn init_sse_manager(config: &Config) -> Arc<Manager> {
    let limits = service::sse_limits(config);

    let Some(redis_url) = config.redis_url() else {
        info!("No Redis configured, SSE runs in single-instance mode");
        return Arc::new(Manager::local(limits));
    };

    match bus::connect(redis_url).await {
        Ok(connection) => {
            let manager = Arc::new(Manager::new(
                Arc::new(RedisPresenceStore::new(connection.manager.clone())),
                Some(Arc::new(RedisBus::new(connection.manager))),
                limits,
            ));
            Relay::new(Arc::clone(&manager)).spawn(connection.client);
            manager
        }
        Err(e) => {
            error!("Failed to connect to Redis, SSE falls back to single-instance mode: {e}");
            Arc::new(Manager::local(limits))
        }
    }
}
