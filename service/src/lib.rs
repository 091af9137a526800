use config::Config;
use events::EventPublisher;
use log::info;
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use std::sync::Arc;
use tokio::time::Duration;

pub mod config;
pub mod logging;

pub async fn init_database(config: &Config) -> Result<DatabaseConnection, DbErr> {
    info!(
        "Database pool config: max_connections={}, min_connections={}, \
         connect_timeout={}s, acquire_timeout={}s, idle_timeout={}s, max_lifetime={}s",
        config.db_max_connections,
        config.db_min_connections,
        config.db_connect_timeout_secs,
        config.db_acquire_timeout_secs,
        config.db_idle_timeout_secs,
        config.db_max_lifetime_secs,
    );

    let mut opt = ConnectOptions::new::<&str>(config.database_url());
    opt.max_connections(config.db_max_connections)
        .min_connections(config.db_min_connections)
        .connect_timeout(Duration::from_secs(config.db_connect_timeout_secs))
        .acquire_timeout(Duration::from_secs(config.db_acquire_timeout_secs))
        .idle_timeout(Duration::from_secs(config.db_idle_timeout_secs))
        .max_lifetime(Duration::from_secs(config.db_max_lifetime_secs))
        .sqlx_logging(true)
        .sqlx_logging_level(log::LevelFilter::Info)
        .set_schema_search_path("cashew_market"); // Setting default PostgreSQL schema

    let db = Database::connect(opt).await?;

    Ok(db)
}

/// Per-topic limits for the SSE manager, taken from the configuration.
pub fn sse_limits(config: &Config) -> sse::Limits {
    sse::Limits {
        max_connections_per_topic: config.sse_max_connections_per_topic,
    }
}

// Service-level state containing only infrastructure concerns
// Needs to implement Clone to be able to be passed into Router as State
#[derive(Clone)]
pub struct AppState {
    pub database_connection: Arc<DatabaseConnection>,
    pub config: Config,
    pub sse_manager: Arc<sse::Manager>,
    pub event_publisher: Arc<EventPublisher>,
}

impl AppState {
    /// State with a single-instance SSE manager and no event handlers. Use
    /// the `with_*` methods to wire in the real ones.
    pub fn new(app_config: Config, db: &Arc<DatabaseConnection>) -> Self {
        let limits = sse_limits(&app_config);
        Self {
            database_connection: Arc::clone(db),
            config: app_config,
            sse_manager: Arc::new(sse::Manager::local(limits)),
            event_publisher: Arc::new(EventPublisher::default()),
        }
    }

    pub fn with_sse_manager(mut self, sse_manager: Arc<sse::Manager>) -> Self {
        self.sse_manager = sse_manager;
        self
    }

    pub fn with_event_publisher(mut self, event_publisher: EventPublisher) -> Self {
        self.event_publisher = Arc::new(event_publisher);
        self
    }

    pub fn db_conn_ref(&self) -> &DatabaseConnection {
        self.database_connection.as_ref()
    }

    pub fn set_db_conn(&mut self, db: DatabaseConnection) {
        self.database_connection = Arc::new(db);
    }
}
