//! Terminal logging shared by the server, the seeder and the migrator.
use crate::config::Config;
use log::{LevelFilter, SetLoggerError};
use simplelog::{ColorChoice, ConfigBuilder, TermLogger, TerminalMode};

/// Dependencies that log on every query, request or Redis command. Their
/// output is only let through at trace level.
const NOISY_DEPENDENCIES: &[&str] = &["sqlx", "sea_orm", "tower", "tracing", "hyper", "axum", "redis"];

pub struct Logger {}

impl Logger {
    /// Install the global terminal logger at the configured level. A second
    /// call is reported on stderr and otherwise ignored.
    pub fn init_logger(config: &Config) {
        if let Err(e) = Self::try_init(config.log_level_filter) {
            eprintln!("Logger was already initialized: {e}");
        }
    }

    pub fn try_init(level: LevelFilter) -> Result<(), SetLoggerError> {
        TermLogger::init(
            level,
            Self::log_config(level),
            TerminalMode::Mixed,
            ColorChoice::Auto,
        )
    }

    fn log_config(level: LevelFilter) -> simplelog::Config {
        let mut builder = ConfigBuilder::new();
        builder.set_time_format_rfc3339();

        for module in Self::ignored_modules(level) {
            builder.add_filter_ignore_str(module);
        }

        builder.build()
    }

    fn ignored_modules(level: LevelFilter) -> &'static [&'static str] {
        if level == LevelFilter::Trace {
            &[]
        } else {
            NOISY_DEPENDENCIES
        }
    }
}
