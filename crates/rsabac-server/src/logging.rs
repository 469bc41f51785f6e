//! Logging initialization.
//!
//! Structured logging via `tracing`, filtered by `RUST_LOG` when set and the
//! configured default level otherwise. JSON output is for production; the
//! text format is for development.

use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Logging setup options.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub json: bool,
    pub default_level: Level,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            json: false,
            default_level: Level::INFO,
        }
    }
}

/// Installs the global subscriber. Calling it again is a no-op; the first
/// subscriber wins.
pub fn init_logging(config: LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.default_level.to_string()));

    if config.json {
        let subscriber = tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_target(true));
        let _ = tracing::subscriber::set_global_default(subscriber);
    } else {
        let subscriber = tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true));
        let _ = tracing::subscriber::set_global_default(subscriber);
    }
}

/// Maps a level name to a `tracing::Level`, defaulting to INFO.
pub fn parse_log_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}
