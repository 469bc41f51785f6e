//! The decision service binary.
//!
//! ```bash
//! # Local dataset
//! rsabac-server --store data/attrs.json
//!
//! # Remote authority with caching
//! rsabac-server --store http://authority:64331 --cache --cacheExpiry PT30S
//!
//! # Config file
//! rsabac-server --config conf.json
//! ```

use clap::Parser;
use tracing::info;

use rsabac_server::{
    build_store, decision_router, init_logging, parse_log_level, resolve, serve, AppState, CliArgs,
    LoggingConfig, StoreMode,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    init_logging(LoggingConfig {
        json: args.log_json,
        default_level: parse_log_level(&args.log_level),
    });

    let config = resolve(&args)?;
    match &config.mode {
        StoreMode::Local { path } => info!(path, "using local attribute store"),
        StoreMode::Remote { user_endpoint, .. } => {
            info!(
                user_endpoint,
                cached = config.cache_expiry.is_some(),
                "using remote attribute store"
            );
        }
    }

    let store = build_store(&config)?;
    let router = decision_router(AppState::new(store));

    info!(
        version = env!("CARGO_PKG_VERSION"),
        port = config.port,
        "starting decision service"
    );
    serve(router, config.port).await?;
    Ok(())
}
