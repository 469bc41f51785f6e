//! The simulated attribute authority binary.
//!
//! Serves the lookup endpoints a remote-mode decision service consumes,
//! backed by a local JSON dataset:
//!
//! ```bash
//! rsabac-authority --store data/attrs.json --port 64331
//! ```

use std::sync::Arc;

use clap::Parser;
use tracing::info;

use rsabac_server::config::{parse_port, DEFAULT_AUTHORITY_PORT};
use rsabac_server::{
    authority_router, init_logging, parse_log_level, serve, AppState, LoggingConfig,
};
use rsabac_store::LocalAttributeStore;

/// Simulated attribute authority.
#[derive(Parser, Debug)]
#[command(name = "rsabac-authority", version, about)]
struct Args {
    /// Path to the JSON dataset to serve.
    #[arg(long, visible_alias = "attrStore")]
    store: String,

    /// Listen port.
    #[arg(long, short = 'p')]
    port: Option<String>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long = "logLevel", default_value = "info")]
    log_level: String,

    /// Emit logs as JSON.
    #[arg(long = "logJson")]
    log_json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    init_logging(LoggingConfig {
        json: args.log_json,
        default_level: parse_log_level(&args.log_level),
    });

    let port = match &args.port {
        Some(text) => parse_port(text)?,
        None => DEFAULT_AUTHORITY_PORT,
    };

    let store = Arc::new(LocalAttributeStore::from_file(&args.store)?);
    let router = authority_router(AppState::new(store));

    info!(
        version = env!("CARGO_PKG_VERSION"),
        dataset = args.store,
        port,
        "starting attribute authority"
    );
    serve(router, port).await?;
    Ok(())
}
