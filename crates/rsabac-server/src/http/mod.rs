//! HTTP layer: routers for the decision service and the simulated attribute
//! authority, plus the serving loop with graceful shutdown.

pub mod authority;
pub mod eval;
pub mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing::info;

pub use state::AppState;

/// Router for the decision service.
pub fn decision_router(state: AppState) -> Router {
    Router::new()
        .route("/eval", post(eval::eval))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

/// Router for the simulated attribute authority.
pub fn authority_router(state: AppState) -> Router {
    Router::new()
        .route("/users/lookup/:user", get(authority::lookup_user))
        .route("/hierarchies/lookup/:name", get(authority::lookup_hierarchy))
        .route("/users", get(authority::list_users))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

async fn health() -> &'static str {
    "OK"
}

/// Serves a router until ctrl-c or SIGTERM.
pub async fn serve(router: Router, port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("shutdown complete");
    Ok(())
}

/// Waits for ctrl-c or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("received Ctrl+C, shutting down");
        }
        _ = terminate => {
            info!("received SIGTERM, shutting down");
        }
    }
}
