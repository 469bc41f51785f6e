//! The ABAC decision service and its simulated attribute authority.
//!
//! Configuration resolution picks an attribute store (local dataset, remote
//! authority, optionally cached), and the HTTP layer serves the `/eval`
//! decision endpoint over it. The authority binary serves the lookup
//! endpoints the remote store consumes, backed by the same local dataset
//! mechanism.

pub mod config;
pub mod http;
pub mod logging;

pub use config::{build_store, resolve, CliArgs, ConfigError, ResolvedConfig, StoreMode};
pub use http::{authority_router, decision_router, serve, AppState};
pub use logging::{init_logging, parse_log_level, LoggingConfig};
