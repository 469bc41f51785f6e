//! Configuration resolution for the decision service.
//!
//! Settings come from CLI flags and optionally a flat JSON config file,
//! merged as layers: CLI values win, file values fill fields the CLI left
//! unset, built-in defaults fill the rest. Exactly one of `--store` and
//! `--config` must be supplied.
//!
//! The store value's URI scheme picks the mode: no scheme or `file:` means a
//! local dataset; any other scheme means a remote attribute authority, with
//! lookup endpoints derived from the base URL unless given explicitly.
//!
//! One quirk is kept for compatibility with deployed configs: a CLI
//! `--cache=true` is never turned off by the file's `cacheEnabled`, but the
//! file's `cacheExpiryTime` still applies when caching ends up enabled.

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use serde::{Deserialize, Deserializer};
use thiserror::Error;
use url::Url;

use rsabac_store::{
    AttributeStore, CachedAttributeStore, LocalAttributeStore, RemoteAttributeStore, StoreError,
};

/// Default listen port for the decision service.
pub const DEFAULT_DECISION_PORT: u16 = 64431;
/// Default listen port for the simulated attribute authority.
pub const DEFAULT_AUTHORITY_PORT: u16 = 64331;
/// Default cache expiry when caching is enabled without an explicit duration.
pub const DEFAULT_CACHE_EXPIRY: &str = "PT10S";

/// Path suffix appended to a remote store base URL to derive the user lookup
/// endpoint template.
pub const USER_LOOKUP_SUFFIX: &str = "/users/lookup/{user}";
/// Path suffix appended to a remote store base URL to derive the hierarchy
/// lookup endpoint template.
pub const HIERARCHY_LOOKUP_SUFFIX: &str = "/hierarchies/lookup/{name}";

/// CLI flags for the decision service.
#[derive(Parser, Debug, Default, Clone)]
#[command(name = "rsabac-server", version, about = "ABAC decision service")]
pub struct CliArgs {
    /// Path to a flat JSON configuration file.
    #[arg(long, short = 'c', visible_alias = "conf")]
    pub config: Option<String>,

    /// Local dataset path or remote attribute-authority base URL.
    #[arg(long, visible_alias = "attrStore")]
    pub store: Option<String>,

    /// Listen port.
    #[arg(long, short = 'p')]
    pub port: Option<String>,

    /// User lookup endpoint template (with a `{user}` placeholder).
    #[arg(long = "userEndpoint")]
    pub user_endpoint: Option<String>,

    /// Hierarchy lookup endpoint template (with a `{name}` placeholder).
    #[arg(long = "hierarchyEndpoint")]
    pub hierarchy_endpoint: Option<String>,

    /// Cache remote lookups (true/false).
    #[arg(
        long,
        visible_alias = "cacheEnabled",
        num_args = 0..=1,
        default_missing_value = "true"
    )]
    pub cache: Option<bool>,

    /// Cache expiry as an ISO-8601 duration, e.g. PT10S.
    #[arg(long = "cacheExpiry", visible_alias = "cacheExpiryTime")]
    pub cache_expiry: Option<String>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long = "logLevel", default_value = "info")]
    pub log_level: String,

    /// Emit logs as JSON.
    #[arg(long = "logJson")]
    pub log_json: bool,
}

/// The flat JSON config file shape.
///
/// `port` accepts a JSON number or string; `cacheEnabled` accepts a JSON
/// boolean or the string `"true"`/`"false"`.
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(alias = "attrStore")]
    store: Option<String>,
    #[serde(default, deserialize_with = "number_or_string")]
    port: Option<String>,
    #[serde(rename = "userEndpoint")]
    user_endpoint: Option<String>,
    #[serde(rename = "hierarchyEndpoint")]
    hierarchy_endpoint: Option<String>,
    #[serde(rename = "cacheEnabled", default, deserialize_with = "bool_or_string")]
    cache_enabled: Option<bool>,
    #[serde(rename = "cacheExpiryTime")]
    cache_expiry: Option<String>,
}

fn number_or_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u64),
        Text(String),
    }
    Ok(Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
        Raw::Number(n) => n.to_string(),
        Raw::Text(s) => s,
    }))
}

fn bool_or_string<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Flag(bool),
        Text(String),
    }
    Ok(Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
        Raw::Flag(b) => b,
        Raw::Text(s) => s.trim().eq_ignore_ascii_case("true"),
    }))
}

/// Configuration failures. All are fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("one of --store or --config is required")]
    MissingSource,

    #[error("--store and --config are mutually exclusive")]
    ConflictingSources,

    #[error("cannot read config file '{path}': {source}")]
    FileRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("config file '{path}' is malformed: {source}")]
    FileMalformed {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("config file '{path}' has no store value")]
    FileMissingStore { path: String },

    #[error("store URI '{uri}' has bad syntax: {reason}")]
    StoreUriSyntax { uri: String, reason: String },

    #[error("store URI '{uri}' is not absolute")]
    StoreUriNotAbsolute { uri: String },

    #[error("bad port '{value}'")]
    BadPort { value: String },

    #[error("bad cache expiry duration '{value}'")]
    BadDuration { value: String },
}

/// Which kind of attribute store to construct. Exactly one mode is ever
/// active; resolution never yields both a local path and remote endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreMode {
    Local {
        path: String,
    },
    Remote {
        user_endpoint: String,
        hierarchy_endpoint: String,
    },
}

/// The outcome of configuration resolution. Built once at startup, immutable
/// thereafter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    pub mode: StoreMode,
    pub port: u16,
    /// `Some` iff caching is enabled.
    pub cache_expiry: Option<Duration>,
}

/// Merges CLI flags and the optional config file into a [`ResolvedConfig`].
pub fn resolve(args: &CliArgs) -> Result<ResolvedConfig, ConfigError> {
    if args.config.is_some() && args.store.is_some() {
        return Err(ConfigError::ConflictingSources);
    }
    let (file, store) = match &args.config {
        Some(path) => {
            let file = load_config_file(path)?;
            let store = file
                .store
                .clone()
                .ok_or_else(|| ConfigError::FileMissingStore { path: path.clone() })?;
            (file, store)
        }
        None => match &args.store {
            Some(store) => (ConfigFile::default(), store.clone()),
            None => return Err(ConfigError::MissingSource),
        },
    };

    // CLI layer first, file layer fills the gaps.
    let port_text = args.port.clone().or(file.port);
    let user_endpoint = args.user_endpoint.clone().or(file.user_endpoint);
    let hierarchy_endpoint = args.hierarchy_endpoint.clone().or(file.hierarchy_endpoint);
    let cache_enabled = args.cache == Some(true) || file.cache_enabled == Some(true);
    let expiry_text = args.cache_expiry.clone().or(file.cache_expiry);

    let mode = resolve_mode(&store, user_endpoint, hierarchy_endpoint)?;

    let port = match port_text {
        Some(text) => parse_port(&text)?,
        None => DEFAULT_DECISION_PORT,
    };

    let cache_expiry = if cache_enabled {
        let text = expiry_text.unwrap_or_else(|| DEFAULT_CACHE_EXPIRY.to_string());
        let duration =
            parse_iso8601_duration(&text).ok_or(ConfigError::BadDuration { value: text })?;
        Some(duration)
    } else {
        None
    };

    Ok(ResolvedConfig {
        mode,
        port,
        cache_expiry,
    })
}

fn load_config_file(path: &str) -> Result<ConfigFile, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::FileRead {
        path: path.to_string(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| ConfigError::FileMalformed {
        path: path.to_string(),
        source,
    })
}

fn resolve_mode(
    store: &str,
    user_endpoint: Option<String>,
    hierarchy_endpoint: Option<String>,
) -> Result<StoreMode, ConfigError> {
    match scheme_of(store)? {
        None => Ok(StoreMode::Local {
            path: store.to_string(),
        }),
        Some(scheme) if scheme.eq_ignore_ascii_case("file") => {
            let path = store
                .strip_prefix("file://")
                .or_else(|| store.strip_prefix("file:"))
                .unwrap_or(store);
            Ok(StoreMode::Local {
                path: path.to_string(),
            })
        }
        Some(_) => {
            match Url::parse(store) {
                Ok(_) => {}
                Err(url::ParseError::RelativeUrlWithoutBase) => {
                    return Err(ConfigError::StoreUriNotAbsolute {
                        uri: store.to_string(),
                    })
                }
                Err(error) => {
                    return Err(ConfigError::StoreUriSyntax {
                        uri: store.to_string(),
                        reason: error.to_string(),
                    })
                }
            }
            Ok(StoreMode::Remote {
                user_endpoint: user_endpoint
                    .unwrap_or_else(|| format!("{store}{USER_LOOKUP_SUFFIX}")),
                hierarchy_endpoint: hierarchy_endpoint
                    .unwrap_or_else(|| format!("{store}{HIERARCHY_LOOKUP_SUFFIX}")),
            })
        }
    }
}

/// Extracts a URI scheme from the store value, if any.
///
/// A colon before the first slash marks a scheme; a malformed scheme there
/// (e.g. `!broken::@x`) is a syntax error rather than a filename.
fn scheme_of(store: &str) -> Result<Option<&str>, ConfigError> {
    let head = store.split('/').next().unwrap_or(store);
    let Some(colon) = head.find(':') else {
        return Ok(None);
    };
    let candidate = &head[..colon];
    let valid = candidate
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic())
        && candidate
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '.' | '-'));
    if valid {
        Ok(Some(candidate))
    } else {
        Err(ConfigError::StoreUriSyntax {
            uri: store.to_string(),
            reason: "invalid scheme".to_string(),
        })
    }
}

/// Parses a port number, rejecting anything that is not an unsigned integer
/// in range.
pub fn parse_port(text: &str) -> Result<u16, ConfigError> {
    text.trim().parse::<u16>().map_err(|_| ConfigError::BadPort {
        value: text.to_string(),
    })
}

/// Parses the `PnDTnHnMnS` subset of ISO-8601 durations, case-insensitively.
///
/// Components must appear in order and at least one must be present.
pub fn parse_iso8601_duration(text: &str) -> Option<Duration> {
    let rest = text.trim().strip_prefix(['P', 'p'])?;
    let (date_part, time_part) = match rest.split_once(['T', 't']) {
        Some((date, time)) => (date, Some(time)),
        None => (rest, None),
    };

    let mut secs: u64 = 0;
    let mut saw_component = false;

    if !date_part.is_empty() {
        let (value, unit, rest) = split_component(date_part)?;
        if !rest.is_empty() || !matches!(unit, 'D' | 'd') {
            return None;
        }
        secs = secs.checked_add(value.checked_mul(86_400)?)?;
        saw_component = true;
    }

    if let Some(mut time) = time_part {
        if time.is_empty() {
            return None;
        }
        let mut last_rank = 0;
        while !time.is_empty() {
            let (value, unit, rest) = split_component(time)?;
            let (rank, multiplier) = match unit.to_ascii_uppercase() {
                'H' => (1, 3_600),
                'M' => (2, 60),
                'S' => (3, 1),
                _ => return None,
            };
            if rank <= last_rank {
                return None;
            }
            last_rank = rank;
            secs = secs.checked_add(value.checked_mul(multiplier)?)?;
            saw_component = true;
            time = rest;
        }
    }

    if saw_component {
        Some(Duration::from_secs(secs))
    } else {
        None
    }
}

fn split_component(text: &str) -> Option<(u64, char, &str)> {
    let digits_end = text.find(|c: char| !c.is_ascii_digit())?;
    if digits_end == 0 {
        return None;
    }
    let value = text[..digits_end].parse::<u64>().ok()?;
    let unit = text[digits_end..].chars().next()?;
    Some((value, unit, &text[digits_end + unit.len_utf8()..]))
}

/// Constructs the attribute store the resolved configuration calls for.
///
/// Local mode always wins; remote mode is wrapped in the caching decorator
/// iff caching is enabled.
pub fn build_store(config: &ResolvedConfig) -> Result<Arc<dyn AttributeStore>, StoreError> {
    match &config.mode {
        StoreMode::Local { path } => Ok(Arc::new(LocalAttributeStore::from_file(path)?)),
        StoreMode::Remote {
            user_endpoint,
            hierarchy_endpoint,
        } => {
            let remote: Arc<dyn AttributeStore> = Arc::new(RemoteAttributeStore::new(
                user_endpoint.clone(),
                hierarchy_endpoint.clone(),
            )?);
            Ok(match config.cache_expiry {
                Some(expiry) => Arc::new(CachedAttributeStore::new(remote, expiry)),
                None => remote,
            })
        }
    }
}
