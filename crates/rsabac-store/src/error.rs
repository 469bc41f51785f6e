//! Store construction errors.
//!
//! Lookup non-findings are not errors anywhere in this crate: an unknown user
//! or absent hierarchy is `None`, and remote transport failures are logged
//! and reported as `None` for that request. Errors here cover only store
//! construction, which is startup-fatal.

use thiserror::Error;

/// Errors raised while building an attribute store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The local dataset file could not be read.
    #[error("cannot read attribute store dataset '{path}': {source}")]
    DatasetRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The local dataset file is not valid JSON or has the wrong shape.
    #[error("attribute store dataset '{path}' is malformed: {source}")]
    DatasetMalformed {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// A user entry in the dataset holds an unparsable attribute string.
    #[error("bad attribute '{value}' for user '{user}' in dataset '{path}'")]
    DatasetBadAttribute {
        path: String,
        user: String,
        value: String,
    },

    /// A remote endpoint template is not a usable absolute URL.
    #[error("bad endpoint URL '{url}': {reason}")]
    BadEndpoint { url: String, reason: String },
}

/// Result type for store construction.
pub type StoreResult<T> = Result<T, StoreError>;
