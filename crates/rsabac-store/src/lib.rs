//! Attribute store implementations for the rsabac decision service.
//!
//! The [`AttributeStore`] trait abstracts where attribute data comes from:
//!
//! - [`LocalAttributeStore`] reads an in-process dataset loaded from a JSON
//!   file at startup.
//! - [`RemoteAttributeStore`] delegates every lookup to an external attribute
//!   authority over HTTP.
//! - [`CachedAttributeStore`] decorates any other store with time-bounded
//!   memoization of user and hierarchy lookups.
//!
//! The caching decorator is built on [`cache::TtlCache`], a generic
//! get-or-load primitive with expire-after-write semantics and at most one
//! concurrent load per key.

pub mod cache;
pub mod cached;
pub mod error;
pub mod local;
pub mod remote;
pub mod traits;
pub mod wire;

pub use cache::TtlCache;
pub use cached::CachedAttributeStore;
pub use error::{StoreError, StoreResult};
pub use local::LocalAttributeStore;
pub use remote::RemoteAttributeStore;
pub use traits::{AttributeStore, HierarchyLookup};
pub use wire::{HierarchyDoc, UserAttributesDoc, UsersDoc};
