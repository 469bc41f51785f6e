//! In-process attribute store backed by a JSON dataset file.
//!
//! Dataset shape:
//!
//! ```json
//! {
//!   "users": {
//!     "employee1": ["credentials=ordinary-degree", "employee"]
//!   },
//!   "hierarchies": {
//!     "credentials": ["hnc", "hnd", "ordinary-degree", "honours-degree", "phd"]
//!   }
//! }
//! ```
//!
//! The dataset is loaded once at startup; construction failures are fatal
//! configuration errors.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use async_trait::async_trait;
use dashmap::DashMap;
use serde::Deserialize;

use rsabac_domain::{Attribute, AttributeValueSet, Hierarchy};

use crate::error::{StoreError, StoreResult};
use crate::traits::AttributeStore;

#[derive(Debug, Deserialize)]
struct DatasetFile {
    #[serde(default)]
    users: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    hierarchies: BTreeMap<String, Vec<String>>,
}

/// Attribute store holding all data in process memory.
///
/// Uses `DashMap` for thread-safe shared access; entries can be inserted
/// after construction, which test setups rely on.
#[derive(Debug, Default)]
pub struct LocalAttributeStore {
    users: DashMap<String, AttributeValueSet>,
    hierarchies: DashMap<Attribute, Hierarchy>,
}

impl LocalAttributeStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a store from a JSON dataset file.
    pub fn from_file(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        let display = path.display().to_string();
        let text = std::fs::read_to_string(path).map_err(|source| StoreError::DatasetRead {
            path: display.clone(),
            source,
        })?;
        let dataset: DatasetFile =
            serde_json::from_str(&text).map_err(|source| StoreError::DatasetMalformed {
                path: display.clone(),
                source,
            })?;

        let store = Self::new();
        for (user, values) in dataset.users {
            let mut parsed = Vec::with_capacity(values.len());
            for value in &values {
                let av = rsabac_domain::AttributeValue::parse(value).map_err(|_| {
                    StoreError::DatasetBadAttribute {
                        path: display.clone(),
                        user: user.clone(),
                        value: value.clone(),
                    }
                })?;
                parsed.push(av);
            }
            store
                .users
                .insert(user, AttributeValueSet::from_values(parsed));
        }
        for (name, tiers) in dataset.hierarchies {
            let attribute = Attribute::new(name);
            store
                .hierarchies
                .insert(attribute.clone(), Hierarchy::new(attribute, tiers));
        }
        Ok(store)
    }

    /// Adds or replaces a user's attribute set.
    pub fn insert_user(&self, user: impl Into<String>, attributes: AttributeValueSet) {
        self.users.insert(user.into(), attributes);
    }

    /// Adds or replaces an attribute's hierarchy.
    pub fn insert_hierarchy(&self, hierarchy: Hierarchy) {
        self.hierarchies
            .insert(hierarchy.attribute().clone(), hierarchy);
    }
}

#[async_trait]
impl AttributeStore for LocalAttributeStore {
    async fn attributes(&self, user: &str) -> Option<AttributeValueSet> {
        self.users.get(user).map(|entry| entry.value().clone())
    }

    async fn get_hierarchy(&self, attribute: &Attribute) -> Option<Hierarchy> {
        self.hierarchies
            .get(attribute)
            .map(|entry| entry.value().clone())
    }

    async fn users(&self) -> HashSet<String> {
        self.users.iter().map(|entry| entry.key().clone()).collect()
    }
}
