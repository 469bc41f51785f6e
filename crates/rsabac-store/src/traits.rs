//! The `AttributeStore` trait definition.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;

use rsabac_domain::{Attribute, AttributeValueSet, Hierarchy, HierarchySource};

/// Source of user attributes and attribute hierarchies.
///
/// Implementations must be thread-safe; lookups run concurrently from the
/// request-serving layer. Non-findings are `None`, never errors: an unknown
/// user and a failed remote lookup both resolve to "no data", which the
/// protocol layer turns into a denial.
#[async_trait]
pub trait AttributeStore: Send + Sync {
    /// The user's attribute set, or `None` when the user is unknown.
    async fn attributes(&self, user: &str) -> Option<AttributeValueSet>;

    /// The ordered tier hierarchy for an attribute, or `None` when no
    /// hierarchy is defined.
    async fn get_hierarchy(&self, attribute: &Attribute) -> Option<Hierarchy>;

    /// True iff a non-empty hierarchy exists for the attribute. Both an
    /// absent and a present-but-empty hierarchy answer false.
    async fn has_hierarchy(&self, attribute: &Attribute) -> bool {
        self.get_hierarchy(attribute)
            .await
            .is_some_and(|h| !h.is_empty())
    }

    /// The identifiers of all known users.
    async fn users(&self) -> HashSet<String>;
}

/// Adapts an [`AttributeStore`] to the evaluator's [`HierarchySource`] seam.
#[derive(Clone)]
pub struct HierarchyLookup {
    store: Arc<dyn AttributeStore>,
}

impl HierarchyLookup {
    pub fn new(store: Arc<dyn AttributeStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl HierarchySource for HierarchyLookup {
    async fn hierarchy_for(&self, attribute: &Attribute) -> Option<Hierarchy> {
        self.store.get_hierarchy(attribute).await
    }
}
