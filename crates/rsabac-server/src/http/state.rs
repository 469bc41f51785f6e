//! Shared application state for the HTTP handlers.

use std::sync::Arc;

use rsabac_store::AttributeStore;

/// State shared across requests: the configured attribute store.
#[derive(Clone)]
pub struct AppState {
    store: Arc<dyn AttributeStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn AttributeStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn AttributeStore> {
        &self.store
    }
}
