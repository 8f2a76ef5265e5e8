//! Shared application state for all routes. Handlers hold no state between requests.

use crate::session::{MemorySessionStore, SessionStore};
use crate::store::{MemoryStore, Store};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub sessions: Arc<dyn SessionStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, sessions: Arc<dyn SessionStore>) -> Self {
        AppState { store, sessions }
    }

    /// Fresh in-memory store and session map.
    pub fn in_memory() -> Self {
        AppState::new(Arc::new(MemoryStore::new()), Arc::new(MemorySessionStore::new()))
    }
}
