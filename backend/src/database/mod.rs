//! Module for store initialization.
//!
//! This module is responsible for constructing the document store the API
//! runs against and exposing it as a shared [`Database`] handle.

use std::sync::Arc;

use adapters::{InMemoryStore, StoreAdapter};
use tracing::info;

/// Shared handle to whichever store implementation is in use.
pub type Database = Arc<dyn StoreAdapter>;

pub fn init_store() -> Database {
    info!("Using in-memory document store; data is lost on restart");
    Arc::new(InMemoryStore::new())
}
