//! Persistence ports for the visit history.

use async_trait::async_trait;
use serde_json::Value as JsonValue;

use super::store::VisitStore;
use crate::error::Result;

/// An asynchronous key-value store holding whole documents.
///
/// This is the only contract the tracker assumes from its persistence layer:
/// there is no transaction, locking or atomic-increment primitive. A `set`
/// replaces the value under `key` as a whole, so readers see either the old
/// or the new document, never a mix.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Returns the value stored under `key`, or `None` if the key is unset.
    async fn get(&self, key: &str) -> Result<Option<JsonValue>>;

    /// Replaces the value stored under `key`.
    async fn set(&self, key: &str, value: JsonValue) -> Result<()>;
}

/// Loads and saves the VisitStore as one document.
///
/// Implementations own the on-disk schema: they must accept every stored
/// shape of visit entry on `load`, and `save` always writes the whole store.
#[async_trait]
pub trait VisitStoreRepository: Send + Sync {
    /// Loads the full store. A missing document is an empty store.
    async fn load(&self) -> Result<VisitStore>;

    /// Persists the full store in a single write.
    async fn save(&self, store: &VisitStore) -> Result<()>;
}
