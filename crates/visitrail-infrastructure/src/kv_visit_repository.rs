//! VisitStoreRepository backed by any KeyValueStore.

use std::sync::Arc;

use async_trait::async_trait;
use visitrail_core::config::TrackerConfig;
use visitrail_core::error::Result;
use visitrail_core::visit::{KeyValueStore, VisitStore, VisitStoreRepository};

use crate::dto::{decode_visit_store, encode_visit_store};

/// Persists the whole VisitStore as one value under a single key.
///
/// Every `save` replaces the previous value. Reads decode both stored visit
/// shapes; see [`crate::dto`].
#[derive(Clone)]
pub struct KeyValueVisitRepository {
    store: Arc<dyn KeyValueStore>,
    key: String,
}

impl KeyValueVisitRepository {
    pub fn new(store: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    /// Uses the storage key from `config`.
    pub fn from_config(store: Arc<dyn KeyValueStore>, config: &TrackerConfig) -> Self {
        Self::new(store, config.storage_key.clone())
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

#[async_trait]
impl VisitStoreRepository for KeyValueVisitRepository {
    async fn load(&self) -> Result<VisitStore> {
        match self.store.get(&self.key).await? {
            Some(value) => decode_visit_store(value),
            None => Ok(VisitStore::new()),
        }
    }

    async fn save(&self, store: &VisitStore) -> Result<()> {
        let value = encode_visit_store(store)?;
        self.store.set(&self.key, value).await?;
        tracing::debug!("Saved {} domains under {}", store.len(), self.key);
        Ok(())
    }
}
