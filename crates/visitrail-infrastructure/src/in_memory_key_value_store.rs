//! In-memory KeyValueStore implementation.

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use visitrail_core::error::Result;
use visitrail_core::visit::KeyValueStore;

/// Process-local key-value store.
///
/// Used for ephemeral tracking sessions and tests. Clones share the same
/// underlying map.
#[derive(Clone, Default)]
pub struct InMemoryKeyValueStore {
    entries: Arc<RwLock<HashMap<String, JsonValue>>>,
}

impl InMemoryKeyValueStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with `key = value`.
    pub fn with_entry(key: impl Into<String>, value: JsonValue) -> Self {
        let mut entries = HashMap::new();
        entries.insert(key.into(), value);
        Self {
            entries: Arc::new(RwLock::new(entries)),
        }
    }
}

#[async_trait]
impl KeyValueStore for InMemoryKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<JsonValue>> {
        let entries = self.entries.read().await;
        Ok(entries.get(key).cloned())
    }

    async fn set(&self, key: &str, value: JsonValue) -> Result<()> {
        let mut entries = self.entries.write().await;
        entries.insert(key.to_string(), value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_get_and_set() {
        let store = InMemoryKeyValueStore::new();
        assert!(store.get("k").await.unwrap().is_none());

        store.set("k", json!(1)).await.unwrap();
        store.set("k", json!(2)).await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some(json!(2)));
    }

    #[tokio::test]
    async fn test_clones_share_entries() {
        let store = InMemoryKeyValueStore::with_entry("k", json!("a"));
        let clone = store.clone();
        clone.set("k", json!("b")).await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some(json!("b")));
    }
}
