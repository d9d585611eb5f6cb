//! JsonFileStorage-based KeyValueStore implementation

use crate::storage::{JsonFileStorage, JsonFileStorageError};
use async_trait::async_trait;
use serde_json::Value as JsonValue;
use std::path::PathBuf;
use std::sync::Arc;
use visitrail_core::error::{Result, VisitrailError};
use visitrail_core::visit::KeyValueStore;

/// Key-value store persisted as one JSON document.
///
/// File layout:
/// ```text
/// storage.json
/// {
///   "visitHistory": { ... },
///   "<other key>": ...
/// }
/// ```
///
/// `set` runs under an exclusive file lock and rewrites the document via
/// tmp file + rename; `get` reads without locking.
#[derive(Clone)]
pub struct JsonFileKeyValueStore {
    storage: Arc<JsonFileStorage>,
}

impl JsonFileKeyValueStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            storage: Arc::new(JsonFileStorage::new(path)),
        }
    }

    pub fn path(&self) -> &std::path::Path {
        self.storage.path()
    }
}

fn storage_error(context: &str, e: JsonFileStorageError) -> VisitrailError {
    match e {
        JsonFileStorageError::IoError(io) => {
            VisitrailError::io(format!("{}: {} (kind: {:?})", context, io, io.kind()))
        }
        JsonFileStorageError::JsonError(json) => VisitrailError::Serialization {
            format: "JSON".to_string(),
            message: format!("{}: {}", context, json),
        },
        other => VisitrailError::data_access(format!("{}: {}", context, other)),
    }
}

fn join_error(e: tokio::task::JoinError) -> VisitrailError {
    VisitrailError::internal(format!("Failed to join task: {}", e))
}

#[async_trait]
impl KeyValueStore for JsonFileKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<JsonValue>> {
        let storage = self.storage.clone();
        let document = tokio::task::spawn_blocking(move || storage.load())
            .await
            .map_err(join_error)?
            .map_err(|e| storage_error("Failed to read storage file", e))?;

        match document {
            None => Ok(None),
            Some(JsonValue::Object(mut entries)) => Ok(entries.remove(key)),
            Some(_) => Err(VisitrailError::data_access(format!(
                "Storage file {} is not a JSON object",
                self.storage.path().display()
            ))),
        }
    }

    async fn set(&self, key: &str, value: JsonValue) -> Result<()> {
        let storage = self.storage.clone();
        let key = key.to_string();
        tokio::task::spawn_blocking(move || {
            storage.update(JsonValue::Object(Default::default()), |document| {
                let entries = document.as_object_mut().ok_or_else(|| {
                    JsonFileStorageError::InvalidDocument(
                        "storage root is not a JSON object".to_string(),
                    )
                })?;
                entries.insert(key, value);
                Ok(())
            })
        })
        .await
        .map_err(join_error)?
        .map_err(|e| storage_error("Failed to write storage file", e))
    }
}
