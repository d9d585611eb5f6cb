pub mod config_service;
pub mod dto;
pub mod in_memory_key_value_store;
pub mod json_file_key_value_store;
pub mod kv_visit_repository;
pub mod paths;
pub mod storage;

pub use crate::config_service::ConfigService;
pub use crate::in_memory_key_value_store::InMemoryKeyValueStore;
pub use crate::json_file_key_value_store::JsonFileKeyValueStore;
pub use crate::kv_visit_repository::KeyValueVisitRepository;
pub use crate::paths::{PathError, VisitrailPaths};
