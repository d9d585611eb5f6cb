use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use visitrail_core::config::TrackerConfig;
use visitrail_core::visit::{HistoryService, KeyValueStore, VisitRecorder};
use visitrail_infrastructure::{
    ConfigService, JsonFileKeyValueStore, KeyValueVisitRepository, VisitrailPaths,
};

pub mod clear;
pub mod detail;
pub mod format;
pub mod history;
pub mod record;
pub mod top;
pub mod watch;

/// Where to find configuration and storage.
#[derive(Debug, Default, Clone)]
pub struct AppOptions {
    pub home: Option<PathBuf>,
    pub store: Option<PathBuf>,
    pub config: Option<PathBuf>,
}

/// Wired-up tracker shared by every command.
pub struct App {
    pub config: TrackerConfig,
    pub recorder: VisitRecorder,
    pub history: HistoryService,
}

impl App {
    pub fn open(options: &AppOptions) -> Result<Self> {
        let paths = VisitrailPaths::new(options.home.as_deref());

        let config_path = match &options.config {
            Some(path) => path.clone(),
            None => paths.config_file()?,
        };
        let config = ConfigService::new(config_path.clone())
            .get_config()
            .with_context(|| format!("Failed to load {}", config_path.display()))?;

        let store_path = match &options.store {
            Some(path) => path.clone(),
            None => paths.store_file()?,
        };
        tracing::debug!("Using store {}", store_path.display());

        let kv: Arc<dyn KeyValueStore> = Arc::new(JsonFileKeyValueStore::new(store_path));
        let repository = Arc::new(KeyValueVisitRepository::from_config(kv, &config));

        Ok(Self {
            recorder: VisitRecorder::new(repository.clone(), &config),
            history: HistoryService::new(repository),
            config,
        })
    }
}
