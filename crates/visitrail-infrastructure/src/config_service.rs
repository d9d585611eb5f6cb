//! Configuration service implementation.
//!
//! Loads the [`TrackerConfig`] from `config.toml` and caches it.

use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use visitrail_core::config::TrackerConfig;
use visitrail_core::error::{Result, VisitrailError};

/// Configuration service that loads and caches the tracker configuration.
///
/// A missing file yields the defaults; a present but invalid file is an error.
#[derive(Debug, Clone)]
pub struct ConfigService {
    path: PathBuf,
    /// Cached configuration loaded from file.
    config: Arc<RwLock<Option<TrackerConfig>>>,
}

impl ConfigService {
    /// Creates a service for the file at `path`. Nothing is read until first access.
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            config: Arc::new(RwLock::new(None)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Gets the configuration, loading from file if not cached.
    pub fn get_config(&self) -> Result<TrackerConfig> {
        {
            let cached = self.config.read().unwrap_or_else(|e| e.into_inner());
            if let Some(config) = cached.as_ref() {
                return Ok(config.clone());
            }
        }

        let loaded = Self::load_config(&self.path)?;

        let mut cached = self.config.write().unwrap_or_else(|e| e.into_inner());
        *cached = Some(loaded.clone());

        Ok(loaded)
    }

    /// Invalidates the cache, forcing a reload on next access.
    pub fn invalidate_cache(&self) {
        let mut cached = self.config.write().unwrap_or_else(|e| e.into_inner());
        *cached = None;
    }

    fn load_config(path: &Path) -> Result<TrackerConfig> {
        if !path.exists() {
            tracing::debug!("No config file at {}, using defaults", path.display());
            return Ok(TrackerConfig::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            VisitrailError::io(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let config: TrackerConfig = toml::from_str(&content)?;
        config.validate()?;

        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_yields_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let service = ConfigService::new(temp_dir.path().join("config.toml"));

        assert_eq!(service.get_config().unwrap(), TrackerConfig::default());
        assert!(!service.path().exists());
    }

    #[test]
    fn test_loads_and_caches() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "top_sites_limit = 3\n").unwrap();

        let service = ConfigService::new(path.clone());
        assert_eq!(service.get_config().unwrap().top_sites_limit, 3);

        std::fs::write(&path, "top_sites_limit = 7\n").unwrap();
        assert_eq!(service.get_config().unwrap().top_sites_limit, 3);

        service.invalidate_cache();
        assert_eq!(service.get_config().unwrap().top_sites_limit, 7);
    }

    #[test]
    fn test_invalid_file_is_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");

        std::fs::write(&path, "top_sites_limit = \"ten\"\n").unwrap();
        let err = ConfigService::new(path.clone()).get_config().unwrap_err();
        assert!(matches!(err, VisitrailError::Serialization { .. }));

        std::fs::write(&path, "storage_key = \"\"\n").unwrap();
        assert!(matches!(
            ConfigService::new(path).get_config(),
            Err(VisitrailError::Config(_))
        ));
    }
}
