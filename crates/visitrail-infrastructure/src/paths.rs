//! Unified path management for visitrail files.
//!
//! Configuration and the visit store are resolved through one type so that
//! every entry point agrees on where data lives.

use std::path::{Path, PathBuf};

const APP_NAME: &str = "visitrail";

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Home directory could not be determined.
    HomeDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::HomeDirNotFound => write!(f, "Cannot find home directory"),
        }
    }
}

impl std::error::Error for PathError {}

/// Path layout for visitrail.
///
/// # Directory Structure
///
/// ```text
/// ~/.config/visitrail/         # Config directory
/// └── config.toml              # Tracker configuration
///
/// ~/.local/share/visitrail/    # Data directory
/// └── storage.json             # Key-value document holding the visit history
/// ```
///
/// With a base override both directories collapse into the given directory.
#[derive(Debug, Clone)]
pub struct VisitrailPaths {
    base_override: Option<PathBuf>,
}

impl VisitrailPaths {
    /// Creates a path resolver. `base` replaces the platform directories.
    pub fn new(base: Option<&Path>) -> Self {
        Self {
            base_override: base.map(Path::to_path_buf),
        }
    }

    /// Returns the configuration directory (e.g., `~/.config/visitrail/`).
    pub fn config_dir(&self) -> Result<PathBuf, PathError> {
        if let Some(base) = &self.base_override {
            return Ok(base.clone());
        }
        dirs::config_dir()
            .map(|dir| dir.join(APP_NAME))
            .ok_or(PathError::HomeDirNotFound)
    }

    /// Returns the data directory (e.g., `~/.local/share/visitrail/`).
    pub fn data_dir(&self) -> Result<PathBuf, PathError> {
        if let Some(base) = &self.base_override {
            return Ok(base.clone());
        }
        dirs::data_dir()
            .map(|dir| dir.join(APP_NAME))
            .ok_or(PathError::HomeDirNotFound)
    }

    /// Returns the path to `config.toml`.
    pub fn config_file(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join("config.toml"))
    }

    /// Returns the path to the key-value storage document.
    pub fn store_file(&self) -> Result<PathBuf, PathError> {
        Ok(self.data_dir()?.join("storage.json"))
    }
}

impl Default for VisitrailPaths {
    fn default() -> Self {
        Self::new(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_override() {
        let paths = VisitrailPaths::new(Some(Path::new("/tmp/visitrail-test")));
        assert_eq!(
            paths.config_file().unwrap(),
            PathBuf::from("/tmp/visitrail-test/config.toml")
        );
        assert_eq!(
            paths.store_file().unwrap(),
            PathBuf::from("/tmp/visitrail-test/storage.json")
        );
    }

    #[test]
    fn test_default_paths_are_namespaced() {
        let paths = VisitrailPaths::default();
        if let Ok(dir) = paths.config_dir() {
            assert!(dir.ends_with("visitrail"));
        }
        if let Ok(file) = paths.store_file() {
            assert!(file.ends_with("visitrail/storage.json"));
        }
    }
}
