//! Tracker configuration.
//!
//! Loaded from `config.toml` by the infrastructure layer. Every field has a
//! default, so an empty or missing file yields the stock behaviour.

use serde::{Deserialize, Serialize};

use crate::error::{Result, VisitrailError};

/// Storage key the whole visit history lives under.
pub const DEFAULT_STORAGE_KEY: &str = "visitHistory";

/// Maximum number of visit events retained per domain.
pub const DEFAULT_MAX_VISITS: usize = 100;

/// Maximum number of distinct URLs retained per domain.
pub const DEFAULT_MAX_URLS: usize = 50;

/// Size of the ranked top-sites view.
pub const DEFAULT_TOP_SITES_LIMIT: usize = 10;

/// URL prefixes that are never tracked (browser-internal and extension pages).
pub const DEFAULT_EXCLUDED_PREFIXES: &[&str] =
    &["chrome://", "chrome-extension://", "about:", "edge://"];

/// Per-domain list caps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetentionLimits {
    pub max_visits: usize,
    pub max_urls: usize,
}

impl Default for RetentionLimits {
    fn default() -> Self {
        Self {
            max_visits: DEFAULT_MAX_VISITS,
            max_urls: DEFAULT_MAX_URLS,
        }
    }
}

/// Root configuration for the tracker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Key under which the VisitStore is persisted.
    pub storage_key: String,
    /// URL prefixes that are skipped by the recorder.
    pub excluded_prefixes: Vec<String>,
    pub retention: RetentionLimits,
    /// Number of entries shown in the top-sites view.
    pub top_sites_limit: usize,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            excluded_prefixes: DEFAULT_EXCLUDED_PREFIXES
                .iter()
                .map(|p| p.to_string())
                .collect(),
            retention: RetentionLimits::default(),
            top_sites_limit: DEFAULT_TOP_SITES_LIMIT,
        }
    }
}

impl TrackerConfig {
    /// Rejects settings the tracker cannot operate with.
    pub fn validate(&self) -> Result<()> {
        if self.storage_key.trim().is_empty() {
            return Err(VisitrailError::config("storage_key must not be empty"));
        }
        if self.retention.max_visits == 0 {
            return Err(VisitrailError::config("retention.max_visits must be at least 1"));
        }
        if self.retention.max_urls == 0 {
            return Err(VisitrailError::config("retention.max_urls must be at least 1"));
        }
        if self.excluded_prefixes.iter().any(|p| p.trim().is_empty()) {
            return Err(VisitrailError::config("excluded_prefixes must not contain blanks"));
        }
        Ok(())
    }
}
