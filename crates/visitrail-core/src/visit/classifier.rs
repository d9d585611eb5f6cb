//! URL classification: which navigations are tracked, and under which domain.

use serde::Serialize;
use url::Url;

use crate::config::TrackerConfig;
use crate::error::{Result, VisitrailError};

/// Why a navigation was not recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Not parseable as a URL, or the URL has no hostname.
    InvalidUrl,
    /// Browser-internal, extension or `about:` page.
    ExcludedScheme,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::InvalidUrl => write!(f, "invalid URL"),
            SkipReason::ExcludedScheme => write!(f, "excluded scheme"),
        }
    }
}

/// Extracts the lowercase hostname from `url`.
///
/// Fails for strings that do not parse and for URLs without a host
/// (`file:///…`, `mailto:…`, `about:blank`).
pub fn extract_domain(url: &str) -> Result<String> {
    let parsed = Url::parse(url)?;
    match parsed.host_str() {
        Some(host) if !host.is_empty() => Ok(host.to_ascii_lowercase()),
        _ => Err(VisitrailError::InvalidUrl(format!("URL has no host: {}", url))),
    }
}

/// Decides whether a URL is tracked and derives its domain.
#[derive(Debug, Clone)]
pub struct UrlClassifier {
    excluded_prefixes: Vec<String>,
}

impl UrlClassifier {
    pub fn new<I, S>(excluded_prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            excluded_prefixes: excluded_prefixes.into_iter().map(Into::into).collect(),
        }
    }

    pub fn from_config(config: &TrackerConfig) -> Self {
        Self::new(config.excluded_prefixes.iter().cloned())
    }

    /// True when `url` starts with one of the excluded prefixes (ASCII case-insensitive).
    pub fn is_excluded(&self, url: &str) -> bool {
        self.excluded_prefixes.iter().any(|prefix| {
            url.get(..prefix.len())
                .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
        })
    }

    /// Returns the domain to record `url` under, or the reason to skip it.
    pub fn classify(&self, url: &str) -> std::result::Result<String, SkipReason> {
        if self.is_excluded(url) {
            return Err(SkipReason::ExcludedScheme);
        }
        extract_domain(url).map_err(|_| SkipReason::InvalidUrl)
    }
}

impl Default for UrlClassifier {
    fn default() -> Self {
        Self::from_config(&TrackerConfig::default())
    }
}
