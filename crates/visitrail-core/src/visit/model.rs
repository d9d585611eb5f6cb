//! Visit history domain models.
//!
//! A [`DomainRecord`] aggregates every observed navigation to one hostname.
//! Its `visits` list holds [`VisitEntry`] values, which come in two shapes:
//! entries written before URL capture existed only carry a timestamp, newer
//! ones carry the full URL as well. Both shapes live side by side in one store.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::RetentionLimits;

/// Builds the synthesized link for a domain (`https://{domain}`).
pub fn bare_domain_url(domain: &str) -> String {
    format!("https://{}", domain)
}

/// One recorded navigation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum VisitEntry {
    /// Timestamp-only entry from before URLs were captured.
    Legacy { timestamp: DateTime<Utc> },
    /// Timestamp plus the exact URL that was observed.
    Full {
        timestamp: DateTime<Utc>,
        url: String,
    },
}

impl VisitEntry {
    pub fn legacy(timestamp: DateTime<Utc>) -> Self {
        Self::Legacy { timestamp }
    }

    pub fn full(timestamp: DateTime<Utc>, url: impl Into<String>) -> Self {
        Self::Full {
            timestamp,
            url: url.into(),
        }
    }

    /// When the navigation was observed.
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::Legacy { timestamp } | Self::Full { timestamp, .. } => *timestamp,
        }
    }

    /// The entry's own URL, if it has a non-blank one.
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Full { url, .. } if !url.trim().is_empty() => Some(url.as_str()),
            _ => None,
        }
    }

    pub fn is_legacy(&self) -> bool {
        matches!(self, Self::Legacy { .. })
    }

    /// Resolves a navigable URL for this entry.
    ///
    /// Precedence:
    /// 1. the entry's own URL
    /// 2. the newest URL in `fallback_urls` that is not the bare domain link
    /// 3. `https://{domain}`
    pub fn resolved_url(&self, fallback_urls: &[String], domain: &str) -> String {
        match self.url() {
            Some(url) => url.to_string(),
            None => fallback_url(fallback_urls, domain),
        }
    }
}

/// Picks the newest meaningful URL from a domain's URL list.
fn fallback_url(urls: &[String], domain: &str) -> String {
    let bare = bare_domain_url(domain);
    urls.iter()
        .rev()
        .find(|url| !url.trim().is_empty() && **url != bare)
        .cloned()
        .unwrap_or(bare)
}

/// Aggregate visit state for a single domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainRecord {
    /// Lowercase hostname, the aggregation key.
    pub domain: String,
    /// Total number of visits ever observed. Never shrinks when old events
    /// are evicted from `visits`.
    pub count: u64,
    /// Most recent visit. `None` only for legacy records whose stored value
    /// could not be read.
    pub last_visit: Option<DateTime<Utc>>,
    /// Retained visits, oldest first.
    pub visits: Vec<VisitEntry>,
    /// Distinct URLs seen for this domain, oldest first.
    pub urls: Vec<String>,
}

impl DomainRecord {
    /// Creates an empty record for `domain`.
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            count: 0,
            last_visit: None,
            visits: Vec::new(),
            urls: Vec::new(),
        }
    }

    /// Timestamp of the newest retained visit.
    pub fn latest_visit_timestamp(&self) -> Option<DateTime<Utc>> {
        self.visits.last().map(VisitEntry::timestamp)
    }

    /// Last-visit time used for ordering: the newest retained visit,
    /// falling back to the stored `last_visit` field.
    pub fn effective_last_visit(&self) -> Option<DateTime<Utc>> {
        self.latest_visit_timestamp().or(self.last_visit)
    }

    /// The link shown for this domain in the history list.
    pub fn display_url(&self) -> String {
        self.visits
            .last()
            .and_then(VisitEntry::url)
            .map(str::to_string)
            .or_else(|| {
                self.urls
                    .iter()
                    .rev()
                    .find(|url| !url.trim().is_empty())
                    .cloned()
            })
            .unwrap_or_else(|| bare_domain_url(&self.domain))
    }

    /// Appends a visit and applies the retention caps.
    ///
    /// The event is stamped with `observed_at`, unless that is older than the
    /// newest retained visit, in which case the newest timestamp is reused so
    /// that `visits` stays ordered. Returns the timestamp that was stored.
    pub fn push_visit(
        &mut self,
        url: &str,
        observed_at: DateTime<Utc>,
        limits: RetentionLimits,
    ) -> DateTime<Utc> {
        let timestamp = match self.latest_visit_timestamp() {
            Some(latest) if latest > observed_at => latest,
            _ => observed_at,
        };

        self.count += 1;
        self.last_visit = Some(timestamp);
        self.visits.push(VisitEntry::full(timestamp, url));

        if !self.urls.iter().any(|known| known == url) {
            self.urls.push(url.to_string());
        }

        self.enforce_limits(limits);
        timestamp
    }

    /// Restores the record invariants: distinct URLs, capped lists and a
    /// count no smaller than the retained history.
    pub fn enforce_limits(&mut self, limits: RetentionLimits) {
        let mut seen = HashSet::new();
        self.urls.retain(|url| seen.insert(url.clone()));

        keep_newest(&mut self.visits, limits.max_visits);
        keep_newest(&mut self.urls, limits.max_urls);

        self.count = self.count.max(self.visits.len() as u64);
    }
}

/// Drops the oldest items so that at most `max` remain.
fn keep_newest<T>(items: &mut Vec<T>, max: usize) {
    if items.len() > max {
        let excess = items.len() - max;
        items.drain(..excess);
    }
}
