//! History aggregation: read-only views over a VisitStore snapshot.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::model::DomainRecord;
use super::repository::VisitStoreRepository;
use super::store::VisitStore;
use crate::error::Result;

/// Which domains the history view includes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum HistoryFilter {
    #[default]
    All,
    /// Only the given domain (typically the one in the active tab).
    Domain(String),
}

impl HistoryFilter {
    pub fn current_domain(domain: impl Into<String>) -> Self {
        Self::Domain(domain.into())
    }

    pub fn matches(&self, domain: &str) -> bool {
        match self {
            Self::All => true,
            Self::Domain(current) => current.eq_ignore_ascii_case(domain),
        }
    }
}

/// One visit with its URL resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedVisit {
    pub timestamp: DateTime<Utc>,
    pub url: String,
}

/// Everything known about a single domain, newest visit first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DomainDetail {
    pub domain: String,
    pub count: u64,
    pub visits: Vec<ResolvedVisit>,
    pub urls: Vec<String>,
}

/// An immutable copy of the store taken at read time.
#[derive(Debug, Clone, Default)]
pub struct HistorySnapshot {
    store: VisitStore,
}

impl HistorySnapshot {
    pub fn new(store: VisitStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &VisitStore {
        &self.store
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Up to `n` records ranked by visit count, highest first.
    ///
    /// Equal counts keep the snapshot's iteration order.
    pub fn top_sites(&self, n: usize) -> Vec<&DomainRecord> {
        let mut sites: Vec<&DomainRecord> = self.store.records().collect();
        sites.sort_by(|a, b| b.count.cmp(&a.count));
        sites.truncate(n);
        sites
    }

    /// Records matching `filter`, most recently visited first.
    ///
    /// Records without any usable timestamp come last.
    pub fn history_view(&self, filter: &HistoryFilter) -> Vec<&DomainRecord> {
        let mut items: Vec<&DomainRecord> = self
            .store
            .records()
            .filter(|record| filter.matches(&record.domain))
            .collect();
        items.sort_by(|a, b| b.effective_last_visit().cmp(&a.effective_last_visit()));
        items
    }

    /// Full chronological detail for `domain`, or `None` if it was never visited.
    pub fn domain_detail(&self, domain: &str) -> Option<DomainDetail> {
        let record = self.store.get(&domain.to_ascii_lowercase())?;

        let mut visits: Vec<ResolvedVisit> = record
            .visits
            .iter()
            .rev()
            .map(|entry| ResolvedVisit {
                timestamp: entry.timestamp(),
                url: entry.resolved_url(&record.urls, &record.domain),
            })
            .collect();
        visits.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

        Some(DomainDetail {
            domain: record.domain.clone(),
            count: record.count,
            visits,
            urls: record.urls.clone(),
        })
    }
}

/// Read side of the tracker: hands out snapshots of the persisted store.
#[derive(Clone)]
pub struct HistoryService {
    repository: Arc<dyn VisitStoreRepository>,
}

impl HistoryService {
    pub fn new(repository: Arc<dyn VisitStoreRepository>) -> Self {
        Self { repository }
    }

    /// Loads an independent snapshot. Never blocks writers.
    pub async fn snapshot(&self) -> Result<HistorySnapshot> {
        let store = self.repository.load().await?;
        tracing::debug!("Loaded history snapshot with {} domains", store.len());
        Ok(HistorySnapshot::new(store))
    }
}
