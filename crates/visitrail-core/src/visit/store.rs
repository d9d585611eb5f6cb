//! The VisitStore: every tracked domain, keyed by hostname.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value as JsonValue;

use super::model::DomainRecord;
use crate::config::RetentionLimits;

/// Mapping from domain to its [`DomainRecord`].
///
/// Iteration follows the key order of the underlying `BTreeMap`, so two
/// snapshots of the same data always iterate identically.
///
/// Stored entries that could not be read as a record are carried verbatim in
/// a separate map. They take no part in any view, and are written back as
/// they were until the domain is visited again or the store is cleared.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct VisitStore {
    records: BTreeMap<String, DomainRecord>,
    #[serde(skip)]
    unreadable: BTreeMap<String, JsonValue>,
}

impl VisitStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, domain: &str) -> Option<&DomainRecord> {
        self.records.get(domain)
    }

    pub fn contains(&self, domain: &str) -> bool {
        self.records.contains_key(domain)
    }

    /// Iterates over all records in key order.
    pub fn records(&self) -> impl Iterator<Item = &DomainRecord> {
        self.records.values()
    }

    /// Inserts a record under its own domain, replacing any previous one.
    pub fn insert(&mut self, record: DomainRecord) -> Option<DomainRecord> {
        self.unreadable.remove(&record.domain);
        self.records.insert(record.domain.clone(), record)
    }

    /// Keeps a stored entry that could not be read, so it survives the next save.
    pub fn preserve_unreadable(&mut self, domain: impl Into<String>, raw: JsonValue) {
        let domain = domain.into();
        if !self.records.contains_key(&domain) {
            self.unreadable.insert(domain, raw);
        }
    }

    /// Entries carried verbatim, in key order.
    pub fn unreadable(&self) -> impl Iterator<Item = (&str, &JsonValue)> {
        self.unreadable.iter().map(|(domain, raw)| (domain.as_str(), raw))
    }

    /// Removes every domain, readable or not.
    pub fn clear(&mut self) {
        self.records.clear();
        self.unreadable.clear();
    }

    /// Records one visit to `domain`, creating the record on first sight.
    pub fn record_visit(
        &mut self,
        domain: &str,
        url: &str,
        observed_at: DateTime<Utc>,
        limits: RetentionLimits,
    ) -> &DomainRecord {
        if self.unreadable.remove(domain).is_some() {
            tracing::warn!("Replacing unreadable stored record for {}", domain);
        }
        let record = self
            .records
            .entry(domain.to_string())
            .or_insert_with(|| DomainRecord::new(domain));
        record.push_visit(url, observed_at, limits);
        record
    }
}

impl FromIterator<DomainRecord> for VisitStore {
    fn from_iter<I: IntoIterator<Item = DomainRecord>>(iter: I) -> Self {
        let mut store = Self::new();
        for record in iter {
            store.insert(record);
        }
        store
    }
}

impl IntoIterator for VisitStore {
    type Item = DomainRecord;
    type IntoIter = std::collections::btree_map::IntoValues<String, DomainRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_values()
    }
}
