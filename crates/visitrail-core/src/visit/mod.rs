//! Visit history: data model, recording and aggregation.
//!
//! This module provides:
//! - Domain models ([`DomainRecord`], [`VisitEntry`], [`VisitStore`])
//! - Persistence ports ([`KeyValueStore`], [`VisitStoreRepository`])
//! - The single writer ([`VisitRecorder`]) and the read side
//!   ([`HistoryService`], [`HistorySnapshot`])

pub mod aggregator;
pub mod classifier;
pub mod model;
pub mod recorder;
pub mod repository;
pub mod store;

pub use aggregator::{DomainDetail, HistoryFilter, HistoryService, HistorySnapshot, ResolvedVisit};
pub use classifier::{SkipReason, UrlClassifier, extract_domain};
pub use model::{DomainRecord, VisitEntry, bare_domain_url};
pub use recorder::{RecordOutcome, VisitRecorder};
pub use repository::{KeyValueStore, VisitStoreRepository};
pub use store::VisitStore;
