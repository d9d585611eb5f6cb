//! Visit recorder: the single writer of the visit history.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::Mutex;

use super::classifier::{SkipReason, UrlClassifier};
use super::repository::VisitStoreRepository;
use super::store::VisitStore;
use crate::config::{RetentionLimits, TrackerConfig};
use crate::error::Result;

/// Result of handing one navigation to the recorder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RecordOutcome {
    /// The visit was stored; `count` is the domain's new total.
    Recorded { domain: String, count: u64 },
    /// The URL was filtered out; the store was not touched.
    Skipped { reason: SkipReason },
    /// Loading or saving the store failed; the visit was dropped.
    Failed { message: String },
}

impl RecordOutcome {
    pub fn is_recorded(&self) -> bool {
        matches!(self, Self::Recorded { .. })
    }
}

/// Appends observed navigations to the persisted VisitStore.
///
/// Cloning is cheap and clones share one write gate, so every write issued
/// through the same recorder family is serialized within this process.
#[derive(Clone)]
pub struct VisitRecorder {
    repository: Arc<dyn VisitStoreRepository>,
    classifier: UrlClassifier,
    limits: RetentionLimits,
    write_gate: Arc<Mutex<()>>,
}

impl VisitRecorder {
    pub fn new(repository: Arc<dyn VisitStoreRepository>, config: &TrackerConfig) -> Self {
        Self {
            repository,
            classifier: UrlClassifier::from_config(config),
            limits: config.retention,
            write_gate: Arc::new(Mutex::new(())),
        }
    }

    /// Records a visit observed now. Never fails: errors are logged and
    /// reported as [`RecordOutcome::Failed`].
    pub async fn record_visit(&self, url: &str) -> RecordOutcome {
        self.record_visit_at(url, Utc::now()).await
    }

    /// Records a visit observed at `observed_at`. Never fails.
    pub async fn record_visit_at(&self, url: &str, observed_at: DateTime<Utc>) -> RecordOutcome {
        match self.try_record_visit_at(url, observed_at).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!("Failed to record visit to {}: {}", url, e);
                RecordOutcome::Failed {
                    message: e.to_string(),
                }
            }
        }
    }

    /// Like [`record_visit`](Self::record_visit) but propagates store errors.
    pub async fn try_record_visit(&self, url: &str) -> Result<RecordOutcome> {
        self.try_record_visit_at(url, Utc::now()).await
    }

    pub async fn try_record_visit_at(
        &self,
        url: &str,
        observed_at: DateTime<Utc>,
    ) -> Result<RecordOutcome> {
        let domain = match self.classifier.classify(url) {
            Ok(domain) => domain,
            Err(reason) => {
                tracing::debug!("Skipping {} ({})", url, reason);
                return Ok(RecordOutcome::Skipped { reason });
            }
        };

        let count = self.apply_visit(&domain, url, observed_at).await?;
        tracing::info!("Tracked visit to {} (Total: {})", domain, count);

        Ok(RecordOutcome::Recorded { domain, count })
    }

    /// Read-modify-write of the whole store for one visit.
    ///
    /// NOT atomic across concurrent writers that do not share this recorder's
    /// write gate (other processes, other recorder instances on the same
    /// store). Two such writers interleaving between `load` and `save` lose
    /// one of the updates; the persisted store offers no primitive to prevent
    /// that. Keep this window free of anything but the mutation itself.
    async fn apply_visit(
        &self,
        domain: &str,
        url: &str,
        observed_at: DateTime<Utc>,
    ) -> Result<u64> {
        let _gate = self.write_gate.lock().await;

        let mut store = self.repository.load().await?;
        let count = store
            .record_visit(domain, url, observed_at, self.limits)
            .count;
        self.repository.save(&store).await?;

        Ok(count)
    }

    /// Replaces the whole history with an empty store. Irreversible.
    pub async fn clear_all(&self) -> Result<()> {
        let _gate = self.write_gate.lock().await;

        if let Err(e) = self.repository.save(&VisitStore::new()).await {
            tracing::error!("Failed to clear visit history: {}", e);
            return Err(e);
        }

        tracing::info!("Visit history cleared");
        Ok(())
    }
}
