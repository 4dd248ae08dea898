//! The position tracker: sampling, remapping, expiry and aggregation over
//! one owned document store.

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::aggregate::{self, ClusterList};
use crate::config::{SortOrder, TrackerConfig};
use crate::error::{Result, TrackerError};
use crate::expiry::ExpiryPolicy;
use crate::host::EditorHost;
use crate::sampler::{Sampler, TickReport};
use crate::store::{DocumentId, DocumentStore, Focus, StoreStats};
use crate::view::{self, ClusterItem};

/// Tracks where the cursor dwells and ranks the hottest spots.
///
/// All operations are synchronous and take `now` explicitly; the caller owns
/// scheduling.
#[derive(Debug, Clone)]
pub struct PositionTracker {
    config: TrackerConfig,
    store: DocumentStore,
    sampler: Sampler,
    expiry: ExpiryPolicy,
}

impl PositionTracker {
    /// Create a tracker from a validated config.
    pub fn new(config: TrackerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            sampler: Sampler::new(config.confirmation_ticks),
            expiry: ExpiryPolicy::new(config.retention()),
            store: DocumentStore::new(),
            config,
        })
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    pub fn sampler(&self) -> &Sampler {
        &self.sampler
    }

    pub fn stats(&self) -> StoreStats {
        self.store.stats()
    }

    /// Run one sampler tick.
    pub fn tick(&mut self, focus: Option<Focus<'_>>, now: DateTime<Utc>) -> TickReport {
        self.sampler.tick(&mut self.store, focus, now)
    }

    /// Note that a document's text changed. Returns whether the view should
    /// be refreshed.
    ///
    /// Remapping waits for the next tick's line-count check.
    pub fn on_document_changed(&self, document: &DocumentId) -> bool {
        debug!("Document changed: {document}");
        self.config.auto_refresh
    }

    /// Expire old records and rank the remaining confirmed clusters.
    pub fn aggregate(&mut self, now: DateTime<Utc>) -> ClusterList {
        aggregate::aggregate(
            &mut self.store,
            &self.expiry,
            self.config.cluster_window,
            self.config.sort_order,
            now,
        )
    }

    /// Aggregate and build display rows.
    pub fn view(&mut self, now: DateTime<Utc>) -> Vec<ClusterItem> {
        let list = self.aggregate(now);
        view::items(&list, now)
    }

    /// Forget all documents and dwell state.
    pub fn reset(&mut self) {
        self.store.clear();
        self.sampler.reset();
        info!("Position tracker reset");
    }

    /// Remove the given lines' records from a document. Returns how many
    /// records were removed.
    pub fn delete_cluster(&mut self, document: &DocumentId, lines: &[usize]) -> Result<usize> {
        let entry = self
            .store
            .get_mut(document)
            .ok_or_else(|| TrackerError::UnknownDocument(document.to_string()))?;

        let removed = lines
            .iter()
            .filter(|line| entry.activity.remove(*line).is_some())
            .count();
        debug!("Deleted {removed} positions from {document}");
        Ok(removed)
    }

    /// Ask the host to reveal a tracked location.
    pub fn select<H: EditorHost + ?Sized>(
        &self,
        host: &mut H,
        document: &DocumentId,
        line: usize,
    ) -> Result<()> {
        let entry = self
            .store
            .get(document)
            .ok_or_else(|| TrackerError::UnknownDocument(document.to_string()))?;

        if entry.snapshot.line(line).is_none() {
            return Err(TrackerError::LineOutOfRange {
                document: document.to_string(),
                line,
                line_count: entry.snapshot.line_count(),
            });
        }

        host.reveal(document, line);
        Ok(())
    }

    pub fn set_auto_refresh(&mut self, enabled: bool) {
        self.config.auto_refresh = enabled;
    }

    pub fn set_sort_order(&mut self, order: SortOrder) {
        self.config.sort_order = order;
    }
}
