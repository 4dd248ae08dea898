//! Clustering confirmed lines into a ranked list.

use std::cmp::Reverse;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::SortOrder;
use crate::expiry::ExpiryPolicy;
use crate::store::{DocumentEntry, DocumentId, DocumentStore, LineActivity};

/// Adjacent confirmed lines of one document, merged into one item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cluster {
    /// Document the lines belong to.
    pub document: DocumentId,

    /// Absorbed line indices, ascending.
    pub lines: Vec<usize>,

    /// Sum of the absorbed lines' weights.
    pub weight: u64,

    /// Most recently confirmed absorbed line.
    pub representative_line: usize,

    /// Text of the representative line.
    pub representative_text: String,

    /// Confirmation time of the representative line.
    pub confirmed_at: DateTime<Utc>,
}

impl Cluster {
    fn start(document: &DocumentId, line: usize, record: &LineActivity, at: DateTime<Utc>) -> Self {
        Self {
            document: document.clone(),
            lines: vec![line],
            weight: record.weight,
            representative_line: line,
            representative_text: record.text.clone(),
            confirmed_at: at,
        }
    }

    fn absorb(&mut self, line: usize, record: &LineActivity, at: DateTime<Utc>) {
        self.lines.push(line);
        self.weight += record.weight;
        if at > self.confirmed_at {
            self.representative_line = line;
            self.representative_text.clone_from(&record.text);
            self.confirmed_at = at;
        }
    }

    pub fn first_line(&self) -> usize {
        self.lines
            .first()
            .copied()
            .unwrap_or(self.representative_line)
    }

    pub fn last_line(&self) -> usize {
        self.lines
            .last()
            .copied()
            .unwrap_or(self.representative_line)
    }

    /// Displayed range; `None` when the cluster holds a single line.
    pub fn range(&self) -> Option<(usize, usize)> {
        (self.lines.len() > 1).then(|| (self.first_line(), self.last_line()))
    }
}

/// Freshly aggregated clusters plus the heaviest cluster weight.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterList {
    clusters: Vec<Cluster>,
    max_weight: u64,
}

impl ClusterList {
    pub fn new(clusters: Vec<Cluster>) -> Self {
        let max_weight = clusters.iter().map(|c| c.weight).max().unwrap_or(0);
        Self {
            clusters,
            max_weight,
        }
    }

    pub fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Cluster> {
        self.clusters.iter()
    }

    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    pub fn max_weight(&self) -> u64 {
        self.max_weight
    }

    /// Relative intensity of a cluster within this list.
    pub fn intensity(&self, cluster: &Cluster) -> u8 {
        intensity(cluster.weight, self.max_weight)
    }
}

/// Map a weight onto a 1–10 scale relative to `max_weight`.
pub fn intensity(weight: u64, max_weight: u64) -> u8 {
    if max_weight == 0 {
        return 1;
    }
    let tenths = weight.saturating_mul(10) / max_weight;
    u8::try_from(tenths.saturating_add(1).min(10)).unwrap_or(10)
}

/// Greedily cluster one document's confirmed lines.
///
/// A cluster starting at line `i` absorbs every later confirmed line below
/// `i + window`.
pub fn cluster_document(
    document: &DocumentId,
    entry: &DocumentEntry,
    window: usize,
) -> Vec<Cluster> {
    let mut clusters = Vec::new();
    let mut current: Option<(Cluster, usize)> = None;

    for (line, record) in entry.confirmed() {
        let Some(at) = record.confirmed_at else {
            continue;
        };
        if let Some((cluster, cutoff)) = current.as_mut()
            && line < *cutoff
        {
            cluster.absorb(line, record, at);
            continue;
        }
        let next = (
            Cluster::start(document, line, record, at),
            line.saturating_add(window),
        );
        if let Some((finished, _)) = current.replace(next) {
            clusters.push(finished);
        }
    }
    if let Some((finished, _)) = current {
        clusters.push(finished);
    }

    clusters
}

/// Expire old records, then cluster and rank every document's confirmed
/// lines.
pub fn aggregate(
    store: &mut DocumentStore,
    policy: &ExpiryPolicy,
    window: usize,
    order: SortOrder,
    now: DateTime<Utc>,
) -> ClusterList {
    let mut clusters = Vec::new();
    for (document, entry) in store.documents_mut() {
        policy.prune(entry, now);
        clusters.extend(cluster_document(document, entry, window));
    }

    match order {
        SortOrder::LastActive => clusters.sort_by_key(|c| Reverse(c.confirmed_at)),
        SortOrder::File => {
            clusters.sort_by(|a, b| {
                a.document
                    .cmp(&b.document)
                    .then_with(|| a.first_line().cmp(&b.first_line()))
            });
        }
    }

    ClusterList::new(clusters)
}
