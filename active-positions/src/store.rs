//! Per-document snapshots and line activity tables.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Process-unique identifier of a document (usually its path).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Final path component, or the whole id when it has none.
    pub fn file_label(&self) -> &str {
        Path::new(&self.0)
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or(&self.0)
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DocumentId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for DocumentId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// What the host reports as focused at tick time.
#[derive(Debug, Clone, Copy)]
pub struct Focus<'a> {
    /// Focused document.
    pub document: &'a DocumentId,

    /// Zero-based cursor line.
    pub line: usize,

    /// Current line texts of the document.
    pub lines: &'a [String],
}

impl<'a> Focus<'a> {
    pub fn new(document: &'a DocumentId, line: usize, lines: &'a [String]) -> Self {
        Self {
            document,
            line,
            lines,
        }
    }
}

/// Activity accumulated for one line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineActivity {
    /// Ticks the cursor spent on this line.
    pub weight: u64,

    /// Text of the line when it was last sampled.
    pub text: String,

    /// When sustained dwell last confirmed this line.
    pub confirmed_at: Option<DateTime<Utc>>,
}

impl LineActivity {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            weight: 0,
            text: text.into(),
            confirmed_at: None,
        }
    }

    pub fn is_confirmed(&self) -> bool {
        self.confirmed_at.is_some()
    }
}

/// Line texts of a document as last observed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentSnapshot {
    lines: Vec<String>,
}

impl DocumentSnapshot {
    pub fn new(lines: Vec<String>) -> Self {
        Self { lines }
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn line(&self, index: usize) -> Option<&str> {
        self.lines.get(index).map(String::as_str)
    }
}

/// One tracked document: its snapshot and its activity table.
#[derive(Debug, Clone, Default)]
pub struct DocumentEntry {
    pub snapshot: DocumentSnapshot,
    pub activity: BTreeMap<usize, LineActivity>,
}

impl DocumentEntry {
    pub fn new(snapshot: DocumentSnapshot) -> Self {
        Self {
            snapshot,
            activity: BTreeMap::new(),
        }
    }

    /// Get a line's record, creating it with weight 0 when absent.
    pub fn record_mut(&mut self, line: usize, text: &str) -> &mut LineActivity {
        self.activity
            .entry(line)
            .or_insert_with(|| LineActivity::new(text))
    }

    /// Iterate confirmed records in ascending line order.
    pub fn confirmed(&self) -> impl Iterator<Item = (usize, &LineActivity)> {
        self.activity
            .iter()
            .filter(|(_, record)| record.is_confirmed())
            .map(|(line, record)| (*line, record))
    }
}

/// All tracked documents, keyed by id.
#[derive(Debug, Clone, Default)]
pub struct DocumentStore {
    documents: BTreeMap<DocumentId, DocumentEntry>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a document entry, creating it from `lines` on first sight.
    pub fn entry_or_create(&mut self, id: &DocumentId, lines: &[String]) -> &mut DocumentEntry {
        self.documents.entry(id.clone()).or_insert_with(|| {
            debug!("Tracking new document: {id} ({} lines)", lines.len());
            DocumentEntry::new(DocumentSnapshot::new(lines.to_vec()))
        })
    }

    pub fn get(&self, id: &DocumentId) -> Option<&DocumentEntry> {
        self.documents.get(id)
    }

    pub fn get_mut(&mut self, id: &DocumentId) -> Option<&mut DocumentEntry> {
        self.documents.get_mut(id)
    }

    pub fn documents_mut(&mut self) -> impl Iterator<Item = (&DocumentId, &mut DocumentEntry)> {
        self.documents.iter_mut()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Get statistics about the store.
    pub fn stats(&self) -> StoreStats {
        let mut stats = StoreStats {
            documents: self.documents.len(),
            ..StoreStats::default()
        };
        for entry in self.documents.values() {
            stats.tracked_lines += entry.activity.len();
            stats.confirmed_lines += entry.confirmed().count();
        }
        stats
    }

    /// Forget every document.
    pub fn clear(&mut self) {
        self.documents.clear();
        debug!("Cleared document store");
    }
}

/// Statistics about the document store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreStats {
    /// Tracked documents.
    pub documents: usize,

    /// Lines with an activity record.
    pub tracked_lines: usize,

    /// Lines with a confirmation timestamp.
    pub confirmed_lines: usize,
}
