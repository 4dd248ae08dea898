//! Periodic sampling of the focused line.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::remap::{self, RemapStats};
use crate::store::{DocumentId, DocumentStore, Focus};

/// What one tick did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickReport {
    /// Line that was sampled, if any.
    pub sampled: Option<(DocumentId, usize)>,

    /// Remap performed before sampling, if the line count changed.
    pub remap: Option<RemapStats>,

    /// Whether the sampled line was confirmed on this tick.
    pub confirmed: bool,

    /// Whether the view should be refreshed.
    pub refresh_requested: bool,
}

impl TickReport {
    pub fn idle() -> Self {
        Self::default()
    }
}

/// Dwell state carried from one tick to the next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sampler {
    confirmation_ticks: u32,
    last_focus: Option<(DocumentId, usize)>,
    dwell_count: u32,
}

impl Sampler {
    pub fn new(confirmation_ticks: u32) -> Self {
        Self {
            confirmation_ticks: confirmation_ticks.max(1),
            last_focus: None,
            dwell_count: 0,
        }
    }

    pub fn dwell_count(&self) -> u32 {
        self.dwell_count
    }

    pub fn last_focus(&self) -> Option<&(DocumentId, usize)> {
        self.last_focus.as_ref()
    }

    /// Forget the dwell state.
    pub fn reset(&mut self) {
        self.last_focus = None;
        self.dwell_count = 0;
    }

    /// Sample the focused line into `store`.
    ///
    /// No focus, or a cursor outside the reported lines, is an idle tick that
    /// leaves both the store and the dwell state untouched.
    pub fn tick(
        &mut self,
        store: &mut DocumentStore,
        focus: Option<Focus<'_>>,
        now: DateTime<Utc>,
    ) -> TickReport {
        let Some(focus) = focus else {
            return TickReport::idle();
        };
        let Some(text) = focus.lines.get(focus.line) else {
            debug!(
                "Cursor line {} outside {} ({} lines)",
                focus.line,
                focus.document,
                focus.lines.len()
            );
            return TickReport::idle();
        };

        let entry = store.entry_or_create(focus.document, focus.lines);
        let line_count_changed = entry.snapshot.line_count() != focus.lines.len();
        let remapped = line_count_changed.then(|| remap::remap(entry, focus.lines));

        let record = entry.record_mut(focus.line, text);
        record.weight += 1;
        record.text.clone_from(text);

        let position = (focus.document.clone(), focus.line);
        if self.last_focus.as_ref() == Some(&position) {
            self.dwell_count += 1;
        } else {
            self.last_focus = Some(position.clone());
            self.dwell_count = 1;
        }

        let confirmed = self.dwell_count >= self.confirmation_ticks;
        if confirmed {
            record.confirmed_at = Some(now);
            self.dwell_count = 0;
            debug!(
                "Confirmed {}:{} (weight: {})",
                focus.document, focus.line, record.weight
            );
        }

        TickReport {
            sampled: Some(position),
            remap: remapped,
            confirmed,
            refresh_requested: confirmed,
        }
    }
}

impl Default for Sampler {
    fn default() -> Self {
        Self::new(5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;
    use pretty_assertions::assert_eq;

    fn lines(texts: &[&str]) -> Vec<String> {
        texts.iter().map(|t| String::from(*t)).collect()
    }

    #[test]
    fn test_weight_counts_ticks() {
        let mut store = DocumentStore::new();
        let mut sampler = Sampler::default();
        let doc = DocumentId::from("a.rs");
        let text = lines(&["a", "b", "c"]);
        let now = Utc::now();

        sampler.tick(&mut store, Some(Focus::new(&doc, 0, &text)), now);
        for _ in 0..7 {
            sampler.tick(&mut store, Some(Focus::new(&doc, 2, &text)), now);
        }

        let entry = store.get(&doc).unwrap();
        assert_eq!(entry.activity[&0].weight, 1);
        assert_eq!(entry.activity[&2].weight, 7);
        assert!(!entry.activity.contains_key(&1));
    }

    #[test]
    fn test_confirmation_needs_exact_dwell() {
        let mut store = DocumentStore::new();
        let mut sampler = Sampler::new(5);
        let doc = DocumentId::from("a.rs");
        let text = lines(&["a", "b"]);
        let start = Utc::now();

        for tick in 0..4 {
            let now = start + TimeDelta::seconds(tick);
            let report = sampler.tick(&mut store, Some(Focus::new(&doc, 1, &text)), now);
            assert!(!report.confirmed);
        }
        assert_eq!(store.get(&doc).unwrap().activity[&1].confirmed_at, None);

        let fifth = start + TimeDelta::seconds(4);
        let report = sampler.tick(&mut store, Some(Focus::new(&doc, 1, &text)), fifth);
        assert!(report.confirmed);
        assert!(report.refresh_requested);
        let record = &store.get(&doc).unwrap().activity[&1];
        assert_eq!(record.confirmed_at, Some(fifth));
        assert_eq!(sampler.dwell_count(), 0);
    }

    #[test]
    fn test_restamp_needs_another_full_dwell() {
        let mut store = DocumentStore::new();
        let mut sampler = Sampler::new(5);
        let doc = DocumentId::from("a.rs");
        let text = lines(&["a", "b"]);
        let start = Utc::now();
        let mut stamps = Vec::new();

        for tick in 1..=10 {
            let now = start + TimeDelta::seconds(tick);
            sampler.tick(&mut store, Some(Focus::new(&doc, 1, &text)), now);
            stamps.push(store.get(&doc).unwrap().activity[&1].confirmed_at);
        }

        let first = Some(start + TimeDelta::seconds(5));
        let second = Some(start + TimeDelta::seconds(10));
        assert!(stamps[..4].iter().all(Option::is_none));
        assert!(stamps[4..9].iter().all(|stamp| *stamp == first));
        assert_eq!(stamps[9], second);
        assert_eq!(store.get(&doc).unwrap().activity[&1].weight, 10);
    }

    #[test]
    fn test_moving_resets_dwell() {
        let mut store = DocumentStore::new();
        let mut sampler = Sampler::new(3);
        let doc = DocumentId::from("a.rs");
        let text = lines(&["a", "b"]);
        let now = Utc::now();

        for line in [0, 0, 1, 1, 0, 0] {
            let report = sampler.tick(&mut store, Some(Focus::new(&doc, line, &text)), now);
            assert!(!report.confirmed);
        }
        assert_eq!(sampler.dwell_count(), 2);
        assert_eq!(sampler.last_focus(), Some(&(doc.clone(), 0)));
    }

    #[test]
    fn test_idle_tick_is_noop() {
        let mut store = DocumentStore::new();
        let mut sampler = Sampler::default();
        let doc = DocumentId::from("a.rs");
        let text = lines(&["a"]);
        let now = Utc::now();

        assert_eq!(sampler.tick(&mut store, None, now), TickReport::idle());
        assert_eq!(
            sampler.tick(&mut store, Some(Focus::new(&doc, 4, &text)), now),
            TickReport::idle()
        );
        assert!(store.is_empty());
    }

    #[test]
    fn test_line_count_change_triggers_remap() {
        let mut store = DocumentStore::new();
        let mut sampler = Sampler::default();
        let doc = DocumentId::from("a.rs");
        let before = lines(&["A", "B", "C", "D", "E"]);
        let after = lines(&["A", "X", "B", "C", "D", "E"]);
        let now = Utc::now();

        for _ in 0..3 {
            sampler.tick(&mut store, Some(Focus::new(&doc, 2, &before)), now);
        }
        let report = sampler.tick(&mut store, Some(Focus::new(&doc, 0, &after)), now);

        assert_eq!(report.remap.map(|stats| stats.delta), Some(1));
        let entry = store.get(&doc).unwrap();
        assert_eq!(entry.activity[&3].weight, 3);
        assert_eq!(entry.activity[&3].text, "C");
        assert_eq!(entry.snapshot.line_count(), 6);
    }
}
