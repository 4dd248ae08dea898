//! Replay of scripted editing sessions.
//!
//! A session is a JSON document listing what the editor would report on
//! each tick. Replaying it runs the tracker on a simulated clock and yields
//! the ranked view at the end.

use std::path::Path;

use active_positions::{ClusterItem, DocumentId, FocusState, PositionTracker, TrackerConfig};
use anyhow::{Context, Result};
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// A scripted session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Session {
    /// Tracker configuration; defaults when omitted.
    #[serde(default)]
    pub config: Option<TrackerConfig>,

    pub steps: Vec<Step>,
}

impl Session {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("invalid session document")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read session {}", path.display()))?;
        Self::from_json(&json)
    }
}

fn one() -> usize {
    1
}

/// One scripted step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    /// Cursor on `line` of `document` for `repeat` ticks.
    Focus {
        document: String,
        line: usize,
        lines: Vec<String>,
        #[serde(default = "one")]
        repeat: usize,
    },

    /// Ticks with no focused document.
    Idle {
        #[serde(default = "one")]
        ticks: usize,
    },

    /// Document change notification.
    Edit { document: String },

    /// Remove the records behind a cluster.
    Delete { document: String, lines: Vec<usize> },

    /// Forget all positions.
    Reset,
}

/// Result of a replay.
#[derive(Debug, Clone, Serialize)]
pub struct ReplayOutcome {
    pub ticks: usize,
    pub refreshes: usize,
    pub items: Vec<ClusterItem>,
}

/// Drives a tracker through a session on a simulated clock.
pub struct Replay {
    tracker: PositionTracker,
    now: DateTime<Utc>,
    step: TimeDelta,
    ticks: usize,
    refreshes: usize,
}

impl Replay {
    pub fn new(config: TrackerConfig, start: DateTime<Utc>) -> Result<Self> {
        let step = TimeDelta::from_std(config.tick_interval())
            .context("tick interval too large")?;
        Ok(Self {
            tracker: PositionTracker::new(config)?,
            now: start,
            step,
            ticks: 0,
            refreshes: 0,
        })
    }

    fn tick(&mut self, focus: Option<&FocusState>) {
        let focus = focus.map(FocusState::as_focus);
        let report = self.tracker.tick(focus, self.now);
        if report.refresh_requested {
            self.refreshes += 1;
        }
        self.ticks += 1;
        self.now += self.step;
    }

    pub fn apply(&mut self, step: &Step) -> Result<()> {
        match step {
            Step::Focus {
                document,
                line,
                lines,
                repeat,
            } => {
                let state = FocusState::new(document.as_str(), *line, lines.clone());
                for _ in 0..*repeat {
                    self.tick(Some(&state));
                }
            }
            Step::Idle { ticks } => {
                for _ in 0..*ticks {
                    self.tick(None);
                }
            }
            Step::Edit { document } => {
                let document = DocumentId::from(document.as_str());
                if self.tracker.on_document_changed(&document) {
                    self.refreshes += 1;
                }
            }
            Step::Delete { document, lines } => {
                let document = DocumentId::from(document.as_str());
                let removed = self.tracker.delete_cluster(&document, lines)?;
                debug!("Removed {removed} records from {document}");
                self.refreshes += 1;
            }
            Step::Reset => {
                self.tracker.reset();
                self.refreshes += 1;
            }
        }
        Ok(())
    }

    pub fn finish(mut self) -> ReplayOutcome {
        let items = self.tracker.view(self.now);
        ReplayOutcome {
            ticks: self.ticks,
            refreshes: self.refreshes,
            items,
        }
    }
}

/// Replay a whole session. `override_config` wins over the session's own.
pub fn replay(
    session: &Session,
    override_config: Option<TrackerConfig>,
    start: DateTime<Utc>,
) -> Result<ReplayOutcome> {
    let config = override_config
        .or_else(|| session.config.clone())
        .unwrap_or_default();
    let mut replay = Replay::new(config, start)?;

    for (index, step) in session.steps.iter().enumerate() {
        replay
            .apply(step)
            .with_context(|| format!("step {index} failed"))?;
    }

    let outcome = replay.finish();
    info!(
        "Replayed {} ticks, {} clusters",
        outcome.ticks,
        outcome.items.len()
    );
    Ok(outcome)
}

/// Plain-text table of the ranked view.
pub fn render_table(items: &[ClusterItem]) -> String {
    if items.is_empty() {
        return "No active positions.\n".to_string();
    }

    let location_width = items
        .iter()
        .map(|item| item.file_label.len() + item.line_label.len() + 1)
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    for item in items {
        let location = format!("{}:{}", item.file_label, item.line_label);
        let bar = "#".repeat(usize::from(item.intensity));
        out.push_str(&format!(
            "{bar:<10}  {location:<location_width$}  {:<16}  {}\n",
            item.relative_time, item.text
        ));
    }
    out
}
