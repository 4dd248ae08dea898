//! Configuration for position tracking.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TrackerError};

/// Configuration for the position tracker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Milliseconds between two sampler ticks.
    pub tick_interval_ms: u64,

    /// Consecutive ticks on one line before it is confirmed.
    pub confirmation_ticks: u32,

    /// Seconds a confirmation stays valid before the record expires.
    pub retention_secs: u64,

    /// Line window used when clustering confirmed lines.
    pub cluster_window: usize,

    /// Whether document edits request a view refresh.
    pub auto_refresh: bool,

    /// Ordering of the aggregated cluster list.
    pub sort_order: SortOrder,
}

impl TrackerConfig {
    /// Create a new config with default values.
    pub fn new() -> Self {
        Self {
            tick_interval_ms: 1_000,
            confirmation_ticks: 5,
            retention_secs: 4 * 60 * 60,
            cluster_window: 5,
            auto_refresh: true,
            sort_order: SortOrder::LastActive,
        }
    }

    /// Parse and validate a JSON config. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Set the tick interval.
    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval_ms = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Set the number of dwell ticks needed for confirmation.
    pub fn with_confirmation_ticks(mut self, ticks: u32) -> Self {
        self.confirmation_ticks = ticks;
        self
    }

    /// Set the retention window.
    pub fn with_retention(mut self, retention: Duration) -> Self {
        self.retention_secs = retention.as_secs();
        self
    }

    /// Set the clustering window.
    pub fn with_cluster_window(mut self, window: usize) -> Self {
        self.cluster_window = window;
        self
    }

    /// Enable or disable refresh on document edits.
    pub fn with_auto_refresh(mut self, enabled: bool) -> Self {
        self.auto_refresh = enabled;
        self
    }

    /// Set the sort order.
    pub fn with_sort_order(mut self, order: SortOrder) -> Self {
        self.sort_order = order;
        self
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn retention(&self) -> Duration {
        Duration::from_secs(self.retention_secs)
    }

    /// Reject values the tracker cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.tick_interval_ms == 0 {
            return Err(TrackerError::Config(
                "tick_interval_ms must be greater than zero".to_string(),
            ));
        }
        if self.confirmation_ticks == 0 {
            return Err(TrackerError::Config(
                "confirmation_ticks must be greater than zero".to_string(),
            ));
        }
        if self.cluster_window == 0 {
            return Err(TrackerError::Config(
                "cluster_window must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// How aggregated clusters are ordered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// Most recently confirmed first.
    #[default]
    LastActive,

    /// Grouped by document, then by line.
    File,
}
