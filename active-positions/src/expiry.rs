//! Expiry of confirmed positions.

use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use tracing::debug;

use crate::store::{DocumentEntry, LineActivity};

/// Decides when a confirmed record is too old to keep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpiryPolicy {
    retention: TimeDelta,
}

impl ExpiryPolicy {
    pub fn new(retention: Duration) -> Self {
        Self {
            retention: TimeDelta::from_std(retention).unwrap_or(TimeDelta::MAX),
        }
    }

    pub fn retention(&self) -> TimeDelta {
        self.retention
    }

    /// Whether the record was confirmed longer than the retention window ago.
    /// Unconfirmed records never expire.
    pub fn is_expired(&self, record: &LineActivity, now: DateTime<Utc>) -> bool {
        record
            .confirmed_at
            .is_some_and(|confirmed_at| now.signed_duration_since(confirmed_at) > self.retention)
    }

    /// Remove expired records from a document. Returns how many were removed.
    pub fn prune(&self, entry: &mut DocumentEntry, now: DateTime<Utc>) -> usize {
        let before = entry.activity.len();
        entry
            .activity
            .retain(|_, record| !self.is_expired(record, now));
        let removed = before - entry.activity.len();
        if removed > 0 {
            debug!("Expired {removed} confirmed positions");
        }
        removed
    }
}

impl Default for ExpiryPolicy {
    fn default() -> Self {
        Self::new(Duration::from_secs(4 * 60 * 60))
    }
}
