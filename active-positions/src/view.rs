//! Display-ready items for the host's cluster list.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::aggregate::{Cluster, ClusterList};
use crate::store::DocumentId;

/// One row of the rendered list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterItem {
    pub document: DocumentId,

    /// Final path component of the document.
    pub file_label: String,

    /// One-based line or range, e.g. `"12"` or `"10-12"`.
    pub line_label: String,

    /// Zero-based line to reveal when the item is selected.
    pub line: usize,

    /// Zero-based lines the item stands for.
    pub lines: Vec<usize>,

    pub text: String,

    /// e.g. `"3 minutes ago"`.
    pub relative_time: String,

    /// 1 (coldest) to 10 (hottest).
    pub intensity: u8,
}

impl ClusterItem {
    pub fn from_cluster(cluster: &Cluster, intensity: u8, now: DateTime<Utc>) -> Self {
        let line_label = match cluster.range() {
            Some((first, last)) => format!("{}-{}", first + 1, last + 1),
            None => (cluster.first_line() + 1).to_string(),
        };

        Self {
            document: cluster.document.clone(),
            file_label: cluster.document.file_label().to_string(),
            line_label,
            line: cluster.representative_line,
            lines: cluster.lines.clone(),
            text: cluster.representative_text.trim().to_string(),
            relative_time: relative_time_label(cluster.confirmed_at, now),
            intensity,
        }
    }
}

/// Build the rendered rows for a cluster list.
pub fn items(list: &ClusterList, now: DateTime<Utc>) -> Vec<ClusterItem> {
    list.iter()
        .map(|cluster| ClusterItem::from_cluster(cluster, list.intensity(cluster), now))
        .collect()
}

/// Human label for how long ago `at` was.
pub fn relative_time_label(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(at);
    let minutes = elapsed.num_minutes();
    let hours = elapsed.num_hours();
    let days = elapsed.num_days();

    if minutes < 1 {
        "just now".to_string()
    } else if hours < 1 {
        plural(minutes, "minute")
    } else if days < 1 {
        plural(hours, "hour")
    } else {
        plural(days, "day")
    }
}

fn plural(count: i64, unit: &str) -> String {
    if count == 1 {
        format!("1 {unit} ago")
    } else {
        format!("{count} {unit}s ago")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::intensity;
    use chrono::TimeDelta;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_relative_time_label() {
        let now = Utc::now();
        let ago = |elapsed: TimeDelta| relative_time_label(now - elapsed, now);

        assert_eq!(ago(TimeDelta::seconds(20)), "just now");
        assert_eq!(ago(TimeDelta::minutes(1)), "1 minute ago");
        assert_eq!(ago(TimeDelta::minutes(42)), "42 minutes ago");
        assert_eq!(ago(TimeDelta::minutes(150)), "2 hours ago");
        assert_eq!(ago(TimeDelta::days(3)), "3 days ago");
        assert_eq!(ago(TimeDelta::seconds(-5)), "just now");
    }

    fn single_line(line: usize, weight: u64, at: DateTime<Utc>) -> Cluster {
        Cluster {
            document: DocumentId::from("a.rs"),
            lines: vec![line],
            weight,
            representative_line: line,
            representative_text: format!("line {line}"),
            confirmed_at: at,
        }
    }

    #[test]
    fn test_items_scale_against_heaviest_cluster() {
        let now = Utc::now();
        let list = ClusterList::new(vec![single_line(0, 10, now), single_line(20, 5, now)]);
        let rows = items(&list, now);

        let intensities: Vec<_> = rows.iter().map(|item| item.intensity).collect();

        assert_eq!(intensities, vec![10, 6]);
    }

    #[test]
    fn test_item_labels() {
        let now = Utc::now();
        let cluster = Cluster {
            document: DocumentId::from("/work/src/lib.rs"),
            lines: vec![9, 11],
            weight: 6,
            representative_line: 11,
            representative_text: "    pub fn run() {".to_string(),
            confirmed_at: now - TimeDelta::minutes(5),
        };

        let item = ClusterItem::from_cluster(&cluster, intensity(cluster.weight, 12), now);

        assert_eq!(item.file_label, "lib.rs");
        assert_eq!(item.line_label, "10-12");
        assert_eq!(item.line, 11);
        assert_eq!(item.text, "pub fn run() {");
        assert_eq!(item.relative_time, "5 minutes ago");
        assert_eq!(item.intensity, 6);
    }
}
