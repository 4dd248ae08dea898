//! # Active Positions
//!
//! This crate tracks where the cursor dwells inside text documents and
//! ranks the lines that were worked on most recently and persistently.
//!
//! ## Features
//!
//! - **Sampling**: One tick per interval adds weight to the focused line
//! - **Remapping**: Tracked lines follow their content across insertions and deletions
//! - **Confirmation & Expiry**: Sustained dwell confirms a line; old confirmations expire
//! - **Clustering**: Nearby confirmed lines are merged into ranked items
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    Position Tracker                             │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  EditorHost ──► Sampler ──► DocumentStore ──► aggregate        │
//! │                    │              ▲               │             │
//! │                    ▼              │               ▼             │
//! │                 remap ────────────┘          ClusterItem       │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod aggregate;
pub mod config;
pub mod error;
pub mod expiry;
pub mod host;
pub mod remap;
pub mod sampler;
pub mod service;
pub mod store;
pub mod tracker;
pub mod view;

pub use aggregate::{Cluster, ClusterList, intensity};
pub use config::{SortOrder, TrackerConfig};
pub use error::{Result, TrackerError};
pub use expiry::ExpiryPolicy;
pub use host::{EditorHost, FocusState};
pub use remap::{RemapStats, is_stable, lines_match};
pub use sampler::{Sampler, TickReport};
pub use service::{HostMessage, TrackerHandle, TrackerService};
pub use store::{DocumentEntry, DocumentId, DocumentSnapshot, DocumentStore, Focus, LineActivity};
pub use tracker::PositionTracker;
pub use view::{ClusterItem, relative_time_label};
