//! Error types for the position tracker.

use thiserror::Error;

/// Result type alias for tracker operations.
pub type Result<T> = std::result::Result<T, TrackerError>;

/// Errors that can occur at the tracker's command and configuration boundary.
///
/// Sampling, remapping and aggregation never fail: missing focus, lost
/// records and out-of-range indices are normal outcomes there.
#[derive(Error, Debug)]
pub enum TrackerError {
    /// Invalid configuration value.
    #[error("configuration error: {0}")]
    Config(String),

    /// Document is not tracked.
    #[error("unknown document: {0}")]
    UnknownDocument(String),

    /// Line index outside the document's current snapshot.
    #[error("line {line} out of range for {document} ({line_count} lines)")]
    LineOutOfRange {
        document: String,
        line: usize,
        line_count: usize,
    },

    /// The service is no longer receiving messages.
    #[error("channel error: tracker service has stopped")]
    ChannelClosed,

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
