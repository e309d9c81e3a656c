//! Error types for report decoding.

use thiserror::Error;

/// Errors that can occur while decoding scan data.
#[derive(Error, Debug)]
pub enum ReportError {
    /// Top-level payload was not a list of entries
    #[error("scan data must be a list of entries, got {0}")]
    NotAList(&'static str),

    /// An entry did not have the `{status, type, value}` shape
    #[error("malformed entry {index}: {source}")]
    MalformedEntry {
        /// Position of the entry in the data list
        index: usize,
        /// Decoding failure
        #[source]
        source: serde_json::Error,
    },
}

/// Result type alias for report operations.
pub type Result<T> = std::result::Result<T, ReportError>;
