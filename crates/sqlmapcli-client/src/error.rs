//! Error types for the sqlmapapi client.
//!
//! Failures are split the same way the operations are: [`TransportError`]
//! describes why a single request produced no usable envelope, [`TaskError`]
//! is what `status`, `get_result` and `get_log` return when the data they
//! promise could not be fetched, and [`ClientError`] covers construction and
//! unsupported operations.

use sqlmapcli_core::{ConfigError, CoreError, TaskId};
use thiserror::Error;

fn suffix(message: Option<&str>) -> String {
    message.map(|m| format!(": {m}")).unwrap_or_default()
}

/// Why a request to the remote service produced no result.
#[derive(Error, Debug)]
pub enum TransportError {
    /// Connection refused, timeout, or other network failure
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Non-success HTTP status
    #[error("HTTP status {status}{}", suffix(.message.as_deref()))]
    HttpStatus {
        /// HTTP status code
        status: u16,
        /// Server-supplied message, if the body carried one
        message: Option<String>,
    },

    /// Body was not valid JSON or did not have the expected shape
    #[error("malformed response: {0}")]
    Malformed(#[from] serde_json::Error),

    /// Envelope reported `success: false` (or omitted `success`)
    #[error("{}", .message.as_deref().unwrap_or("request rejected by server"))]
    Rejected {
        /// Server-supplied `message` field
        message: Option<String>,
    },

    /// Path could not be joined onto the base address
    #[error("invalid request path: {0}")]
    InvalidPath(#[from] url::ParseError),
}

/// Errors raised by task operations that must yield a definite answer.
#[derive(Error, Debug)]
pub enum TaskError {
    /// Status could not be fetched
    #[error("can't get status of task {task_id}: {source}")]
    Status {
        /// Task whose status was requested
        task_id: TaskId,
        /// Underlying request failure
        #[source]
        source: TransportError,
    },

    /// Result data could not be fetched
    #[error("can't get result of task {task_id}: {source}")]
    Result {
        /// Task whose data was requested
        task_id: TaskId,
        /// Underlying request failure
        #[source]
        source: TransportError,
    },

    /// Log could not be fetched
    #[error("can't get log of task {task_id}: {source}")]
    Log {
        /// Task whose log was requested
        task_id: TaskId,
        /// Underlying request failure
        #[source]
        source: TransportError,
    },
}

impl TaskError {
    /// Identifier of the task the failed request targeted.
    #[must_use]
    pub fn task_id(&self) -> &TaskId {
        match self {
            Self::Status { task_id, .. }
            | Self::Result { task_id, .. }
            | Self::Log { task_id, .. } => task_id,
        }
    }
}

/// Errors from client construction and unsupported operations.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Operation exists in the remote API but is not implemented here
    #[error("not implemented: {0}")]
    Unsupported(&'static str),

    /// Base address could not be parsed
    #[error("invalid server address {address}: {source}")]
    InvalidAddress {
        /// Address as given
        address: String,
        /// Parse failure
        #[source]
        source: url::ParseError,
    },

    /// HTTP client could not be built
    #[error("failed to create HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// Invalid identifier or other foundation error
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Invalid configuration
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Result type alias for client construction.
pub type Result<T> = std::result::Result<T, ClientError>;
