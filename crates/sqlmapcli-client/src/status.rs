//! Task status as reported by the remote service.
//!
//! The client never caches status: every [`ScanStatus`] is the decoded
//! answer to one `GET /scan/<taskid>/status` request.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of a remote task.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TaskStatus {
    /// Created but not started (`"not running"`)
    Ready,
    /// Scan engine is running (`"running"`)
    Running,
    /// Scan engine has exited (`"terminated"`)
    Finished,
    /// Any other value the server sent
    Unknown(String),
}

impl TaskStatus {
    /// Wire value for [`TaskStatus::Ready`].
    pub const READY: &'static str = "not running";
    /// Wire value for [`TaskStatus::Running`].
    pub const RUNNING: &'static str = "running";
    /// Wire value for [`TaskStatus::Finished`].
    pub const FINISHED: &'static str = "terminated";

    /// The string the server uses for this status.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Ready => Self::READY,
            Self::Running => Self::RUNNING,
            Self::Finished => Self::FINISHED,
            Self::Unknown(raw) => raw,
        }
    }

    /// Whether the scan has exited.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Finished)
    }
}

impl From<String> for TaskStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            Self::READY => Self::Ready,
            Self::RUNNING => Self::Running,
            Self::FINISHED => Self::Finished,
            _ => Self::Unknown(raw),
        }
    }
}

impl From<TaskStatus> for String {
    fn from(status: TaskStatus) -> Self {
        match status {
            TaskStatus::Unknown(raw) => raw,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One status answer: the state plus the engine's return code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanStatus {
    /// Current lifecycle state
    pub status: TaskStatus,
    /// `None` while running; 0 for success, non-zero for a failed scan
    pub retcode: Option<i64>,
}

impl ScanStatus {
    /// Whether this answer reports [`TaskStatus::Ready`].
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.status == TaskStatus::Ready
    }

    /// Whether this answer reports [`TaskStatus::Running`].
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.status == TaskStatus::Running
    }

    /// Whether this answer reports [`TaskStatus::Finished`].
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.status == TaskStatus::Finished
    }

    /// Finished with a zero return code.
    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.is_finished() && self.retcode == Some(0)
    }
}
