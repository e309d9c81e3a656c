//! Shared types used across the sqlmapcli crates.
//!
//! Identifiers issued by the remote service are opaque, but they are spliced
//! into URL paths (`/scan/<taskid>/start`), so the newtypes here reject
//! anything that would not survive as a single path segment.

use crate::error::CoreError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

fn is_path_segment(id: &str) -> bool {
    static SEGMENT_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex =
        SEGMENT_REGEX.get_or_init(|| Regex::new(r"^[A-Za-z0-9._-]+$").expect("valid regex"));
    regex.is_match(id) && id != "." && id != ".."
}

/// Server-issued task identifier.
///
/// Allocated by `GET /task/new` and immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TaskId(String);

impl TaskId {
    /// Create a new `TaskId` from a string.
    ///
    /// # Errors
    /// Returns error if the ID is empty or is not a single URL path segment.
    pub fn new(id: impl Into<String>) -> Result<Self, CoreError> {
        let id = id.into();
        if is_path_segment(&id) {
            Ok(Self(id))
        } else {
            Err(CoreError::Validation(format!(
                "invalid task ID: must be non-empty and contain only [A-Za-z0-9._-], got '{id}'"
            )))
        }
    }

    /// Get the inner string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for TaskId {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TaskId> for String {
    fn from(id: TaskId) -> Self {
        id.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Admin identifier scoping the list/flush endpoints.
///
/// Printed by `sqlmapapi -s` on startup (or configured in a proxy). It has
/// no relation to individual task identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AdminId(String);

impl AdminId {
    /// Create a new `AdminId` from a string.
    ///
    /// # Errors
    /// Returns error if the ID is empty or is not a single URL path segment.
    pub fn new(id: impl Into<String>) -> Result<Self, CoreError> {
        let id = id.into();
        if is_path_segment(&id) {
            Ok(Self(id))
        } else {
            Err(CoreError::Validation(format!(
                "invalid admin ID: must be non-empty and contain only [A-Za-z0-9._-], got '{id}'"
            )))
        }
    }

    /// Get the inner string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for AdminId {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<AdminId> for String {
    fn from(id: AdminId) -> Self {
        id.0
    }
}

impl fmt::Display for AdminId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of the scan engine process behind a started task.
///
/// sqlmapapi reports the engine's process id as a number; proxies may send a
/// string. Only used for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "RawEngineId", into = "String")]
pub struct EngineId(String);

impl EngineId {
    /// Create a new `EngineId`.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the inner string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawEngineId {
    Number(i64),
    Text(String),
}

impl From<RawEngineId> for EngineId {
    fn from(raw: RawEngineId) -> Self {
        match raw {
            RawEngineId::Number(n) => Self(n.to_string()),
            RawEngineId::Text(s) => Self(s),
        }
    }
}

impl From<EngineId> for String {
    fn from(id: EngineId) -> Self {
        id.0
    }
}

impl fmt::Display for EngineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single scan option value.
///
/// sqlmap options are flat scalars: flags, counts, levels and strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    /// Boolean flag (e.g. `batch`)
    Bool(bool),
    /// Integer setting (e.g. `level`, `risk`)
    Integer(i64),
    /// Floating point setting (e.g. `delay`)
    Float(f64),
    /// String setting (e.g. `url`, `dbms`)
    Text(String),
}

impl OptionValue {
    /// Parse a value from command-line text.
    ///
    /// `true`/`false` become booleans, then integers and floats are tried,
    /// and anything else is kept as text.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw {
            "true" => return Self::Bool(true),
            "false" => return Self::Bool(false),
            _ => {}
        }
        if let Ok(n) = raw.parse::<i64>() {
            return Self::Integer(n);
        }
        if let Ok(f) = raw.parse::<f64>() {
            if f.is_finite() {
                return Self::Float(f);
            }
        }
        Self::Text(raw.to_string())
    }

    /// Borrow the string payload, if this is a text value.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Integer(n) => write!(f, "{n}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<bool> for OptionValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for OptionValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for OptionValue {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<u32> for OptionValue {
    fn from(value: u32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<f64> for OptionValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}
