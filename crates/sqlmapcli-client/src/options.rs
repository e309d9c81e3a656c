//! Per-task scan option map.

use serde::{Deserialize, Serialize};
use sqlmapcli_core::OptionValue;
use std::collections::BTreeMap;

/// Option key holding the scan target.
pub const URL_KEY: &str = "url";

/// Caller-set sqlmap options for one task.
///
/// Sent verbatim as the body of `POST /scan/<taskid>/start`. Server-side
/// defaults are not included. The target url is always read back from the
/// map itself, so it reflects whichever call wrote `url` last.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Options(BTreeMap<String, OptionValue>);

impl Options {
    /// Create an empty option map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set one option, replacing any previous value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<OptionValue>) {
        self.0.insert(key.into(), value.into());
    }

    /// Builder form of [`Options::set`].
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<OptionValue>) -> Self {
        self.set(key, value);
        self
    }

    /// Merge `other` into this map; keys in `other` win.
    pub fn update(&mut self, other: Options) {
        self.0.extend(other.0);
    }

    /// Look up one option.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&OptionValue> {
        self.0.get(key)
    }

    /// The scan target, if one has been set.
    #[must_use]
    pub fn url(&self) -> Option<String> {
        self.0.get(URL_KEY).map(ToString::to_string)
    }

    /// Whether no option has been set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of options set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate options in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &OptionValue)> {
        self.0.iter()
    }
}

impl From<BTreeMap<String, OptionValue>> for Options {
    fn from(map: BTreeMap<String, OptionValue>) -> Self {
        Self(map)
    }
}

impl<K, V> FromIterator<(K, V)> for Options
where
    K: Into<String>,
    V: Into<OptionValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}
