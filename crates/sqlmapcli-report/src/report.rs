//! Scan data entries and the report built from them.

use crate::error::{ReportError, Result};
use crate::injection::{InjectionPoint, Technique};
use serde::Deserialize;
use serde_json::Value;

/// Content type id of injection findings.
pub const TECHNIQUES_TYPE: u32 = 0;

/// Collection state of one content entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentStatus {
    /// Still being collected (0)
    InProgress,
    /// Fully collected (1)
    Complete,
    /// Any other code
    Other(i64),
}

impl From<i64> for ContentStatus {
    fn from(code: i64) -> Self {
        match code {
            0 => Self::InProgress,
            1 => Self::Complete,
            other => Self::Other(other),
        }
    }
}

/// Decoded entry value.
#[derive(Debug, Clone, PartialEq)]
pub enum ReportValue {
    /// Injection findings
    Injections(Vec<InjectionPoint>),
    /// Anything else, kept as returned
    Raw(Value),
}

/// One entry of the scan data list.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportEntry {
    /// Collection state
    pub status: ContentStatus,
    /// sqlmap content type id
    pub content_type: u32,
    /// Entry payload
    pub value: ReportValue,
}

#[derive(Deserialize)]
struct RawEntry {
    #[serde(default)]
    status: Option<i64>,
    #[serde(rename = "type")]
    content_type: u32,
    #[serde(default)]
    value: Value,
}

impl From<RawEntry> for ReportEntry {
    fn from(raw: RawEntry) -> Self {
        let value = match InjectionPoint::decode_list(&raw.value) {
            Some(points) => ReportValue::Injections(points),
            None => ReportValue::Raw(raw.value),
        };
        Self {
            status: raw.status.map_or(ContentStatus::Complete, ContentStatus::from),
            content_type: raw.content_type,
            value,
        }
    }
}

/// Counts describing a report at a glance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReportSummary {
    /// Number of content entries
    pub entries: usize,
    /// Number of injectable parameters
    pub injection_points: usize,
    /// Number of confirmed techniques over all parameters
    pub techniques: usize,
    /// Entries still in progress
    pub incomplete: usize,
}

/// Typed view of the data returned for a finished scan.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Report {
    entries: Vec<ReportEntry>,
}

impl Report {
    /// Decode the `data` value of a scan result.
    ///
    /// `null` is treated as an empty report.
    pub fn from_data(data: &Value) -> Result<Self> {
        let items = match data {
            Value::Null => return Ok(Self::default()),
            Value::Array(items) => items,
            Value::Bool(_) => return Err(ReportError::NotAList("a boolean")),
            Value::Number(_) => return Err(ReportError::NotAList("a number")),
            Value::String(_) => return Err(ReportError::NotAList("a string")),
            Value::Object(_) => return Err(ReportError::NotAList("an object")),
        };

        let entries = items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                RawEntry::deserialize(item)
                    .map(ReportEntry::from)
                    .map_err(|source| ReportError::MalformedEntry { index, source })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { entries })
    }

    /// All entries in server order.
    #[must_use]
    pub fn entries(&self) -> &[ReportEntry] {
        &self.entries
    }

    /// Whether the scan confirmed at least one injection.
    #[must_use]
    pub fn is_vulnerable(&self) -> bool {
        self.injection_points().next().is_some()
    }

    /// Every injection point over all entries.
    pub fn injection_points(&self) -> impl Iterator<Item = &InjectionPoint> {
        self.entries.iter().flat_map(|entry| match &entry.value {
            ReportValue::Injections(points) => points.as_slice(),
            ReportValue::Raw(_) => &[][..],
        })
    }

    /// Raw values of non-injection entries with the given content type.
    pub fn raw_values(&self, content_type: u32) -> impl Iterator<Item = &Value> {
        self.entries
            .iter()
            .filter(move |entry| entry.content_type == content_type)
            .filter_map(|entry| match &entry.value {
                ReportValue::Raw(value) => Some(value),
                ReportValue::Injections(_) => None,
            })
    }

    /// Summary counts.
    #[must_use]
    pub fn summary(&self) -> ReportSummary {
        ReportSummary {
            entries: self.entries.len(),
            injection_points: self.injection_points().count(),
            techniques: self
                .injection_points()
                .map(|point| point.techniques.len())
                .sum(),
            incomplete: self
                .entries
                .iter()
                .filter(|entry| entry.status == ContentStatus::InProgress)
                .count(),
        }
    }

    /// Distinct technique names confirmed anywhere in the report.
    #[must_use]
    pub fn technique_names(&self) -> Vec<&'static str> {
        let mut ids: Vec<&Technique> = self
            .injection_points()
            .flat_map(|point| point.techniques.iter())
            .collect();
        ids.sort_by_key(|t| t.id());
        ids.dedup_by_key(|t| t.id());
        ids.into_iter().map(Technique::name).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn scan_data() -> Value {
        json!([
            {
                "status": 1,
                "type": 0,
                "value": [{
                    "place": "GET",
                    "parameter": "id",
                    "ptype": 1,
                    "prefix": "",
                    "suffix": "",
                    "clause": [1],
                    "dbms": "MySQL",
                    "dbms_version": ["> 5.0.11"],
                    "os": null,
                    "data": {
                        "1": {
                            "title": "AND boolean-based blind - WHERE or HAVING clause",
                            "vector": "AND [INFERENCE]",
                            "where": 1,
                            "payload": "id=1 AND 6981=6981",
                            "comment": ""
                        },
                        "5": {
                            "title": "MySQL > 5.0.11 AND time-based blind",
                            "vector": "AND [RANDNUM]=IF(([INFERENCE]),SLEEP([SLEEPTIME]),[RANDNUM])",
                            "where": 1,
                            "payload": "id=1 AND SLEEP([SLEEPTIME])",
                            "comment": ""
                        }
                    }
                }]
            },
            {"status": 1, "type": 2, "value": "5.5.62-0ubuntu0.14.04.1"},
            {"status": 0, "type": 3, "value": "root@localhost"}
        ])
    }

    #[test]
    fn test_from_data() {
        let report = Report::from_data(&scan_data()).expect("valid report");
        assert_eq!(report.entries().len(), 3);
        assert!(report.is_vulnerable());

        let entry = &report.entries()[0];
        assert_eq!(entry.status, ContentStatus::Complete);
        assert_eq!(entry.content_type, TECHNIQUES_TYPE);
        assert!(matches!(&entry.value, ReportValue::Injections(points) if points.len() == 1));

        assert_eq!(report.entries()[2].status, ContentStatus::InProgress);
        let banner: Vec<&Value> = report.raw_values(2).collect();
        assert_eq!(banner, vec![&json!("5.5.62-0ubuntu0.14.04.1")]);
    }

    #[test]
    fn test_summary() {
        let report = Report::from_data(&scan_data()).expect("valid report");
        assert_eq!(
            report.summary(),
            ReportSummary {
                entries: 3,
                injection_points: 1,
                techniques: 2,
                incomplete: 1,
            }
        );
        assert_eq!(
            report.technique_names(),
            vec!["boolean-based blind", "time-based blind"]
        );
    }

    #[test]
    fn test_null_and_empty_data() {
        let report = Report::from_data(&Value::Null).expect("null is empty");
        assert!(report.entries().is_empty());
        assert!(!report.is_vulnerable());

        let report = Report::from_data(&json!([])).expect("empty list");
        assert_eq!(report.summary(), ReportSummary::default());
    }

    #[test]
    fn test_rejects_non_list() {
        let err = Report::from_data(&json!({"type": 0})).expect_err("object is not a list");
        assert!(matches!(err, ReportError::NotAList("an object")));
    }

    #[test]
    fn test_rejects_malformed_entry() {
        let err = Report::from_data(&json!([{"status": 1, "type": 1, "value": 1}, {"value": 2}]))
            .expect_err("entry without type");
        assert!(matches!(err, ReportError::MalformedEntry { index: 1, .. }));
    }

    #[test]
    fn test_unknown_status_code() {
        let report = Report::from_data(&json!([{"status": 7, "type": 4, "value": true}]))
            .expect("valid report");
        assert_eq!(report.entries()[0].status, ContentStatus::Other(7));
    }
}
