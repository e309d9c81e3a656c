//! Injection points and the techniques confirmed against them.

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::BTreeMap;

/// One injectable parameter found by the scan.
#[derive(Debug, Clone, PartialEq)]
pub struct InjectionPoint {
    /// Where the parameter lives (`GET`, `POST`, `Cookie`, ...)
    pub place: String,
    /// Parameter name
    pub parameter: String,
    /// Parameter type code (1 = numeric, 2 = single-quoted string, ...)
    pub ptype: Option<i64>,
    /// Payload prefix
    pub prefix: String,
    /// Payload suffix
    pub suffix: String,
    /// SQL clause codes where the injection applies
    pub clause: Vec<i64>,
    /// Identified back-end DBMS names
    pub dbms: Vec<String>,
    /// Identified DBMS version constraints
    pub dbms_version: Vec<String>,
    /// Identified operating system
    pub os: Option<String>,
    /// Confirmed techniques, ordered by technique id
    pub techniques: Vec<Technique>,
}

impl InjectionPoint {
    /// Decode a content value as a list of injection points.
    ///
    /// Returns `None` when the value does not have that shape, so callers
    /// can keep it as raw JSON instead.
    #[must_use]
    pub fn decode_list(value: &Value) -> Option<Vec<Self>> {
        let items = value.as_array()?;
        let looks_like_injections = !items.is_empty()
            && items
                .iter()
                .all(|item| item.get("place").is_some() && item.get("data").is_some());
        if !looks_like_injections {
            return None;
        }

        let raw: Vec<RawInjection> = serde_json::from_value(value.clone()).ok()?;
        Some(raw.into_iter().map(Self::from).collect())
    }

    /// Human readable DBMS line, e.g. `MySQL > 5.0.11`.
    #[must_use]
    pub fn dbms_label(&self) -> Option<String> {
        if self.dbms.is_empty() {
            return None;
        }
        let mut label = self.dbms.join(", ");
        if !self.dbms_version.is_empty() {
            label.push(' ');
            label.push_str(&self.dbms_version.join(", "));
        }
        Some(label)
    }
}

/// A confirmed injection technique, tagged by sqlmap's technique id.
#[derive(Debug, Clone, PartialEq)]
pub enum Technique {
    /// Boolean-based blind (id 1)
    BooleanBlind(TechniqueDetail),
    /// Error-based (id 2)
    ErrorBased(TechniqueDetail),
    /// UNION query (id 3)
    UnionQuery(TechniqueDetail),
    /// Stacked queries (id 4)
    Stacked(TechniqueDetail),
    /// Time-based blind (id 5)
    TimeBlind(TechniqueDetail),
    /// Inline query (id 6)
    InlineQuery(TechniqueDetail),
    /// Any other technique id
    Unknown {
        /// Technique id as reported
        id: u8,
        /// Technique details
        detail: TechniqueDetail,
    },
}

impl Technique {
    /// Build the variant matching a technique id.
    #[must_use]
    pub fn from_id(id: u8, detail: TechniqueDetail) -> Self {
        match id {
            1 => Self::BooleanBlind(detail),
            2 => Self::ErrorBased(detail),
            3 => Self::UnionQuery(detail),
            4 => Self::Stacked(detail),
            5 => Self::TimeBlind(detail),
            6 => Self::InlineQuery(detail),
            id => Self::Unknown { id, detail },
        }
    }

    /// sqlmap technique id.
    #[must_use]
    pub fn id(&self) -> u8 {
        match self {
            Self::BooleanBlind(_) => 1,
            Self::ErrorBased(_) => 2,
            Self::UnionQuery(_) => 3,
            Self::Stacked(_) => 4,
            Self::TimeBlind(_) => 5,
            Self::InlineQuery(_) => 6,
            Self::Unknown { id, .. } => *id,
        }
    }

    /// Short technique name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::BooleanBlind(_) => "boolean-based blind",
            Self::ErrorBased(_) => "error-based",
            Self::UnionQuery(_) => "UNION query",
            Self::Stacked(_) => "stacked queries",
            Self::TimeBlind(_) => "time-based blind",
            Self::InlineQuery(_) => "inline query",
            Self::Unknown { .. } => "unknown technique",
        }
    }

    /// Details of the confirmed payload.
    #[must_use]
    pub fn detail(&self) -> &TechniqueDetail {
        match self {
            Self::BooleanBlind(d)
            | Self::ErrorBased(d)
            | Self::UnionQuery(d)
            | Self::Stacked(d)
            | Self::TimeBlind(d)
            | Self::InlineQuery(d)
            | Self::Unknown { detail: d, .. } => d,
        }
    }
}

/// Payload details for one technique.
#[derive(Debug, Clone, PartialEq)]
pub struct TechniqueDetail {
    /// Test title, e.g. `AND boolean-based blind - WHERE or HAVING clause`
    pub title: String,
    /// Working payload
    pub payload: String,
    /// Injection vector template
    pub vector: Vector,
    /// Where the payload is placed (1 = original value, 2 = negative, 3 = replace)
    pub where_: Option<i64>,
    /// Trailing comment used by the payload
    pub comment: String,
}

/// Injection vector as sent by sqlmap.
#[derive(Debug, Clone, PartialEq)]
pub enum Vector {
    /// Template string, e.g. `AND [INFERENCE]`
    Template(String),
    /// UNION vector: position, column count, comment, prefix, suffix, char, where, ...
    Union(Vec<Value>),
    /// Any other shape
    Other(Value),
    /// No vector reported
    Missing,
}

impl From<Value> for Vector {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Missing,
            Value::String(s) => Self::Template(s),
            Value::Array(items) => Self::Union(items),
            other => Self::Other(other),
        }
    }
}

#[derive(Deserialize)]
struct RawInjection {
    place: String,
    parameter: String,
    #[serde(default)]
    ptype: Option<i64>,
    #[serde(default, deserialize_with = "null_as_empty")]
    prefix: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    suffix: String,
    #[serde(default, deserialize_with = "int_list")]
    clause: Vec<i64>,
    #[serde(default, deserialize_with = "string_or_list")]
    dbms: Vec<String>,
    #[serde(default, deserialize_with = "string_or_list")]
    dbms_version: Vec<String>,
    #[serde(default)]
    os: Option<String>,
    data: BTreeMap<String, RawTechnique>,
}

#[derive(Deserialize)]
struct RawTechnique {
    #[serde(default, deserialize_with = "null_as_empty")]
    title: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    payload: String,
    #[serde(default)]
    vector: Value,
    #[serde(default, rename = "where")]
    where_: Option<i64>,
    #[serde(default, deserialize_with = "null_as_empty")]
    comment: String,
}

impl From<RawInjection> for InjectionPoint {
    fn from(raw: RawInjection) -> Self {
        let mut techniques: Vec<Technique> = raw
            .data
            .into_iter()
            .filter_map(|(id, t)| {
                let id = id.parse::<u8>().ok()?;
                Some(Technique::from_id(
                    id,
                    TechniqueDetail {
                        title: t.title,
                        payload: t.payload,
                        vector: Vector::from(t.vector),
                        where_: t.where_,
                        comment: t.comment,
                    },
                ))
            })
            .collect();
        techniques.sort_by_key(Technique::id);

        Self {
            place: raw.place,
            parameter: raw.parameter,
            ptype: raw.ptype,
            prefix: raw.prefix,
            suffix: raw.suffix,
            clause: raw.clause,
            dbms: raw.dbms,
            dbms_version: raw.dbms_version,
            os: raw.os,
            techniques,
        }
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn string_or_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => vec![s],
        Value::Array(items) => items
            .into_iter()
            .filter_map(|v| match v {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    })
}

fn int_list<'de, D>(deserializer: D) -> Result<Vec<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items.iter().filter_map(Value::as_i64).collect(),
        Value::Number(n) => n.as_i64().into_iter().collect(),
        _ => Vec::new(),
    })
}
