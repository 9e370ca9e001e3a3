//! Dataset records and the ingestion normalization pass.
//!
//! The backend has emitted records under several key conventions over time
//! (`CreatedAt`, `created_at`, `createdAt`, ...). [`normalize`] resolves each
//! field once, in a fixed order, into the canonical [`DatasetRecord`];
//! nothing downstream ever sees the raw shape.

use std::fmt;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

// ---------------------------------------------------------------------------
// Data type tag
// ---------------------------------------------------------------------------

/// Dataset category.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DataType {
    Physics,
    ComputerScience,
    /// Any tag the client does not know; kept verbatim.
    Other(String),
}

impl DataType {
    pub fn parse(tag: &str) -> Self {
        match tag {
            "physics" => Self::Physics,
            "computer_science" => Self::ComputerScience,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Physics => "physics",
            Self::ComputerScience => "computer_science",
            Self::Other(tag) => tag,
        }
    }

    /// Human label used on pages.
    pub fn label(&self) -> &str {
        match self {
            Self::Physics => "Physics",
            Self::ComputerScience => "Computer Science",
            Self::Other(tag) => tag,
        }
    }
}

impl Serialize for DataType {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Record
// ---------------------------------------------------------------------------

/// One normalized dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetRecord {
    pub id: String,
    pub title: String,
    pub description: String,
    pub data_type: DataType,
    /// Opaque payload driving chart selection.
    pub payload: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Lookup order per field; the first present, non-empty value wins.
const ID_KEYS: &[&str] = &["ID", "id"];
const TITLE_KEYS: &[&str] = &["Title", "title"];
const DESCRIPTION_KEYS: &[&str] = &["Description", "description"];
const DATA_TYPE_KEYS: &[&str] = &["DataType", "data_type", "dataType"];
const PAYLOAD_KEYS: &[&str] = &["Data", "data"];
const CREATED_AT_KEYS: &[&str] = &["CreatedAt", "created_at", "createdAt"];
const UPDATED_AT_KEYS: &[&str] = &["UpdatedAt", "updated_at", "updatedAt"];

/// Normalize one raw backend record.
pub fn normalize(raw: &Value) -> Result<DatasetRecord> {
    let obj = raw.as_object().context("record is not a JSON object")?;

    let id = first_present(obj, ID_KEYS)
        .map(value_to_string)
        .unwrap_or_default();
    let title = first_string(obj, TITLE_KEYS);
    let description = first_string(obj, DESCRIPTION_KEYS);
    let data_type = DataType::parse(&first_string(obj, DATA_TYPE_KEYS));
    let payload = first_present(obj, PAYLOAD_KEYS)
        .cloned()
        .unwrap_or(Value::Null);

    let created_at = first_present(obj, CREATED_AT_KEYS)
        .context("record has no creation timestamp")
        .and_then(parse_timestamp)
        .with_context(|| format!("record {id:?}: bad created_at"))?;
    let updated_at = first_present(obj, UPDATED_AT_KEYS)
        .context("record has no update timestamp")
        .and_then(parse_timestamp)
        .with_context(|| format!("record {id:?}: bad updated_at"))?;

    Ok(DatasetRecord {
        id,
        title,
        description,
        data_type,
        payload,
        created_at,
        updated_at,
    })
}

/// Normalize a whole list. Any bad record fails the list.
pub fn normalize_all(raw: &[Value]) -> Result<Vec<DatasetRecord>> {
    raw.iter()
        .enumerate()
        .map(|(i, r)| normalize(r).with_context(|| format!("record #{i}")))
        .collect()
}

fn first_present<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|k| obj.get(*k))
        .find(|v| !is_blank(v))
}

fn first_string(obj: &Map<String, Value>, keys: &[&str]) -> String {
    first_present(obj, keys)
        .map(value_to_string)
        .unwrap_or_default()
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Parse an RFC 3339 string, a naive `YYYY-MM-DDTHH:MM:SS[.f]` (UTC), or
/// epoch milliseconds.
pub fn parse_timestamp(value: &Value) -> Result<DateTime<Utc>> {
    match value {
        Value::String(s) => parse_timestamp_str(s),
        Value::Number(n) => {
            let millis = n.as_i64().context("timestamp is not an integer")?;
            Utc.timestamp_millis_opt(millis)
                .single()
                .with_context(|| format!("timestamp out of range: {millis}"))
        }
        other => anyhow::bail!("unsupported timestamp value: {other}"),
    }
}

fn parse_timestamp_str(s: &str) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(naive.and_utc());
        }
    }
    anyhow::bail!("unrecognized timestamp: {s:?}")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
