//! Change record model.
//!
//! A [`Record`] is one change event delivered by the pipeline host. Its key
//! and payload arrive either already structured or as raw JSON bytes; both
//! are turned into a [`StructuredData`] map by [`RecordData::to_columns`].

use crate::values::Value;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

/// Metadata key whose value overrides the destination table of a record.
pub const METADATA_TABLE: &str = "table";

/// Metadata key whose value overrides the operation of a record.
pub const METADATA_ACTION: &str = "action";

/// Column name to value mapping, ordered by column name.
pub type StructuredData = BTreeMap<String, Value>;

/// Error type for decoding record data.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// Raw data is not valid JSON
    #[error("failed to unmarshal data into structured data: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// Raw data is valid JSON but not an object
    #[error("expected a JSON object, got {0}")]
    NotAnObject(&'static str),

    /// Operation tag is not one of create/update/delete/snapshot
    #[error("unknown operation '{0}'")]
    UnknownOperation(String),
}

/// Kind of change a record describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    /// A new row. Records without an operation are treated as creates.
    #[default]
    Create,
    /// A changed row
    Update,
    /// A removed row
    Delete,
    /// A row read during an initial snapshot
    Snapshot,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Create => write!(f, "create"),
            Self::Update => write!(f, "update"),
            Self::Delete => write!(f, "delete"),
            Self::Snapshot => write!(f, "snapshot"),
        }
    }
}

impl FromStr for Operation {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "create" => Ok(Self::Create),
            "update" => Ok(Self::Update),
            "delete" => Ok(Self::Delete),
            "snapshot" => Ok(Self::Snapshot),
            _ => Err(DecodeError::UnknownOperation(s.to_string())),
        }
    }
}

/// Key or payload data of a record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "serde_json::Value", into = "serde_json::Value")]
pub enum RecordData {
    /// Already decoded column map
    Structured(StructuredData),
    /// JSON-encoded bytes
    Raw(Vec<u8>),
}

impl Default for RecordData {
    fn default() -> Self {
        Self::Structured(StructuredData::new())
    }
}

impl RecordData {
    /// Create structured data from column/value pairs.
    pub fn structured<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        Self::Structured(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Create raw data from JSON bytes.
    pub fn raw(bytes: impl Into<Vec<u8>>) -> Self {
        Self::Raw(bytes.into())
    }

    /// Check if there is no data at all.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Structured(map) => map.is_empty(),
            Self::Raw(bytes) => bytes.is_empty(),
        }
    }

    /// Decode into a column map with lowercased column names.
    ///
    /// Empty raw data and a JSON `null` both decode to an empty map.
    pub fn to_columns(&self) -> Result<StructuredData, DecodeError> {
        match self {
            Self::Structured(map) => Ok(map
                .iter()
                .map(|(k, v)| (k.to_lowercase(), v.clone()))
                .collect()),
            Self::Raw(bytes) if bytes.is_empty() => Ok(StructuredData::new()),
            Self::Raw(bytes) => match serde_json::from_slice::<serde_json::Value>(bytes)? {
                serde_json::Value::Null => Ok(StructuredData::new()),
                serde_json::Value::Object(obj) => Ok(obj
                    .into_iter()
                    .map(|(k, v)| (k.to_lowercase(), Value::from(v)))
                    .collect()),
                other => Err(DecodeError::NotAnObject(json_kind(&other))),
            },
        }
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

// On the wire, objects are structured data and strings are raw JSON text.
impl TryFrom<serde_json::Value> for RecordData {
    type Error = DecodeError;

    fn try_from(value: serde_json::Value) -> Result<Self, Self::Error> {
        match value {
            serde_json::Value::Null => Ok(Self::default()),
            serde_json::Value::Object(obj) => Ok(Self::Structured(
                obj.into_iter().map(|(k, v)| (k, Value::from(v))).collect(),
            )),
            serde_json::Value::String(s) => Ok(Self::Raw(s.into_bytes())),
            other => Err(DecodeError::NotAnObject(json_kind(&other))),
        }
    }
}

impl From<RecordData> for serde_json::Value {
    fn from(data: RecordData) -> Self {
        match data {
            RecordData::Structured(map) => serde_json::Value::Object(
                map.into_iter()
                    .map(|(k, v)| (k, serde_json::Value::from(v)))
                    .collect(),
            ),
            RecordData::Raw(bytes) => {
                serde_json::Value::String(String::from_utf8_lossy(&bytes).into_owned())
            }
        }
    }
}

/// Row state before and after the change.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Payload {
    /// Previous row state, if the source provides it
    #[serde(default)]
    pub before: RecordData,

    /// New row state
    #[serde(default)]
    pub after: RecordData,
}

/// One change event from the pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Opaque source position, used for diagnostics only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,

    /// Kind of change
    #[serde(default)]
    pub operation: Operation,

    /// Per-record overrides such as the destination table
    #[serde(default)]
    pub metadata: HashMap<String, String>,

    /// Identifies the destination row; at most one column is supported
    #[serde(default)]
    pub key: RecordData,

    /// Row data
    #[serde(default)]
    pub payload: Payload,
}

impl Record {
    /// Create an empty record with the given operation.
    pub fn new(operation: Operation) -> Self {
        Self {
            operation,
            ..Self::default()
        }
    }

    /// Set the key data.
    pub fn with_key(mut self, key: RecordData) -> Self {
        self.key = key;
        self
    }

    /// Set the new row state.
    pub fn with_after(mut self, after: RecordData) -> Self {
        self.payload.after = after;
        self
    }

    /// Set the previous row state.
    pub fn with_before(mut self, before: RecordData) -> Self {
        self.payload.before = before;
        self
    }

    /// Add a metadata entry.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Set the source position.
    pub fn with_position(mut self, position: impl Into<String>) -> Self {
        self.position = Some(position.into());
        self
    }

    /// Table override from metadata, if any.
    pub fn table_override(&self) -> Option<&str> {
        self.metadata.get(METADATA_TABLE).map(String::as_str)
    }

    /// Action override from metadata, if any.
    pub fn action(&self) -> Option<&str> {
        self.metadata.get(METADATA_ACTION).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_from_str() {
        assert_eq!("create".parse::<Operation>().unwrap(), Operation::Create);
        assert_eq!("UPDATE".parse::<Operation>().unwrap(), Operation::Update);
        assert_eq!("delete".parse::<Operation>().unwrap(), Operation::Delete);
        assert_eq!("snapshot".parse::<Operation>().unwrap(), Operation::Snapshot);
        assert!(matches!(
            "upsert".parse::<Operation>(),
            Err(DecodeError::UnknownOperation(op)) if op == "upsert"
        ));
    }

    #[test]
    fn test_raw_payload_columns_are_lowercased() {
        let data = RecordData::raw(br#"{"ID":3,"NAME":"Anon"}"#.to_vec());
        let columns = data.to_columns().unwrap();

        let expected: StructuredData = [
            ("id".to_string(), Value::Int(3)),
            ("name".to_string(), Value::from("Anon")),
        ]
        .into_iter()
        .collect();
        assert_eq!(columns, expected);
    }

    #[test]
    fn test_structured_columns_are_lowercased() {
        let data = RecordData::structured([("UserId", Value::Int(1))]);
        let columns = data.to_columns().unwrap();
        assert_eq!(columns.get("userid"), Some(&Value::Int(1)));
    }

    #[test]
    fn test_empty_raw_data() {
        assert!(RecordData::raw(Vec::new()).to_columns().unwrap().is_empty());
        assert!(RecordData::raw(b"null".to_vec()).to_columns().unwrap().is_empty());
        assert!(RecordData::default().is_empty());
    }

    #[test]
    fn test_invalid_raw_data() {
        assert!(matches!(
            RecordData::raw(b"{not json".to_vec()).to_columns(),
            Err(DecodeError::InvalidJson(_))
        ));
        assert!(matches!(
            RecordData::raw(b"[1,2]".to_vec()).to_columns(),
            Err(DecodeError::NotAnObject("an array"))
        ));
    }

    #[test]
    fn test_record_from_json_line() {
        let line = r#"{
            "operation": "update",
            "metadata": {"table": "Users"},
            "key": {"id": 7},
            "payload": {"after": "{\"id\":7,\"name\":\"Bob\"}"}
        }"#;
        let record: Record = serde_json::from_str(line).unwrap();

        assert_eq!(record.operation, Operation::Update);
        assert_eq!(record.table_override(), Some("Users"));
        assert_eq!(record.key, RecordData::structured([("id", 7i64)]));
        assert_eq!(
            record.payload.after,
            RecordData::raw(br#"{"id":7,"name":"Bob"}"#.to_vec())
        );
        assert!(record.payload.before.is_empty());
    }

    #[test]
    fn test_record_defaults_to_create() {
        let record: Record = serde_json::from_str(r#"{"payload":{"after":{"a":1}}}"#).unwrap();
        assert_eq!(record.operation, Operation::Create);
        assert!(record.key.is_empty());
        assert!(record.action().is_none());
    }

    #[test]
    fn test_record_rejects_unknown_operation() {
        let result: Result<Record, _> = serde_json::from_str(r#"{"operation":"merge"}"#);
        assert!(result.is_err());
    }
}
