use std::fmt;
use std::hash::{Hash, Hasher};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Identifier of a record as assigned by the server.
///
/// Backends disagree on whether ids are numbers or strings. Two ids are equal
/// when their textual forms are equal, so `5` and `"5"` name the same record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Int(i64),
    Text(String),
}

impl RecordId {
    /// Canonical textual form, used in URLs and persisted bookmark sets.
    pub fn as_key(&self) -> String {
        self.to_string()
    }

    /// Parses a path segment, keeping integers as integers.
    pub fn parse(raw: &str) -> Self {
        match raw.parse::<i64>() {
            Ok(n) => RecordId::Int(n),
            Err(_) => RecordId::Text(raw.to_string()),
        }
    }

    /// Reads an id from a JSON value (number or string).
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_i64().map(RecordId::Int),
            Value::String(s) => Some(RecordId::Text(s.clone())),
            _ => None,
        }
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Int(n) => write!(f, "{}", n),
            RecordId::Text(s) => write!(f, "{}", s),
        }
    }
}

impl PartialEq for RecordId {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (RecordId::Int(a), RecordId::Int(b)) => a == b,
            (RecordId::Text(a), RecordId::Text(b)) => a == b,
            _ => self.as_key() == other.as_key(),
        }
    }
}

impl Eq for RecordId {}

impl Hash for RecordId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_key().hash(state);
    }
}

impl From<i64> for RecordId {
    fn from(n: i64) -> Self {
        RecordId::Int(n)
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        RecordId::Text(s.to_string())
    }
}

impl From<String> for RecordId {
    fn from(s: String) -> Self {
        RecordId::Text(s)
    }
}

/// A domain entity cached client-side.
pub trait Record: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Stable unique identifier within a collection.
    fn id(&self) -> RecordId;

    /// Text of a named display field, for the local filter engine.
    fn field(&self, name: &str) -> Option<&str>;
}

/// Applies `patch` on top of `record`, treating both as JSON objects.
///
/// Keys present in the patch replace the record's keys. The merged value must
/// still deserialize as `R`; the input record is never modified.
pub fn merge_fields<R: Record>(record: &R, patch: &Value) -> Result<R, serde_json::Error> {
    let mut current = serde_json::to_value(record)?;
    if let (Value::Object(target), Value::Object(changes)) = (&mut current, patch) {
        for (key, value) in changes {
            target.insert(key.clone(), value.clone());
        }
    }
    serde_json::from_value(current)
}
