//! The `{"registros": [...]}` envelope shared by seed files and LLM replies.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::CoreError;

/// Envelope key holding the record list.
pub const RECORDS_KEY: &str = "registros";

/// One row keyed by column name.
pub type Record = Map<String, Value>;

/// A list of generated or seeded rows for one table.
///
/// Items are kept as raw JSON so callers can report entries that are not
/// objects instead of failing the whole batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordBatch {
    #[serde(rename = "registros")]
    pub records: Vec<Value>,
}

impl RecordBatch {
    #[must_use]
    pub fn from_records(records: Vec<Record>) -> Self {
        Self {
            records: records.into_iter().map(Value::Object).collect(),
        }
    }

    /// Extract the batch from a parsed JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidBatch`] if the document is not an object,
    /// has no `registros` key, or `registros` is not an array.
    pub fn from_value(value: Value) -> Result<Self, CoreError> {
        let Value::Object(mut map) = value else {
            return Err(CoreError::InvalidBatch(String::from(
                "expected a JSON object",
            )));
        };
        match map.remove(RECORDS_KEY) {
            Some(Value::Array(records)) => Ok(Self { records }),
            Some(other) => Err(CoreError::InvalidBatch(format!(
                "'{RECORDS_KEY}' must be an array, got {}",
                json_kind(&other)
            ))),
            None => Err(CoreError::InvalidBatch(format!(
                "JSON must contain the '{RECORDS_KEY}' key"
            ))),
        }
    }

    /// Parse a JSON document and extract the batch.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidBatch`] on malformed JSON or a wrong shape.
    pub fn from_json_str(text: &str) -> Result<Self, CoreError> {
        let value: Value = serde_json::from_str(text)
            .map_err(|error| CoreError::InvalidBatch(format!("invalid JSON: {error}")))?;
        Self::from_value(value)
    }

    /// Object entries only; anything else is skipped.
    #[must_use]
    pub fn objects(&self) -> Vec<Record> {
        self.records
            .iter()
            .filter_map(Value::as_object)
            .cloned()
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
