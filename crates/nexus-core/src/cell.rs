//! Dynamic cell values exchanged with MySQL.
//!
//! The program never knows its tables at compile time: every row is read as a
//! list of [`CellValue`]s keyed by the column names the server reports, and
//! every insert binds [`CellValue`]s built from JSON or from user input.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Serialize, Serializer};
use serde_json::{Map, Number, Value};

/// A single SQL value.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Null,
    Int(i64),
    UInt(u64),
    Float(f64),
    /// DECIMAL columns are kept as their exact textual form.
    Decimal(String),
    Text(String),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    /// TIME columns, kept textual (`HH:MM:SS`).
    Time(String),
    Bytes(Vec<u8>),
}

impl CellValue {
    /// Convert a JSON value (seed files, LLM output) into a bindable cell.
    ///
    /// Booleans become `0`/`1`; arrays and objects are bound as their JSON text.
    #[must_use]
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(flag) => Self::Int(i64::from(*flag)),
            Value::Number(number) => number
                .as_i64()
                .map(Self::Int)
                .or_else(|| number.as_u64().map(Self::UInt))
                .or_else(|| number.as_f64().map(Self::Float))
                .unwrap_or(Self::Null),
            Value::String(text) => Self::Text(text.clone()),
            other => Self::Text(other.to_string()),
        }
    }

    /// JSON view of the cell. BLOBs are summarised as `<BLOB:Nbytes>`.
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::Int(v) => Value::from(*v),
            Self::UInt(v) => Value::from(*v),
            Self::Float(v) => Number::from_f64(*v).map_or(Value::Null, Value::Number),
            Self::Decimal(text) => text
                .parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .map_or_else(|| Value::String(text.clone()), Value::Number),
            Self::Text(text) | Self::Time(text) => Value::String(text.clone()),
            Self::Date(date) => Value::String(date.format("%Y-%m-%d").to_string()),
            Self::DateTime(dt) => Value::String(dt.format("%Y-%m-%d %H:%M:%S").to_string()),
            Self::Bytes(bytes) => Value::String(blob_label(bytes.len())),
        }
    }

    /// Numeric view, used for chart values and FK ids.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            #[allow(clippy::cast_precision_loss)]
            Self::Int(v) => Some(*v as f64),
            #[allow(clippy::cast_precision_loss)]
            Self::UInt(v) => Some(*v as f64),
            Self::Float(v) => Some(*v),
            Self::Decimal(text) | Self::Text(text) => text.trim().parse().ok(),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("NULL"),
            Self::Int(v) => write!(f, "{v}"),
            Self::UInt(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Decimal(text) | Self::Text(text) | Self::Time(text) => f.write_str(text),
            Self::Date(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            Self::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
            Self::Bytes(bytes) => f.write_str(&blob_label(bytes.len())),
        }
    }
}

impl Serialize for CellValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

fn blob_label(len: usize) -> String {
    format!("<BLOB:{len}bytes>")
}

/// Column names plus the rows a statement returned.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl QueryResult {
    #[must_use]
    pub const fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column, compared case-insensitively.
    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|column| column.eq_ignore_ascii_case(name))
    }

    /// Rows as JSON objects keyed by column name.
    #[must_use]
    pub fn to_records(&self) -> Vec<Map<String, Value>> {
        self.rows
            .iter()
            .map(|row| {
                self.columns
                    .iter()
                    .zip(row)
                    .map(|(column, cell)| (column.clone(), cell.to_json()))
                    .collect()
            })
            .collect()
    }

    /// Rows rendered as display strings (for table output).
    #[must_use]
    pub fn to_string_rows(&self) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|row| row.iter().map(ToString::to_string).collect())
            .collect()
    }

    /// Keep at most `limit` rows, returning how many were dropped.
    pub fn truncate(&mut self, limit: usize) -> usize {
        let dropped = self.rows.len().saturating_sub(limit);
        self.rows.truncate(limit);
        dropped
    }
}

impl Serialize for QueryResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_records().serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn json_numbers_keep_integer_identity() {
        assert_eq!(CellValue::from_json(&json!(42)), CellValue::Int(42));
        assert_eq!(CellValue::from_json(&json!(15000.5)), CellValue::Float(15000.5));
        assert_eq!(CellValue::from_json(&json!(true)), CellValue::Int(1));
        assert_eq!(CellValue::from_json(&json!(null)), CellValue::Null);
    }

    #[test]
    fn nested_json_is_bound_as_text() {
        let cell = CellValue::from_json(&json!({"a": 1}));
        assert_eq!(cell, CellValue::Text(String::from("{\"a\":1}")));
    }

    #[test]
    fn blobs_are_summarised() {
        let cell = CellValue::Bytes(vec![0; 2048]);
        assert_eq!(cell.to_string(), "<BLOB:2048bytes>");
        assert_eq!(cell.to_json(), json!("<BLOB:2048bytes>"));
    }

    #[test]
    fn decimals_render_as_numbers_in_json() {
        let cell = CellValue::Decimal(String::from("1234.50"));
        assert_eq!(cell.to_json(), json!(1234.5));
        assert_eq!(cell.to_string(), "1234.50");
        assert_eq!(cell.as_f64(), Some(1234.5));
    }

    #[test]
    fn dates_use_iso_format() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).expect("valid date");
        assert_eq!(CellValue::Date(date).to_string(), "2024-03-09");
        let dt = date.and_hms_opt(8, 5, 0).expect("valid time");
        assert_eq!(CellValue::DateTime(dt).to_json(), json!("2024-03-09 08:05:00"));
    }

    #[test]
    fn query_result_converts_to_records() {
        let mut result = QueryResult {
            columns: vec![String::from("ID_Proj"), String::from("Nome")],
            rows: vec![
                vec![CellValue::Int(1), CellValue::Text(String::from("Aves"))],
                vec![CellValue::Int(2), CellValue::Null],
            ],
        };

        let records = result.to_records();
        assert_eq!(records[0]["Nome"], json!("Aves"));
        assert_eq!(records[1]["Nome"], json!(null));
        assert_eq!(result.column_index("nome"), Some(1));

        assert_eq!(result.truncate(1), 1);
        assert_eq!(result.len(), 1);
    }
}
