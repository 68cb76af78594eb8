//! Live-schema metadata.
//!
//! Tables are discovered at runtime, so column metadata is carried as plain
//! strings exactly as MySQL reports them (`varchar(50)`, `decimal(10,2)`, ...)
//! and classified on demand.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static VARCHAR_LEN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"varchar\((\d+)\)").ok());

/// Table name → ordered column list.
pub type SchemaMap = BTreeMap<String, Vec<ColumnInfo>>;

/// One column of a live table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub name: String,
    /// Full SQL type, e.g. `varchar(50)` or `int unsigned`.
    pub column_type: String,
    pub nullable: bool,
    /// `PRI`, `UNI`, `MUL` or empty.
    pub key: String,
    pub default: Option<String>,
    /// e.g. `auto_increment`, `DEFAULT_GENERATED`.
    pub extra: String,
}

/// How user or generated input is coerced for a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Timestamp,
    Blob,
    Integer,
    Decimal,
    Date,
    Varchar(usize),
    Text,
}

impl ColumnInfo {
    /// Shorthand for tests and catalog code.
    #[must_use]
    pub fn new(name: &str, column_type: &str) -> Self {
        Self {
            name: name.to_string(),
            column_type: column_type.to_string(),
            nullable: true,
            key: String::new(),
            default: None,
            extra: String::new(),
        }
    }

    #[must_use]
    pub fn is_primary_key(&self) -> bool {
        self.key.eq_ignore_ascii_case("PRI")
    }

    #[must_use]
    pub fn is_auto_increment(&self) -> bool {
        self.extra.to_ascii_lowercase().contains("auto_increment")
    }

    /// NOT NULL columns that are not the primary key.
    #[must_use]
    pub fn is_required(&self) -> bool {
        !self.nullable && !self.is_primary_key()
    }

    #[must_use]
    pub fn is_blob(&self) -> bool {
        let lower = self.column_type.to_ascii_lowercase();
        lower.contains("blob") || lower.contains("binary")
    }

    /// Declared `varchar(N)` length, if any.
    #[must_use]
    pub fn varchar_len(&self) -> Option<usize> {
        varchar_len(&self.column_type)
    }

    /// Classify the column type. Checks run in a fixed order, so
    /// `timestamp` wins over `date` and `tinyint` is an integer.
    #[must_use]
    pub fn kind(&self) -> ColumnKind {
        let lower = self.column_type.to_ascii_lowercase();
        if lower.contains("timestamp") {
            ColumnKind::Timestamp
        } else if self.is_blob() {
            ColumnKind::Blob
        } else if lower.contains("int") {
            ColumnKind::Integer
        } else if lower.contains("decimal") || lower.contains("float") || lower.contains("double")
        {
            ColumnKind::Decimal
        } else if lower.contains("date") {
            ColumnKind::Date
        } else if let Some(len) = self.varchar_len() {
            ColumnKind::Varchar(len)
        } else {
            ColumnKind::Text
        }
    }

    /// Status tags shown next to a column: `PK`, `AI`, `REQUIRED`.
    #[must_use]
    pub fn flags(&self) -> Vec<&'static str> {
        let mut flags = Vec::new();
        if self.is_primary_key() {
            flags.push("PK");
        }
        if self.is_auto_increment() {
            flags.push("AI");
        }
        if self.is_required() {
            flags.push("REQUIRED");
        }
        flags
    }
}

/// Parse `varchar(N)` out of a SQL type string.
#[must_use]
pub fn varchar_len(column_type: &str) -> Option<usize> {
    let lower = column_type.to_ascii_lowercase();
    VARCHAR_LEN
        .as_ref()?
        .captures(&lower)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Truncate `value` to at most `max_chars` characters.
///
/// Returns `None` when the value already fits.
#[must_use]
pub fn truncate_chars(value: &str, max_chars: usize) -> Option<String> {
    if value.chars().count() <= max_chars {
        return None;
    }
    Some(value.chars().take(max_chars).collect())
}

/// Case-insensitive lookup from any spelling of a table name to its real name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableNames {
    by_lower: BTreeMap<String, String>,
}

impl TableNames {
    #[must_use]
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let by_lower = names
            .into_iter()
            .map(Into::into)
            .map(|name: String| (name.to_lowercase(), name))
            .collect();
        Self { by_lower }
    }

    /// Real table name for `name`, compared case-insensitively.
    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<&str> {
        self.by_lower
            .get(&name.trim().to_lowercase())
            .map(String::as_str)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.resolve(name).is_some()
    }

    /// Real names in lowercase-sorted order.
    pub fn real_names(&self) -> impl Iterator<Item = &str> {
        self.by_lower.values().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.by_lower.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_lower.is_empty()
    }
}
