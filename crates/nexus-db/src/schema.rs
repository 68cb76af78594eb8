//! Live-schema discovery through `information_schema`.
//!
//! Text columns of `information_schema` are cast to `CHAR` because some
//! server versions report them as binary strings.

use std::sync::LazyLock;

use nexus_core::{ColumnInfo, SchemaMap, TableNames};
use regex::Regex;
use serde::Serialize;

use crate::NexusDb;
use crate::error::DatabaseError;

static CHECK_IN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?is)`(\w+)`\s+in\s*\((.*?)\)").ok());

static QUOTED: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"'([^']+)'").ok());

/// A CHECK constraint of one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckConstraint {
    pub name: String,
    pub clause: String,
}

impl CheckConstraint {
    /// `(column, allowed values)` pairs found in the clause.
    #[must_use]
    pub fn allowed_values(&self) -> Vec<(String, Vec<String>)> {
        parse_check_values(&self.clause)
    }
}

/// Parse every `` `col` in ('a','b') `` group of a CHECK clause.
#[must_use]
pub fn parse_check_values(clause: &str) -> Vec<(String, Vec<String>)> {
    let (Some(check_in), Some(quoted)) = (CHECK_IN.as_ref(), QUOTED.as_ref()) else {
        return Vec::new();
    };
    check_in
        .captures_iter(clause)
        .filter_map(|caps| {
            let column = caps.get(1)?.as_str().to_string();
            let values = quoted
                .captures_iter(caps.get(2)?.as_str())
                .filter_map(|v| v.get(1).map(|m| m.as_str().to_string()))
                .collect::<Vec<_>>();
            (!values.is_empty()).then_some((column, values))
        })
        .collect()
}

impl NexusDb {
    /// Base tables of the current database, sorted by name.
    pub async fn list_tables(&self) -> Result<Vec<String>, DatabaseError> {
        let names = sqlx::query_scalar::<_, String>(
            "SELECT CAST(TABLE_NAME AS CHAR) FROM information_schema.TABLES
             WHERE TABLE_SCHEMA = DATABASE() AND TABLE_TYPE = 'BASE TABLE'
             ORDER BY TABLE_NAME",
        )
        .fetch_all(self.pool())
        .await?;
        Ok(names)
    }

    /// Case-insensitive name map of the live tables.
    pub async fn table_names(&self) -> Result<TableNames, DatabaseError> {
        Ok(TableNames::from_names(self.list_tables().await?))
    }

    /// Real name of `table`, compared case-insensitively.
    ///
    /// # Errors
    ///
    /// `DatabaseError::TableNotFound` when no live table matches.
    pub async fn resolve_table(&self, table: &str) -> Result<String, DatabaseError> {
        self.table_names()
            .await?
            .resolve(table)
            .map(ToString::to_string)
            .ok_or_else(|| DatabaseError::TableNotFound(table.to_string()))
    }

    /// Columns of one table in ordinal order.
    pub async fn columns(&self, table: &str) -> Result<Vec<ColumnInfo>, DatabaseError> {
        let rows = sqlx::query_as::<_, (String, String, String, String, Option<String>, String)>(
            "SELECT CAST(COLUMN_NAME AS CHAR), CAST(COLUMN_TYPE AS CHAR),
                    CAST(IS_NULLABLE AS CHAR), CAST(COLUMN_KEY AS CHAR),
                    CAST(COLUMN_DEFAULT AS CHAR), CAST(EXTRA AS CHAR)
             FROM information_schema.COLUMNS
             WHERE TABLE_SCHEMA = DATABASE() AND TABLE_NAME = ?
             ORDER BY ORDINAL_POSITION",
        )
        .bind(table)
        .fetch_all(self.pool())
        .await?;

        Ok(rows
            .into_iter()
            .map(|(name, column_type, nullable, key, default, extra)| ColumnInfo {
                name,
                column_type,
                nullable: nullable.eq_ignore_ascii_case("YES"),
                key,
                default,
                extra,
            })
            .collect())
    }

    /// Every live table with its columns.
    pub async fn schema_info(&self) -> Result<SchemaMap, DatabaseError> {
        let mut schema = SchemaMap::new();
        for table in self.list_tables().await? {
            let columns = self.columns(&table).await?;
            schema.insert(table, columns);
        }
        Ok(schema)
    }

    /// CHECK constraints declared on `table` in the current database.
    pub async fn check_constraints(
        &self,
        table: &str,
    ) -> Result<Vec<CheckConstraint>, DatabaseError> {
        let rows = sqlx::query_as::<_, (String, String)>(
            "SELECT CAST(cc.CONSTRAINT_NAME AS CHAR), CAST(cc.CHECK_CLAUSE AS CHAR)
             FROM information_schema.CHECK_CONSTRAINTS cc
             JOIN information_schema.TABLE_CONSTRAINTS tc
               ON cc.CONSTRAINT_SCHEMA = tc.CONSTRAINT_SCHEMA
              AND cc.CONSTRAINT_NAME = tc.CONSTRAINT_NAME
             WHERE tc.TABLE_SCHEMA = DATABASE()
               AND tc.TABLE_NAME = ?
               AND tc.CONSTRAINT_TYPE = 'CHECK'",
        )
        .bind(table)
        .fetch_all(self.pool())
        .await?;

        Ok(rows
            .into_iter()
            .map(|(name, clause)| CheckConstraint { name, clause })
            .collect())
    }

    /// First primary-key column of `table`, if any.
    pub async fn primary_key(&self, table: &str) -> Result<Option<String>, DatabaseError> {
        let key = sqlx::query_scalar::<_, String>(
            "SELECT CAST(COLUMN_NAME AS CHAR) FROM information_schema.COLUMNS
             WHERE TABLE_SCHEMA = DATABASE() AND TABLE_NAME = ? AND COLUMN_KEY = 'PRI'
             ORDER BY ORDINAL_POSITION LIMIT 1",
        )
        .bind(table)
        .fetch_optional(self.pool())
        .await?;
        Ok(key)
    }
}
