//! Inserts from record batches, manual CRUD, and row sampling.

use std::collections::HashMap;

use nexus_core::{CellValue, ColumnInfo, QueryResult, RecordBatch};
use serde::Serialize;
use serde_json::Value;

use crate::NexusDb;
use crate::error::{DatabaseError, MySqlErrorKind, mysql_error_code};
use crate::helpers::{fit_to_column, placeholders, quote_ident};
use crate::value::{bind_all, bind_cell, rows_to_result};

/// Why one record of a batch was not inserted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowFailure {
    /// 1-based position in the batch.
    pub index: usize,
    pub code: Option<u16>,
    pub message: String,
}

impl RowFailure {
    #[must_use]
    pub fn kind(&self) -> Option<MySqlErrorKind> {
        self.code.map(MySqlErrorKind::from_code)
    }
}

/// Per-record outcome of a batch insert.
#[derive(Debug, Clone, Default, Serialize)]
pub struct InsertReport {
    pub table: String,
    pub inserted: usize,
    pub failures: Vec<RowFailure>,
}

impl InsertReport {
    /// At least one row went in.
    #[must_use]
    pub const fn success(&self) -> bool {
        self.inserted > 0
    }

    #[must_use]
    pub fn attempted(&self) -> usize {
        self.inserted + self.failures.len()
    }
}

impl NexusDb {
    /// Insert a `{"registros": [...]}` document.
    ///
    /// # Errors
    ///
    /// `DatabaseError::Core` when the document has no `registros` array.
    pub async fn insert_records(
        &self,
        table: &str,
        document: Value,
    ) -> Result<InsertReport, DatabaseError> {
        let batch = RecordBatch::from_value(document)?;
        self.insert_batch(table, &batch).await
    }

    /// Insert every record of `batch`, one statement per record.
    ///
    /// Columns come from the first object record. Text for `varchar(N)`
    /// columns is truncated to N characters. An empty batch inserts nothing.
    pub async fn insert_batch(
        &self,
        table: &str,
        batch: &RecordBatch,
    ) -> Result<InsertReport, DatabaseError> {
        let table = self.resolve_table(table).await?;
        let mut report = InsertReport {
            table: table.clone(),
            ..InsertReport::default()
        };

        let Some(first) = batch.records.iter().find_map(Value::as_object) else {
            tracing::debug!(%table, "empty batch skipped");
            return Ok(report);
        };
        let columns = first.keys().cloned().collect::<Vec<_>>();

        let live = self.columns(&table).await?;
        let by_name: HashMap<String, &ColumnInfo> = live
            .iter()
            .map(|column| (column.name.to_lowercase(), column))
            .collect();

        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            quote_ident(&table),
            columns
                .iter()
                .map(|c| quote_ident(c))
                .collect::<Vec<_>>()
                .join(", "),
            placeholders(columns.len())
        );

        for (offset, record) in batch.records.iter().enumerate() {
            let index = offset + 1;
            let Some(object) = record.as_object() else {
                report.failures.push(RowFailure {
                    index,
                    code: None,
                    message: "record is not a JSON object".to_string(),
                });
                continue;
            };

            let values = columns
                .iter()
                .map(|column| {
                    let cell = object.get(column).map_or(CellValue::Null, CellValue::from_json);
                    fit_to_column(cell, by_name.get(&column.to_lowercase()).copied())
                })
                .collect::<Vec<_>>();

            match bind_all(sqlx::query(&sql), &values)
                .execute(self.pool())
                .await
            {
                Ok(_) => report.inserted += 1,
                Err(error) => {
                    let code = mysql_error_code(&error);
                    tracing::debug!(%table, index, ?code, %error, "record rejected");
                    report.failures.push(RowFailure {
                        index,
                        code,
                        message: error.to_string(),
                    });
                }
            }
        }

        tracing::info!(
            %table,
            inserted = report.inserted,
            failed = report.failures.len(),
            "batch insert finished"
        );
        Ok(report)
    }

    /// Insert a single row. Returns the affected row count.
    pub async fn insert_row(
        &self,
        table: &str,
        columns: &[String],
        values: &[CellValue],
    ) -> Result<u64, DatabaseError> {
        if columns.len() != values.len() {
            return Err(DatabaseError::InvalidState(format!(
                "{} columns but {} values",
                columns.len(),
                values.len()
            )));
        }
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            quote_ident(table),
            columns
                .iter()
                .map(|c| quote_ident(c))
                .collect::<Vec<_>>()
                .join(", "),
            placeholders(values.len())
        );
        let result = bind_all(sqlx::query(&sql), values)
            .execute(self.pool())
            .await?;
        Ok(result.rows_affected())
    }

    /// ``UPDATE `table` SET `column` = ? WHERE {condition}``.
    ///
    /// The condition is free text typed by the user.
    pub async fn update_where(
        &self,
        table: &str,
        column: &str,
        value: &CellValue,
        condition: &str,
    ) -> Result<u64, DatabaseError> {
        let sql = format!(
            "UPDATE {} SET {} = ? WHERE {condition}",
            quote_ident(table),
            quote_ident(column)
        );
        let result = bind_cell(sqlx::query(&sql), value)
            .execute(self.pool())
            .await?;
        Ok(result.rows_affected())
    }

    /// ``DELETE FROM `table` WHERE {condition}``.
    pub async fn delete_where(&self, table: &str, condition: &str) -> Result<u64, DatabaseError> {
        let sql = format!("DELETE FROM {} WHERE {condition}", quote_ident(table));
        let result = sqlx::query(&sql).execute(self.pool()).await?;
        Ok(result.rows_affected())
    }

    /// Update several columns of the row whose `key_column` equals `key`.
    pub async fn update_by_key(
        &self,
        table: &str,
        key_column: &str,
        key: &CellValue,
        assignments: &[(String, CellValue)],
    ) -> Result<u64, DatabaseError> {
        if assignments.is_empty() {
            return Ok(0);
        }
        let set = assignments
            .iter()
            .map(|(column, _)| format!("{} = ?", quote_ident(column)))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "UPDATE {} SET {set} WHERE {} = ?",
            quote_ident(table),
            quote_ident(key_column)
        );
        let values = assignments
            .iter()
            .map(|(_, value)| value.clone())
            .chain(std::iter::once(key.clone()))
            .collect::<Vec<_>>();
        let result = bind_all(sqlx::query(&sql), &values)
            .execute(self.pool())
            .await?;
        Ok(result.rows_affected())
    }

    /// All rows of `table`, resolved case-insensitively.
    ///
    /// # Errors
    ///
    /// `DatabaseError::TableNotFound` for an unknown table.
    pub async fn select_all(&self, table: &str) -> Result<QueryResult, DatabaseError> {
        let table = self.resolve_table(table).await?;
        let mut result = self
            .fetch(&format!("SELECT * FROM {}", quote_ident(&table)), &[])
            .await?;
        if result.columns.is_empty() {
            result.columns = self
                .columns(&table)
                .await?
                .into_iter()
                .map(|c| c.name)
                .collect();
        }
        Ok(result)
    }

    /// The first `n` rows of `table`. BLOBs display as `<BLOB:Nbytes>`.
    pub async fn sample_rows(&self, table: &str, n: u32) -> Result<QueryResult, DatabaseError> {
        self.fetch(
            &format!("SELECT * FROM {} LIMIT ?", quote_ident(table)),
            &[CellValue::UInt(u64::from(n))],
        )
        .await
    }

    /// `n` random rows of `table`.
    pub async fn random_rows(&self, table: &str, n: u32) -> Result<QueryResult, DatabaseError> {
        self.fetch(
            &format!("SELECT * FROM {} ORDER BY RAND() LIMIT ?", quote_ident(table)),
            &[CellValue::UInt(u64::from(n))],
        )
        .await
    }

    /// Delete up to `n` random rows, addressed by primary key.
    ///
    /// # Errors
    ///
    /// `DatabaseError::InvalidState` when the table has no primary key.
    pub async fn delete_random_rows(&self, table: &str, n: u32) -> Result<u64, DatabaseError> {
        let pk = self.primary_key(table).await?.ok_or_else(|| {
            DatabaseError::InvalidState(format!("table {table} has no primary key"))
        })?;
        let picked = self
            .fetch(
                &format!(
                    "SELECT {} FROM {} ORDER BY RAND() LIMIT ?",
                    quote_ident(&pk),
                    quote_ident(table)
                ),
                &[CellValue::UInt(u64::from(n))],
            )
            .await?;

        let sql = format!(
            "DELETE FROM {} WHERE {} = ?",
            quote_ident(table),
            quote_ident(&pk)
        );
        let mut deleted = 0;
        for row in &picked.rows {
            let Some(key) = row.first() else { continue };
            let result = bind_cell(sqlx::query(&sql), key)
                .execute(self.pool())
                .await?;
            deleted += result.rows_affected();
        }
        tracing::info!(%table, deleted, "random rows deleted");
        Ok(deleted)
    }

    /// `SELECT COUNT(*)` of `table`.
    pub async fn count_rows(&self, table: &str) -> Result<u64, DatabaseError> {
        let count = sqlx::query_scalar::<_, i64>(&format!(
            "SELECT COUNT(*) FROM {}",
            quote_ident(table)
        ))
        .fetch_one(self.pool())
        .await?;
        Ok(u64::try_from(count).unwrap_or_default())
    }

    /// Run a fixed lookup SELECT (FK allow-lists, joins).
    pub async fn lookup_rows(&self, sql: &str) -> Result<QueryResult, DatabaseError> {
        self.fetch(sql, &[]).await
    }

    /// Prepared SELECT with bound parameters.
    pub async fn fetch(&self, sql: &str, params: &[CellValue]) -> Result<QueryResult, DatabaseError> {
        let rows = bind_all(sqlx::query(sql), params)
            .fetch_all(self.pool())
            .await?;
        rows_to_result(&rows)
    }
}
