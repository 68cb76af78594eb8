//! Free-form SQL typed by the user or generated by the LLM.

use nexus_core::QueryResult;

use crate::NexusDb;
use crate::error::DatabaseError;
use crate::script::is_row_returning;
use crate::value::rows_to_result;

/// What a free-form statement produced.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlOutcome {
    Rows(QueryResult),
    Affected(u64),
}

impl NexusDb {
    /// Execute one statement as-is.
    ///
    /// Row-returning statements (`SELECT`, `SHOW`, `DESCRIBE`, `EXPLAIN`,
    /// `WITH`) yield their rows; anything else yields the affected count.
    ///
    /// # Errors
    ///
    /// `DatabaseError::Sql`; use [`DatabaseError::kind`] for user hints.
    pub async fn run_sql(&self, sql: &str) -> Result<SqlOutcome, DatabaseError> {
        let sql = sql.trim().trim_end_matches(';').trim();
        if sql.is_empty() {
            return Err(DatabaseError::Query("empty statement".to_string()));
        }

        if is_row_returning(sql) {
            let rows = sqlx::raw_sql(sql).fetch_all(self.pool()).await?;
            tracing::debug!(rows = rows.len(), "query returned rows");
            Ok(SqlOutcome::Rows(rows_to_result(&rows)?))
        } else {
            let result = sqlx::raw_sql(sql).execute(self.pool()).await?;
            tracing::debug!(affected = result.rows_affected(), "statement executed");
            Ok(SqlOutcome::Affected(result.rows_affected()))
        }
    }
}
