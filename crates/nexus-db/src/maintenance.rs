//! Creating the schema from the DDL script and dropping every table.

use std::path::Path;

use serde::Serialize;

use crate::NexusDb;
use crate::error::{DatabaseError, MySqlErrorKind, mysql_error_code};
use crate::helpers::quote_ident;
use crate::script::{StatementOutcome, created_table_name, preview, split_script};

/// Outcome of every statement of a script run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScriptReport {
    pub outcomes: Vec<StatementOutcome>,
}

impl ScriptReport {
    #[must_use]
    pub fn executed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    #[must_use]
    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.executed()
    }
}

/// Per-table outcome of [`NexusDb::drop_all_tables`].
#[derive(Debug, Clone, Default, Serialize)]
pub struct DropReport {
    pub dropped: Vec<String>,
    pub failed: Vec<(String, String)>,
}

impl DropReport {
    /// No tables existed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dropped.is_empty() && self.failed.is_empty()
    }
}

impl NexusDb {
    /// Execute the DDL script at `path`.
    ///
    /// # Errors
    ///
    /// Only when the file cannot be read; statement failures are reported.
    pub async fn create_tables(&self, path: &Path) -> Result<ScriptReport, DatabaseError> {
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| DatabaseError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(self.run_script(&text).await)
    }

    /// Execute every statement of `text`, never stopping on a failure.
    pub async fn run_script(&self, text: &str) -> ScriptReport {
        let mut report = ScriptReport::default();
        for (offset, statement) in split_script(text).iter().enumerate() {
            let index = offset + 1;
            let outcome = match sqlx::raw_sql(statement).execute(self.pool()).await {
                Ok(_) => StatementOutcome::Executed {
                    index,
                    preview: preview(statement, 50),
                },
                Err(error) => classify_failure(index, statement, &error),
            };
            tracing::debug!(?outcome, "script statement");
            report.outcomes.push(outcome);
        }
        report
    }

    /// Drop every base table with FK checks disabled on one session.
    ///
    /// Checks are re-enabled even when a drop fails.
    pub async fn drop_all_tables(&self) -> Result<DropReport, DatabaseError> {
        let mut conn = self.pool().acquire().await?;
        sqlx::raw_sql("SET FOREIGN_KEY_CHECKS = 0")
            .execute(&mut *conn)
            .await?;

        let tables = sqlx::query_scalar::<_, String>(
            "SELECT CAST(TABLE_NAME AS CHAR) FROM information_schema.TABLES
             WHERE TABLE_SCHEMA = DATABASE() AND TABLE_TYPE = 'BASE TABLE'
             ORDER BY TABLE_NAME",
        )
        .fetch_all(&mut *conn)
        .await;

        let mut report = DropReport::default();
        if let Ok(tables) = &tables {
            for table in tables {
                let sql = format!("DROP TABLE IF EXISTS {}", quote_ident(table));
                match sqlx::raw_sql(&sql).execute(&mut *conn).await {
                    Ok(_) => report.dropped.push(table.clone()),
                    Err(error) => {
                        tracing::warn!(%table, %error, "drop failed");
                        report.failed.push((table.clone(), error.to_string()));
                    }
                }
            }
        }

        sqlx::raw_sql("SET FOREIGN_KEY_CHECKS = 1")
            .execute(&mut *conn)
            .await?;
        if let Err(error) = tables {
            return Err(error.into());
        }
        Ok(report)
    }
}

fn classify_failure(index: usize, statement: &str, error: &sqlx::Error) -> StatementOutcome {
    let code = mysql_error_code(error);
    match code.map(MySqlErrorKind::from_code) {
        Some(MySqlErrorKind::TableExists) => StatementOutcome::AlreadyExists {
            index,
            table: created_table_name(statement).unwrap_or_else(|| "?".to_string()),
        },
        Some(MySqlErrorKind::Syntax) => StatementOutcome::SyntaxError {
            index,
            message: error.to_string(),
        },
        _ => StatementOutcome::Failed {
            index,
            code,
            message: error.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_counts_outcomes() {
        let report = ScriptReport {
            outcomes: vec![
                StatementOutcome::Executed {
                    index: 1,
                    preview: "CREATE TABLE Taxon".into(),
                },
                StatementOutcome::AlreadyExists {
                    index: 2,
                    table: "Especie".into(),
                },
            ],
        };
        assert_eq!(report.executed(), 1);
        assert_eq!(report.failed(), 1);
    }

    #[test]
    fn non_server_failure_has_no_code() {
        let outcome = classify_failure(3, "CREATE TABLE T (x INT)", &sqlx::Error::PoolTimedOut);
        assert!(matches!(
            outcome,
            StatementOutcome::Failed {
                index: 3,
                code: None,
                ..
            }
        ));
    }

    #[test]
    fn empty_drop_report() {
        assert!(DropReport::default().is_empty());
    }
}
