//! Loading `data/{table}.json` seed files.

use std::path::{Path, PathBuf};

use nexus_core::catalog::SEED_ORDER;
use serde::Serialize;
use serde_json::Value;

use crate::NexusDb;
use crate::error::DatabaseError;
use crate::records::InsertReport;

/// What happened to one seed file.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SeedOutcome {
    Loaded { report: InsertReport },
    Missing { table: String, path: PathBuf },
    Failed { table: String, error: String },
}

impl SeedOutcome {
    #[must_use]
    pub fn table(&self) -> &str {
        match self {
            Self::Loaded { report } => &report.table,
            Self::Missing { table, .. } | Self::Failed { table, .. } => table,
        }
    }
}

/// Seed file path for `table` inside `dir`.
#[must_use]
pub fn seed_path(dir: &Path, table: &str) -> PathBuf {
    dir.join(format!("{}.json", table.to_lowercase()))
}

impl NexusDb {
    /// Load every seed file in seed order. Missing files are skipped.
    ///
    /// A file that fails to parse or insert is reported and does not stop
    /// the run.
    pub async fn seed_from_dir(&self, dir: &Path) -> Result<Vec<SeedOutcome>, DatabaseError> {
        let mut outcomes = Vec::with_capacity(SEED_ORDER.len());
        for table in SEED_ORDER {
            let path = seed_path(dir, table);
            if !path.exists() {
                tracing::debug!(%table, path = %path.display(), "seed file missing");
                outcomes.push(SeedOutcome::Missing {
                    table: (*table).to_string(),
                    path,
                });
                continue;
            }

            let outcome = match self.seed_file(table, &path).await {
                Ok(report) => SeedOutcome::Loaded { report },
                Err(error) => {
                    tracing::warn!(%table, %error, "seed failed");
                    SeedOutcome::Failed {
                        table: (*table).to_string(),
                        error: error.to_string(),
                    }
                }
            };
            outcomes.push(outcome);
        }
        Ok(outcomes)
    }

    async fn seed_file(&self, table: &str, path: &Path) -> Result<InsertReport, DatabaseError> {
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| DatabaseError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        let document: Value = serde_json::from_str(&text)?;
        self.insert_records(table, document).await
    }
}
