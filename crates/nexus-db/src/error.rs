//! Database error types for nexus-db.

use std::path::PathBuf;

use nexus_core::CoreError;
use thiserror::Error;

/// Errors from database operations.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// A SQL statement failed for a reason other than the driver error below.
    #[error("Query failed: {0}")]
    Query(String),

    /// The named table does not exist in the current database.
    #[error("Table not found: {0}")]
    TableNotFound(String),

    /// Expected a result row but none was returned.
    #[error("No result returned")]
    NoResult,

    /// Invalid state encountered (e.g., a table without a primary key).
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// A script or seed file could not be read.
    #[error("Cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A seed file is not valid JSON.
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A record batch had the wrong shape.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Underlying sqlx / MySQL error.
    #[error("MySQL error: {0}")]
    Sql(#[from] sqlx::Error),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DatabaseError {
    /// MySQL error number, when the failure came from the server.
    #[must_use]
    pub fn mysql_code(&self) -> Option<u16> {
        match self {
            Self::Sql(error) => mysql_error_code(error),
            _ => None,
        }
    }

    /// Classified server error, when the failure came from the server.
    #[must_use]
    pub fn kind(&self) -> Option<MySqlErrorKind> {
        self.mysql_code().map(MySqlErrorKind::from_code)
    }
}

/// Extract the MySQL error number (e.g. 1452) from a sqlx error.
#[must_use]
pub fn mysql_error_code(error: &sqlx::Error) -> Option<u16> {
    match error {
        sqlx::Error::Database(db_err) => db_err
            .try_downcast_ref::<sqlx::mysql::MySqlDatabaseError>()
            .map(sqlx::mysql::MySqlDatabaseError::number),
        _ => None,
    }
}

/// MySQL server errors the CLI reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MySqlErrorKind {
    /// 1050
    TableExists,
    /// 1054
    UnknownColumn,
    /// 1064
    Syntax,
    /// 1146
    NoSuchTable,
    /// 1406
    DataTooLong,
    /// 1452
    ForeignKey,
    Other(u16),
}

impl MySqlErrorKind {
    #[must_use]
    pub const fn from_code(code: u16) -> Self {
        match code {
            1050 => Self::TableExists,
            1054 => Self::UnknownColumn,
            1064 => Self::Syntax,
            1146 => Self::NoSuchTable,
            1406 => Self::DataTooLong,
            1452 => Self::ForeignKey,
            other => Self::Other(other),
        }
    }

    #[must_use]
    pub const fn code(self) -> u16 {
        match self {
            Self::TableExists => 1050,
            Self::UnknownColumn => 1054,
            Self::Syntax => 1064,
            Self::NoSuchTable => 1146,
            Self::DataTooLong => 1406,
            Self::ForeignKey => 1452,
            Self::Other(code) => code,
        }
    }

    /// Short user-facing explanation.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::TableExists => Some("the table already exists"),
            Self::UnknownColumn => Some("a column in the statement does not exist"),
            Self::Syntax => Some("SQL syntax error"),
            Self::NoSuchTable => Some("a table in the statement does not exist"),
            Self::DataTooLong => Some("a value is too long for its column"),
            Self::ForeignKey => Some("a foreign key points at a missing parent row"),
            Self::Other(_) => None,
        }
    }
}
