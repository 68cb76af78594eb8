//! # nexus-db
//!
//! MySQL access for NEXUS-BIO through `sqlx`.
//!
//! The schema is owned by an external DDL script; this crate executes it,
//! discovers the live tables at runtime, and treats every table generically.
//! Operations are grouped by concern and implemented as `impl NexusDb` blocks:
//!
//! - [`maintenance`]: run the DDL script, drop every table
//! - [`schema`]: table names, columns, CHECK constraints, primary keys
//! - [`records`]: inserts from record batches, manual CRUD, sampling
//! - [`query`]: free-form SQL
//! - [`reports`]: the three canned reports
//! - [`deps`]: FK graph and topological table order
//! - [`seed`]: loading `data/{table}.json` files

pub mod deps;
pub mod error;
pub mod helpers;
pub mod maintenance;
pub mod query;
pub mod records;
pub mod reports;
pub mod schema;
pub mod script;
pub mod seed;
mod value;

use std::time::Duration;

use error::DatabaseError;
use nexus_config::MySqlConfig;
use sqlx::MySqlPool;
use sqlx::mysql::{MySqlConnectOptions, MySqlPoolOptions};

pub use error::MySqlErrorKind;

/// Central database handle.
///
/// Cheap to clone; clones share the same pool.
#[derive(Debug, Clone)]
pub struct NexusDb {
    pool: MySqlPool,
}

impl NexusDb {
    /// Open a pool from configuration (`utf8mb4`).
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Sql` if no connection can be established.
    pub async fn connect(config: &MySqlConfig) -> Result<Self, DatabaseError> {
        let mut options = MySqlConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.user)
            .database(&config.database)
            .charset("utf8mb4");
        if !config.password.is_empty() {
            options = options.password(&config.password);
        }

        let pool = MySqlPoolOptions::new()
            .max_connections(config.max_connections.max(1))
            .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
            .connect_with(options)
            .await?;

        tracing::debug!(url = %config.redacted_url(), "connected to MySQL");
        Ok(Self { pool })
    }

    /// Open a pool from a `mysql://` URL.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Sql` if the URL is invalid or unreachable.
    pub async fn connect_url(url: &str) -> Result<Self, DatabaseError> {
        let pool = MySqlPoolOptions::new()
            .max_connections(2)
            .connect(url)
            .await?;
        Ok(Self { pool })
    }

    #[must_use]
    pub const fn from_pool(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Access the pool for direct queries.
    #[must_use]
    pub const fn pool(&self) -> &MySqlPool {
        &self.pool
    }

    /// Close every pooled connection.
    pub async fn close(&self) {
        self.pool.close().await;
        tracing::debug!("MySQL pool closed");
    }
}
