//! Cross-cutting error types for NEXUS-BIO.
//!
//! Domain-specific errors (`DatabaseError`, `LlmError`, ...) live in their
//! respective crates. The CLI converges everything into `anyhow`.

use thiserror::Error;

/// Errors that can be raised by any NEXUS-BIO crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A table name did not match any table in the live schema.
    #[error("Table not found: {0}")]
    TableNotFound(String),

    /// A record batch did not have the expected `{"registros": [...]}` shape.
    #[error("Invalid record batch: {0}")]
    InvalidBatch(String),

    /// Data failed validation (format, constraints).
    #[error("Validation error: {0}")]
    Validation(String),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
