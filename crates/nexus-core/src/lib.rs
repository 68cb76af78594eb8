//! # nexus-core
//!
//! Core types, table catalog, and error types for NEXUS-BIO.
//!
//! This crate provides the foundational types shared across all NEXUS-BIO crates:
//! - Dynamic cell values read from and bound to MySQL (`CellValue`)
//! - Column metadata discovered at runtime (`ColumnInfo`, `ColumnKind`)
//! - Case-insensitive table name resolution (`TableNames`)
//! - The static taxonomy-lab catalog: population order, FK dependencies,
//!   allow-list lookups, and enum constraints
//! - The `{"registros": [...]}` record batch envelope
//! - Cross-cutting error types

pub mod catalog;
pub mod cell;
pub mod errors;
pub mod records;
pub mod schema;

pub use cell::{CellValue, QueryResult};
pub use errors::CoreError;
pub use records::{Record, RecordBatch};
pub use schema::{ColumnInfo, ColumnKind, SchemaMap, TableNames};
