//! Foreign-key graph and a parents-first table order derived from it.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use serde::Serialize;

use crate::NexusDb;
use crate::error::DatabaseError;

/// One FK column and the column it references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ForeignKey {
    pub table: String,
    pub column: String,
    pub referenced_table: String,
    pub referenced_column: String,
}

/// Kahn's algorithm over the FK graph: parents before children.
///
/// Ties are broken alphabetically. Tables caught in a cycle are appended at
/// the end in alphabetical order. Self-references and references to tables
/// outside `tables` are ignored.
#[must_use]
pub fn topological_order(tables: &[String], foreign_keys: &[ForeignKey]) -> Vec<String> {
    let known: BTreeSet<&str> = tables.iter().map(String::as_str).collect();
    let mut in_degree: BTreeMap<&str, usize> = known.iter().map(|t| (*t, 0)).collect();
    let mut children: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();

    for fk in foreign_keys {
        let (child, parent) = (fk.table.as_str(), fk.referenced_table.as_str());
        if child == parent || !known.contains(child) || !known.contains(parent) {
            continue;
        }
        if children.entry(parent).or_default().insert(child) {
            *in_degree.entry(child).or_default() += 1;
        }
    }

    let mut ready: VecDeque<&str> = in_degree
        .iter()
        .filter(|(_, degree)| **degree == 0)
        .map(|(table, _)| *table)
        .collect();
    let mut order = Vec::with_capacity(known.len());

    while let Some(table) = ready.pop_front() {
        order.push(table.to_string());
        for child in children.get(table).into_iter().flatten() {
            if let Some(degree) = in_degree.get_mut(child) {
                *degree -= 1;
                if *degree == 0 {
                    ready.push_back(*child);
                }
            }
        }
    }

    let placed: BTreeSet<String> = order.iter().cloned().collect();
    let leftover = known
        .iter()
        .filter(|t| !placed.contains(**t))
        .map(ToString::to_string)
        .collect::<Vec<_>>();
    if !leftover.is_empty() {
        tracing::warn!(?leftover, "FK cycle detected; appending remaining tables");
    }
    order.extend(leftover);
    order
}

impl NexusDb {
    /// Every FK of the current database.
    pub async fn foreign_keys(&self) -> Result<Vec<ForeignKey>, DatabaseError> {
        let rows = sqlx::query_as::<_, (String, String, String, String)>(
            "SELECT CAST(TABLE_NAME AS CHAR), CAST(COLUMN_NAME AS CHAR),
                    CAST(REFERENCED_TABLE_NAME AS CHAR), CAST(REFERENCED_COLUMN_NAME AS CHAR)
             FROM information_schema.KEY_COLUMN_USAGE
             WHERE TABLE_SCHEMA = DATABASE() AND REFERENCED_TABLE_NAME IS NOT NULL
             ORDER BY TABLE_NAME, COLUMN_NAME",
        )
        .fetch_all(self.pool())
        .await?;

        Ok(rows
            .into_iter()
            .map(
                |(table, column, referenced_table, referenced_column)| ForeignKey {
                    table,
                    column,
                    referenced_table,
                    referenced_column,
                },
            )
            .collect())
    }

    /// Live tables ordered parents-first from the FK graph.
    pub async fn dependency_order(&self) -> Result<Vec<String>, DatabaseError> {
        let tables = self.list_tables().await?;
        let foreign_keys = self.foreign_keys().await?;
        Ok(topological_order(&tables, &foreign_keys))
    }
}
