//! What a generation prompt sees of the tables already filled.

use nexus_core::TableNames;
use nexus_core::catalog::{dependencies, fk_lookups, sizing_dependencies};
use nexus_db::NexusDb;
use nexus_llm::{ContextTable, FkAllowList};

/// Sample rows of every populated table. Unreadable tables are skipped.
pub async fn collect_context(db: &NexusDb, populated: &[String], per_table: u32) -> Vec<ContextTable> {
    let mut context = Vec::with_capacity(populated.len());
    for table in populated {
        match db.sample_rows(table, per_table).await {
            Ok(rows) if !rows.is_empty() => context.push(ContextTable {
                table: table.clone(),
                rows: rows.to_records(),
            }),
            Ok(_) => {}
            Err(error) => tracing::warn!(%table, %error, "cannot sample context rows"),
        }
    }
    context
}

/// Valid ids for each FK column of `table`.
pub async fn collect_allow_lists(db: &NexusDb, table: &str) -> Vec<FkAllowList> {
    let mut lists = Vec::new();
    for lookup in fk_lookups(table) {
        match db.lookup_rows(lookup.sql).await {
            Ok(rows) => {
                let list = FkAllowList::from_result(lookup.column, &rows);
                if list.is_empty() {
                    tracing::debug!(%table, column = lookup.column, "no valid ids yet");
                } else {
                    lists.push(list);
                }
            }
            Err(error) => {
                tracing::warn!(%table, column = lookup.column, %error, "FK lookup failed");
            }
        }
    }
    lists
}

/// Row counts of the parents that cap the request size for `table`.
///
/// A parent missing from the database counts as empty.
pub async fn sizing_counts(db: &NexusDb, names: &TableNames, table: &str) -> anyhow::Result<Vec<u64>> {
    let mut counts = Vec::new();
    for parent in sizing_dependencies(table) {
        counts.push(live_count(db, names, parent).await?);
    }
    Ok(counts)
}

/// Parents of `table` that are missing or still empty.
pub async fn unmet_dependencies(
    db: &NexusDb,
    names: &TableNames,
    table: &str,
) -> anyhow::Result<Vec<&'static str>> {
    let mut unmet = Vec::new();
    for parent in dependencies(table) {
        if live_count(db, names, parent).await? == 0 {
            unmet.push(*parent);
        }
    }
    Ok(unmet)
}

async fn live_count(db: &NexusDb, names: &TableNames, table: &str) -> anyhow::Result<u64> {
    match names.resolve(table) {
        Some(real) => Ok(db.count_rows(real).await?),
        None => Ok(0),
    }
}
