//! `rewrite` and `prune`: LLM rewrites or deletions of random rows.

use anyhow::anyhow;
use nexus_core::{CellValue, ColumnInfo, ColumnKind, Record};
use nexus_db::helpers::fit_to_column;
use nexus_llm::generate::rewrite_row;
use nexus_llm::prompts::build_row_rewrite_prompt;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::RandomRowsArgs;
use crate::commands::shared::tables::pick_table;
use crate::context::AppContext;
use crate::prompt::{Prompter, positive_or};

/// Row count from the flag, else prompted in interactive use, else the default.
fn row_count<P: Prompter>(
    args: &RandomRowsArgs,
    default: u32,
    prompter: &mut P,
) -> anyhow::Result<u32> {
    match (args.rows, &args.table) {
        (Some(rows), _) => Ok(rows.max(1)),
        (None, Some(_)) => Ok(default),
        (None, None) => Ok(positive_or(
            &prompter.input_or("Rows", &default.to_string())?,
            default,
        )),
    }
}

/// SET assignments for a rewritten row.
///
/// The key, BLOB, and timestamp columns are left alone, as are columns the
/// reply does not mention.
fn assignments(columns: &[ColumnInfo], primary_key: &str, row: &Record) -> Vec<(String, CellValue)> {
    columns
        .iter()
        .filter(|column| !column.name.eq_ignore_ascii_case(primary_key))
        .filter(|column| !matches!(column.kind(), ColumnKind::Blob | ColumnKind::Timestamp))
        .filter_map(|column| {
            let value = row.get(&column.name)?;
            let cell = fit_to_column(CellValue::from_json(value), Some(column));
            Some((column.name.clone(), cell))
        })
        .collect()
}

/// Handle `nexus-bio rewrite`.
pub async fn rewrite<P: Prompter>(
    args: &RandomRowsArgs,
    ctx: &AppContext,
    prompter: &mut P,
    _flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let table = pick_table(args.table.as_deref(), ctx, prompter).await?;
    let rows = row_count(args, ctx.config.general.random_rows, prompter)?;

    let primary_key = ctx
        .db
        .primary_key(&table)
        .await?
        .ok_or_else(|| anyhow!("table `{table}` has no primary key"))?;
    let sample = ctx.db.random_rows(&table, rows).await?;
    if sample.is_empty() {
        println!("Table `{table}` is empty, nothing to rewrite.");
        return Ok(());
    }

    let columns = ctx.db.columns(&table).await?;
    let model = ctx.chat_client()?;
    let records = sample.to_records();
    let total = records.len();
    let mut rewritten = 0;

    for (position, original) in records.iter().enumerate() {
        let Some(key) = original.get(&primary_key).map(CellValue::from_json) else {
            tracing::warn!(%table, "sampled row has no primary key value");
            continue;
        };
        let prompt = build_row_rewrite_prompt(&table, &columns, original, &primary_key);
        let updated = match rewrite_row(
            &model,
            &prompt,
            original,
            &primary_key,
            ctx.config.openai.temperature,
            ctx.retry_policy(),
        )
        .await
        {
            Ok(updated) => updated,
            Err(error) => {
                eprintln!("Row {}/{total}: unusable reply ({error})", position + 1);
                continue;
            }
        };

        let set = assignments(&columns, &primary_key, &updated);
        match ctx.db.update_by_key(&table, &primary_key, &key, &set).await {
            Ok(_) => {
                rewritten += 1;
                println!("Row {}/{total} of `{table}` rewritten.", position + 1);
            }
            Err(error) => eprintln!("Row {}/{total}: update failed ({error})", position + 1),
        }
    }

    println!("{rewritten} of {total} row(s) rewritten.");
    Ok(())
}

/// Handle `nexus-bio prune`.
pub async fn prune<P: Prompter>(
    args: &RandomRowsArgs,
    ctx: &AppContext,
    prompter: &mut P,
    _flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let table = pick_table(args.table.as_deref(), ctx, prompter).await?;
    let rows = row_count(args, ctx.config.general.random_rows, prompter)?;

    let deleted = ctx.db.delete_random_rows(&table, rows).await?;
    if deleted == 0 {
        println!("Table `{table}` is empty.");
    } else {
        println!("{deleted} row(s) deleted from `{table}`.");
    }
    Ok(())
}
