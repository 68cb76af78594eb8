//! `create`, `drop`, `tables`, and `show`.

use anyhow::Context;
use nexus_db::maintenance::{DropReport, ScriptReport};
use nexus_db::script::StatementOutcome;
use serde::Serialize;

use crate::cli::root_commands::{ConfirmArgs, CreateArgs, ShowArgs};
use crate::cli::{GlobalFlags, OutputFormat};
use crate::commands::shared::hints::describe_code;
use crate::commands::shared::limit::display_cap;
use crate::commands::shared::tables::pick_table;
use crate::context::AppContext;
use crate::output::{output, output_rows};
use crate::prompt::Prompter;

#[derive(Debug, Serialize)]
struct TableSummary {
    table: String,
    rows: u64,
}

/// Handle `nexus-bio create`.
pub async fn create(args: &CreateArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let path = args
        .script
        .clone()
        .unwrap_or_else(|| ctx.config.general.script_path.clone());
    let report = ctx
        .db
        .create_tables(&path)
        .await
        .with_context(|| format!("cannot run {}", path.display()))?;

    if flags.format != OutputFormat::Table {
        return output(&report, flags.format);
    }
    print_script_report(&report, flags);
    Ok(())
}

/// One line per statement plus a count summary.
pub fn print_script_report(report: &ScriptReport, flags: &GlobalFlags) {
    if !flags.quiet {
        for outcome in &report.outcomes {
            println!("{}", describe_statement(outcome));
        }
    }
    println!(
        "{} statement(s) executed, {} not applied.",
        report.executed(),
        report.failed()
    );
}

fn describe_statement(outcome: &StatementOutcome) -> String {
    match outcome {
        StatementOutcome::Executed { index, preview } => format!("[{index:02}] ok: {preview}"),
        StatementOutcome::AlreadyExists { index, table } => {
            format!("[{index:02}] table `{table}` already exists")
        }
        StatementOutcome::SyntaxError { index, message } => {
            format!("[{index:02}] syntax error: {message}")
        }
        StatementOutcome::Failed {
            index,
            code,
            message,
        } => format!("[{index:02}] failed ({}): {message}", describe_code(*code)),
    }
}

/// Handle `nexus-bio drop`.
pub async fn drop<P: Prompter>(
    args: &ConfirmArgs,
    ctx: &AppContext,
    prompter: &mut P,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    if !args.yes && !prompter.confirm("Drop every table of the database?")? {
        println!("Cancelled.");
        return Ok(());
    }

    let report = ctx.db.drop_all_tables().await?;
    if flags.format != OutputFormat::Table {
        return output(&report, flags.format);
    }
    print_drop_report(&report);
    Ok(())
}

pub fn print_drop_report(report: &DropReport) {
    if report.is_empty() {
        println!("No tables to drop.");
        return;
    }
    for table in &report.dropped {
        println!("Dropped `{table}`.");
    }
    for (table, error) in &report.failed {
        eprintln!("Could not drop `{table}`: {error}");
    }
}

/// Handle `nexus-bio tables`: every table with its row count.
pub async fn tables(ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let names = ctx.db.list_tables().await?;
    if names.is_empty() {
        if flags.format == OutputFormat::Table {
            println!("No tables. Run `nexus-bio create` first.");
            return Ok(());
        }
        return output(&Vec::<TableSummary>::new(), flags.format);
    }

    let mut summaries = Vec::with_capacity(names.len());
    for table in names {
        let rows = ctx.db.count_rows(&table).await?;
        summaries.push(TableSummary { table, rows });
    }
    output(&summaries, flags.format)
}

/// Handle `nexus-bio show`.
pub async fn show<P: Prompter>(
    args: &ShowArgs,
    ctx: &AppContext,
    prompter: &mut P,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let table = pick_table(args.table.as_deref(), ctx, prompter).await?;
    let result = ctx.db.select_all(&table).await?;

    if flags.narrate() {
        println!("\n{}", table.to_uppercase());
    }
    if result.is_empty() && flags.format == OutputFormat::Table {
        println!("Table `{table}` is empty.");
        return Ok(());
    }
    output_rows(&result, flags.format, display_cap(flags.limit, usize::MAX))
}
