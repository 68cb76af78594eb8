//! `nexus-bio demo`: rebuild the database from the script and seed files,
//! then show how a sample update and delete move the canned reports.

use anyhow::Context;
use chrono::NaiveDate;
use nexus_core::CellValue;
use nexus_db::reports::Report;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::ConfirmArgs;
use crate::commands::{report, schema, seed};
use crate::context::AppContext;
use crate::prompt::Prompter;

/// Pending contracts become active, so the staff report grows.
const UPDATE_TABLE: &str = "Contrato";
const UPDATE_COLUMN: &str = "Status";
const UPDATE_VALUE: &str = "Ativo";
const UPDATE_CONDITION: &str = "Status = 'Pendente'";

/// Small grants are removed, so the funding averages rise.
const DELETE_TABLE: &str = "Financiamento";
const DELETE_CONDITION: &str = "Valor < 5000";

fn report_range() -> anyhow::Result<(NaiveDate, NaiveDate)> {
    let from = NaiveDate::from_ymd_opt(2000, 1, 1).context("invalid demo start date")?;
    let to = NaiveDate::from_ymd_opt(2030, 12, 31).context("invalid demo end date")?;
    Ok((from, to))
}

fn demo_reports() -> anyhow::Result<[Report; 3]> {
    let (from, to) = report_range()?;
    Ok([
        Report::ActiveStaffPerProject,
        Report::EquipmentUsePerLab { from, to },
        Report::FundingPerProject { from, to },
    ])
}

/// Handle `nexus-bio demo`.
pub async fn handle<P: Prompter>(
    args: &ConfirmArgs,
    ctx: &AppContext,
    prompter: &mut P,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    if !args.yes && !prompter.confirm("The demo drops and recreates every table. Continue?")? {
        println!("Demo cancelled.");
        return Ok(());
    }

    heading("Dropping tables");
    schema::print_drop_report(&ctx.db.drop_all_tables().await?);

    heading("Creating tables");
    let script = &ctx.config.general.script_path;
    let created = ctx
        .db
        .create_tables(script)
        .await
        .with_context(|| format!("cannot run {}", script.display()))?;
    schema::print_script_report(&created, flags);

    heading("Loading seed files");
    seed::run(&ctx.config.general.data_dir, ctx, flags).await?;

    let reports = demo_reports()?;
    heading("Reports before the changes");
    for report in &reports {
        report::show(report, ctx, flags).await?;
    }

    heading("Sample update and delete");
    let updated = ctx
        .db
        .update_where(
            UPDATE_TABLE,
            UPDATE_COLUMN,
            &CellValue::Text(UPDATE_VALUE.to_string()),
            UPDATE_CONDITION,
        )
        .await?;
    println!(
        "UPDATE {UPDATE_TABLE} SET {UPDATE_COLUMN} = '{UPDATE_VALUE}' WHERE {UPDATE_CONDITION}: {updated} row(s)"
    );
    let deleted = ctx.db.delete_where(DELETE_TABLE, DELETE_CONDITION).await?;
    println!("DELETE FROM {DELETE_TABLE} WHERE {DELETE_CONDITION}: {deleted} row(s)");

    heading("Reports after the changes");
    for report in &reports {
        report::show(report, ctx, flags).await?;
    }
    Ok(())
}

fn heading(title: &str) {
    println!("\n=== {title} ===");
}
