//! `nexus-bio populate`: fill every empty table with generated rows.
//!
//! Tables are visited parents-first. A table that already has rows is
//! skipped and only serves as context for the tables after it. `Taxon` and
//! `Midia` have their own generators; every other table goes through the
//! generic prompt, validation, FK repair, and batch insert.

mod context;
mod media;
mod table;
mod taxon;

use anyhow::bail;
use nexus_core::catalog::{MEDIA_TABLE, TAXON_TABLE};
use nexus_core::{SchemaMap, TableNames};
use nexus_db::records::InsertReport;
use nexus_llm::{ChatModel, PopulationTally};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;

use crate::cli::root_commands::PopulateArgs;
use crate::cli::{GlobalFlags, OutputFormat};
use crate::commands::order;
use crate::context::AppContext;
use crate::output::output;
use crate::progress::Progress;
use crate::prompt::Prompter;

/// Missing catalog tables listed before the "... and N more" line.
const MISSING_SHOWN: usize = 5;

#[derive(Debug, Clone, Copy)]
pub struct PopulateOptions {
    pub rows: u32,
    pub species: u32,
    pub derived_order: bool,
    pub assume_yes: bool,
}

impl PopulateOptions {
    #[must_use]
    pub fn from_args(args: &PopulateArgs, ctx: &AppContext) -> Self {
        Self {
            rows: args.rows.unwrap_or(ctx.config.general.default_rows),
            species: args.species.unwrap_or(ctx.config.general.default_species),
            derived_order: args.derived_order,
            assume_yes: args.yes,
        }
    }
}

/// What happened to one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableOutcome {
    /// Already had rows; used as context only.
    Skipped { existing: u64 },
    Inserted { rows: usize, failed: usize },
    /// The model answered with an empty `registros` list.
    NothingGenerated,
    Failed(String),
}

impl TableOutcome {
    /// At least one row inserted is a success.
    pub(crate) fn from_report(report: &InsertReport) -> Self {
        if report.success() {
            Self::Inserted {
                rows: report.inserted,
                failed: report.failures.len(),
            }
        } else {
            let reason = report.failures.first().map_or_else(
                || String::from("no row was inserted"),
                |failure| format!("no row was inserted; first error: {}", failure.message),
            );
            Self::Failed(reason)
        }
    }
}

#[derive(Debug, Serialize)]
struct PopulationSummary {
    successes: u32,
    errors: u32,
    processed: u32,
    skipped: u32,
    success_rate: Option<f64>,
}

impl From<PopulationTally> for PopulationSummary {
    fn from(tally: PopulationTally) -> Self {
        Self {
            successes: tally.successes,
            errors: tally.errors,
            processed: tally.processed,
            skipped: tally.skipped,
            success_rate: tally.success_rate(),
        }
    }
}

/// Handle `nexus-bio populate`.
pub async fn handle<P: Prompter>(
    args: &PopulateArgs,
    ctx: &AppContext,
    prompter: &mut P,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let options = PopulateOptions::from_args(args, ctx);
    run(options, ctx, prompter, flags).await
}

/// Run a population pass and print its report.
pub async fn run<P: Prompter>(
    options: PopulateOptions,
    ctx: &AppContext,
    prompter: &mut P,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let model = ctx.chat_client()?;
    let tally = populate(&model, options, ctx, prompter, flags).await?;

    if flags.format == OutputFormat::Table {
        for line in report_lines(&tally) {
            println!("{line}");
        }
        Ok(())
    } else {
        output(&PopulationSummary::from(tally), flags.format)
    }
}

/// Visit every planned table in order.
pub async fn populate<M, P>(
    model: &M,
    options: PopulateOptions,
    ctx: &AppContext,
    prompter: &mut P,
    flags: &GlobalFlags,
) -> anyhow::Result<PopulationTally>
where
    M: ChatModel + Sync,
    P: Prompter,
{
    let names = ctx.db.table_names().await?;
    if names.is_empty() {
        bail!("no tables found; create them first with `nexus-bio create`");
    }

    let plan = order::plan(ctx, options.derived_order).await?;
    let mut tally = PopulationTally::default();
    if !plan.is_complete() {
        println!("{}", missing_tables_warning(&plan.missing));
        if !options.assume_yes && !prompter.confirm("Continue anyway?")? {
            println!("Population cancelled.");
            tally.error();
            return Ok(tally);
        }
    }
    if flags.narrate() {
        println!("Population order: {}", plan.describe());
    }

    let schema = ctx.db.schema_info().await?;
    let mut run = Run {
        ctx,
        model,
        names,
        schema,
        options,
        rng: StdRng::from_entropy(),
    };
    let mut populated: Vec<String> = Vec::new();

    let progress = Progress::bar(plan.ordered.len() as u64, "populating");
    for table in &plan.ordered {
        progress.set_message(table);
        let outcome = match run.table(table, &populated).await {
            Ok(outcome) => outcome,
            Err(error) => TableOutcome::Failed(format!("{error:#}")),
        };
        progress.println(&describe_outcome(table, &outcome));

        match outcome {
            TableOutcome::Skipped { .. } => {
                tally.skipped += 1;
                populated.push(table.clone());
            }
            TableOutcome::Inserted { .. } => {
                tally.success();
                populated.push(table.clone());
            }
            TableOutcome::NothingGenerated => {}
            TableOutcome::Failed(_) => tally.error(),
        }
        progress.inc(1);
    }
    progress.finish_clear();

    Ok(tally)
}

/// State shared by the per-table steps of one run.
struct Run<'a, M> {
    ctx: &'a AppContext,
    model: &'a M,
    names: TableNames,
    schema: SchemaMap,
    options: PopulateOptions,
    rng: StdRng,
}

impl<M: ChatModel + Sync> Run<'_, M> {
    async fn table(&mut self, table: &str, populated: &[String]) -> anyhow::Result<TableOutcome> {
        let existing = self.ctx.db.count_rows(table).await?;
        if existing > 0 {
            return Ok(TableOutcome::Skipped { existing });
        }

        match table.to_lowercase().as_str() {
            TAXON_TABLE => {
                taxon::populate(self.ctx, self.model, table, self.options.species).await
            }
            MEDIA_TABLE => media::populate(self.ctx, table).await,
            _ => self.generic(table, populated).await,
        }
    }
}

/// `"... N tables missing"` warning, listing the first few.
#[must_use]
pub fn missing_tables_warning(missing: &[&str]) -> String {
    let mut lines = vec![format!(
        "{} catalog table(s) are not in the database:",
        missing.len()
    )];
    lines.extend(
        missing
            .iter()
            .take(MISSING_SHOWN)
            .map(|table| format!("  - {}", table.to_uppercase())),
    );
    if missing.len() > MISSING_SHOWN {
        lines.push(format!("  ... and {} more", missing.len() - MISSING_SHOWN));
    }
    lines.join("\n")
}

fn describe_outcome(table: &str, outcome: &TableOutcome) -> String {
    let upper = table.to_uppercase();
    match outcome {
        TableOutcome::Skipped { existing } => {
            format!("{upper}: skipped, already has {existing} row(s)")
        }
        TableOutcome::Inserted { rows, failed: 0 } => format!("{upper}: inserted {rows} row(s)"),
        TableOutcome::Inserted { rows, failed } => {
            format!("{upper}: inserted {rows} row(s), {failed} rejected")
        }
        TableOutcome::NothingGenerated => format!("{upper}: the model generated no rows"),
        TableOutcome::Failed(reason) => format!("{upper}: failed, {reason}"),
    }
}

/// Final report of a run.
#[must_use]
pub fn report_lines(tally: &PopulationTally) -> Vec<String> {
    let rate = tally
        .success_rate()
        .map_or_else(|| String::from("N/A"), |rate| format!("{rate:.1}%"));
    vec![
        String::from("POPULATION REPORT"),
        format!("Tables populated:      {}", tally.successes),
        format!("Tables with errors:    {}", tally.errors),
        format!("Tables processed:      {}", tally.processed),
        format!("Skipped (had rows):    {}", tally.skipped),
        format!("Success rate:          {rate}"),
    ]
}

#[cfg(test)]
mod tests {
    use nexus_db::records::RowFailure;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn short_missing_lists_are_shown_in_full() {
        let warning = missing_tables_warning(&["midia", "artigo"]);
        assert_eq!(
            warning,
            "2 catalog table(s) are not in the database:\n  - MIDIA\n  - ARTIGO"
        );
    }

    #[test]
    fn long_missing_lists_are_cut() {
        let missing = ["a", "b", "c", "d", "e", "f", "g"];
        let warning = missing_tables_warning(&missing);
        assert_eq!(warning.lines().count(), 1 + MISSING_SHOWN + 1);
        assert!(warning.ends_with("... and 2 more"));
    }

    #[test]
    fn report_without_attempts_has_no_rate() {
        let lines = report_lines(&PopulationTally::default());
        assert_eq!(lines.last().map(String::as_str), Some("Success rate:          N/A"));
    }

    #[test]
    fn report_shows_the_rate() {
        let tally = PopulationTally {
            successes: 3,
            errors: 1,
            processed: 3,
            skipped: 2,
        };
        let lines = report_lines(&tally);
        assert_eq!(lines[1], "Tables populated:      3");
        assert_eq!(lines[4], "Skipped (had rows):    2");
        assert_eq!(lines[5], "Success rate:          75.0%");
    }

    #[test]
    fn partial_inserts_count_as_success() {
        let report = InsertReport {
            table: String::from("Projeto"),
            inserted: 4,
            failures: vec![RowFailure {
                index: 2,
                code: Some(1406),
                message: String::from("Data too long"),
            }],
        };
        assert_eq!(
            TableOutcome::from_report(&report),
            TableOutcome::Inserted { rows: 4, failed: 1 }
        );
    }

    #[test]
    fn empty_inserts_fail_with_the_first_error() {
        let report = InsertReport {
            table: String::from("Projeto"),
            inserted: 0,
            failures: vec![RowFailure {
                index: 1,
                code: Some(1452),
                message: String::from("foreign key constraint fails"),
            }],
        };
        let TableOutcome::Failed(reason) = TableOutcome::from_report(&report) else {
            panic!("expected a failure");
        };
        assert!(reason.ends_with("foreign key constraint fails"));
    }

    #[test]
    fn outcomes_read_naturally() {
        assert_eq!(
            describe_outcome("Especie", &TableOutcome::Skipped { existing: 12 }),
            "ESPECIE: skipped, already has 12 row(s)"
        );
        assert_eq!(
            describe_outcome("Projeto", &TableOutcome::Inserted { rows: 10, failed: 0 }),
            "PROJETO: inserted 10 row(s)"
        );
    }
}
