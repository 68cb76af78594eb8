//! Running free-form SQL, typed by the user or generated by `ask`.

use nexus_db::query::SqlOutcome;
use serde::Serialize;

use crate::cli::root_commands::QueryArgs;
use crate::cli::{GlobalFlags, OutputFormat};
use crate::commands::shared::hints::{NO_RESULT_TIPS, print_tips, query_hints};
use crate::commands::shared::limit::display_cap;
use crate::context::AppContext;
use crate::output::{output, output_rows};

#[derive(Debug, Serialize)]
struct AffectedResponse {
    affected: u64,
}

/// Handle `nexus-bio query`.
pub async fn handle(args: &QueryArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    execute(&args.sql, ctx, flags).await
}

/// Execute `sql` and print its rows or affected count.
///
/// Failures print hints chosen by the MySQL error code before the error is
/// returned.
pub async fn execute(sql: &str, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let outcome = match ctx.db.run_sql(sql).await {
        Ok(outcome) => outcome,
        Err(error) => {
            if !flags.quiet {
                print_tips("Suggestions:", query_hints(error.kind()));
            }
            return Err(anyhow::Error::new(error).context("query failed"));
        }
    };

    match outcome {
        SqlOutcome::Rows(result) if result.is_empty() && flags.format == OutputFormat::Table => {
            println!("No results.");
            if !flags.quiet {
                print_tips("Tips:", NO_RESULT_TIPS);
            }
            Ok(())
        }
        SqlOutcome::Rows(result) => {
            if flags.narrate() {
                println!("{} record(s) found", result.len());
            }
            output_rows(
                &result,
                flags.format,
                display_cap(flags.limit, ctx.config.general.max_display_rows),
            )
        }
        SqlOutcome::Affected(affected) if flags.format == OutputFormat::Table => {
            println!("Statement executed, {affected} row(s) affected.");
            Ok(())
        }
        SqlOutcome::Affected(affected) => output(&AffectedResponse { affected }, flags.format),
    }
}
