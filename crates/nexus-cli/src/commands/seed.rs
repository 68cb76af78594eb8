use std::path::Path;

use nexus_db::seed::SeedOutcome;

use crate::cli::root_commands::SeedArgs;
use crate::cli::{GlobalFlags, OutputFormat};
use crate::commands::shared::hints::describe_code;
use crate::context::AppContext;
use crate::output::output;

/// Handle `nexus-bio seed`.
pub async fn handle(args: &SeedArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let dir = args
        .dir
        .clone()
        .unwrap_or_else(|| ctx.config.general.data_dir.clone());
    run(&dir, ctx, flags).await
}

/// Load every seed file in `dir` and print what happened per table.
pub async fn run(dir: &Path, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    if !dir.is_dir() {
        anyhow::bail!("seed directory {} does not exist", dir.display());
    }
    let outcomes = ctx.db.seed_from_dir(dir).await?;

    if flags.format != OutputFormat::Table {
        return output(&outcomes, flags.format);
    }
    for outcome in &outcomes {
        for line in describe(outcome, flags.verbose) {
            println!("{line}");
        }
    }
    let loaded = outcomes
        .iter()
        .filter(|outcome| matches!(outcome, SeedOutcome::Loaded { report } if report.success()))
        .count();
    println!("{loaded} of {} table(s) seeded.", outcomes.len());
    Ok(())
}

fn describe(outcome: &SeedOutcome, verbose: bool) -> Vec<String> {
    match outcome {
        SeedOutcome::Loaded { report } => {
            let mut lines = vec![format!(
                "{}: {} inserted, {} rejected",
                report.table,
                report.inserted,
                report.failures.len()
            )];
            let shown = if verbose { report.failures.len() } else { 3 };
            lines.extend(report.failures.iter().take(shown).map(|failure| {
                format!(
                    "  row {}: {} ({})",
                    failure.index,
                    failure.message,
                    describe_code(failure.code)
                )
            }));
            if report.failures.len() > shown {
                lines.push(format!("  ... {} more", report.failures.len() - shown));
            }
            lines
        }
        SeedOutcome::Missing { table, path } => {
            vec![format!("{table}: no seed file at {}, skipped", path.display())]
        }
        SeedOutcome::Failed { table, error } => vec![format!("{table}: failed, {error}")],
    }
}
