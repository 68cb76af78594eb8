use anyhow::{Context, bail};
use nexus_llm::sqlgen::generate_sql;
use serde::Serialize;

use crate::cli::root_commands::AskArgs;
use crate::cli::{GlobalFlags, OutputFormat};
use crate::commands::query;
use crate::context::AppContext;
use crate::output::output;
use crate::progress::Progress;
use crate::prompt::Prompter;

#[derive(Debug, Serialize)]
struct DryRunResponse<'a> {
    sql: &'a str,
    tables: &'a [String],
    regenerated: bool,
}

/// Handle `nexus-bio ask`.
pub async fn handle<P: Prompter>(
    args: &AskArgs,
    ctx: &AppContext,
    prompter: &mut P,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let question = match args.question.as_deref() {
        Some(question) => question.trim().to_string(),
        None => prompter.input("Question")?,
    };
    if question.is_empty() {
        bail!("the question is empty");
    }

    let schema = ctx.db.schema_info().await?;
    if schema.is_empty() {
        bail!("the database has no tables; run `nexus-bio create` first");
    }
    let model = ctx.chat_client()?;

    let spinner = Progress::spinner("generating SQL");
    let generated = generate_sql(&model, &question, &schema, ctx.retry_policy()).await;
    spinner.finish_clear();
    let generated = generated.context("SQL generation failed")?;

    if args.dry_run && flags.format != OutputFormat::Table {
        return output(
            &DryRunResponse {
                sql: &generated.sql,
                tables: &generated.tables,
                regenerated: generated.regenerated,
            },
            flags.format,
        );
    }

    if flags.narrate() {
        println!("Tables considered: {}", generated.tables.join(", "));
        if generated.regenerated {
            println!("(regenerated with a stricter prompt)");
        }
    }
    println!("SQL: {}", generated.sql);
    if args.dry_run {
        return Ok(());
    }

    query::execute(&generated.sql, ctx, flags).await
}
