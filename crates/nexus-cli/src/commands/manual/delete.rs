use crate::cli::GlobalFlags;
use crate::cli::root_commands::DeleteArgs;
use crate::commands::manual::{ask_condition, print_rows};
use crate::commands::shared::tables::pick_table;
use crate::context::AppContext;
use crate::prompt::Prompter;

/// Handle `nexus-bio delete`.
pub async fn run<P: Prompter>(
    args: &DeleteArgs,
    ctx: &AppContext,
    prompter: &mut P,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let table = pick_table(args.table.as_deref(), ctx, prompter).await?;
    if print_rows(ctx, &table, flags).await? == 0 {
        println!("Nothing to delete.");
        return Ok(());
    }

    let condition = ask_condition(args.condition.as_deref(), prompter)?;
    if !args.yes && !prompter.confirm(&format!("Delete from `{table}` WHERE {condition}?"))? {
        println!("Delete cancelled.");
        return Ok(());
    }

    let deleted = ctx.db.delete_where(&table, &condition).await?;
    println!("Deleted {deleted} row(s) from `{table}`.");
    Ok(())
}
