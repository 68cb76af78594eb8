use chrono::Local;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::UpdateArgs;
use crate::commands::manual::coerce::coerce_input;
use crate::commands::manual::{ask_condition, ask_value, find_column, print_allowed_values, print_rows};
use crate::commands::shared::tables::pick_table;
use crate::context::AppContext;
use crate::prompt::Prompter;

/// Handle `nexus-bio update`.
///
/// Flags that were given are used as-is; the rest are prompted for.
pub async fn run<P: Prompter>(
    args: &UpdateArgs,
    ctx: &AppContext,
    prompter: &mut P,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let table = pick_table(args.table.as_deref(), ctx, prompter).await?;
    if print_rows(ctx, &table, flags).await? == 0 {
        println!("Nothing to update.");
        return Ok(());
    }

    let columns = ctx.db.columns(&table).await?;
    let wanted = match args.column.as_deref() {
        Some(column) => column.to_string(),
        None => prompter.input("Column to update")?,
    };
    let column = find_column(&columns, &wanted)?;
    print_allowed_values(ctx, &table, Some(&column.name)).await?;

    let now = Local::now().naive_local();
    let value = match args.value.as_deref() {
        Some(raw) => {
            let coerced = coerce_input(column, raw, now);
            if let Some(note) = coerced.note {
                println!("    {note}");
            }
            coerced.value
        }
        None => ask_value(prompter, column, now)?,
    };
    let condition = ask_condition(args.condition.as_deref(), prompter)?;

    let updated = ctx
        .db
        .update_where(&table, &column.name, &value, &condition)
        .await?;
    println!("Updated {updated} row(s) of `{table}`.");
    Ok(())
}
