use chrono::Local;
use nexus_core::CellValue;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::TableArg;
use crate::commands::manual::{ask_value, describe_column, print_allowed_values, print_rows};
use crate::commands::shared::hints::describe_code;
use crate::commands::shared::tables::pick_table;
use crate::context::AppContext;
use crate::prompt::Prompter;

/// Handle `nexus-bio insert`.
pub async fn run<P: Prompter>(
    args: &TableArg,
    ctx: &AppContext,
    prompter: &mut P,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let table = pick_table(args.table.as_deref(), ctx, prompter).await?;
    let columns = ctx.db.columns(&table).await?;

    println!("\n{}", table.to_uppercase());
    for column in &columns {
        println!("  {}", describe_column(column));
    }
    print_allowed_values(ctx, &table, None).await?;
    print_rows(ctx, &table, flags).await?;

    println!("\nType a value per column (empty or 'null' for NULL):");
    let now = Local::now().naive_local();
    let mut names = Vec::with_capacity(columns.len());
    let mut values = Vec::with_capacity(columns.len());
    for column in &columns {
        values.push(ask_value(prompter, column, now)?);
        names.push(column.name.clone());
    }

    println!("\nRow to insert:");
    for (name, value) in names.iter().zip(&values) {
        println!("  {name} = {}", summary_value(value));
    }
    if !prompter.confirm("Insert this row?")? {
        println!("Insert cancelled.");
        return Ok(());
    }

    match ctx.db.insert_row(&table, &names, &values).await {
        Ok(inserted) => {
            println!("Inserted {inserted} row(s) into `{table}`.");
            Ok(())
        }
        Err(error) => Err(anyhow::anyhow!(
            "insert into `{table}` failed ({}): {error}",
            describe_code(error.mysql_code())
        )),
    }
}

fn summary_value(value: &CellValue) -> String {
    match value {
        CellValue::Text(text) => format!("'{text}'"),
        other => other.to_string(),
    }
}
