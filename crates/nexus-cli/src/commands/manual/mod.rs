//! Prompt-driven insert, update, and delete.

pub mod coerce;
pub mod delete;
pub mod insert;
pub mod update;

use chrono::NaiveDateTime;
use nexus_core::{CellValue, ColumnInfo};

use crate::cli::GlobalFlags;
use crate::commands::shared::limit::display_cap;
use crate::context::AppContext;
use crate::output::output_rows;
use crate::prompt::Prompter;

use self::coerce::{coerce_input, is_automatic};

/// `Status: varchar(20) [REQUIRED]`
#[must_use]
pub fn describe_column(column: &ColumnInfo) -> String {
    let flags = column.flags();
    if flags.is_empty() {
        format!("{}: {}", column.name, column.column_type)
    } else {
        format!("{}: {} [{}]", column.name, column.column_type, flags.join(", "))
    }
}

/// Print the CHECK-constrained values of `table`, optionally for one column.
pub async fn print_allowed_values(
    ctx: &AppContext,
    table: &str,
    column: Option<&str>,
) -> anyhow::Result<()> {
    for constraint in ctx.db.check_constraints(table).await? {
        for (name, values) in constraint.allowed_values() {
            if column.is_none_or(|wanted| wanted.eq_ignore_ascii_case(&name)) {
                println!("Allowed values for '{name}': {}", values.join(", "));
            }
        }
    }
    Ok(())
}

/// Print the current rows of `table`. Returns how many there are.
pub async fn print_rows(ctx: &AppContext, table: &str, flags: &GlobalFlags) -> anyhow::Result<usize> {
    let rows = ctx.db.select_all(table).await?;
    if rows.is_empty() {
        println!("Table `{table}` is empty.");
    } else {
        output_rows(
            &rows,
            flags.format,
            display_cap(flags.limit, ctx.config.general.max_display_rows),
        )?;
    }
    Ok(rows.len())
}

/// Ask for one column value and coerce it, echoing any fallback note.
pub fn ask_value<P: Prompter>(
    prompter: &mut P,
    column: &ColumnInfo,
    now: NaiveDateTime,
) -> anyhow::Result<CellValue> {
    if is_automatic(column) {
        println!("  {} ({}): {now} [automatic]", column.name, column.column_type);
        return Ok(CellValue::DateTime(now));
    }

    let label = if column.is_blob() {
        format!("{} ({}) file path", column.name, column.column_type)
    } else {
        format!("{} ({})", column.name, column.column_type)
    };
    let raw = prompter.input(&label)?;
    let coerced = coerce_input(column, &raw, now);
    if let Some(note) = coerced.note {
        println!("    {note}");
    }
    Ok(coerced.value)
}

/// Column named `wanted`, compared case-insensitively.
pub fn find_column<'a>(columns: &'a [ColumnInfo], wanted: &str) -> anyhow::Result<&'a ColumnInfo> {
    columns
        .iter()
        .find(|column| column.name.eq_ignore_ascii_case(wanted.trim()))
        .ok_or_else(|| {
            anyhow::anyhow!(
                "unknown column '{}'; columns are {}",
                wanted.trim(),
                columns.iter().map(|c| c.name.as_str()).collect::<Vec<_>>().join(", ")
            )
        })
}

/// Read a WHERE clause, refusing an empty one.
pub fn ask_condition<P: Prompter>(given: Option<&str>, prompter: &mut P) -> anyhow::Result<String> {
    let condition = match given {
        Some(condition) => condition.trim().to_string(),
        None => prompter.input("WHERE condition (e.g. ID_Proj = 1)")?,
    };
    if condition.is_empty() {
        anyhow::bail!("a WHERE condition is required");
    }
    Ok(condition)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::prompt::scripted::ScriptedPrompter;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 2)
            .and_then(|d| d.and_hms_opt(3, 4, 5))
            .expect("valid timestamp")
    }

    #[test]
    fn column_descriptions_list_flags() {
        let mut id = ColumnInfo::new("ID_Proj", "int");
        id.key = String::from("PRI");
        id.extra = String::from("auto_increment");
        id.nullable = false;
        assert_eq!(describe_column(&id), "ID_Proj: int [PK, AI]");

        let mut name = ColumnInfo::new("Nome", "varchar(100)");
        name.nullable = false;
        assert_eq!(describe_column(&name), "Nome: varchar(100) [REQUIRED]");

        assert_eq!(describe_column(&ColumnInfo::new("Obs", "text")), "Obs: text");
    }

    #[test]
    fn timestamps_are_not_prompted() {
        let mut prompter = ScriptedPrompter::default();
        let value = ask_value(&mut prompter, &ColumnInfo::new("Dt_Cad", "timestamp"), now())
            .expect("automatic value");
        assert_eq!(value, CellValue::DateTime(now()));
        assert!(prompter.asked.is_empty());
    }

    #[test]
    fn values_are_typed_by_column() {
        let mut prompter = ScriptedPrompter::new(["12"]);
        let value = ask_value(&mut prompter, &ColumnInfo::new("Qtd", "int"), now()).expect("value");
        assert_eq!(value, CellValue::Int(12));
        assert_eq!(prompter.asked, vec!["Qtd (int)"]);
    }

    #[test]
    fn column_lookup_ignores_case() {
        let columns = vec![ColumnInfo::new("Status", "varchar(20)")];
        assert_eq!(find_column(&columns, "status").expect("found").name, "Status");
        let error = find_column(&columns, "Estado").unwrap_err();
        assert!(error.to_string().contains("columns are Status"));
    }

    #[test]
    fn empty_conditions_are_refused() {
        let mut prompter = ScriptedPrompter::new([""]);
        assert!(ask_condition(None, &mut prompter).is_err());
        assert_eq!(ask_condition(Some(" ID = 1 "), &mut prompter).expect("given"), "ID = 1");
    }
}
