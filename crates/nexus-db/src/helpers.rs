//! SQL text helpers shared by the statement builders.

use nexus_core::{CellValue, ColumnInfo, ColumnKind, schema::truncate_chars};

/// Quote an identifier with backticks, doubling embedded backticks.
#[must_use]
pub fn quote_ident(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

/// `?, ?, ?` for `n` parameters.
#[must_use]
pub fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}

/// Truncate text bound for a `varchar(N)` column to N characters.
///
/// Returns the value unchanged for other column kinds.
#[must_use]
pub fn fit_to_column(value: CellValue, column: Option<&ColumnInfo>) -> CellValue {
    let Some(ColumnKind::Varchar(max)) = column.map(ColumnInfo::kind) else {
        return value;
    };
    match value {
        CellValue::Text(text) => match truncate_chars(&text, max) {
            Some(short) => {
                tracing::debug!(
                    column = column.map_or("", |c| c.name.as_str()),
                    max,
                    "truncated value to column length"
                );
                CellValue::Text(short)
            }
            None => CellValue::Text(text),
        },
        other => other,
    }
}
