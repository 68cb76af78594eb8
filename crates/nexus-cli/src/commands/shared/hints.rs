//! Advice printed after failed or empty statements.

use nexus_db::MySqlErrorKind;

/// Suggestions when a query ran but matched nothing.
pub const NO_RESULT_TIPS: &[&str] = &[
    "check that the data you are looking for exists",
    "try more generic terms",
    "check the spelling of names and values",
];

/// Suggestions for a failed free-form statement.
#[must_use]
pub fn query_hints(kind: Option<MySqlErrorKind>) -> &'static [&'static str] {
    match kind {
        Some(MySqlErrorKind::UnknownColumn) => &[
            "check the column names",
            "qualify ambiguous columns with a table alias (e.g. e.Nome)",
            "confirm the column exists in that table",
        ],
        Some(MySqlErrorKind::NoSuchTable) => &[
            "check the table name",
            "confirm the table was created (`nexus-bio tables`)",
        ],
        Some(MySqlErrorKind::Syntax) => &[
            "check the SQL syntax",
            "quote text values with single quotes",
            "check the JOIN conditions",
        ],
        _ => &["rephrase the question or check the database structure"],
    }
}

/// One line describing a MySQL error code, e.g. `MySQL 1452: a foreign key ...`.
#[must_use]
pub fn describe_code(code: Option<u16>) -> String {
    match code {
        Some(code) => {
            let kind = MySqlErrorKind::from_code(code);
            kind.hint()
                .map_or_else(|| format!("MySQL {code}"), |hint| format!("MySQL {code}: {hint}"))
        }
        None => String::from("error"),
    }
}

/// Print `lines` as an indented bullet list on stderr.
pub fn print_tips(heading: &str, lines: &[&str]) {
    eprintln!("{heading}");
    for line in lines {
        eprintln!("  - {line}");
    }
}
