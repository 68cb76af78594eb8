//! Splitting and classifying SQL script text.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

static BLOCK_COMMENT: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?s)/\*.*?\*/").ok());

static CREATE_TABLE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(?i)CREATE\s+TABLE\s+(?:IF\s+NOT\s+EXISTS\s+)?`?(\w+)`?").ok()
});

/// Verbs whose statements return a row set.
const ROW_VERBS: &[&str] = &["SELECT", "SHOW", "DESCRIBE", "DESC", "EXPLAIN", "WITH"];

/// Split a DDL/DML script into executable statements.
///
/// Block comments are removed, lines starting with `--` or `#` and blank
/// lines are dropped, and the rest is split on `;`.
#[must_use]
pub fn split_script(text: &str) -> Vec<String> {
    let without_blocks = match BLOCK_COMMENT.as_ref() {
        Some(re) => re.replace_all(text, "").into_owned(),
        None => text.to_string(),
    };

    let kept = without_blocks
        .lines()
        .filter(|line| {
            let trimmed = line.trim();
            !trimmed.is_empty() && !trimmed.starts_with("--") && !trimmed.starts_with('#')
        })
        .collect::<Vec<_>>()
        .join("\n");

    kept.split(';')
        .map(str::trim)
        .filter(|stmt| !stmt.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// First keyword of a statement, uppercased.
#[must_use]
pub fn statement_verb(sql: &str) -> String {
    sql.split_whitespace()
        .next()
        .unwrap_or_default()
        .trim_start_matches('(')
        .to_ascii_uppercase()
}

/// Whether the statement is expected to return rows.
#[must_use]
pub fn is_row_returning(sql: &str) -> bool {
    ROW_VERBS.contains(&statement_verb(sql).as_str())
}

/// Table name of a `CREATE TABLE` statement.
#[must_use]
pub fn created_table_name(sql: &str) -> Option<String> {
    CREATE_TABLE
        .as_ref()?
        .captures(sql)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Single-line preview of a statement, at most `width` characters.
#[must_use]
pub fn preview(sql: &str, width: usize) -> String {
    let flat = sql.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= width {
        flat
    } else {
        let cut: String = flat.chars().take(width).collect();
        format!("{cut}...")
    }
}

/// Result of one script statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum StatementOutcome {
    Executed { index: usize, preview: String },
    AlreadyExists { index: usize, table: String },
    SyntaxError { index: usize, message: String },
    Failed {
        index: usize,
        code: Option<u16>,
        message: String,
    },
}

impl StatementOutcome {
    #[must_use]
    pub const fn index(&self) -> usize {
        match self {
            Self::Executed { index, .. }
            | Self::AlreadyExists { index, .. }
            | Self::SyntaxError { index, .. }
            | Self::Failed { index, .. } => *index,
        }
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Executed { .. })
    }
}
