//! String-level repair of model replies.
//!
//! Models wrap JSON and SQL in markdown fences, prefix it with labels, or add
//! chatter around it. These helpers strip that back to the payload.

use std::sync::LazyLock;

use nexus_core::RecordBatch;
use regex::Regex;

use crate::error::LlmError;

static JSON_FENCE: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"```json\s*").ok());
static ANY_FENCE: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"```\s*").ok());
static SQL_FENCE: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"(?i)```sql\s*").ok());
static SQL_LABEL: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(?i)^(SQL:|Query:|Resposta:|SELECT\s*SQL:)\s*").ok()
});
static WHITESPACE: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"\s+").ok());

/// Statement keywords a usable SQL reply must contain.
pub const SQL_KEYWORDS: &[&str] = &["SELECT", "INSERT", "UPDATE", "DELETE", "SHOW", "DESCRIBE"];

fn strip(re: &LazyLock<Option<Regex>>, text: &str) -> String {
    match re.as_ref() {
        Some(re) => re.replace_all(text, "").into_owned(),
        None => text.to_string(),
    }
}

/// Remove code fences and keep the span from the first line starting with
/// `{` to the last line ending with `}`.
///
/// Without such a span the fence-stripped text is returned trimmed.
#[must_use]
pub fn clean_json_response(reply: &str) -> String {
    if reply.is_empty() {
        return String::new();
    }
    let text = strip(&ANY_FENCE, &strip(&JSON_FENCE, reply));
    let lines: Vec<&str> = text.split('\n').collect();

    let start = lines.iter().position(|line| line.trim().starts_with('{'));
    let end = lines.iter().rposition(|line| line.trim().ends_with('}'));
    match (start, end) {
        (Some(start), Some(end)) if start <= end => lines[start..=end].join("\n"),
        _ => text.trim().to_string(),
    }
}

/// Clean a reply and parse it as a `{"registros": [...]}` batch.
///
/// # Errors
///
/// [`LlmError::EmptyReply`] when nothing is left after cleaning,
/// [`LlmError::Core`] when the JSON is malformed or lacks `registros`.
pub fn parse_record_batch(reply: &str) -> Result<RecordBatch, LlmError> {
    let cleaned = clean_json_response(reply);
    if cleaned.trim().is_empty() {
        return Err(LlmError::EmptyReply);
    }
    Ok(RecordBatch::from_json_str(&cleaned)?)
}

/// Remove fences from a SQL reply and collapse it onto one line.
///
/// With `strip_label` set, a leading `SQL:`/`Query:`/`Resposta:` label is
/// removed too.
#[must_use]
pub fn clean_sql_response(reply: &str, strip_label: bool) -> String {
    let mut text = strip(&ANY_FENCE, &strip(&SQL_FENCE, reply)).trim().to_string();
    if strip_label {
        text = strip(&SQL_LABEL, &text).trim().to_string();
    }
    match WHITESPACE.as_ref() {
        Some(re) => re.replace_all(&text, " ").trim().to_string(),
        None => text.split_whitespace().collect::<Vec<_>>().join(" "),
    }
}

/// True if the text mentions one of [`SQL_KEYWORDS`] anywhere.
#[must_use]
pub fn looks_like_sql(text: &str) -> bool {
    let upper = text.to_uppercase();
    SQL_KEYWORDS.iter().any(|keyword| upper.contains(keyword))
}
