//! Natural-language questions to SQL.

use std::collections::{BTreeSet, HashSet};

use nexus_core::catalog::{self, CORE_TABLES, OVERVIEW_WORDS, QUESTION_KEYWORDS};
use nexus_core::{CoreError, SchemaMap, TableNames};

use crate::cleanup::{clean_sql_response, looks_like_sql};
use crate::client::ChatModel;
use crate::error::LlmError;
use crate::prompts::{
    SQL_TEMPERATURE, STRICT_SQL_TEMPERATURE, build_sql_prompt, build_strict_sql_prompt,
    schema_lines,
};
use crate::retry::{RetryPolicy, complete_with_retry};

/// Tables offered when the question names nothing and is not an overview.
const FALLBACK_TABLES: usize = 5;

/// Suspicious words tolerated before the query is regenerated.
const MAX_SUSPICIOUS: usize = 2;

/// Unknown words shorter than this are never suspicious.
const MIN_SUSPICIOUS_LEN: usize = 6;

/// SQL words plus Portuguese filler and domain words that show up in
/// string literals.
const IGNORED_WORDS: &[&str] = &[
    "SELECT", "FROM", "WHERE", "JOIN", "INNER", "LEFT", "RIGHT", "ON", "GROUP", "BY", "ORDER",
    "HAVING", "LIMIT", "AS", "AND", "OR", "NOT", "COUNT", "SUM", "AVG", "MIN", "MAX", "DISTINCT",
    "ALL", "IN", "LIKE", "BETWEEN", "IS", "NULL", "ASC", "DESC", "UNION", "INSERT", "INTO",
    "VALUES", "UPDATE", "SET", "DELETE", "CREATE", "DROP", "ALTER", "TABLE", "DE", "DA", "DO",
    "DAS", "DOS", "EM", "NO", "NA", "NOS", "NAS", "COM", "SEM", "PARA", "POR", "ENTRE", "SOBRE",
    "CONTRA", "DURANTE", "LABORATORIO", "LABORATÓRIO", "ESTUDO", "ESTUDOS", "PESQUISA", "CENTRO",
    "INSTITUTO", "DEPARTAMENTO", "SETOR", "UNIDADE", "INSETOS", "PLANTAS", "ANIMAIS", "FUNGOS",
    "BACTERIAS", "ESPECIES", "ESPECIME", "GENETICA", "BIOLOGIA", "TAXONOMIA",
];

/// A generated statement and how it was obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedSql {
    pub sql: String,
    /// Tables whose schema was shown to the model.
    pub tables: Vec<String>,
    /// True when the stricter second prompt produced `sql`.
    pub regenerated: bool,
}

/// Tables a question is probably about, restricted to live tables.
///
/// Keywords and literal table names select tables; questions with none fall
/// back to the core tables (for "list everything" wording) or the first few
/// live tables. FK parents of every selected table are added.
#[must_use]
pub fn select_relevant_tables(question: &str, schema: &SchemaMap) -> Vec<String> {
    let text = question.to_lowercase();
    let names = TableNames::from_names(schema.keys().cloned());

    let mut picked: Vec<String> = QUESTION_KEYWORDS
        .iter()
        .filter(|(word, _)| text.contains(word))
        .flat_map(|(_, tables)| tables.iter().map(|t| (*t).to_string()))
        .collect();
    picked.extend(
        schema
            .keys()
            .filter(|table| text.contains(&table.to_lowercase()))
            .cloned(),
    );

    if picked.is_empty() {
        if OVERVIEW_WORDS.iter().any(|word| text.contains(word)) {
            picked = CORE_TABLES.iter().map(|t| (*t).to_string()).collect();
        } else {
            picked = schema.keys().take(FALLBACK_TABLES).cloned().collect();
        }
    }

    let related: Vec<String> = picked
        .iter()
        .flat_map(|table| catalog::related_tables(table).iter().map(|t| (*t).to_string()))
        .collect();
    picked.extend(related);

    picked
        .iter()
        .filter_map(|table| names.resolve(table))
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Words in `sql` that are neither SQL, filler, table names nor column names.
///
/// Only alphabetic words longer than five characters count, and words whose
/// raw form contains a dot, dash, underscore or digit are ignored.
#[must_use]
pub fn suspicious_words(sql: &str, schema: &SchemaMap) -> Vec<String> {
    let known: HashSet<String> = schema
        .iter()
        .flat_map(|(table, columns)| {
            std::iter::once(table.to_uppercase())
                .chain(columns.iter().map(|column| column.name.to_uppercase()))
        })
        .chain(IGNORED_WORDS.iter().map(|word| (*word).to_string()))
        .collect();

    sql.to_uppercase()
        .split_whitespace()
        .filter(|raw| {
            !raw.chars()
                .any(|c| matches!(c, '.' | '-' | '_') || c.is_ascii_digit())
        })
        .map(|raw| raw.trim_matches(|c: char| "(),;`\"'".contains(c)).to_string())
        .filter(|word| {
            word.chars().count() >= MIN_SUSPICIOUS_LEN
                && word.chars().all(char::is_alphabetic)
                && !known.contains(word)
        })
        .collect()
}

/// Ask the model for one SQL statement answering `question`.
///
/// A reply naming more than two unknown words is regenerated once with a
/// stricter prompt at a lower temperature; the second reply replaces the
/// first only if it still looks like SQL.
///
/// # Errors
///
/// [`LlmError::Exhausted`] when the model never answers and
/// [`LlmError::NotSql`] when the reply carries no SQL keyword.
pub async fn generate_sql<M: ChatModel + Sync>(
    model: &M,
    question: &str,
    schema: &SchemaMap,
    policy: RetryPolicy,
) -> Result<GeneratedSql, LlmError> {
    if schema.is_empty() {
        return Err(CoreError::Validation(String::from("the database has no tables")).into());
    }

    let tables = select_relevant_tables(question, schema);
    let lines = schema_lines(
        tables
            .iter()
            .filter_map(|table| schema.get(table).map(|cols| (table.as_str(), cols.as_slice()))),
    );
    tracing::debug!(tables = ?tables, "tables selected for SQL generation");

    let reply = complete_with_retry(model, &build_sql_prompt(question, &lines), SQL_TEMPERATURE, policy)
        .await?;
    let sql = clean_sql_response(&reply, true);
    if sql.is_empty() || !looks_like_sql(&sql) {
        return Err(LlmError::NotSql(sql));
    }

    let suspicious = suspicious_words(&sql, schema);
    if suspicious.len() <= MAX_SUSPICIOUS {
        return Ok(GeneratedSql {
            sql,
            tables,
            regenerated: false,
        });
    }

    tracing::warn!(words = ?&suspicious[..MAX_SUSPICIOUS + 1], "unknown words in generated SQL, regenerating");
    let all_tables: Vec<&str> = schema.keys().map(String::as_str).collect();
    let strict = build_strict_sql_prompt(question, &lines, &all_tables);
    match model.complete(&strict, STRICT_SQL_TEMPERATURE).await {
        Ok(second) => {
            let second = clean_sql_response(&second, false);
            if looks_like_sql(&second) {
                return Ok(GeneratedSql {
                    sql: second,
                    tables,
                    regenerated: true,
                });
            }
        }
        Err(error) => tracing::warn!(%error, "strict regeneration failed, keeping first query"),
    }
    Ok(GeneratedSql {
        sql,
        tables,
        regenerated: false,
    })
}
