use nexus_core::QueryResult;
use serde::Serialize;
use serde_json::Value;

use crate::cli::OutputFormat;
use crate::ui;

pub mod chart;
pub mod table;

/// Render a serializable response to a string in the requested format.
pub fn render<T: Serialize>(value: &T, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(value)?),
        OutputFormat::Table => render_table(value),
        OutputFormat::Raw => Ok(serde_json::to_string(value)?),
    }
}

/// Print a serializable response in the requested format.
pub fn output<T: Serialize>(value: &T, format: OutputFormat) -> anyhow::Result<()> {
    let rendered = render(value, format)?;
    println!("{rendered}");
    Ok(())
}

/// Render query rows keeping the server's column order.
pub fn render_rows(result: &QueryResult, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Table => {
            if result.columns.is_empty() {
                return Ok(String::from("(no columns)"));
            }
            let headers = result.columns.iter().map(String::as_str).collect::<Vec<_>>();
            let table = table::render_entity_table(&headers, &result.to_string_rows(), options());
            Ok(if result.is_empty() {
                format!("{table}\n(no rows)")
            } else {
                table
            })
        }
        OutputFormat::Json | OutputFormat::Raw => render(result, format),
    }
}

/// Print query rows, showing at most `cap` of them.
///
/// In table mode a footer reports the total when rows were held back.
pub fn output_rows(result: &QueryResult, format: OutputFormat, cap: usize) -> anyhow::Result<()> {
    let total = result.len();
    let mut shown = result.clone();
    let hidden = shown.truncate(cap);
    println!("{}", render_rows(&shown, format)?);
    if hidden > 0 && format == OutputFormat::Table {
        println!("(showing {cap} of {total} rows)");
    }
    Ok(())
}

fn options() -> table::TableOptions {
    let prefs = ui::prefs();
    table::TableOptions {
        max_width: prefs.term_width,
        color: prefs.table_color,
    }
}

fn render_table<T: Serialize>(value: &T) -> anyhow::Result<String> {
    let value = serde_json::to_value(value)?;
    match value {
        Value::Array(items) => Ok(render_array_table(&items)),
        Value::Object(map) => {
            let headers = ["key", "value"];
            let mut entries = map.into_iter().collect::<Vec<_>>();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            let rows = entries
                .into_iter()
                .map(|(key, value)| vec![key, value_to_cell(&value)])
                .collect::<Vec<_>>();
            Ok(table::render_entity_table(&headers, &rows, options()))
        }
        scalar => {
            let headers = ["value"];
            let rows = vec![vec![value_to_cell(&scalar)]];
            Ok(table::render_entity_table(&headers, &rows, options()))
        }
    }
}

fn render_array_table(items: &[Value]) -> String {
    if items.is_empty() {
        return String::from("(no rows)");
    }

    if !items.iter().all(Value::is_object) {
        let headers = ["value"];
        let rows = items
            .iter()
            .map(|item| vec![value_to_cell(item)])
            .collect::<Vec<_>>();
        return table::render_entity_table(&headers, &rows, options());
    }

    let mut headers = Vec::<String>::new();
    for map in items.iter().filter_map(Value::as_object) {
        for key in map.keys() {
            if !headers.contains(key) {
                headers.push(key.clone());
            }
        }
    }

    if headers.is_empty() {
        return String::from("(no columns)");
    }

    headers.sort();

    let header_refs = headers.iter().map(String::as_str).collect::<Vec<_>>();
    let rows = items
        .iter()
        .filter_map(Value::as_object)
        .map(|map| {
            headers
                .iter()
                .map(|header| map.get(header).map_or_else(|| String::from("-"), value_to_cell))
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>();

    table::render_entity_table(&header_refs, &rows, options())
}

fn value_to_cell(value: &Value) -> String {
    match value {
        Value::Null => String::from("NULL"),
        Value::Bool(v) => v.to_string(),
        Value::Number(v) => v.to_string(),
        Value::String(v) => v.clone(),
        other => serde_json::to_string(other).unwrap_or_else(|_| String::from("<invalid-json>")),
    }
}

#[cfg(test)]
mod tests {
    use nexus_core::{CellValue, QueryResult};
    use pretty_assertions::assert_eq;
    use serde::Serialize;

    use super::{render, render_rows};
    use crate::cli::OutputFormat;

    #[derive(Serialize)]
    struct Example {
        table: &'static str,
        inserted: u32,
    }

    fn sample() -> QueryResult {
        QueryResult {
            columns: vec![String::from("ID_Tax"), String::from("Tipo"), String::from("Nome")],
            rows: vec![
                vec![
                    CellValue::Int(1),
                    CellValue::Text(String::from("Dominio")),
                    CellValue::Text(String::from("Eukarya")),
                ],
                vec![CellValue::Int(2), CellValue::Text(String::from("Reino")), CellValue::Null],
            ],
        }
    }

    #[test]
    fn json_render_is_valid_json() {
        let value = Example { table: "Taxon", inserted: 7 };
        let out = render(&value, OutputFormat::Json).expect("json render should work");
        let parsed: serde_json::Value = serde_json::from_str(&out).expect("json should parse");
        assert_eq!(parsed["table"], "Taxon");
        assert_eq!(parsed["inserted"], 7);
    }

    #[test]
    fn raw_render_is_single_line_json() {
        let value = Example { table: "Taxon", inserted: 7 };
        let out = render(&value, OutputFormat::Raw).expect("raw render should work");
        assert!(!out.contains('\n'));
    }

    #[test]
    fn table_render_for_object_is_tabular() {
        let value = Example { table: "Taxon", inserted: 7 };
        let out = render(&value, OutputFormat::Table).expect("table render should work");
        assert!(out.lines().next().is_some_and(|line| line.contains("key")));
        assert!(out.contains("inserted"));
    }

    #[test]
    fn array_tables_sort_headers() {
        let rows = vec![Example { table: "Taxon", inserted: 7 }];
        let out = render(&rows, OutputFormat::Table).expect("table render should work");
        let header = out.lines().next().expect("header line");
        assert!(header.find("inserted") < header.find("table"));
    }

    #[test]
    fn query_rows_keep_column_order_and_show_null() {
        let out = render_rows(&sample(), OutputFormat::Table).expect("render");
        let lines: Vec<&str> = out.lines().collect();
        assert!(lines[0].starts_with("ID_Tax"));
        assert!(lines[0].find("Tipo") < lines[0].find("Nome"));
        assert!(lines[3].contains("NULL"));
    }

    #[test]
    fn empty_results_say_so() {
        let mut empty = sample();
        empty.rows.clear();
        let out = render_rows(&empty, OutputFormat::Table).expect("render");
        assert!(out.ends_with("(no rows)"));
    }

    #[test]
    fn json_rows_are_records() {
        let out = render_rows(&sample(), OutputFormat::Raw).expect("render");
        let parsed: serde_json::Value = serde_json::from_str(&out).expect("json should parse");
        assert_eq!(parsed[0]["Nome"], "Eukarya");
        assert_eq!(parsed[1]["Nome"], serde_json::Value::Null);
    }
}
