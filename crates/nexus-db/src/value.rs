//! Conversion between MySQL rows and [`CellValue`]s.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use nexus_core::{CellValue, QueryResult};
use sqlx::mysql::{MySql, MySqlArguments, MySqlRow};
use sqlx::query::Query;
use sqlx::{Column, Row, TypeInfo, ValueRef};

use crate::error::DatabaseError;

/// Bind one cell as the next `?` parameter.
pub(crate) fn bind_cell<'q>(
    query: Query<'q, MySql, MySqlArguments>,
    cell: &CellValue,
) -> Query<'q, MySql, MySqlArguments> {
    match cell {
        CellValue::Null => query.bind(None::<String>),
        CellValue::Int(v) => query.bind(*v),
        CellValue::UInt(v) => query.bind(*v),
        CellValue::Float(v) => query.bind(*v),
        CellValue::Decimal(text) | CellValue::Text(text) | CellValue::Time(text) => {
            query.bind(text.clone())
        }
        CellValue::Date(date) => query.bind(*date),
        CellValue::DateTime(dt) => query.bind(*dt),
        CellValue::Bytes(bytes) => query.bind(bytes.clone()),
    }
}

/// Bind every cell in order.
pub(crate) fn bind_all<'q>(
    mut query: Query<'q, MySql, MySqlArguments>,
    cells: &[CellValue],
) -> Query<'q, MySql, MySqlArguments> {
    for cell in cells {
        query = bind_cell(query, cell);
    }
    query
}

/// Decode fetched rows into a [`QueryResult`].
pub(crate) fn rows_to_result(rows: &[MySqlRow]) -> Result<QueryResult, DatabaseError> {
    let columns = rows
        .first()
        .map(|row| {
            row.columns()
                .iter()
                .map(|column| column.name().to_string())
                .collect()
        })
        .unwrap_or_default();
    let rows = rows.iter().map(decode_row).collect::<Result<_, _>>()?;
    Ok(QueryResult { columns, rows })
}

pub(crate) fn decode_row(row: &MySqlRow) -> Result<Vec<CellValue>, DatabaseError> {
    (0..row.len())
        .map(|idx| decode_cell(row, idx).map_err(DatabaseError::from))
        .collect()
}

fn decode_cell(row: &MySqlRow, idx: usize) -> Result<CellValue, sqlx::Error> {
    let type_name = {
        let raw = row.try_get_raw(idx)?;
        if raw.is_null() {
            return Ok(CellValue::Null);
        }
        raw.type_info().name().to_ascii_uppercase()
    };

    // Unchecked reads: the declared type was already inspected above and the
    // driver decodes by wire width.
    let cell = match type_name.as_str() {
        "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" | "BOOLEAN" | "YEAR" => {
            CellValue::Int(row.try_get_unchecked::<i64, _>(idx)?)
        }
        name if name.ends_with("UNSIGNED") => {
            CellValue::UInt(row.try_get_unchecked::<u64, _>(idx)?)
        }
        "FLOAT" | "DOUBLE" => CellValue::Float(row.try_get_unchecked::<f64, _>(idx)?),
        "DECIMAL" => CellValue::Decimal(row.try_get_unchecked::<String, _>(idx)?),
        "DATE" => CellValue::Date(row.try_get_unchecked::<NaiveDate, _>(idx)?),
        "DATETIME" | "TIMESTAMP" => {
            CellValue::DateTime(row.try_get_unchecked::<NaiveDateTime, _>(idx)?)
        }
        "TIME" => match row.try_get_unchecked::<NaiveTime, _>(idx) {
            Ok(time) => CellValue::Time(time.format("%H:%M:%S").to_string()),
            Err(_) => CellValue::Time(row.try_get_unchecked::<String, _>(idx)?),
        },
        name if name.contains("BLOB") || name.contains("BINARY") || name == "BIT" => {
            CellValue::Bytes(row.try_get_unchecked::<Vec<u8>, _>(idx)?)
        }
        _ => match row.try_get_unchecked::<String, _>(idx) {
            Ok(text) => CellValue::Text(text),
            Err(_) => {
                let bytes = row.try_get_unchecked::<Vec<u8>, _>(idx)?;
                CellValue::Text(String::from_utf8_lossy(&bytes).into_owned())
            }
        },
    };
    Ok(cell)
}
