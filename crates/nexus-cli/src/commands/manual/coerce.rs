//! Typing raw answers into column values.

use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use nexus_core::schema::truncate_chars;
use nexus_core::{CellValue, ColumnInfo, ColumnKind};

/// A coerced value plus a note for the user when input was replaced.
#[derive(Debug, Clone, PartialEq)]
pub struct Coerced {
    pub value: CellValue,
    pub note: Option<String>,
}

impl Coerced {
    const fn exact(value: CellValue) -> Self {
        Self { value, note: None }
    }

    fn noted(value: CellValue, note: String) -> Self {
        Self {
            value,
            note: Some(note),
        }
    }
}

/// Timestamp columns are filled with `now` and never prompted for.
#[must_use]
pub fn is_automatic(column: &ColumnInfo) -> bool {
    column.kind() == ColumnKind::Timestamp
}

fn is_null(raw: &str) -> bool {
    raw.is_empty() || raw.eq_ignore_ascii_case("null")
}

/// Convert one answer to the value bound for `column`.
///
/// Empty answers and `null` become NULL. Unparseable numbers fall back to
/// zero and malformed dates to today, each with a note.
#[must_use]
pub fn coerce_input(column: &ColumnInfo, raw: &str, now: NaiveDateTime) -> Coerced {
    let raw = raw.trim();
    let kind = column.kind();

    if kind == ColumnKind::Timestamp {
        return Coerced::exact(CellValue::DateTime(now));
    }
    if is_null(raw) {
        return Coerced::exact(CellValue::Null);
    }

    match kind {
        ColumnKind::Blob => read_blob(raw),
        ColumnKind::Integer => raw.parse::<i64>().map_or_else(
            |_| Coerced::noted(CellValue::Int(0), format!("'{raw}' is not an integer, using 0")),
            |n| Coerced::exact(CellValue::Int(n)),
        ),
        ColumnKind::Decimal => raw.replace(',', ".").parse::<f64>().map_or_else(
            |_| Coerced::noted(CellValue::Float(0.0), format!("'{raw}' is not a number, using 0.0")),
            |n| Coerced::exact(CellValue::Float(n)),
        ),
        ColumnKind::Date => NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_or_else(
            |_| {
                let today = now.date();
                Coerced::noted(
                    CellValue::Date(today),
                    format!("'{raw}' is not a YYYY-MM-DD date, using {today}"),
                )
            },
            |date| Coerced::exact(CellValue::Date(date)),
        ),
        ColumnKind::Varchar(max) => match truncate_chars(raw, max) {
            Some(short) => Coerced::noted(
                CellValue::Text(short),
                format!("cut to {max} characters"),
            ),
            None => Coerced::exact(CellValue::Text(raw.to_string())),
        },
        ColumnKind::Text | ColumnKind::Timestamp => Coerced::exact(CellValue::Text(raw.to_string())),
    }
}

fn read_blob(raw: &str) -> Coerced {
    let path = Path::new(raw);
    match std::fs::read(path) {
        Ok(bytes) => {
            let size = bytes.len();
            Coerced::noted(CellValue::Bytes(bytes), format!("read {size} bytes from {raw}"))
        }
        Err(error) => Coerced::noted(
            CellValue::Null,
            format!("cannot read {raw} ({error}), storing NULL"),
        ),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 17)
            .and_then(|d| d.and_hms_opt(10, 30, 0))
            .expect("valid timestamp")
    }

    fn column(column_type: &str) -> ColumnInfo {
        ColumnInfo::new("Campo", column_type)
    }

    #[rstest]
    #[case("int", "42", CellValue::Int(42))]
    #[case("int", "", CellValue::Null)]
    #[case("varchar(10)", "NULL", CellValue::Null)]
    #[case("decimal(10,2)", "1500,75", CellValue::Float(1500.75))]
    #[case("date", "2023-02-01", CellValue::Date(NaiveDate::from_ymd_opt(2023, 2, 1).unwrap()))]
    #[case("text", "Coletado na margem", CellValue::Text(String::from("Coletado na margem")))]
    fn well_formed_input_is_kept(
        #[case] column_type: &str,
        #[case] raw: &str,
        #[case] expected: CellValue,
    ) {
        let coerced = coerce_input(&column(column_type), raw, now());
        assert_eq!(coerced.value, expected);
        assert_eq!(coerced.note, None);
    }

    #[rstest]
    #[case("int", "dez", CellValue::Int(0))]
    #[case("float", "abc", CellValue::Float(0.0))]
    #[case("date", "17/05/2024", CellValue::Date(NaiveDate::from_ymd_opt(2024, 5, 17).unwrap()))]
    fn malformed_input_falls_back(
        #[case] column_type: &str,
        #[case] raw: &str,
        #[case] expected: CellValue,
    ) {
        let coerced = coerce_input(&column(column_type), raw, now());
        assert_eq!(coerced.value, expected);
        assert!(coerced.note.is_some());
    }

    #[test]
    fn timestamps_are_automatic() {
        let col = column("timestamp");
        assert!(is_automatic(&col));
        assert_eq!(coerce_input(&col, "ignored", now()).value, CellValue::DateTime(now()));
    }

    #[test]
    fn varchar_input_is_cut_to_length() {
        let coerced = coerce_input(&column("varchar(5)"), "Araucária", now());
        assert_eq!(coerced.value, CellValue::Text(String::from("Arauc")));
        assert_eq!(coerced.note.as_deref(), Some("cut to 5 characters"));
    }

    #[test]
    fn blobs_are_read_from_disk() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(b"\x89PNG fake").expect("write");
        let path = file.path().to_string_lossy().to_string();

        let coerced = coerce_input(&column("longblob"), &path, now());
        assert_eq!(coerced.value, CellValue::Bytes(b"\x89PNG fake".to_vec()));
    }

    #[test]
    fn missing_blob_files_store_null() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("nope.png").to_string_lossy().to_string();

        let coerced = coerce_input(&column("blob"), &path, now());
        assert_eq!(coerced.value, CellValue::Null);
        assert!(coerced.note.is_some_and(|note| note.contains("storing NULL")));
    }
}
