//! Repairs applied to generated records before they reach the database.

use std::sync::LazyLock;

use nexus_core::catalog::{self, TAXON_RANKS};
use nexus_core::schema::truncate_chars;
use nexus_core::{ColumnInfo, Record};
use rand::Rng;
use rand::seq::SliceRandom;
use regex::Regex;
use serde_json::{Number, Value};

use crate::prompts::FkAllowList;

static DOI: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"^10\.\d+/.+").ok());
static ISO_DATE: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}").ok());

/// Share of expected columns the first record must carry.
pub const MIN_COLUMN_COVERAGE: f64 = 0.5;

/// Longest `Taxon.Nome` accepted.
pub const TAXON_NAME_MAX: usize = 50;

/// Records that survived validation plus what was changed on the way.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Validated {
    pub records: Vec<Record>,
    /// Field values that were replaced or normalised.
    pub corrections: usize,
    /// Entries dropped for not being non-empty objects.
    pub dropped: usize,
}

/// JSON truthiness as the generators treat it: null, false, 0, "" and empty
/// containers are "no value".
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

fn as_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn matches(re: &LazyLock<Option<Regex>>, text: &str) -> bool {
    re.as_ref().is_some_and(|re| re.is_match(text))
}

fn money(value: f64) -> Value {
    let rounded = (value * 100.0).round() / 100.0;
    Number::from_f64(rounded).map_or(Value::Null, Value::Number)
}

fn random_money<R: Rng + ?Sized>(rng: &mut R) -> Value {
    money(rng.gen_range(3000.0..=25000.0))
}

fn random_cpf<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..11)
        .map(|_| char::from(b'0' + rng.gen_range(0..=9u8)))
        .collect()
}

fn is_date_field(column: &str) -> bool {
    let lower = column.to_lowercase();
    lower.contains("data") || lower.contains("dt_")
}

/// Repair one field. Returns the new value when it changed.
fn repair_field<R: Rng + ?Sized>(
    table: &str,
    column: &str,
    value: &Value,
    rng: &mut R,
) -> Option<Value> {
    let mut current = value.clone();
    let mut changed = false;

    if let Some(allowed) = catalog::enum_constraint(table, column) {
        let valid = current
            .as_str()
            .is_some_and(|text| allowed.contains(&text));
        if !valid {
            if let Some(first) = allowed.first() {
                current = Value::String((*first).to_string());
                changed = true;
            }
        }
    }

    if column == "CPF" && is_truthy(&current) {
        let digits: String = as_text(&current)
            .chars()
            .filter(char::is_ascii_digit)
            .collect();
        let cpf = if digits.len() == 11 {
            digits
        } else {
            random_cpf(rng)
        };
        let cpf = Value::String(cpf);
        changed |= cpf != current;
        current = cpf;
    }

    if column == "DOI" && is_truthy(&current) && !matches(&DOI, &as_text(&current)) {
        current = Value::String(format!(
            "10.{}/example.{}.{}",
            rng.gen_range(1000..=9999),
            rng.gen_range(2020..=2024),
            rng.gen_range(1..=999)
        ));
        changed = true;
    }

    if is_date_field(column) && is_truthy(&current) && !matches(&ISO_DATE, &as_text(&current)) {
        current = Value::String(format!(
            "2024-{:02}-{:02}",
            rng.gen_range(1..=12),
            rng.gen_range(1..=28)
        ));
        changed = true;
    }

    if column == "Valor" && is_truthy(&current) {
        let parsed = match &current {
            Value::Number(number) => number.as_f64(),
            Value::String(text) => text.trim().parse::<f64>().ok(),
            _ => None,
        };
        let fixed = match parsed {
            Some(amount) if amount > 0.0 && amount.is_finite() => money(amount),
            _ => random_money(rng),
        };
        changed |= fixed != current;
        current = fixed;
    }

    changed.then_some(current)
}

/// Normalise generated records for `table`.
///
/// Enum-constrained columns fall back to their first allowed value; `CPF`
/// becomes 11 digits; `DOI` must look like `10.N/...`; date columns must
/// start with `YYYY-MM-DD`; `Valor` must be a positive amount with two
/// decimals. Entries that are not non-empty objects are dropped.
pub fn validate_records<R: Rng + ?Sized>(table: &str, records: &[Value], rng: &mut R) -> Validated {
    let mut out = Validated::default();
    for (index, entry) in records.iter().enumerate() {
        let Some(object) = entry.as_object().filter(|map| !map.is_empty()) else {
            tracing::debug!(table, record = index + 1, "dropping non-object record");
            out.dropped += 1;
            continue;
        };
        let mut record = object.clone();
        for (column, value) in &mut record {
            if let Some(fixed) = repair_field(table, column, value, rng) {
                tracing::debug!(table, record = index + 1, column = %column, from = %value, to = %fixed, "corrected field");
                *value = fixed;
                out.corrections += 1;
            }
        }
        out.records.push(record);
    }
    tracing::debug!(table, valid = out.records.len(), total = records.len(), "validation finished");
    out
}

/// True when the first record carries at least half of `columns`.
///
/// An empty column list accepts any non-empty batch.
#[must_use]
pub fn validate_structure(records: &[Value], columns: &[ColumnInfo]) -> bool {
    let Some(first) = records.first() else {
        return false;
    };
    let Some(first) = first.as_object() else {
        return false;
    };
    if columns.is_empty() {
        return true;
    }
    let present = columns
        .iter()
        .filter(|column| first.contains_key(&column.name))
        .count();
    #[allow(clippy::cast_precision_loss)]
    let coverage = present as f64 / columns.len() as f64;
    coverage >= MIN_COLUMN_COVERAGE
}

/// Replace FK values missing from their allow-list with a random valid id.
///
/// Returns how many values were replaced.
pub fn patch_foreign_keys<R: Rng + ?Sized>(
    records: &mut [Record],
    allow_lists: &[FkAllowList],
    rng: &mut R,
) -> usize {
    let mut patched = 0;
    for (index, record) in records.iter_mut().enumerate() {
        for list in allow_lists {
            let ids = list.ids();
            let Some(current) = record.get_mut(&list.column) else {
                continue;
            };
            if ids.contains(&&*current) {
                continue;
            }
            if let Some(replacement) = ids.choose(rng) {
                tracing::debug!(record = index + 1, column = %list.column, from = %current, to = %replacement, "patched foreign key");
                *current = (*replacement).clone();
                patched += 1;
            }
        }
    }
    patched
}

/// Number of rows worth asking for, given how many rows each parent holds.
///
/// `dependency_counts` follows [`catalog::sizing_dependencies`]. Association
/// tables may combine parents (capped at three times the request); other
/// tables get at most twice the smallest parent. Any empty parent yields 0.
#[must_use]
pub fn adjust_row_count(table: &str, requested: u32, dependency_counts: &[u64]) -> u32 {
    if dependency_counts.is_empty() {
        return requested;
    }
    let Some(&smallest) = dependency_counts.iter().min() else {
        return requested;
    };
    if smallest == 0 {
        return 0;
    }
    let limit = if catalog::is_association_table(table) {
        let combinations = dependency_counts
            .iter()
            .take(2)
            .fold(1u64, |acc, count| acc.saturating_mul(*count));
        combinations.min(u64::from(requested).saturating_mul(3))
    } else {
        smallest.saturating_mul(2)
    };
    let capped = u64::from(requested).min(limit.max(1));
    u32::try_from(capped).unwrap_or(requested)
}

/// Keep taxonomy records that carry `ID_Tax`, a valid `Tipo` and a `Nome`.
///
/// `Nome` is stringified and cut to 50 characters.
#[must_use]
pub fn filter_taxon_records(records: &[Value]) -> Vec<Record> {
    records
        .iter()
        .filter_map(Value::as_object)
        .filter(|record| {
            record.contains_key("ID_Tax") && record.contains_key("Nome")
        })
        .filter(|record| {
            record
                .get("Tipo")
                .and_then(Value::as_str)
                .is_some_and(|rank| TAXON_RANKS.contains(&rank))
        })
        .map(|record| {
            let name = as_text(&record["Nome"]);
            let name = truncate_chars(&name, TAXON_NAME_MAX).unwrap_or(name);
            let mut kept = Record::new();
            kept.insert(String::from("ID_Tax"), record["ID_Tax"].clone());
            kept.insert(String::from("Tipo"), record["Tipo"].clone());
            kept.insert(String::from("Nome"), Value::String(name));
            kept
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use rstest::rstest;
    use serde_json::json;

    use super::*;
    use crate::prompts::FkOption;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    fn one(table: &str, record: Value) -> Record {
        let out = validate_records(table, &[record], &mut rng());
        assert_eq!(out.records.len(), 1);
        out.records.into_iter().next().unwrap()
    }

    #[test]
    fn enum_values_fall_back_to_first_allowed() {
        let record = one("Projeto", json!({"Status": "Em andamento", "Nome": "X"}));
        assert_eq!(record["Status"], json!("Planejado"));
        let record = one("especie", json!({"IUCN": "VU"}));
        assert_eq!(record["IUCN"], json!("VU"));
        let record = one("Contrato", json!({"Status": null}));
        assert_eq!(record["Status"], json!("Pendente"));
    }

    #[test]
    fn cpf_is_reduced_to_digits() {
        let record = one("Funcionario", json!({"CPF": "123.456.789-09"}));
        assert_eq!(record["CPF"], json!("12345678909"));

        let record = one("Funcionario", json!({"CPF": "123"}));
        let cpf = record["CPF"].as_str().unwrap();
        assert_eq!(cpf.len(), 11);
        assert!(cpf.chars().all(|c| c.is_ascii_digit()));

        let record = one("Funcionario", json!({"CPF": ""}));
        assert_eq!(record["CPF"], json!(""));
    }

    #[test]
    fn bad_doi_is_regenerated() {
        let record = one("Artigo", json!({"DOI": "doi:abc"}));
        let doi = record["DOI"].as_str().unwrap();
        assert!(matches(&DOI, doi), "{doi}");
        assert!(doi.contains("/example.20"));

        let record = one("Artigo", json!({"DOI": "10.1234/revista.2023.1"}));
        assert_eq!(record["DOI"], json!("10.1234/revista.2023.1"));
    }

    #[rstest]
    #[case("Dt_Inicio")]
    #[case("Data_Coleta")]
    #[case("dt_reg")]
    fn malformed_dates_are_replaced(#[case] column: &str) {
        let record = one("Projeto", json!({ column: "15/03/2023" }));
        let date = record[column].as_str().unwrap();
        assert!(date.starts_with("2024-"), "{date}");
        assert!(matches(&ISO_DATE, date));
    }

    #[test]
    fn well_formed_dates_and_timestamps_pass() {
        let record = one("Registro_de_Uso", json!({"Dt_Reg": "2024-05-01 10:30:00"}));
        assert_eq!(record["Dt_Reg"], json!("2024-05-01 10:30:00"));
    }

    #[test]
    fn amounts_are_positive_and_rounded() {
        let record = one("Contrato", json!({"Valor": 15000.456}));
        assert_eq!(record["Valor"], json!(15000.46));

        let record = one("Contrato", json!({"Valor": "8000.5"}));
        assert_eq!(record["Valor"], json!(8000.5));

        for bad in [json!(-10), json!("muito")] {
            let record = one("Contrato", json!({ "Valor": bad }));
            let amount = record["Valor"].as_f64().unwrap();
            assert!((3000.0..=25000.0).contains(&amount), "{amount}");
        }
    }

    #[test]
    fn non_objects_are_dropped() {
        let out = validate_records(
            "Taxon",
            &[json!("texto"), json!({}), json!({"Tipo": "Genero"})],
            &mut rng(),
        );
        assert_eq!(out.records.len(), 1);
        assert_eq!(out.dropped, 2);
        assert_eq!(out.corrections, 0);
    }

    #[test]
    fn structure_needs_half_the_columns() {
        let columns = vec![
            ColumnInfo::new("ID_Lab", "int"),
            ColumnInfo::new("Nome", "varchar(50)"),
            ColumnInfo::new("Sigla", "varchar(10)"),
            ColumnInfo::new("Local", "varchar(50)"),
        ];
        assert!(validate_structure(&[json!({"ID_Lab": 1, "Nome": "A"})], &columns));
        assert!(!validate_structure(&[json!({"Nome": "A"})], &columns));
        assert!(!validate_structure(&[], &columns));
        assert!(!validate_structure(&[json!([1, 2])], &columns));
        assert!(validate_structure(&[json!({"x": 1})], &[]));
    }

    #[test]
    fn foreign_keys_outside_allow_list_are_patched() {
        let list = FkAllowList {
            column: String::from("ID_Esp"),
            options: vec![
                FkOption { id: json!(1), label: None },
                FkOption { id: json!(2), label: None },
            ],
        };
        let mut records = vec![
            json!({"ID_Esp": 2}).as_object().unwrap().clone(),
            json!({"ID_Esp": 99}).as_object().unwrap().clone(),
            json!({"Outro": 1}).as_object().unwrap().clone(),
        ];
        let patched = patch_foreign_keys(&mut records, &[list], &mut rng());
        assert_eq!(patched, 1);
        assert_eq!(records[0]["ID_Esp"], json!(2));
        assert!([json!(1), json!(2)].contains(&records[1]["ID_Esp"]));
        assert!(!records[2].contains_key("ID_Esp"));
    }

    #[test]
    fn empty_allow_list_leaves_values_alone() {
        let list = FkAllowList {
            column: String::from("ID_Proj"),
            options: Vec::new(),
        };
        let mut records = vec![json!({"ID_Proj": 5}).as_object().unwrap().clone()];
        assert_eq!(patch_foreign_keys(&mut records, &[list], &mut rng()), 0);
        assert_eq!(records[0]["ID_Proj"], json!(5));
    }

    #[rstest]
    #[case("Local_de_Coleta", 10, &[], 10)]
    #[case("Especime", 10, &[3], 6)]
    #[case("Especime", 10, &[50], 10)]
    #[case("Amostra", 10, &[4, 0], 0)]
    #[case("Proj_Func", 10, &[2, 3], 6)]
    #[case("proj_esp", 10, &[20, 20], 10)]
    #[case("Contrato", 5, &[1, 9], 2)]
    fn row_counts_follow_parents(
        #[case] table: &str,
        #[case] requested: u32,
        #[case] counts: &[u64],
        #[case] expected: u32,
    ) {
        assert_eq!(adjust_row_count(table, requested, counts), expected);
    }

    #[test]
    fn taxon_records_are_filtered_and_trimmed() {
        let long = "x".repeat(60);
        let kept = filter_taxon_records(&[
            json!({"ID_Tax": 1, "Tipo": "Dominio", "Nome": "Eukarya"}),
            json!({"ID_Tax": 2, "Tipo": "Gênero", "Nome": "Panthera"}),
            json!({"ID_Tax": 3, "Tipo": "Reino"}),
            json!({"ID_Tax": 4, "Tipo": "Filo", "Nome": long}),
            json!("solto"),
        ]);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0]["Nome"], json!("Eukarya"));
        assert_eq!(kept[1]["Nome"].as_str().unwrap().len(), 50);
    }
}
