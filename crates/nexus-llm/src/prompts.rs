//! Prompt builders for data generation, row rewrites and SQL generation.
//!
//! Prompts are plain English. Generated values themselves must be
//! Brazilian-Portuguese where the domain calls for it (names, job titles,
//! descriptions) and must match the accent-free CHECK values exactly.

use std::fmt::Write as _;

use nexus_core::catalog::{self, TAXON_RANKS};
use nexus_core::{ColumnInfo, QueryResult, Record};
use serde_json::Value;

/// Allow-list entries rendered per FK column before "... and N more".
pub const FK_OPTIONS_SHOWN: usize = 8;

/// Example rows rendered per already-populated table.
pub const CONTEXT_EXAMPLES: usize = 2;

/// Rows from an already-populated table, used as generation context.
#[derive(Debug, Clone, PartialEq)]
pub struct ContextTable {
    pub table: String,
    pub rows: Vec<Record>,
}

/// One valid FK target: its id and an optional human label.
#[derive(Debug, Clone, PartialEq)]
pub struct FkOption {
    pub id: Value,
    pub label: Option<String>,
}

/// The ids an FK column may take.
#[derive(Debug, Clone, PartialEq)]
pub struct FkAllowList {
    pub column: String,
    pub options: Vec<FkOption>,
}

impl FkAllowList {
    /// Build from a lookup result: first column is the id, second the label.
    #[must_use]
    pub fn from_result(column: &str, result: &QueryResult) -> Self {
        let options = result
            .rows
            .iter()
            .filter_map(|row| {
                let id = row.first()?.to_json();
                let label = row.get(1).map(ToString::to_string);
                Some(FkOption { id, label })
            })
            .collect();
        Self {
            column: column.to_string(),
            options,
        }
    }

    #[must_use]
    pub fn ids(&self) -> Vec<&Value> {
        self.options.iter().map(|option| &option.id).collect()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }
}

fn column_constraint(table: &str, column: &str) -> Option<&'static str> {
    let text = match (table.to_lowercase().as_str(), column) {
        ("taxon", "Tipo") => {
            "REQUIRED: exactly one of 'Dominio', 'Reino', 'Filo', 'Classe', 'Ordem', 'Familia', 'Genero'"
        }
        ("taxon", "Nome") => "VARCHAR(50) - real, valid scientific taxon names",
        ("especie", "IUCN") => {
            "REQUIRED: exactly one of the codes 'LC', 'NT', 'VU', 'EN', 'CR', 'EW', 'EX'"
        }
        ("especie", "Nome") => "VARCHAR(50) - real binomial scientific name (Genus species)",
        ("especie", "Nome_Pop") => "VARCHAR(50) - common name in Brazilian Portuguese",
        ("especie", "ID_Gen") => "required FK - MUST reference a Taxon row with Tipo='Genero'",
        ("projeto", "Status") => {
            "REQUIRED: exactly one of 'Planejado', 'Ativo', 'Suspenso', 'Cancelado', 'Encerrado'"
        }
        ("projeto", "Nome") => "VARCHAR(50) - realistic scientific project names",
        ("projeto", "Descricao") => "VARCHAR(100) - short project description",
        ("contrato", "Status") => {
            "REQUIRED: exactly one of 'Pendente', 'Ativo', 'Suspenso', 'Cancelado', 'Encerrado'"
        }
        ("contrato", "Valor") => "DECIMAL(10,2) - positive amount (realistic Brazilian salaries)",
        ("funcionario", "CPF") => "VARCHAR(11) - EXACTLY 11 numeric digits (no dots or dashes)",
        ("funcionario", "Nome") => "VARCHAR(50) - realistic Brazilian names",
        ("funcionario", "Cargo") => "VARCHAR(50) - valid academic/scientific job titles",
        ("artigo", "DOI") => "VARCHAR(50) - valid DOI format: '10.xxxx/xxxxx'",
        ("artigo", "Titulo") => "VARCHAR(50) - realistic scientific title",
        ("artigo", "Resumo") => "VARCHAR(2500) - detailed scientific abstract",
        _ => return None,
    };
    Some(text)
}

fn extra_validation(table: &str) -> Option<&'static str> {
    let text = match table.to_lowercase().as_str() {
        "taxon" => {
            "- Dominio: Eukarya\n- Reino: Animalia, Plantae, Fungi\n- Build a coherent taxonomic hierarchy\n- The (Tipo, Nome) pair must be unique"
        }
        "especie" => {
            "- Correct binomial scientific names\n- Most common IUCN code: LC (Least Concern)\n- Realistic biological description, max 500 chars"
        }
        "projeto" => {
            "- Most common Status: 'Ativo'\n- Dt_Inicio before Dt_Fim\n- Realistic dates (2020-2025)"
        }
        "contrato" => {
            "- Most common Status: 'Ativo'\n- Valor between 3000.00 and 25000.00 reais\n- Dt_Inicio before Dt_Fim"
        }
        "funcionario" => {
            "- CPF: digits only, 11 digits\n- Cargo: Pesquisador, Professor, Técnico, Estagiário, Bolsista"
        }
        "artigo" => {
            "- DOI format: 10.1234/exemplo.2023\n- Realistic academic titles\n- Links to scientific journals"
        }
        _ => return None,
    };
    Some(text)
}

fn table_instruction(table: &str) -> &'static str {
    match table.to_lowercase().as_str() {
        "hierarquia" => {
            "ID_Tax and ID_TaxTopo MUST be existing Taxon ids. Build the chain Dominio -> Reino -> Filo -> Classe -> Ordem -> Familia -> Genero."
        }
        "especie" => {
            "ID_Gen MUST be the id of a Taxon with Tipo='Genero'. Nome MUST be a real binomial (e.g. \"Homo sapiens\"). Most common IUCN: \"LC\"."
        }
        "especime" => {
            "ID_Esp MUST be an existing Especie id. Descritivo examples: \"Adulto macho\", \"Jovem fêmea\", \"Espécime preservado\"."
        }
        "amostra" => {
            "Use existing ids. Tipo: \"Sangue\", \"DNA\", \"Tecido\", \"Osso\". Realistic collection date (2020-2024)."
        }
        "artigo" => {
            "ID_Proj MUST exist. DOI format: \"10.1234/revista.2023.123\". Real academic titles."
        }
        "proj_func" => {
            "Association table. Use existing Projeto and Funcionario ids. Every (ID_Proj, ID_Func) pair unique."
        }
        "proj_esp" => {
            "Association table. Use existing Projeto and Especie ids. Every pair unique."
        }
        "proj_cat" => {
            "Association table. Use existing Projeto and Categoria ids. Every pair unique."
        }
        "contrato" => {
            "Status values as listed above. Valor between 3000.00 and 25000.00. Coherent dates."
        }
        "financiamento" => {
            "Use existing ids. Realistic funding amounts (10000.00-500000.00)."
        }
        "registro_de_uso" => {
            "Use existing ids. Dt_Reg is a full timestamp including the time of day."
        }
        _ => "Generate realistic data following all constraints.",
    }
}

const DOMAIN_CONTEXT: &str = "\
STRICT SYSTEM CONTEXT:
A scientific taxonomy laboratory system that MUST follow real academic standards:
- Taxonomy: Dominio -> Reino -> Filo -> Classe -> Ordem -> Familia -> Genero -> Especie
- Species with REAL binomial scientific names
- Projects, articles and staff from a Brazilian academic setting (Portuguese values)
- Official status values and IUCN codes
- Monetary values in Brazilian reais";

const ABSOLUTE_RULES: &str = "\
ABSOLUTE RULES (VIOLATION = ERROR):
1. Use ONLY the Status/IUCN/Tipo values listed in the constraints
2. Use ONLY the FK ids listed above
3. Respect the VARCHAR sizes EXACTLY
4. CPF: 11 numeric digits only
5. DOI: format 10.xxxx/yyyy
6. Dates: valid 'YYYY-MM-DD'
7. Decimal values: numeric format (e.g. 15000.50)
8. BLOB: always null
9. REAL, valid scientific names
10. Consistency with the existing data";

const RECORDS_SHAPE: &str = r#"REQUIRED FORMAT (valid JSON):
{
    "registros": [
        {"campo1": valor1, "campo2": "valor2"},
        {"campo1": valor3, "campo2": "valor4"}
    ]
}"#;

fn render_columns(table: &str, columns: &[ColumnInfo]) -> String {
    if columns.is_empty() {
        return String::from("ERROR: table not found in the schema");
    }
    let mut out = columns
        .iter()
        .map(|column| {
            if column.is_blob() {
                format!("- {}: {} (ALWAYS null in JSON)", column.name, column.column_type)
            } else {
                let constraint = column_constraint(table, &column.name).map_or_else(
                    || format!("{} - appropriate value", column.column_type),
                    str::to_string,
                );
                format!("- {}: {constraint}", column.name)
            }
        })
        .collect::<Vec<_>>()
        .join("\n");
    if let Some(extra) = extra_validation(table) {
        let _ = write!(out, "\n\nEXTRA VALIDATIONS:\n{extra}");
    }
    out
}

fn render_context(context: &[ContextTable]) -> String {
    let mut out = String::new();
    for entry in context.iter().filter(|entry| !entry.rows.is_empty()) {
        let _ = writeln!(out, "\n{} (example):", entry.table.to_uppercase());
        for row in entry.rows.iter().take(CONTEXT_EXAMPLES) {
            let _ = writeln!(out, "  {}", Value::Object(row.clone()));
        }
    }
    if out.is_empty() {
        return out;
    }
    format!("EXISTING DATA (keep it consistent):\n{out}")
}

fn render_allow_lists(foreign_keys: &[FkAllowList]) -> String {
    if foreign_keys.is_empty() {
        return String::new();
    }
    let mut out = String::from("REQUIRED FOREIGN KEYS (use ONLY these ids):\n");
    for list in foreign_keys {
        let _ = writeln!(out, "\n{} - valid ids:", list.column);
        for option in list.options.iter().take(FK_OPTIONS_SHOWN) {
            match &option.label {
                Some(label) => {
                    let _ = writeln!(out, "  ID {}: {label}", render_id(&option.id));
                }
                None => {
                    let _ = writeln!(out, "  ID {}", render_id(&option.id));
                }
            }
        }
        if list.options.len() > FK_OPTIONS_SHOWN {
            let _ = writeln!(
                out,
                "  ... and {} more",
                list.options.len() - FK_OPTIONS_SHOWN
            );
        }
    }
    out
}

fn render_id(id: &Value) -> String {
    match id {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Prompt asking for `rows` records of `table`.
#[must_use]
pub fn build_table_prompt(
    table: &str,
    columns: &[ColumnInfo],
    rows: u32,
    context: &[ContextTable],
    foreign_keys: &[FkAllowList],
) -> String {
    let upper = table.to_uppercase();
    let sections = [
        DOMAIN_CONTEXT.to_string(),
        format!(
            "TARGET TABLE: {upper}\nSTRICT SCHEMA (FOLLOW EVERY CONSTRAINT):\n{}",
            render_columns(table, columns)
        ),
        render_context(context),
        render_allow_lists(foreign_keys),
        format!(
            "SPECIFIC INSTRUCTIONS FOR {upper}:\n{}",
            table_instruction(table)
        ),
        format!("CRITICAL TASK:\nGenerate EXACTLY {rows} VALID records for `{table}`."),
        ABSOLUTE_RULES.to_string(),
        RECORDS_SHAPE.to_string(),
        String::from("REPLY WITH THE JSON ONLY. NO ADDITIONAL TEXT."),
    ];
    sections
        .into_iter()
        .filter(|section| !section.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Temperature for the taxonomy prompt.
pub const TAXON_TEMPERATURE: f32 = 0.3;

/// Prompt asking for a full taxonomy able to hold about `species` species.
#[must_use]
pub fn build_taxon_prompt(species: u32) -> String {
    let ranks = TAXON_RANKS
        .iter()
        .map(|rank| format!("- {rank}"))
        .collect::<Vec<_>>()
        .join("\n");
    let allowed = TAXON_RANKS
        .iter()
        .map(|rank| format!("'{rank}'"))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        r#"Generate a complete taxonomy for roughly {species} species of a scientific laboratory.

CREATE TABLE Taxon (
    ID_Tax integer PRIMARY KEY,
    Tipo varchar(10) NOT NULL,
    Nome varchar(50) NOT NULL,
    UNIQUE (Tipo, Nome),
    CHECK (Tipo IN ({allowed})));

IMPORTANT: use EXACTLY these Tipo values (no accents):
{ranks}

Build a realistic taxonomic hierarchy with:
- 1 Dominio (Eukarya)
- 2-3 Reinos (Animalia, Plantae, Fungi)
- 5-8 Filos
- 10-15 Classes
- 20-30 Ordens
- 40-60 Familias
- Enough Generos for the species

Return ONLY valid JSON in this format:
{{
    "registros": [
        {{"ID_Tax": 1, "Tipo": "Dominio", "Nome": "Eukarya"}},
        {{"ID_Tax": 2, "Tipo": "Reino", "Nome": "Animalia"}},
        {{"ID_Tax": 3, "Tipo": "Reino", "Nome": "Plantae"}}
    ]
}}"#
    )
}

/// Prompt asking the model to rewrite one sampled row.
///
/// The reply is expected as a JSON object with the same keys; the primary
/// key keeps its value.
#[must_use]
pub fn build_row_rewrite_prompt(
    table: &str,
    columns: &[ColumnInfo],
    row: &Record,
    primary_key: &str,
) -> String {
    let fields = columns
        .iter()
        .map(|column| format!("- `{}`: {}", column.name, column.column_type))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "Update the following row of table `{table}` with new, different and realistic values, \
keeping the schema structure:\n\n{fields}\n\nOriginal row:\n{}\n\n\
Reply with the new row as a single JSON object with the same fields and updated values. \
The primary key `{primary_key}` must keep the same value. Reply with the JSON only.",
        Value::Object(row.clone())
    )
}

/// `Table: col (type), ...` lines for the SQL prompts.
#[must_use]
pub fn schema_lines<'a, I>(tables: I) -> Vec<String>
where
    I: IntoIterator<Item = (&'a str, &'a [ColumnInfo])>,
{
    tables
        .into_iter()
        .map(|(table, columns)| {
            let columns = columns
                .iter()
                .map(|column| {
                    let mut text = format!("{} ({})", column.name, column.column_type);
                    if column.is_primary_key() {
                        text.push_str(" PK");
                    }
                    text
                })
                .collect::<Vec<_>>()
                .join(", ");
            format!("{table}: {columns}")
        })
        .collect()
}

fn constraint_notes() -> String {
    catalog::ENUM_CONSTRAINTS
        .iter()
        .map(|constraint| {
            let allowed = constraint
                .allowed
                .iter()
                .map(|value| format!("'{value}'"))
                .collect::<Vec<_>>()
                .join(", ");
            let table = capitalize(constraint.table);
            format!("- {table}.{} IN ({allowed})", constraint.column)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

/// Temperature for the first SQL attempt.
pub const SQL_TEMPERATURE: f32 = 0.3;

/// Temperature for the strict regeneration.
pub const STRICT_SQL_TEMPERATURE: f32 = 0.1;

/// Prompt turning a natural-language question into one SQL statement.
#[must_use]
pub fn build_sql_prompt(question: &str, schema: &[String]) -> String {
    let relationships = catalog::RELATIONSHIP_NOTES
        .iter()
        .map(|note| format!("- {note}"))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        r#"You are a SQL expert for taxonomy and scientific laboratory databases.

DATABASE CONTEXT:
A research-lab taxonomy system that manages:
- Species taxonomy (Dominio -> Reino -> Filo -> Classe -> Ordem -> Familia -> Genero -> Especie)
- Collected specimens and their media (photos, videos)
- Research projects and their staff
- Laboratories, equipment and contracts
- Biological samples and collection sites
- Funding and scientific articles

EXACT DATABASE SCHEMA (USE ONLY THESE FIELDS):
{schema}

RELATIONSHIPS AND FOREIGN KEYS (CRITICAL):
{relationships}

IMPORTANT CONSTRAINTS:
{constraints}

USER REQUEST: "{question}"

CRITICAL INSTRUCTIONS:
1. Use ONLY the EXACT table and column names from the schema above
2. To search for specific names (e.g. "Laboratório de Estudo de Insetos"), use LIKE '%word%'
3. If you do not know an exact name, use LIKE with relevant keywords
4. Staff in laboratories: JOIN Funcionario -> Contrato -> Laboratorio
5. Species in projects: JOIN Projeto -> Proj_Esp -> Especie
6. Use correct JOINs based on the listed FKs
7. For Status/Tipo fields use ONLY the constraint values
8. Dates as 'YYYY-MM-DD', single quotes for strings
9. NEVER invent laboratory/project names - search with LIKE
10. If you need LIMIT, use a reasonable value (10-20)

EXAMPLES OF CORRECT QUERIES:
- SELECT f.Nome FROM Funcionario f JOIN Contrato c ON f.ID_Func = c.ID_Func JOIN Laboratorio l ON c.ID_Lab = l.ID_Lab WHERE l.Nome LIKE '%Insetos%'
- SELECT e.Nome, t.Nome FROM Especie e JOIN Taxon t ON e.ID_Gen = t.ID_Tax WHERE t.Tipo = 'Genero' LIMIT 10
- SELECT p.Nome, COUNT(f.ID_Func) FROM Projeto p JOIN Proj_Func pf ON p.ID_Proj = pf.ID_Proj JOIN Funcionario f ON pf.ID_Func = f.ID_Func GROUP BY p.Nome

REPLY INSTRUCTIONS:
- Return ONLY the complete SQL query
- ONE SINGLE LINE, no line breaks
- NO comments or explanations
- NO markdown code blocks
- The query must be immediately executable

SQL:"#,
        schema = schema.join("\n"),
        constraints = constraint_notes(),
    )
}

/// Stricter prompt used when the first reply names things not in the schema.
#[must_use]
pub fn build_strict_sql_prompt(question: &str, schema: &[String], tables: &[&str]) -> String {
    format!(
        "STRICT SQL GENERATION - USE ONLY THE FIELDS THAT EXIST:\n\n\
EXACT SCHEMA:\n{}\n\n\
REQUEST: \"{question}\"\n\n\
MANDATORY RULES:\n\
- Use ONLY these tables: {}\n\
- Use ONLY the columns listed in the schema\n\
- For name searches use LIKE '%word%'\n\
- NEVER invent table, column or value names\n\n\
Return ONLY the SQL on a single line:",
        schema.join("\n"),
        tables.join(", "),
    )
}
