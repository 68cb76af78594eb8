//! Static knowledge about the taxonomy-lab schema.
//!
//! The live schema is always discovered at runtime; this module only holds
//! the facts the program cannot derive cheaply: the order tables are filled
//! in, which parents must be populated first, where valid FK ids come from,
//! and which columns are restricted by CHECK constraints.
//!
//! Table keys are lowercase; callers resolve real names through
//! [`crate::TableNames`].

/// Table that receives the dedicated taxonomy prompt.
pub const TAXON_TABLE: &str = "taxon";

/// Table whose BLOB rows are filled with images instead of LLM output.
pub const MEDIA_TABLE: &str = "midia";

/// Order used when populating through the LLM. Parents come before children.
pub const POPULATION_ORDER: &[&str] = &[
    "taxon",
    "hierarquia",
    "especie",
    "especime",
    "local_de_coleta",
    "projeto",
    "amostra",
    "funcionario",
    "categoria",
    "laboratorio",
    "financiador",
    "equipamento",
    "midia",
    "artigo",
    "proj_func",
    "proj_esp",
    "proj_cat",
    "contrato",
    "financiamento",
    "registro_de_uso",
];

/// Order used when loading `data/{table}.json` seed files.
pub const SEED_ORDER: &[&str] = &[
    // no dependencies
    "taxon",
    "local_de_coleta",
    "funcionario",
    "categoria",
    "laboratorio",
    "financiador",
    "projeto",
    // single parent
    "hierarquia",
    "especie",
    "equipamento",
    // several parents
    "especime",
    "amostra",
    "artigo",
    "contrato",
    "financiamento",
    // association tables
    "proj_func",
    "proj_esp",
    "proj_cat",
    "registro_de_uso",
];

/// Parent tables that must hold rows before `table` can be populated.
#[must_use]
pub fn dependencies(table: &str) -> &'static [&'static str] {
    match table.to_lowercase().as_str() {
        "hierarquia" | "especie" => &["taxon"],
        "especime" => &["especie"],
        "amostra" => &["especie", "local_de_coleta"],
        "midia" => &["especime"],
        "artigo" => &["projeto"],
        "proj_func" => &["projeto", "funcionario"],
        "proj_esp" => &["projeto", "especie"],
        "proj_cat" => &["projeto", "categoria"],
        "contrato" => &["funcionario", "laboratorio"],
        "financiamento" => &["projeto", "financiador"],
        "registro_de_uso" => &["funcionario", "equipamento"],
        _ => &[],
    }
}

/// Parents whose row counts cap how many rows are requested for `table`.
///
/// Taxonomy children are not capped: a handful of genera can carry many
/// species and hierarchy edges.
#[must_use]
pub fn sizing_dependencies(table: &str) -> &'static [&'static str] {
    match table.to_lowercase().as_str() {
        "hierarquia" | "especie" => &[],
        other => dependencies(other),
    }
}

/// Association tables pair two parents, so their row cap is the product of
/// both parents rather than a multiple of the smaller one.
#[must_use]
pub fn is_association_table(table: &str) -> bool {
    table.to_lowercase().starts_with("proj_")
}

/// Where the valid ids for one FK column come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FkLookup {
    pub column: &'static str,
    /// Returns `(id, label, ...)` rows.
    pub sql: &'static str,
}

const TAXON_IDS: &str = "SELECT ID_Tax, Tipo, Nome FROM Taxon ORDER BY ID_Tax";
const GENUS_IDS: &str = "SELECT ID_Tax, Nome FROM Taxon WHERE Tipo = 'Genero' ORDER BY ID_Tax";
const SPECIES_IDS: &str = "SELECT ID_Esp, Nome FROM Especie ORDER BY ID_Esp";
const SITE_IDS: &str = "SELECT ID_Local, Nome FROM Local_de_Coleta ORDER BY ID_Local";
const SPECIMEN_IDS: &str = "SELECT ID_Especime, Descritivo FROM Especime ORDER BY ID_Especime";
const PROJECT_IDS: &str = "SELECT ID_Proj, Nome FROM Projeto ORDER BY ID_Proj";
const EMPLOYEE_IDS: &str = "SELECT ID_Func, Nome FROM Funcionario ORDER BY ID_Func";
const CATEGORY_IDS: &str = "SELECT ID_Categ, Descritivo FROM Categoria ORDER BY ID_Categ";
const LAB_IDS: &str = "SELECT ID_Lab, Nome FROM Laboratorio ORDER BY ID_Lab";
const FUNDER_IDS: &str =
    "SELECT ID_Financiador, Descritivo FROM Financiador ORDER BY ID_Financiador";
const EQUIPMENT_IDS: &str = "SELECT ID_Equip, Tipo, Modelo FROM Equipamento ORDER BY ID_Equip";

/// FK columns of `table` and the lookups that list their valid ids.
#[must_use]
pub fn fk_lookups(table: &str) -> &'static [FkLookup] {
    match table.to_lowercase().as_str() {
        "hierarquia" => &[
            FkLookup {
                column: "ID_Tax",
                sql: TAXON_IDS,
            },
            FkLookup {
                column: "ID_TaxTopo",
                sql: TAXON_IDS,
            },
        ],
        "especie" => &[FkLookup { column: "ID_Gen", sql: GENUS_IDS }],
        "especime" => &[FkLookup { column: "ID_Esp", sql: SPECIES_IDS }],
        "amostra" => &[
            FkLookup {
                column: "ID_Esp",
                sql: SPECIES_IDS,
            },
            FkLookup {
                column: "ID_Local",
                sql: SITE_IDS,
            },
        ],
        "midia" => &[FkLookup { column: "ID_Especime", sql: SPECIMEN_IDS }],
        "artigo" => &[FkLookup { column: "ID_Proj", sql: PROJECT_IDS }],
        "proj_func" => &[
            FkLookup {
                column: "ID_Proj",
                sql: PROJECT_IDS,
            },
            FkLookup {
                column: "ID_Func",
                sql: EMPLOYEE_IDS,
            },
        ],
        "proj_esp" => &[
            FkLookup {
                column: "ID_Proj",
                sql: PROJECT_IDS,
            },
            FkLookup {
                column: "ID_Esp",
                sql: SPECIES_IDS,
            },
        ],
        "proj_cat" => &[
            FkLookup {
                column: "ID_Proj",
                sql: PROJECT_IDS,
            },
            FkLookup {
                column: "ID_Categ",
                sql: CATEGORY_IDS,
            },
        ],
        "contrato" => &[
            FkLookup {
                column: "ID_Func",
                sql: EMPLOYEE_IDS,
            },
            FkLookup {
                column: "ID_Lab",
                sql: LAB_IDS,
            },
        ],
        "financiamento" => &[
            FkLookup {
                column: "ID_Proj",
                sql: PROJECT_IDS,
            },
            FkLookup {
                column: "ID_Financiador",
                sql: FUNDER_IDS,
            },
        ],
        "registro_de_uso" => &[
            FkLookup {
                column: "ID_Func",
                sql: EMPLOYEE_IDS,
            },
            FkLookup {
                column: "ID_Equip",
                sql: EQUIPMENT_IDS,
            },
        ],
        _ => &[],
    }
}

/// A CHECK (`col IN (...)`) constraint known ahead of time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnumConstraint {
    pub table: &'static str,
    pub column: &'static str,
    pub allowed: &'static [&'static str],
}

pub const TAXON_RANKS: &[&str] = &[
    "Dominio", "Reino", "Filo", "Classe", "Ordem", "Familia", "Genero",
];
pub const IUCN_CODES: &[&str] = &["LC", "NT", "VU", "EN", "CR", "EW", "EX"];
pub const PROJECT_STATUSES: &[&str] = &["Planejado", "Ativo", "Suspenso", "Cancelado", "Encerrado"];
pub const CONTRACT_STATUSES: &[&str] = &["Pendente", "Ativo", "Suspenso", "Cancelado", "Encerrado"];

pub const ENUM_CONSTRAINTS: &[EnumConstraint] = &[
    EnumConstraint {
        table: "taxon",
        column: "Tipo",
        allowed: TAXON_RANKS,
    },
    EnumConstraint {
        table: "especie",
        column: "IUCN",
        allowed: IUCN_CODES,
    },
    EnumConstraint {
        table: "projeto",
        column: "Status",
        allowed: PROJECT_STATUSES,
    },
    EnumConstraint {
        table: "contrato",
        column: "Status",
        allowed: CONTRACT_STATUSES,
    },
];

/// Allowed values for `table.column`, if the column is enum-constrained.
#[must_use]
pub fn enum_constraint(table: &str, column: &str) -> Option<&'static [&'static str]> {
    ENUM_CONSTRAINTS
        .iter()
        .find(|c| c.table.eq_ignore_ascii_case(table) && c.column == column)
        .map(|c| c.allowed)
}

/// Question keywords (Portuguese, accent-free) and the tables they point at.
pub const QUESTION_KEYWORDS: &[(&str, &[&str])] = &[
    ("especie", &["Especie", "Especime"]),
    ("especies", &["Especie", "Especime"]),
    ("taxonomia", &["Taxon", "Hierarquia", "Especie"]),
    ("taxonomico", &["Taxon", "Hierarquia"]),
    ("classificacao", &["Taxon", "Hierarquia"]),
    ("projeto", &["Projeto", "Artigo", "Proj_Func", "Proj_Esp", "Proj_Cat"]),
    ("projetos", &["Projeto", "Artigo", "Proj_Func", "Proj_Esp", "Proj_Cat"]),
    ("funcionario", &["Funcionario", "Contrato", "Proj_Func"]),
    ("funcionarios", &["Funcionario", "Contrato", "Proj_Func"]),
    ("empregado", &["Funcionario"]),
    ("trabalhador", &["Funcionario"]),
    ("laboratorio", &["Laboratorio", "Equipamento", "Contrato"]),
    ("laboratorios", &["Laboratorio", "Equipamento", "Contrato"]),
    ("lab", &["Laboratorio"]),
    ("midia", &["Midia"]),
    ("imagem", &["Midia"]),
    ("imagens", &["Midia"]),
    ("foto", &["Midia"]),
    ("amostra", &["Amostra", "Local_de_Coleta"]),
    ("amostras", &["Amostra", "Local_de_Coleta"]),
    ("coleta", &["Amostra", "Local_de_Coleta"]),
    ("local", &["Local_de_Coleta"]),
    ("financiamento", &["Financiamento", "Financiador"]),
    ("financiador", &["Financiador"]),
    ("verba", &["Financiamento"]),
    ("equipamento", &["Equipamento"]),
    ("equipamentos", &["Equipamento"]),
    ("artigo", &["Artigo"]),
    ("artigos", &["Artigo"]),
    ("publicacao", &["Artigo"]),
    ("contrato", &["Contrato"]),
    ("contratos", &["Contrato"]),
];

/// Tables offered for broad "list everything" questions.
pub const CORE_TABLES: &[&str] = &["Especie", "Taxon", "Projeto", "Funcionario"];

/// Words that mark a broad question.
pub const OVERVIEW_WORDS: &[&str] = &["todos", "todas", "listar", "mostrar", "contar"];

/// Tables joined from `table` through its foreign keys.
#[must_use]
pub fn related_tables(table: &str) -> &'static [&'static str] {
    match table.to_lowercase().as_str() {
        "especime" => &["Especie"],
        "especie" | "hierarquia" => &["Taxon"],
        "midia" => &["Especime", "Especie"],
        "amostra" => &["Especie", "Local_de_Coleta"],
        "artigo" => &["Projeto"],
        "proj_func" => &["Projeto", "Funcionario"],
        "proj_esp" => &["Projeto", "Especie"],
        "proj_cat" => &["Projeto", "Categoria"],
        "contrato" => &["Funcionario", "Laboratorio"],
        "financiamento" => &["Projeto", "Financiador"],
        "registro_de_uso" => &["Funcionario", "Equipamento"],
        _ => &[],
    }
}

/// Human-readable FK map handed to the SQL generator.
pub const RELATIONSHIP_NOTES: &[&str] = &[
    "Especie.ID_Gen -> Taxon.ID_Tax (genus of the species)",
    "Especime.ID_Esp -> Especie.ID_Esp (species of the specimen)",
    "Midia.ID_Especime -> Especime.ID_Especime (media of the specimen)",
    "Amostra.ID_Esp -> Especie.ID_Esp (species of the sample)",
    "Amostra.ID_Local -> Local_de_Coleta.ID_Local (collection site of the sample)",
    "Hierarquia.ID_Tax -> Taxon.ID_Tax (child taxon)",
    "Hierarquia.ID_TaxTopo -> Taxon.ID_Tax (parent taxon)",
    "Artigo.ID_Proj -> Projeto.ID_Proj (project of the article)",
    "Contrato.ID_Func -> Funcionario.ID_Func (employee of the contract)",
    "Contrato.ID_Lab -> Laboratorio.ID_Lab (lab of the contract)",
    "Proj_Func.ID_Proj -> Projeto.ID_Proj and Proj_Func.ID_Func -> Funcionario.ID_Func",
    "Proj_Esp.ID_Proj -> Projeto.ID_Proj and Proj_Esp.ID_Esp -> Especie.ID_Esp",
    "Proj_Cat.ID_Proj -> Projeto.ID_Proj and Proj_Cat.ID_Categ -> Categoria.ID_Categ",
    "Financiamento.ID_Proj -> Projeto.ID_Proj and Financiamento.ID_Financiador -> Financiador.ID_Financiador",
    "Registro_de_Uso.ID_Func -> Funcionario.ID_Func and Registro_de_Uso.ID_Equip -> Equipamento.ID_Equip",
];

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use pretty_assertions::assert_eq;

    use super::*;

    fn position(order: &[&str], table: &str) -> usize {
        order
            .iter()
            .position(|t| *t == table)
            .unwrap_or_else(|| panic!("{table} missing from order"))
    }

    #[test]
    fn population_order_puts_parents_first() {
        for table in POPULATION_ORDER {
            for parent in dependencies(table) {
                assert!(
                    position(POPULATION_ORDER, parent) < position(POPULATION_ORDER, table),
                    "{parent} must come before {table}"
                );
            }
        }
    }

    #[test]
    fn seed_order_puts_parents_first() {
        for table in SEED_ORDER {
            for parent in dependencies(table) {
                assert!(
                    position(SEED_ORDER, parent) < position(SEED_ORDER, table),
                    "{parent} must come before {table}"
                );
            }
        }
    }

    #[test]
    fn orders_have_no_duplicates() {
        let population: HashSet<_> = POPULATION_ORDER.iter().collect();
        assert_eq!(population.len(), POPULATION_ORDER.len());
        let seed: HashSet<_> = SEED_ORDER.iter().collect();
        assert_eq!(seed.len(), SEED_ORDER.len());
        assert!(!SEED_ORDER.contains(&MEDIA_TABLE));
    }

    #[test]
    fn every_fk_lookup_targets_a_dependency_table() {
        for table in POPULATION_ORDER {
            let lookups = fk_lookups(table);
            if lookups.is_empty() {
                continue;
            }
            assert!(!dependencies(table).is_empty(), "{table} has FKs but no deps");
        }
    }

    #[test]
    fn fk_lookups_list_every_parent_column() {
        assert_eq!(
            fk_lookups("Contrato"),
            &[
                FkLookup {
                    column: "ID_Func",
                    sql: EMPLOYEE_IDS,
                },
                FkLookup {
                    column: "ID_Lab",
                    sql: LAB_IDS,
                },
            ]
        );
        let hierarchy: Vec<_> = fk_lookups("hierarquia").iter().map(|fk| fk.column).collect();
        assert_eq!(hierarchy, vec!["ID_Tax", "ID_TaxTopo"]);
        assert!(fk_lookups("hierarquia").iter().all(|fk| fk.sql == TAXON_IDS));
    }

    #[test]
    fn lookups_are_case_insensitive() {
        assert_eq!(dependencies("Proj_Func"), &["projeto", "funcionario"]);
        assert_eq!(fk_lookups("ESPECIE")[0].column, "ID_Gen");
        assert!(fk_lookups("taxon").is_empty());
    }

    #[test]
    fn sizing_skips_taxonomy_children() {
        assert!(sizing_dependencies("especie").is_empty());
        assert_eq!(sizing_dependencies("amostra"), &["especie", "local_de_coleta"]);
        assert!(is_association_table("proj_cat"));
        assert!(!is_association_table("projeto"));
    }

    #[test]
    fn enum_constraints_resolve() {
        assert_eq!(enum_constraint("Contrato", "Status"), Some(CONTRACT_STATUSES));
        assert_eq!(enum_constraint("taxon", "Tipo").map(|v| v[0]), Some("Dominio"));
        assert_eq!(enum_constraint("taxon", "Nome"), None);
    }
}
