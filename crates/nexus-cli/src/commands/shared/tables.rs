use anyhow::{anyhow, bail};
use nexus_core::TableNames;

use crate::context::AppContext;
use crate::prompt::Prompter;

/// Resolve the table a command works on, prompting when none was given.
///
/// Names are matched case-insensitively against the live tables.
pub async fn pick_table<P: Prompter>(
    given: Option<&str>,
    ctx: &AppContext,
    prompter: &mut P,
) -> anyhow::Result<String> {
    let names = ctx.db.table_names().await?;
    if names.is_empty() {
        bail!("the database has no tables; run `nexus-bio create` first");
    }

    let requested = match given {
        Some(name) => name.to_string(),
        None => {
            println!("Tables: {}", table_list(&names));
            prompter.input("Table")?
        }
    };
    resolve(&names, &requested)
}

/// Real name of `requested`, or an error naming it in upper case.
pub fn resolve(names: &TableNames, requested: &str) -> anyhow::Result<String> {
    names
        .resolve(requested)
        .map(ToString::to_string)
        .ok_or_else(|| anyhow!("table `{}` not found", requested.trim().to_uppercase()))
}

#[must_use]
pub fn table_list(names: &TableNames) -> String {
    names.real_names().collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn names() -> TableNames {
        TableNames::from_names(["Taxon", "Especie", "Midia"])
    }

    #[test]
    fn lookup_ignores_case_and_whitespace() {
        assert_eq!(resolve(&names(), " ESPECIE ").unwrap(), "Especie");
    }

    #[test]
    fn unknown_tables_are_reported_in_upper_case() {
        let error = resolve(&names(), "amostra").unwrap_err();
        assert_eq!(error.to_string(), "table `AMOSTRA` not found");
    }

    #[test]
    fn listing_is_sorted() {
        assert_eq!(table_list(&names()), "Especie, Midia, Taxon");
    }
}
