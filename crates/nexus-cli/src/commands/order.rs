use nexus_core::TableNames;
use nexus_llm::PopulationPlan;
use serde::Serialize;

use crate::cli::root_commands::OrderArgs;
use crate::cli::{GlobalFlags, OutputFormat};
use crate::context::AppContext;
use crate::output::output;

#[derive(Debug, Serialize)]
struct OrderResponse {
    source: &'static str,
    order: Vec<String>,
    missing: Vec<String>,
}

/// Population plan from the fixed catalog order or from live foreign keys.
pub async fn plan(ctx: &AppContext, derived: bool) -> anyhow::Result<PopulationPlan> {
    let names = ctx.db.table_names().await?;
    if derived {
        let order = ctx.db.dependency_order().await?;
        Ok(derived_plan(&names, order))
    } else {
        Ok(PopulationPlan::from_tables(&names))
    }
}

/// Keep the derived order as-is; catalog tables absent from the database are
/// still reported as missing.
fn derived_plan(names: &TableNames, order: Vec<String>) -> PopulationPlan {
    let fixed = PopulationPlan::from_tables(names);
    PopulationPlan {
        ordered: order,
        missing: fixed.missing,
    }
}

/// Handle `nexus-bio order`.
pub async fn handle(args: &OrderArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let plan = plan(ctx, args.derived).await?;
    let source = if args.derived { "foreign_keys" } else { "catalog" };

    if flags.format != OutputFormat::Table {
        return output(
            &OrderResponse {
                source,
                order: plan.ordered,
                missing: plan.missing.iter().map(ToString::to_string).collect(),
            },
            flags.format,
        );
    }

    for (position, table) in plan.ordered.iter().enumerate() {
        println!("{:>2}. {table}", position + 1);
    }
    if !plan.is_complete() {
        println!("Not in the database: {}", plan.missing.join(", "));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn derived_plans_keep_the_foreign_key_order() {
        let names = TableNames::from_names(["Taxon", "Especie", "Custom"]);
        let plan = derived_plan(
            &names,
            vec![String::from("Taxon"), String::from("Custom"), String::from("Especie")],
        );
        assert_eq!(plan.ordered, vec!["Taxon", "Custom", "Especie"]);
        assert!(plan.missing.contains(&"midia"));
        assert!(!plan.missing.contains(&"taxon"));
        assert!(!plan.is_complete());
    }
}
