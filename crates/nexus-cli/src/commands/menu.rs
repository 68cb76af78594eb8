//! The numbered interactive menu shown when no subcommand is given.

use std::path::Path;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::{
    AskArgs, ConfirmArgs, CreateArgs, DeleteArgs, ReportArgs, ShowArgs, SimilarArgs, TableArg,
    UpdateArgs,
};
use crate::commands::populate::PopulateOptions;
use crate::commands::{ask, demo, manual, populate, report, schema, seed, similar};
use crate::context::AppContext;
use crate::prompt::{Prompter, positive_or};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuAction {
    CreateTables,
    DropTables,
    ShowTable,
    Insert,
    Update,
    Delete,
    Populate,
    AskSql,
    Similar,
    Reports,
    Seed,
    Demo,
    Exit,
}

const ENTRIES: &[(&str, MenuAction, &str)] = &[
    ("1", MenuAction::CreateTables, "Create tables from the SQL script"),
    ("2", MenuAction::DropTables, "Drop every table"),
    ("3", MenuAction::ShowTable, "Show a table"),
    ("4", MenuAction::Insert, "Insert a row"),
    ("5", MenuAction::Update, "Update rows"),
    ("6", MenuAction::Delete, "Delete rows"),
    ("7", MenuAction::Populate, "Populate empty tables with AI"),
    ("8", MenuAction::AskSql, "Ask a question (AI-generated SQL)"),
    ("9", MenuAction::Similar, "Find similar images"),
    ("10", MenuAction::Reports, "Reports"),
    ("11", MenuAction::Seed, "Load seed files"),
    ("12", MenuAction::Demo, "CRUD demo"),
    ("0", MenuAction::Exit, "Exit"),
];

impl MenuAction {
    fn parse(answer: &str) -> Option<Self> {
        let answer = answer.trim();
        ENTRIES
            .iter()
            .find(|(key, _, _)| *key == answer)
            .map(|(_, action, _)| *action)
    }
}

fn render_menu() -> String {
    let mut lines = vec![String::from("\nNEXUS-BIO CMD")];
    lines.extend(
        ENTRIES
            .iter()
            .map(|(key, _, label)| format!("{key:>3}. {label}")),
    );
    lines.join("\n")
}

/// Show the menu until the user exits. A failing action is reported and the
/// menu is shown again.
pub async fn run<P: Prompter>(
    ctx: &AppContext,
    prompter: &mut P,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    loop {
        println!("{}", render_menu());
        let answer = prompter.input("Option")?;
        let Some(action) = MenuAction::parse(&answer) else {
            println!("Enter a valid number.");
            continue;
        };
        if action == MenuAction::Exit {
            println!("Bye.");
            return Ok(());
        }

        if let Err(error) = perform(action, ctx, prompter, flags).await {
            eprintln!("error: {error:#}");
        }
    }
}

async fn perform<P: Prompter>(
    action: MenuAction,
    ctx: &AppContext,
    prompter: &mut P,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let general = &ctx.config.general;
    match action {
        MenuAction::CreateTables => {
            let default = general.script_path.display().to_string();
            let script = prompter.input_or("SQL script", &default)?;
            schema::create(&CreateArgs { script: Some(script.into()) }, ctx, flags).await
        }
        MenuAction::DropTables => {
            schema::drop(&ConfirmArgs { yes: false }, ctx, prompter, flags).await
        }
        MenuAction::ShowTable => schema::show(&ShowArgs { table: None }, ctx, prompter, flags).await,
        MenuAction::Insert => {
            manual::insert::run(&TableArg { table: None }, ctx, prompter, flags).await
        }
        MenuAction::Update => {
            let args = UpdateArgs {
                table: None,
                column: None,
                value: None,
                condition: None,
            };
            manual::update::run(&args, ctx, prompter, flags).await
        }
        MenuAction::Delete => {
            let args = DeleteArgs {
                table: None,
                condition: None,
                yes: false,
            };
            manual::delete::run(&args, ctx, prompter, flags).await
        }
        MenuAction::Populate => {
            let rows = prompter.input_or("Rows per table", &general.default_rows.to_string())?;
            let species =
                prompter.input_or("Species to cover", &general.default_species.to_string())?;
            let options = PopulateOptions {
                rows: positive_or(&rows, general.default_rows),
                species: positive_or(&species, general.default_species),
                derived_order: false,
                assume_yes: false,
            };
            populate::run(options, ctx, prompter, flags).await
        }
        MenuAction::AskSql => {
            let args = AskArgs {
                question: None,
                dry_run: false,
            };
            ask::handle(&args, ctx, prompter, flags).await
        }
        MenuAction::Similar => {
            let args = SimilarArgs {
                image: None,
                top: None,
            };
            similar::handle(&args, ctx, prompter, flags).await
        }
        MenuAction::Reports => {
            let args = ReportArgs {
                kind: None,
                from: None,
                to: None,
            };
            report::handle(&args, ctx, prompter, flags).await
        }
        MenuAction::Seed => {
            let default = general.data_dir.display().to_string();
            let dir = prompter.input_or("Seed directory", &default)?;
            seed::run(Path::new(&dir), ctx, flags).await
        }
        MenuAction::Demo => demo::handle(&ConfirmArgs { yes: false }, ctx, prompter, flags).await,
        MenuAction::Exit => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("1", Some(MenuAction::CreateTables))]
    #[case(" 7 ", Some(MenuAction::Populate))]
    #[case("10", Some(MenuAction::Reports))]
    #[case("12", Some(MenuAction::Demo))]
    #[case("0", Some(MenuAction::Exit))]
    #[case("13", None)]
    #[case("sair", None)]
    #[case("", None)]
    fn options_parse(#[case] answer: &str, #[case] expected: Option<MenuAction>) {
        assert_eq!(MenuAction::parse(answer), expected);
    }

    #[test]
    fn every_action_is_listed_once() {
        let menu = render_menu();
        assert_eq!(menu.lines().filter(|line| line.contains(". ")).count(), ENTRIES.len());
        assert!(menu.contains(" 10. Reports"));
        assert!(menu.ends_with("  0. Exit"));
    }
}
