use clap::Parser;

pub mod global;
pub mod root_commands;

pub use global::{ColorMode, GlobalFlags, OutputFormat};
pub use root_commands::Commands;

/// Top-level CLI parser for the `nexus-bio` binary.
#[derive(Debug, Parser)]
#[command(
    name = "nexus-bio",
    version,
    about = "NEXUS-BIO CMD - taxonomy lab database console"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Output format: table, json, raw
    #[arg(short, long, global = true, default_value = "table")]
    pub format: OutputFormat,

    /// ANSI colour in tables: auto, always, never
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorMode,

    /// Max rows to display
    #[arg(short, long, global = true)]
    pub limit: Option<u32>,

    /// Quiet mode (suppress non-essential output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

impl Cli {
    /// Extract ergonomic global flags struct for command handlers.
    #[must_use]
    pub const fn global_flags(&self) -> GlobalFlags {
        GlobalFlags {
            format: self.format,
            color: self.color,
            limit: self.limit,
            quiet: self.quiet,
            verbose: self.verbose,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use clap::{CommandFactory, Parser};
    use pretty_assertions::assert_eq;

    use super::root_commands::ReportKind;
    use super::{Cli, ColorMode, Commands, OutputFormat};

    #[test]
    fn clap_command_tree_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn no_subcommand_means_menu() {
        let cli = Cli::try_parse_from(["nexus-bio"]).expect("cli should parse");
        assert!(cli.command.is_none());
        assert_eq!(cli.format, OutputFormat::Table);
        assert_eq!(cli.color, ColorMode::Auto);
    }

    #[test]
    fn global_flags_parse_before_subcommand() {
        let cli = Cli::try_parse_from([
            "nexus-bio", "--format", "json", "--limit", "10", "--verbose", "tables",
        ])
        .expect("cli should parse");

        assert_eq!(cli.format, OutputFormat::Json);
        assert_eq!(cli.limit, Some(10));
        assert!(cli.verbose);
        assert!(matches!(cli.command, Some(Commands::Tables)));
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::try_parse_from(["nexus-bio", "show", "taxon", "--format", "raw", "--quiet"])
            .expect("cli should parse");

        assert_eq!(cli.format, OutputFormat::Raw);
        assert!(cli.quiet);
        match cli.command {
            Some(Commands::Show(args)) => assert_eq!(args.table.as_deref(), Some("taxon")),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn output_format_rejects_invalid_value() {
        assert!(Cli::try_parse_from(["nexus-bio", "--format", "xml", "tables"]).is_err());
    }

    #[test]
    fn report_dates_parse_as_iso() {
        let cli = Cli::try_parse_from([
            "nexus-bio", "report", "funding", "--from", "2023-01-01", "--to", "2024-12-31",
        ])
        .expect("cli should parse");

        let Some(Commands::Report(args)) = cli.command else {
            panic!("expected report");
        };
        assert_eq!(args.kind, Some(ReportKind::Funding));
        assert_eq!(args.from, NaiveDate::from_ymd_opt(2023, 1, 1));
        assert_eq!(args.to, NaiveDate::from_ymd_opt(2024, 12, 31));
    }

    #[test]
    fn report_rejects_bad_dates() {
        assert!(Cli::try_parse_from(["nexus-bio", "report", "equipment", "--from", "01/02/2024"]).is_err());
    }

    #[test]
    fn update_takes_where_flag() {
        let cli = Cli::try_parse_from([
            "nexus-bio", "update", "Projeto", "--column", "Status", "--value", "Ativo", "--where",
            "ID_Proj = 3",
        ])
        .expect("cli should parse");

        let Some(Commands::Update(args)) = cli.command else {
            panic!("expected update");
        };
        assert_eq!(args.condition.as_deref(), Some("ID_Proj = 3"));
        assert_eq!(args.column.as_deref(), Some("Status"));
    }

    #[test]
    fn random_row_commands_take_short_count() {
        let cli = Cli::try_parse_from(["nexus-bio", "prune", "Amostra", "-n", "3"])
            .expect("cli should parse");
        let Some(Commands::Prune(args)) = cli.command else {
            panic!("expected prune");
        };
        assert_eq!(args.rows, Some(3));
    }
}
