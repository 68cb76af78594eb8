use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Subcommand, ValueEnum};

/// Top-level command tree. Without a subcommand the interactive menu runs.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Run the DDL script and create every table.
    Create(CreateArgs),
    /// Drop every table of the database.
    Drop(ConfirmArgs),
    /// List the tables of the database.
    Tables,
    /// Show every row of a table.
    Show(ShowArgs),
    /// Insert one row, prompting for each column.
    Insert(TableArg),
    /// Update one column of the rows matching a WHERE clause.
    Update(UpdateArgs),
    /// Delete the rows matching a WHERE clause.
    Delete(DeleteArgs),
    /// Fill every empty table with LLM-generated rows.
    Populate(PopulateArgs),
    /// Turn a question into SQL with the LLM and run it.
    Ask(AskArgs),
    /// Rank stored media by similarity to an image.
    Similar(SimilarArgs),
    /// Run one of the canned reports.
    Report(ReportArgs),
    /// Load `data/{table}.json` seed files.
    Seed(SeedArgs),
    /// Drop, recreate, seed, and exercise the canned reports and CRUD.
    Demo(ConfirmArgs),
    /// Execute a SQL statement.
    Query(QueryArgs),
    /// Rewrite random rows of a table with LLM-generated values.
    Rewrite(RandomRowsArgs),
    /// Delete random rows of a table.
    Prune(RandomRowsArgs),
    /// Show the population order.
    Order(OrderArgs),
    /// Open the interactive menu.
    Menu,
}

#[derive(Clone, Debug, Args)]
pub struct CreateArgs {
    /// DDL script (defaults to `general.script_path`).
    #[arg(long)]
    pub script: Option<PathBuf>,
}

#[derive(Clone, Debug, Args)]
pub struct ConfirmArgs {
    /// Skip the confirmation prompt.
    #[arg(short, long)]
    pub yes: bool,
}

#[derive(Clone, Debug, Args)]
pub struct ShowArgs {
    /// Table name, compared case-insensitively. Prompted when omitted.
    pub table: Option<String>,
}

#[derive(Clone, Debug, Args)]
pub struct TableArg {
    /// Table name. Prompted when omitted.
    pub table: Option<String>,
}

#[derive(Clone, Debug, Args)]
pub struct UpdateArgs {
    pub table: Option<String>,

    /// Column to set.
    #[arg(long)]
    pub column: Option<String>,

    /// New value, coerced to the column type.
    #[arg(long)]
    pub value: Option<String>,

    /// WHERE condition, e.g. `ID_Proj = 3`.
    #[arg(long = "where")]
    pub condition: Option<String>,
}

#[derive(Clone, Debug, Args)]
pub struct DeleteArgs {
    pub table: Option<String>,

    /// WHERE condition, e.g. `ID_Proj = 3`.
    #[arg(long = "where")]
    pub condition: Option<String>,

    #[arg(short, long)]
    pub yes: bool,
}

#[derive(Clone, Debug, Args)]
pub struct PopulateArgs {
    /// Rows requested per table (defaults to `general.default_rows`).
    #[arg(long)]
    pub rows: Option<u32>,

    /// Species the taxonomy should cover (defaults to `general.default_species`).
    #[arg(long)]
    pub species: Option<u32>,

    /// Order tables by live foreign keys instead of the fixed order.
    #[arg(long)]
    pub derived_order: bool,

    /// Continue without asking when catalog tables are missing.
    #[arg(short, long)]
    pub yes: bool,
}

#[derive(Clone, Debug, Args)]
pub struct AskArgs {
    /// Question in natural language. Prompted when omitted.
    pub question: Option<String>,

    /// Print the generated SQL without running it.
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Clone, Debug, Args)]
pub struct SimilarArgs {
    /// Query image (PNG or JPEG). Prompted when omitted.
    pub image: Option<PathBuf>,

    /// Matches to show (defaults to `media.top_k`).
    #[arg(long)]
    pub top: Option<usize>,
}

/// The canned reports.
#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum ReportKind {
    /// Active-contract employees per project.
    Staff,
    /// Equipment uses per lab in a date range.
    Equipment,
    /// Average funding per project in a date range.
    Funding,
}

#[derive(Clone, Debug, Args)]
pub struct ReportArgs {
    /// Prompted when omitted.
    #[arg(value_enum)]
    pub kind: Option<ReportKind>,

    /// Range start (YYYY-MM-DD).
    #[arg(long)]
    pub from: Option<NaiveDate>,

    /// Range end (YYYY-MM-DD).
    #[arg(long)]
    pub to: Option<NaiveDate>,
}

#[derive(Clone, Debug, Args)]
pub struct SeedArgs {
    /// Seed directory (defaults to `general.data_dir`).
    #[arg(long)]
    pub dir: Option<PathBuf>,
}

#[derive(Clone, Debug, Args)]
pub struct QueryArgs {
    /// Statement to execute.
    pub sql: String,
}

#[derive(Clone, Debug, Args)]
pub struct RandomRowsArgs {
    pub table: Option<String>,

    /// Rows to touch (defaults to `general.random_rows`).
    #[arg(short = 'n', long)]
    pub rows: Option<u32>,
}

#[derive(Clone, Debug, Args)]
pub struct OrderArgs {
    /// Derive the order from live foreign keys.
    #[arg(long)]
    pub derived: bool,
}
