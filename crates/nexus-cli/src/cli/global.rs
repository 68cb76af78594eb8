use clap::ValueEnum;

/// Shared output mode across all commands.
#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Raw,
}

/// When to emit ANSI colour in table output.
#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum ColorMode {
    Auto,
    Always,
    Never,
}

/// Global flags available before or after subcommands.
#[derive(Clone, Debug)]
pub struct GlobalFlags {
    pub format: OutputFormat,
    pub color: ColorMode,
    pub limit: Option<u32>,
    pub quiet: bool,
    pub verbose: bool,
}

impl GlobalFlags {
    /// Human-oriented narration (headers, hints) is printed only for tables.
    #[must_use]
    pub fn narrate(&self) -> bool {
        self.format == OutputFormat::Table && !self.quiet
    }
}
