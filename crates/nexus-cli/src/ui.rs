use std::io::IsTerminal;
use std::sync::OnceLock;

use crate::cli::{ColorMode, GlobalFlags, OutputFormat};

#[derive(Clone, Copy, Debug)]
pub struct UiPrefs {
    pub table_color: bool,
    pub progress: bool,
    pub term_width: Option<usize>,
}

static UI_PREFS: OnceLock<UiPrefs> = OnceLock::new();

pub fn init(flags: &GlobalFlags) {
    let _ = UI_PREFS.set(resolve(
        flags,
        std::io::stdout().is_terminal(),
        std::env::var_os("NO_COLOR").is_some(),
        std::env::var("COLUMNS").ok().as_deref(),
    ));
}

fn resolve(flags: &GlobalFlags, is_tty: bool, no_color: bool, columns: Option<&str>) -> UiPrefs {
    let is_table = flags.format == OutputFormat::Table;
    let table_color = match flags.color {
        ColorMode::Always => is_table,
        ColorMode::Never => false,
        ColorMode::Auto => is_tty && is_table && !flags.quiet && !no_color,
    };

    let term_width = columns
        .and_then(|value| value.parse::<usize>().ok())
        .filter(|width| *width >= 40);

    UiPrefs {
        table_color,
        progress: is_tty && is_table && !flags.quiet,
        term_width,
    }
}

#[must_use]
pub fn prefs() -> UiPrefs {
    *UI_PREFS.get().unwrap_or(&UiPrefs {
        table_color: false,
        progress: false,
        term_width: None,
    })
}

#[cfg(test)]
mod tests {
    use super::resolve;
    use crate::cli::{ColorMode, GlobalFlags, OutputFormat};

    fn flags(format: OutputFormat, color: ColorMode) -> GlobalFlags {
        GlobalFlags {
            format,
            color,
            limit: None,
            quiet: false,
            verbose: false,
        }
    }

    #[test]
    fn auto_colour_needs_a_terminal_and_no_no_color() {
        let table = flags(OutputFormat::Table, ColorMode::Auto);
        assert!(resolve(&table, true, false, None).table_color);
        assert!(!resolve(&table, false, false, None).table_color);
        assert!(!resolve(&table, true, true, None).table_color);
    }

    #[test]
    fn json_output_never_gets_colour_or_progress() {
        let json = flags(OutputFormat::Json, ColorMode::Always);
        let prefs = resolve(&json, true, false, None);
        assert!(!prefs.table_color);
        assert!(!prefs.progress);
    }

    #[test]
    fn narrow_or_invalid_columns_are_ignored() {
        let table = flags(OutputFormat::Table, ColorMode::Never);
        assert_eq!(resolve(&table, true, false, Some("120")).term_width, Some(120));
        assert_eq!(resolve(&table, true, false, Some("20")).term_width, None);
        assert_eq!(resolve(&table, true, false, Some("wide")).term_width, None);
    }
}
