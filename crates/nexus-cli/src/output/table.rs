/// Narrowest a column is squeezed to when fitting the terminal.
const MIN_WIDTH: usize = 6;

#[derive(Clone, Copy, Debug)]
pub struct TableOptions {
    pub max_width: Option<usize>,
    pub color: bool,
}

/// Render a simple aligned table for string rows.
#[must_use]
pub fn render_entity_table(
    headers: &[&str],
    rows: &[Vec<String>],
    options: TableOptions,
) -> String {
    let mut widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(index, header)| {
            rows.iter()
                .filter_map(|row| row.get(index))
                .map(|cell| display_width(cell))
                .max()
                .unwrap_or(0)
                .max(display_width(header))
                .max(MIN_WIDTH)
        })
        .collect();

    fit_widths(&mut widths, headers, options.max_width);

    let header_line = headers
        .iter()
        .zip(widths.iter())
        .map(|(header, width)| {
            let text = truncate_text(header, *width);
            format_cell(&text, *width, false, false)
        })
        .collect::<Vec<_>>()
        .join("  ");

    let divider = "-".repeat(display_width(&strip_ansi(&header_line)));

    let row_lines = rows
        .iter()
        .map(|row| {
            widths
                .iter()
                .enumerate()
                .map(|(index, width)| {
                    let value = row.get(index).cloned().unwrap_or_else(|| "-".to_string());
                    let truncated = truncate_text(&value, *width);
                    let numeric = looks_numeric(&truncated);
                    let colored = if options.color {
                        colorize_status(&truncated)
                    } else {
                        truncated
                    };
                    format_cell(&colored, *width, numeric, options.color)
                })
                .collect::<Vec<_>>()
                .join("  ")
        })
        .collect::<Vec<_>>();

    let mut lines = Vec::with_capacity(2 + row_lines.len());
    lines.push(header_line);
    lines.push(divider);
    lines.extend(row_lines);
    lines.join("\n")
}

fn fit_widths(widths: &mut [usize], headers: &[&str], max_width: Option<usize>) {
    let Some(max_width) = max_width else {
        return;
    };

    if widths.is_empty() {
        return;
    }

    let separators = widths.len().saturating_sub(1) * 2;
    let mut total = widths.iter().sum::<usize>() + separators;
    if total <= max_width {
        return;
    }

    loop {
        if total <= max_width {
            break;
        }

        let mut candidate_idx = None;
        let mut candidate_width = 0usize;
        for (idx, width) in widths.iter().enumerate() {
            let min_width = display_width(headers[idx]).max(MIN_WIDTH);
            if *width > min_width && *width > candidate_width {
                candidate_idx = Some(idx);
                candidate_width = *width;
            }
        }

        let Some(idx) = candidate_idx else {
            break;
        };

        widths[idx] = widths[idx].saturating_sub(1);
        total = widths.iter().sum::<usize>() + separators;
    }
}

fn truncate_text(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        return value.to_string();
    }
    if width <= 1 {
        return "…".to_string();
    }

    let mut out = String::new();
    for ch in value.chars().take(width - 1) {
        out.push(ch);
    }
    out.push('…');
    out
}

fn looks_numeric(value: &str) -> bool {
    let trimmed = value.trim();
    !trimmed.is_empty()
        && trimmed
            .chars()
            .all(|ch| ch.is_ascii_digit() || matches!(ch, '-' | '+' | '.' | ','))
}

fn format_cell(value: &str, width: usize, numeric: bool, has_ansi: bool) -> String {
    let plain_len = if has_ansi {
        display_width(&strip_ansi(value))
    } else {
        display_width(value)
    };
    let pad = width.saturating_sub(plain_len);
    if numeric {
        format!("{}{}", " ".repeat(pad), value)
    } else {
        format!("{}{}", value, " ".repeat(pad))
    }
}

/// Colour the lab's status vocabulary (contracts, projects, script and
/// seed outcomes).
fn colorize_status(value: &str) -> String {
    let lower = value.to_lowercase();
    let code = if matches!(
        lower.as_str(),
        "ativo" | "ok" | "executed" | "loaded" | "dropped" | "true"
    ) {
        Some("32")
    } else if matches!(
        lower.as_str(),
        "pendente" | "planejado" | "suspenso" | "already_exists" | "missing" | "skipped"
    ) {
        Some("33")
    } else if matches!(
        lower.as_str(),
        "cancelado" | "failed" | "syntax_error" | "error" | "false"
    ) {
        Some("31")
    } else {
        None
    };

    match code {
        Some(code) => format!("\u{1b}[{code}m{value}\u{1b}[0m"),
        None => value.to_string(),
    }
}

/// Width in characters; accented names count once.
fn display_width(value: &str) -> usize {
    value.chars().count()
}

fn strip_ansi(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '\u{1b}' && chars.peek() == Some(&'[') {
            let _ = chars.next();
            for next in chars.by_ref() {
                if next == 'm' {
                    break;
                }
            }
            continue;
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const PLAIN: TableOptions = TableOptions {
        max_width: None,
        color: false,
    };

    #[test]
    fn alignment_handles_mixed_widths() {
        let headers = ["ID_Proj", "Nome", "Status"];
        let rows = vec![
            vec!["1".to_string(), "Aves".to_string(), "Ativo".to_string()],
            vec![
                "200".to_string(),
                "Fauna do Cerrado".to_string(),
                "Encerrado".to_string(),
            ],
        ];

        let table = render_entity_table(&headers, &rows, PLAIN);
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines.len(), 4);
        assert!(lines[1].chars().all(|c| c == '-'));
        // Numbers are right-aligned.
        assert!(lines[2].starts_with("      1"));
        assert!(lines[3].starts_with("    200"));
    }

    #[test]
    fn accented_text_pads_by_characters() {
        let headers = ["Nome"];
        let rows = vec![vec!["Espécie".to_string()], vec!["Gênero".to_string()]];
        let table = render_entity_table(&headers, &rows, PLAIN);
        let widths: Vec<usize> = table.lines().map(display_width).collect();
        assert!(widths.iter().all(|w| *w == widths[0]), "{widths:?}");
    }

    #[test]
    fn narrow_terminals_truncate_wide_columns() {
        let headers = ["ID", "Descricao"];
        let rows = vec![vec!["1".to_string(), "x".repeat(80)]];
        let options = TableOptions {
            max_width: Some(40),
            color: false,
        };
        let table = render_entity_table(&headers, &rows, options);
        assert!(table.lines().all(|line| display_width(line) <= 40));
        assert!(table.contains('…'));
    }

    #[test]
    fn status_colours_ignore_case_and_strip_cleanly() {
        let green = colorize_status("Ativo");
        assert!(green.starts_with("\u{1b}[32m"));
        assert_eq!(strip_ansi(&green), "Ativo");
        assert!(colorize_status("Cancelado").starts_with("\u{1b}[31m"));
        assert_eq!(colorize_status("Eukarya"), "Eukarya");
    }
}
