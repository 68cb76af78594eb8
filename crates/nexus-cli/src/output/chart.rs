//! Horizontal text bar charts for report results.

use nexus_core::QueryResult;

/// Widest bar, in cells.
pub const BAR_WIDTH: usize = 40;

const BAR: char = '█';

/// `(label, value)` pairs from two named columns.
///
/// Rows whose value is not numeric are skipped.
#[must_use]
pub fn chart_points(result: &QueryResult, label_column: &str, value_column: &str) -> Vec<(String, f64)> {
    let (Some(label), Some(value)) = (
        result.column_index(label_column),
        result.column_index(value_column),
    ) else {
        return Vec::new();
    };

    result
        .rows
        .iter()
        .filter_map(|row| {
            let amount = row.get(value)?.as_f64()?;
            let name = row.get(label).map(ToString::to_string).unwrap_or_default();
            Some((name, amount))
        })
        .collect()
}

/// Render one bar per point, scaled to the largest value.
#[must_use]
pub fn bar_chart(points: &[(String, f64)], width: usize) -> String {
    if points.is_empty() {
        return String::from("(no data to chart)");
    }

    let label_width = points
        .iter()
        .map(|(label, _)| label.chars().count())
        .max()
        .unwrap_or(0);
    let max = points
        .iter()
        .map(|(_, value)| *value)
        .filter(|value| value.is_finite())
        .fold(0.0_f64, f64::max);

    points
        .iter()
        .map(|(label, value)| {
            let cells = bar_cells(*value, max, width);
            let pad = label_width - label.chars().count();
            format!(
                "{label}{} | {}{} {}",
                " ".repeat(pad),
                BAR.to_string().repeat(cells),
                " ".repeat(width - cells),
                format_value(*value)
            )
            .trim_end()
            .to_string()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn bar_cells(value: f64, max: f64, width: usize) -> usize {
    if !value.is_finite() || value <= 0.0 || max <= 0.0 {
        return 0;
    }
    let cells = (value / max * width as f64).round() as usize;
    cells.clamp(1, width)
}

fn format_value(value: f64) -> String {
    if value.fract().abs() < f64::EPSILON && value.abs() < 1e15 {
        format!("{value:.0}")
    } else {
        format!("{value:.2}")
    }
}

#[cfg(test)]
mod tests {
    use nexus_core::CellValue;
    use pretty_assertions::assert_eq;

    use super::*;

    fn report() -> QueryResult {
        QueryResult {
            columns: vec![
                String::from("ID_Proj"),
                String::from("Nome"),
                String::from("Media"),
            ],
            rows: vec![
                vec![
                    CellValue::Int(1),
                    CellValue::Text(String::from("Aves")),
                    CellValue::Decimal(String::from("15000.50")),
                ],
                vec![
                    CellValue::Int(2),
                    CellValue::Text(String::from("Flora")),
                    CellValue::Decimal(String::from("7500.25")),
                ],
                vec![CellValue::Int(3), CellValue::Text(String::from("Vazio")), CellValue::Null],
            ],
        }
    }

    #[test]
    fn points_skip_non_numeric_values() {
        let points = chart_points(&report(), "Nome", "media");
        assert_eq!(
            points,
            vec![(String::from("Aves"), 15000.5), (String::from("Flora"), 7500.25)]
        );
    }

    #[test]
    fn unknown_columns_give_no_points() {
        assert!(chart_points(&report(), "Nome", "Quantidade").is_empty());
    }

    #[test]
    fn bars_scale_to_the_largest_value() {
        let points = vec![(String::from("Lab A"), 4.0), (String::from("B"), 2.0)];
        let chart = bar_chart(&points, 10);
        let lines: Vec<&str> = chart.lines().collect();
        assert_eq!(lines[0], "Lab A | ██████████ 4");
        assert_eq!(lines[1], "B     | █████      2");
    }

    #[test]
    fn small_positive_values_still_get_a_cell() {
        let points = vec![(String::from("a"), 1000.0), (String::from("b"), 1.0)];
        let chart = bar_chart(&points, 10);
        assert!(chart.lines().nth(1).is_some_and(|line| line.contains('█')));
    }

    #[test]
    fn zero_and_empty_inputs_render_without_bars() {
        assert_eq!(bar_chart(&[], 10), "(no data to chart)");
        let chart = bar_chart(&[(String::from("x"), 0.0)], 10);
        assert!(!chart.contains('█'));
        assert!(chart.ends_with(" 0"));
    }

    #[test]
    fn fractional_values_keep_two_decimals() {
        assert_eq!(format_value(7500.25), "7500.25");
        assert_eq!(format_value(3.0), "3");
    }
}
