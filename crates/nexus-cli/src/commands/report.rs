use anyhow::{Context, bail};
use chrono::NaiveDate;
use nexus_db::reports::Report;

use crate::cli::root_commands::{ReportArgs, ReportKind};
use crate::cli::{GlobalFlags, OutputFormat};
use crate::context::AppContext;
use crate::output::chart::{BAR_WIDTH, bar_chart, chart_points};
use crate::output::output_rows;
use crate::prompt::Prompter;

const REPORT_MENU: &[&str] = &[
    "1. Active staff per project",
    "2. Equipment use per lab in a period",
    "3. Average funding per project in a period",
    "0. Back",
];

/// Handle `nexus-bio report`.
pub async fn handle<P: Prompter>(
    args: &ReportArgs,
    ctx: &AppContext,
    prompter: &mut P,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let kind = match args.kind {
        Some(kind) => kind,
        None => {
            for line in REPORT_MENU {
                println!("{line}");
            }
            let Some(kind) = parse_choice(&prompter.input("Report")?)? else {
                return Ok(());
            };
            kind
        }
    };

    let report = build_report(kind, args.from, args.to, prompter)?;
    show(&report, ctx, flags).await
}

/// `1`..`3` pick a report, `0` goes back.
fn parse_choice(answer: &str) -> anyhow::Result<Option<ReportKind>> {
    match answer.trim() {
        "0" => Ok(None),
        "1" => Ok(Some(ReportKind::Staff)),
        "2" => Ok(Some(ReportKind::Equipment)),
        "3" => Ok(Some(ReportKind::Funding)),
        other => bail!("invalid report option '{other}'"),
    }
}

/// Build the report, prompting for range dates that were not given.
fn build_report<P: Prompter>(
    kind: ReportKind,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
    prompter: &mut P,
) -> anyhow::Result<Report> {
    if kind == ReportKind::Staff {
        return Ok(Report::ActiveStaffPerProject);
    }

    let from = match from {
        Some(date) => date,
        None => parse_date(&prompter.input("Start date (YYYY-MM-DD)")?)?,
    };
    let to = match to {
        Some(date) => date,
        None => parse_date(&prompter.input("End date (YYYY-MM-DD)")?)?,
    };
    if from > to {
        bail!("the start date {from} is after the end date {to}");
    }

    Ok(match kind {
        ReportKind::Equipment => Report::EquipmentUsePerLab { from, to },
        _ => Report::FundingPerProject { from, to },
    })
}

fn parse_date(raw: &str) -> anyhow::Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .with_context(|| format!("'{}' is not a YYYY-MM-DD date", raw.trim()))
}

/// Run `report` and print its table, followed by a bar chart in table mode.
pub async fn show(report: &Report, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let result = ctx.db.run_report(report).await?;

    if flags.narrate() {
        println!("\n{}", report.title());
    }
    output_rows(&result, flags.format, usize::MAX)?;

    if flags.format == OutputFormat::Table && !result.is_empty() {
        let points = chart_points(&result, report.label_column(), report.value_column());
        println!("\n{}", bar_chart(&points, BAR_WIDTH));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::prompt::scripted::ScriptedPrompter;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn menu_choices_map_to_reports() {
        assert_eq!(parse_choice("1").unwrap(), Some(ReportKind::Staff));
        assert_eq!(parse_choice(" 3 ").unwrap(), Some(ReportKind::Funding));
        assert_eq!(parse_choice("0").unwrap(), None);
        assert!(parse_choice("4").is_err());
    }

    #[test]
    fn staff_report_needs_no_dates() {
        let mut prompter = ScriptedPrompter::default();
        let report = build_report(ReportKind::Staff, None, None, &mut prompter).unwrap();
        assert_eq!(report, Report::ActiveStaffPerProject);
        assert!(prompter.asked.is_empty());
    }

    #[test]
    fn missing_dates_are_prompted() {
        let mut prompter = ScriptedPrompter::new(["2023-01-01", "2023-12-31"]);
        let report = build_report(ReportKind::Equipment, None, None, &mut prompter).unwrap();
        assert_eq!(
            report,
            Report::EquipmentUsePerLab {
                from: date(2023, 1, 1),
                to: date(2023, 12, 31),
            }
        );
        assert_eq!(prompter.asked.len(), 2);
    }

    #[test]
    fn given_dates_are_not_prompted() {
        let mut prompter = ScriptedPrompter::default();
        let report = build_report(
            ReportKind::Funding,
            Some(date(2022, 1, 1)),
            Some(date(2024, 1, 1)),
            &mut prompter,
        )
        .unwrap();
        assert!(matches!(report, Report::FundingPerProject { .. }));
    }

    #[test]
    fn malformed_and_reversed_ranges_fail() {
        let mut prompter = ScriptedPrompter::new(["01/02/2023"]);
        assert!(build_report(ReportKind::Funding, None, None, &mut prompter).is_err());

        let mut prompter = ScriptedPrompter::default();
        let reversed = build_report(
            ReportKind::Funding,
            Some(date(2024, 1, 1)),
            Some(date(2023, 1, 1)),
            &mut prompter,
        );
        assert!(reversed.is_err());
    }
}
