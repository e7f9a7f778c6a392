//! Run summary formatting

use std::path::PathBuf;

use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::services::{MonthReport, RunSummary};

#[derive(Tabled)]
struct MonthRow {
    #[tabled(rename = "Month")]
    month: String,
    #[tabled(rename = "Records")]
    records: usize,
    #[tabled(rename = "Fetched")]
    fetched: usize,
    #[tabled(rename = "Opening skipped")]
    opening_skipped: usize,
    #[tabled(rename = "Status")]
    status: String,
}

impl From<&MonthReport> for MonthRow {
    fn from(report: &MonthReport) -> Self {
        Self {
            month: if report.window.is_partial() {
                format!("{} (to {})", report.window.label(), report.window.end.format("%d"))
            } else {
                report.window.label()
            },
            records: report.records,
            fetched: report.fetched,
            opening_skipped: report.opening_skipped,
            status: report.status.to_string(),
        }
    }
}

/// Format the per-month table followed by totals and warnings
pub fn format_run_summary(summary: &RunSummary) -> String {
    let mut output = String::new();
    output.push_str(&format!(
        "{} ({})\n",
        summary.company_name, summary.company_id
    ));

    if summary.months.is_empty() {
        output.push_str("No months processed.\n");
    } else {
        let rows: Vec<MonthRow> = summary.months.iter().map(MonthRow::from).collect();
        let mut table = Table::new(rows);
        table.with(Style::sharp());
        output.push_str(&table.to_string());
        output.push('\n');
    }

    output.push_str(&format!(
        "Total records: {}\n",
        summary.total_records()
    ));
    let degraded = summary.degraded_months();
    if degraded > 0 {
        output.push_str(&format!("Incomplete months: {}\n", degraded));
    }

    if !summary.warnings.is_empty() {
        output.push_str("\nWarnings:\n");
        for warning in &summary.warnings {
            output.push_str(&format!("  - {}\n", warning));
        }
    }

    output
}

/// Format the list of files an export wrote
pub fn format_written_files(paths: &[PathBuf]) -> String {
    let mut output = String::new();
    for path in paths {
        output.push_str(&format!("  {}\n", path.display()));
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MonthWindow;
    use crate::services::MonthStatus;

    fn report(month: u32, records: usize, status: MonthStatus) -> MonthReport {
        MonthReport {
            window: MonthWindow::full(2024, month).unwrap(),
            records,
            fetched: records + 1,
            opening_skipped: 1,
            status,
        }
    }

    #[test]
    fn test_format_run_summary() {
        let summary = RunSummary {
            company_id: "76543210".into(),
            company_name: "Acme SA".into(),
            months: vec![
                report(1, 2, MonthStatus::Complete),
                report(2, 0, MonthStatus::PlanUnavailable("HTTP 404".into())),
            ],
            warnings: vec!["2024-02: no account plan".into()],
        };

        let output = format_run_summary(&summary);
        assert!(output.starts_with("Acme SA (76543210)"));
        assert!(output.contains("2024-01"));
        assert!(output.contains("no account plan"));
        assert!(output.contains("Total records: 2"));
        assert!(output.contains("Incomplete months: 1"));
        assert!(output.contains("Warnings:"));
    }

    #[test]
    fn test_partial_month_shows_end_day() {
        let mut partial = report(5, 1, MonthStatus::Complete);
        partial.window.end = chrono::NaiveDate::from_ymd_opt(2024, 5, 15).unwrap();
        let summary = RunSummary {
            company_id: "76543210".into(),
            company_name: "Acme SA".into(),
            months: vec![partial],
            warnings: vec![],
        };

        assert!(format_run_summary(&summary).contains("2024-05 (to 15)"));
    }

    #[test]
    fn test_format_empty_summary() {
        let summary = RunSummary {
            company_id: "1".into(),
            company_name: "Vacía".into(),
            months: vec![],
            warnings: vec![],
        };
        let output = format_run_summary(&summary);
        assert!(output.contains("No months processed."));
        assert!(!output.contains("Warnings"));
    }

    #[test]
    fn test_format_written_files() {
        let output = format_written_files(&[PathBuf::from("out/Acme_SA_2024-03.json")]);
        assert_eq!(output, "  out/Acme_SA_2024-03.json\n");
    }
}
