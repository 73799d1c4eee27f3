//! Markdown report generation.
//!
//! Renders one section per company: the overall verdict with its parsed
//! risk level up front, then every article analysis with title, link, and
//! per-article risk. Rendering is pure; writing is a separate async step so
//! the layout is testable without touching the filesystem.

use std::fmt::Write as _;

use tokio::fs;
use tracing::{info, instrument};

use crate::error::Result;
use crate::models::CompanyChurnReport;
use crate::risk::parse_risk_level;

/// Render the full Markdown report for a run.
pub fn render_report(reports: &[CompanyChurnReport]) -> String {
    let mut md = String::new();
    writeln!(md, "# Company Churn Risk Analysis\n").unwrap();

    for report in reports {
        writeln!(md, "## {}\n", report.company).unwrap();
        writeln!(md, "### Summary for {}\n", report.company).unwrap();
        writeln!(
            md,
            "**Overall Risk Level:** {}\n",
            parse_risk_level(&report.overall_summary)
        )
        .unwrap();
        writeln!(md, "{}\n", report.overall_summary).unwrap();

        writeln!(md, "### Individual Article Analyses\n").unwrap();
        if report.individual_analyses.is_empty() {
            writeln!(md, "No individual articles found for detailed analysis.\n").unwrap();
        } else {
            for (i, analysis) in report.individual_analyses.iter().enumerate() {
                let title = if analysis.title.is_empty() {
                    format!("Article {}", i + 1)
                } else {
                    analysis.title.clone()
                };
                writeln!(md, "#### {title}\n").unwrap();
                writeln!(md, "**URL:** [Link]({})\n", analysis.url).unwrap();
                writeln!(
                    md,
                    "**Risk Level:** {}\n",
                    parse_risk_level(&analysis.analysis)
                )
                .unwrap();
                writeln!(md, "**Analysis:** {}\n", analysis.analysis).unwrap();
                writeln!(md, "---\n").unwrap();
            }
        }
        writeln!(md, "---\n").unwrap();
    }

    md
}

/// Write the Markdown report to `{output_dir}/churn_report_{timestamp}.md`.
///
/// Returns the path of the written file.
#[instrument(level = "info", skip_all, fields(%output_dir, company_count = reports.len()))]
pub async fn write_report(
    output_dir: &str,
    reports: &[CompanyChurnReport],
    timestamp: &str,
) -> Result<String> {
    let path = format!("{output_dir}/churn_report_{timestamp}.md");
    fs::write(&path, render_report(reports)).await?;
    info!(%path, "Wrote Markdown report");
    Ok(path)
}
