//! CSV spreadsheet export.
//!
//! One row per company with three fixed columns (company, overall risk
//! level, overall summary) followed by four columns per article (title,
//! URL, risk level, analysis). The header is sized by the company with the
//! most articles and shorter rows are padded with empty cells, so the file
//! is rectangular no matter how uneven retrieval was.

use tracing::{info, instrument};

use crate::error::Result;
use crate::models::CompanyChurnReport;
use crate::risk::parse_risk_level;

const FIXED_COLUMNS: [&str; 3] = ["Company", "Overall Risk Level", "Overall Summary"];

/// Header row for a run whose widest company has `max_articles` articles.
pub fn header_row(max_articles: usize) -> Vec<String> {
    let mut header: Vec<String> = FIXED_COLUMNS.iter().map(|c| c.to_string()).collect();
    for i in 1..=max_articles {
        header.push(format!("Article {i} Title"));
        header.push(format!("Article {i} URL"));
        header.push(format!("Article {i} Risk Level"));
        header.push(format!("Article {i} Analysis"));
    }
    header
}

fn data_row(report: &CompanyChurnReport, max_articles: usize) -> Vec<String> {
    let mut row = vec![
        report.company.clone(),
        parse_risk_level(&report.overall_summary).to_string(),
        report.overall_summary.clone(),
    ];
    for analysis in &report.individual_analyses {
        row.push(analysis.title.clone());
        row.push(analysis.url.clone());
        row.push(parse_risk_level(&analysis.analysis).to_string());
        row.push(analysis.analysis.clone());
    }
    row.resize(FIXED_COLUMNS.len() + max_articles * 4, String::new());
    row
}

/// Write the CSV export to
/// `{output_dir}/churn_analysis_results_{timestamp}.csv`.
///
/// Returns the path of the written file.
#[instrument(level = "info", skip_all, fields(%output_dir, company_count = reports.len()))]
pub fn write_table(
    output_dir: &str,
    reports: &[CompanyChurnReport],
    timestamp: &str,
) -> Result<String> {
    let max_articles = reports
        .iter()
        .map(|r| r.individual_analyses.len())
        .max()
        .unwrap_or(0);

    let path = format!("{output_dir}/churn_analysis_results_{timestamp}.csv");
    let mut writer = csv::Writer::from_path(&path)?;
    writer.write_record(header_row(max_articles))?;
    for report in reports {
        writer.write_record(data_row(report, max_articles))?;
    }
    writer.flush()?;

    info!(%path, "Wrote CSV export");
    Ok(path)
}
