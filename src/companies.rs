//! Company list ingestion.
//!
//! Companies come from either a comma-separated command line argument or a
//! CSV file with a `CompanyName` column. When both are given the manual
//! list wins outright; the file is only consulted when the manual input is
//! absent or contains nothing after trimming.

use std::path::Path;

use tracing::info;

use crate::error::{Error, Result};

/// Split a comma-separated company list, trimming and dropping blanks.
pub fn parse_manual_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|company| !company.is_empty())
        .map(str::to_string)
        .collect()
}

/// Read company names from the `CompanyName` column of a CSV file.
///
/// Other columns are ignored. Blank cells are skipped, matching how a
/// spreadsheet with trailing empty rows usually arrives.
pub fn read_company_file(path: &Path) -> Result<Vec<String>> {
    let file_error = |reason: String| Error::InvalidCompanyFile {
        path: path.display().to_string(),
        reason,
    };

    let mut reader = csv::Reader::from_path(path).map_err(|e| file_error(e.to_string()))?;
    let headers = reader
        .headers()
        .map_err(|e| file_error(e.to_string()))?
        .clone();
    let column = headers
        .iter()
        .position(|h| h.trim() == "CompanyName")
        .ok_or_else(|| file_error("missing required CompanyName column".to_string()))?;

    let mut companies = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| file_error(e.to_string()))?;
        if let Some(value) = record.get(column) {
            let value = value.trim();
            if !value.is_empty() {
                companies.push(value.to_string());
            }
        }
    }

    info!(
        path = %path.display(),
        company_count = companies.len(),
        "Loaded companies from file"
    );
    Ok(companies)
}

/// Resolve the final company list from manual input and an optional file.
pub fn resolve(manual: Option<&str>, file: Option<&Path>) -> Result<Vec<String>> {
    if let Some(raw) = manual {
        let companies = parse_manual_list(raw);
        if !companies.is_empty() {
            return Ok(companies);
        }
    }
    match file {
        Some(path) => read_company_file(path),
        None => Ok(Vec::new()),
    }
}
