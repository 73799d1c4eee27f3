//! Output writers for analysis results.
//!
//! Each run produces two timestamped files in the output directory:
//!
//! - [`report`]: a human-readable Markdown report, one section per company
//! - [`table`]: a CSV spreadsheet with one row per company, article columns
//!   widened to the company with the most articles
//!
//! Both writers take the same [`crate::models::CompanyChurnReport`] slice
//! and a shared timestamp so the pair of files from one run sort together.

pub mod report;
pub mod table;
