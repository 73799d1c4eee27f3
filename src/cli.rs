//! Command-line interface definitions for the churn analyzer.
//!
//! This module defines the CLI arguments and options using the `clap`
//! crate. Companies come from `--companies` or `--company-file`; everything
//! else tunes the search window, keywords, and output location.

use clap::Parser;

/// Command-line arguments for the churn analyzer.
///
/// # Examples
///
/// ```sh
/// # Analyze two companies over the default 90-day window
/// churn_radar -c "Acme Corp, Zeta Works"
///
/// # Analyze companies from a CSV file, looking back 30 days
/// churn_radar -f companies.csv --days 30
///
/// # Use custom search keywords instead of the built-in categories
/// churn_radar -c "Acme Corp" --keywords "layoffs, acquisition"
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Comma-separated company names to analyze
    #[arg(short, long)]
    pub companies: Option<String>,

    /// Path to a CSV file with a CompanyName column (ignored when
    /// --companies is given)
    #[arg(short = 'f', long)]
    pub company_file: Option<String>,

    /// How many days back from today to search for news
    #[arg(long, default_value_t = 90, value_parser = clap::value_parser!(u32).range(1..=365))]
    pub days: u32,

    /// Comma-separated custom search keywords replacing the default
    /// churn keyword categories
    #[arg(short, long)]
    pub keywords: Option<String>,

    /// Output directory for the report and spreadsheet
    #[arg(short, long, default_value = "./reports")]
    pub output_dir: String,

    /// Optional path to a churn_radar.yaml config file
    #[arg(long)]
    pub config: Option<String>,

    /// Print the search keyword categories and exit
    #[arg(long)]
    pub show_keywords: bool,
}
