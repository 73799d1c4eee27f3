//! # Churn Radar
//!
//! A churn-risk analysis pipeline for an employee benefits business. For
//! each company of interest it fetches recent news from Google News RSS,
//! classifies every article through an OpenAI-compatible LLM API, and
//! produces an overall churn verdict per company along with a Markdown
//! report and a CSV spreadsheet.
//!
//! ## Features
//!
//! - Searches Google News with churn-themed keyword queries per company,
//!   batched to keep request counts down
//! - Filters articles to a configurable list of Indian business news,
//!   government and registry domains
//! - Classifies each article individually, then distills the per-article
//!   analyses into one overall risk verdict per company
//! - Caches news fetches and classifications for an hour, so re-runs
//!   within a session cost nothing
//! - Outputs a timestamped Markdown report and CSV spreadsheet
//!
//! ## Usage
//!
//! ```sh
//! CHURN_RADAR_API_KEY=... churn_radar -c "Acme Corp, Zeta Works"
//! ```
//!
//! ## Architecture
//!
//! The application follows a pipeline architecture:
//! 1. **Ingestion**: Resolve the company list from the CLI or a CSV file
//! 2. **Retrieval**: Fetch and filter news articles per company
//! 3. **Classification**: Send article text to the LLM for risk analysis
//! 4. **Output**: Write the Markdown report and CSV export

use chrono::Local;
use clap::Parser;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod analysis;
mod api;
mod cache;
mod classify;
mod cli;
mod companies;
mod config;
mod error;
mod keywords;
mod models;
mod news;
mod outputs;
mod risk;
mod utils;

use analysis::{AnalysisParams, ChurnAnalyzer};
use api::ChatClient;
use cache::{DEFAULT_TTL, TtlCache};
use classify::RiskClassifier;
use cli::Cli;
use config::AppConfig;
use error::Result;
use keywords::KeywordTaxonomy;
use news::NewsRetriever;
use news::google::GoogleNewsClient;
use outputs::{report, table};
use risk::parse_risk_level;
use utils::{ensure_writable_dir, timestamp_slug};

#[tokio::main]
#[instrument]
async fn main() -> Result<()> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("churn_radar starting up");

    let args = Cli::parse();
    debug!(?args.companies, ?args.company_file, days = args.days, "Parsed CLI arguments");

    if args.show_keywords {
        let taxonomy = KeywordTaxonomy::from_custom_or_default(args.keywords.as_deref());
        for (category, keywords) in taxonomy.categories() {
            println!("{category}: {}", keywords.join(", "));
        }
        return Ok(());
    }

    let config = AppConfig::load(args.config.as_deref().map(Path::new))?;

    // ---- Resolve the company list ----
    let companies = match companies::resolve(
        args.companies.as_deref(),
        args.company_file.as_deref().map(Path::new),
    ) {
        Ok(companies) => companies,
        Err(e) => {
            error!(error = %e, "Could not resolve the company list");
            return Err(e);
        }
    };
    if companies.is_empty() {
        warn!("No companies to analyze; pass --companies or --company-file");
        return Ok(());
    }

    // ---- Analysis parameters ----
    let to = Local::now().date_naive();
    let from = to - chrono::Duration::days(i64::from(args.days));
    let taxonomy = KeywordTaxonomy::from_custom_or_default(args.keywords.as_deref());

    info!(%from, %to, days = args.days, "Search window");
    info!(
        max_articles_per_query = config.max_articles_per_query,
        allowed_domain_count = config.allowed_domains.len(),
        custom_keywords = taxonomy.is_custom(),
        "Analysis parameters"
    );

    // The key is required before any fetching or classification starts.
    let api_key = match config.resolve_api_key() {
        Ok(key) => key,
        Err(e) => {
            error!(
                error = %e,
                "No generation API key; set CHURN_RADAR_API_KEY or api_key in the config file"
            );
            return Err(e);
        }
    };

    // Early check: ensure the output dir is writable
    if let Err(e) = ensure_writable_dir(&args.output_dir).await {
        error!(
            path = %args.output_dir,
            error = %e,
            "Output directory is not writable (fix perms or choose a different path)"
        );
        return Err(e);
    }

    // ---- Build the pipeline ----
    let news_client =
        GoogleNewsClient::new(&config.language, &config.country, config.news_timeout())?;
    let chat_client = ChatClient::new(
        &config.base_url,
        api_key,
        &config.model,
        config.generation_timeout(),
    )?;
    let retriever = NewsRetriever::new(news_client, Arc::new(TtlCache::new(DEFAULT_TTL)));
    let classifier = RiskClassifier::new(chat_client, Arc::new(TtlCache::new(DEFAULT_TTL)));
    let analyzer = ChurnAnalyzer::new(retriever, classifier);

    let params = AnalysisParams {
        from,
        to,
        max_articles: config.max_articles_per_query,
        taxonomy,
        allowed_domains: config.allowed_domains.clone(),
    };

    // ---- Analyze companies ----
    info!(
        company_count = companies.len(),
        parallel = config.parallel_companies,
        "Starting churn analysis"
    );

    let reports = analyzer
        .analyze_companies(&companies, &params, config.parallel_companies)
        .await;

    for company_report in &reports {
        info!(
            company = %company_report.company,
            risk = %parse_risk_level(&company_report.overall_summary),
            article_count = company_report.individual_analyses.len(),
            "Company analyzed"
        );
    }

    // ---- Write outputs ----
    let timestamp = timestamp_slug();
    let report_path = report::write_report(&args.output_dir, &reports, &timestamp).await?;
    let table_path = table::write_table(&args.output_dir, &reports, &timestamp)?;
    info!(report = %report_path, table = %table_path, "Outputs written");

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );

    Ok(())
}
