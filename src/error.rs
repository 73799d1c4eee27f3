//! Error types for the churn analysis pipeline.
//!
//! The taxonomy separates run-fatal conditions (a missing generation
//! credential, unreadable input) from per-unit failures (one news query, one
//! classification) which are logged and degraded in place so the rest of the
//! run continues.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// No credential for the text-generation provider. Fatal: no analysis is
    /// attempted without it.
    #[error(
        "no text generation API key configured; set `api_key` in the config file \
         or the CHURN_RADAR_API_KEY environment variable"
    )]
    MissingApiKey,

    /// The text-generation provider returned a non-success status or an
    /// unusable payload.
    #[error("text generation request failed: {0}")]
    Generation(String),

    /// The news-search provider returned a non-success status.
    #[error("news search request failed: {0}")]
    NewsSearch(String),

    /// The news feed payload could not be parsed.
    #[error("news feed parse failed: {0}")]
    FeedParse(String),

    /// The company list file is unreadable or missing the required column.
    #[error("company file {path}: {reason}")]
    InvalidCompanyFile { path: String, reason: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
