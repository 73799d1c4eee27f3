//! Data models for news articles and their analyzed representations.
//!
//! The pipeline passes three record types between its stages:
//! - [`NewsArticle`]: Raw article record returned by the news-search provider
//! - [`ArticleAnalysis`]: The classifier's text output bound to its article
//! - [`CompanyChurnReport`]: One company's full analysis for a single run
//!
//! All of these live only for the duration of one run; nothing is persisted
//! beyond the rendered report and spreadsheet.

use serde::{Deserialize, Serialize};

use crate::news::normalize_domain;

/// A raw news article as returned by the search provider.
///
/// Articles with no usable text still flow through the pipeline: the
/// aggregator records a placeholder analysis for them instead of dropping
/// them, so the analysis list stays 1:1 with the retrieved articles.
#[derive(Debug, Clone)]
pub struct NewsArticle {
    /// The article headline as published in the feed.
    pub title: String,
    /// Link to the article.
    pub link: String,
    /// Snippet or description text; empty when the feed provided none.
    pub summary: String,
    /// URL of the publishing outlet, taken from the feed's source element.
    /// Empty when the feed omitted it.
    pub source_url: String,
    /// Publication timestamp as given by the feed, unparsed.
    pub published: Option<String>,
}

impl NewsArticle {
    /// The best available text for classification: the summary if non-empty,
    /// else the title, else an empty string.
    pub fn analysis_text(&self) -> &str {
        if !self.summary.is_empty() {
            &self.summary
        } else {
            &self.title
        }
    }

    /// The publishing outlet's domain, normalized for filtering.
    /// For example: `"https://www.livemint.com"` -> `"livemint.com"`.
    pub fn source_domain(&self) -> String {
        normalize_domain(&self.source_url)
    }
}

/// The classifier's raw text output for one article.
///
/// `analysis` is expected, by convention, to begin with a risk-level phrase,
/// but it is passed through unvalidated; the risk level is always recomputed
/// from the text by [`crate::risk::parse_risk_level`].
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ArticleAnalysis {
    /// The article headline.
    pub title: String,
    /// Link to the article.
    pub url: String,
    /// Unstructured classifier output, or a synthetic placeholder for
    /// articles with no text.
    pub analysis: String,
}

/// One company's complete churn analysis for a single run.
///
/// `individual_analyses` corresponds 1:1 and in original order to the
/// articles retrieved for the company; a company with no retrieved articles
/// carries an empty list and a fixed no-articles summary.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CompanyChurnReport {
    /// The company the analysis was run for.
    pub company: String,
    /// Per-article analyses in retrieval order.
    pub individual_analyses: Vec<ArticleAnalysis>,
    /// The second-pass verdict over all individual analyses.
    pub overall_summary: String,
}
