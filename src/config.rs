//! Runtime configuration.
//!
//! Settings load from a YAML file (`--config` path, else `churn_radar.yaml`
//! in the working directory, else built-in defaults) with every field
//! optional. The API key is deliberately not baked in anywhere: it comes
//! from the `CHURN_RADAR_API_KEY` environment variable or the config file's
//! `api_key` field, and a run refuses to start without one.

use std::path::Path;

use once_cell::sync::Lazy;
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{Error, Result};

/// Environment variable consulted first for the generation API key.
pub const API_KEY_ENV: &str = "CHURN_RADAR_API_KEY";

/// Config file picked up from the working directory when `--config` is not
/// given.
pub const DEFAULT_CONFIG_FILE: &str = "churn_radar.yaml";

/// Indian business press, government and registry sources accepted by
/// default. Entries are kept normalized (lowercase, no `www.`) so they
/// compare directly against normalized article domains.
pub static DEFAULT_ALLOWED_DOMAINS: Lazy<Vec<String>> = Lazy::new(|| {
    [
        "livemint.com",
        "economictimes.indiatimes.com",
        "business-standard.com",
        "thehindubusinessline.com",
        "financialexpress.com",
        "ndtvprofit.com",
        "zeebiz.com",
        "moneycontrol.com",
        "bloombergquint.com",
        "cnbctv18.com",
        "businesstoday.in",
        "indianexpress.com",
        "thehindu.com",
        "reuters.com",
        "businesstraveller.com",
        "sify.com",
        "telegraphindia.com",
        "outlookindia.com",
        "firstpost.com",
        "pulse.zerodha.com",
        "ddnews.gov.in",
        "newsonair.gov.in",
        "pib.gov.in",
        "niti.gov.in",
        "rbi.org.in",
        "sebi.gov.in",
        "dpiit.gov.in",
        "investindia.gov.in",
        "indiabriefing.com",
        "taxscan.in",
        "bwbusinessworld.com",
        "inc42.com",
        "yourstory.com",
        "vccircle.com",
        "entrackr.com",
        "the-ken.com",
        "linkedin.com",
        "mca.gov.in",
        "zaubacorp.com",
        "tofler.in",
        "smestreet.in",
    ]
    .into_iter()
    .map(String::from)
    .collect()
});

/// Application settings, all overridable from YAML.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Generation API key; the environment variable wins over this field.
    pub api_key: Option<String>,
    /// OpenAI-compatible chat completions endpoint base.
    pub base_url: String,
    /// Model name sent with every generation request.
    pub model: String,
    /// Google News feed language, e.g. `en`.
    pub language: String,
    /// Google News feed country, e.g. `IN`.
    pub country: String,
    /// Cap on articles analyzed per company.
    pub max_articles_per_query: usize,
    /// Companies analyzed concurrently.
    pub parallel_companies: usize,
    /// Timeout for each news feed request, in seconds.
    pub news_timeout_secs: u64,
    /// Timeout for each generation request, in seconds.
    pub generation_timeout_secs: u64,
    /// Domain substrings articles must match; empty disables filtering.
    pub allowed_domains: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.sambanova.ai/v1".to_string(),
            model: "Meta-Llama-3.3-70B-Instruct".to_string(),
            language: "en".to_string(),
            country: "IN".to_string(),
            max_articles_per_query: 10,
            parallel_companies: 1,
            news_timeout_secs: 15,
            generation_timeout_secs: 120,
            allowed_domains: DEFAULT_ALLOWED_DOMAINS.clone(),
        }
    }
}

impl AppConfig {
    /// Load settings from `path` if given, else from the default file if it
    /// exists, else fall back to built-in defaults.
    ///
    /// An explicitly named file must exist; a missing default file is not
    /// an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            let raw = std::fs::read_to_string(path)?;
            let config: Self = serde_yaml::from_str(&raw)?;
            info!(path = %path.display(), "Loaded configuration");
            return Ok(config);
        }

        let default_path = Path::new(DEFAULT_CONFIG_FILE);
        if default_path.exists() {
            let raw = std::fs::read_to_string(default_path)?;
            let config: Self = serde_yaml::from_str(&raw)?;
            info!(path = DEFAULT_CONFIG_FILE, "Loaded configuration");
            return Ok(config);
        }

        debug!("No configuration file found, using defaults");
        Ok(Self::default())
    }

    /// Resolve the generation API key or fail the run.
    pub fn resolve_api_key(&self) -> Result<String> {
        let env_value = std::env::var(API_KEY_ENV).ok();
        pick_api_key(env_value, self.api_key.clone()).ok_or(Error::MissingApiKey)
    }

    pub fn news_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.news_timeout_secs)
    }

    pub fn generation_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.generation_timeout_secs)
    }
}

/// Environment wins over the config file; blank values count as absent.
fn pick_api_key(env_value: Option<String>, config_value: Option<String>) -> Option<String> {
    env_value
        .filter(|key| !key.trim().is_empty())
        .or_else(|| config_value.filter(|key| !key.trim().is_empty()))
}
