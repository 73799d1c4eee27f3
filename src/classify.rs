//! Churn risk classification of article text.
//!
//! [`RiskClassifier`] renders one of two fixed prompt templates and sends it
//! through a [`Generate`] implementation as a single non-streaming request.
//! The per-article template asks for a risk level, categorized reasons, and
//! a two-line summary; the combined template asks for one overall verdict
//! over all per-article analyses. Output is loosely-formatted prose and is
//! passed through as-is; risk levels are recovered later by
//! [`crate::risk::parse_risk_level`].
//!
//! Responses are cached for one hour keyed by (company, text, prompt kind),
//! so re-running a company within a session re-bills nothing. The prompt
//! kind is part of the key to keep the two templates from ever colliding on
//! identical text. A provider failure degrades that one classification to
//! [`ANALYSIS_FAILED`] instead of propagating.

use std::sync::Arc;

use tracing::{debug, error, instrument};

use crate::api::Generate;
use crate::cache::TtlCache;

/// Recorded in place of a classification when the provider call fails.
pub const ANALYSIS_FAILED: &str = "Analysis failed due to AI service error.";

/// Per-article analysis prompt. `{provided_text}` is replaced with the
/// article text.
pub const INDIVIDUAL_ANALYSIS_PROMPT: &str = r#"Carefully analyze the following news article text for information directly indicating potential reasons for client churn specifically for an **employee benefits company in India**. Focus only on details that would impact an employee benefits provider or suggest a company might reduce or discontinue its employee benefits programs.

**Text:**
{provided_text}

Based on your analysis and using the provided categories below, determine the churn risk and the specific reason(s).

1.  **Risk Level (First Line):** State the risk level as one of the following:
    * "High Risk"
    * "Medium Risk"
    * "Low Risk"
    * "No Churn Risk Indicated" (If no relevant information is found regarding churn for an employee benefits company)

2.  **Reason(s) for Risk (Second Line):** If a risk is indicated, explain the major reason(s) concisely, referencing the relevant category (e.g., "Reason: [Category Name] - Brief explanation."). If there are multiple relevant reasons, list them clearly.

3.  **2-Line Summary of Analysis (Third and Fourth Lines):** Provide a brief, overall summary of the article's relevance to churn for an employee benefits company, condensing the key findings into exactly two lines. If no churn risk is indicated, summarize why the article is not relevant.

**Categories for Reasons:**
I. Corporate Restructuring (Mergers, Acquisitions, Joint Ventures, IPO, Entity Realignment, Rebranding, Consolidation, Subsidiary changes)
II. Business Discontinuity (Closures, Market Exits, Bankruptcy, Operational Suspensions, Business Model Pivots)
III. Strategic Policy Changes (Benefits Strategy Transformation, Leadership Changes impacting strategy, Cost Optimization related to benefits, Changes in top leadership impacting benefits)
IV. Financial Constraints (Cash Flow Issues, Cost-Cutting impacting benefits, Budget Reallocation away from benefits, Severe financial loss)
V. Employment Structure Changes (Workforce Reorganization, Shifts to contractual work, Remote work transitions impacting benefits, Layoffs, Furloughs, Downsizing)
VI. Regulatory & Compliance Factors (India Specific: Changes in tax policy, GST, labor codes, social security impacting benefits compliance or costs)
VII. Competitive Market Dynamics (Client switched vendor, New platform adoption by client, Competitor activity in benefits space, Pricing pressures on benefits, Market share shifts impacting client's ability to offer benefits, Disruption in client's industry affecting benefits, Client's value proposition change impacting benefits)
VIII. Technological Transitions (Digital transformation affecting benefits administration, HRMS integration impacting benefits systems, API changes relevant to benefits platforms, Analytics adoption impacting benefits, Mobile app for benefits, Platform upgrade for benefits management)
IX. Service Delivery Issues (Onboarding delay with benefits provider, Tech issues with benefits platform, Merchant issue impacting benefits, Support problem with benefits services, Delivery delay of benefits, Reimbursement issue with benefits claims)
X. Employee Engagement (Low adoption of benefits programs, Poor user experience with benefits platform, Negative employee feedback on benefits, Generation gap affecting benefits appeal, Hybrid work models impacting benefits usage, Usage drop in benefits offerings)

**Example Output Format (for High/Medium/Low Risk):**
High Risk
Reason: Business Discontinuity - Company announced complete shutdown impacting all operations including benefits.
Summary: The company is facing imminent closure, directly impacting its ability to retain any employee benefits plans. This represents a critical churn event for any associated benefits provider.

**Example Output Format (for No Risk):
No Churn Risk Indicated
Summary: The article discusses general market trends not specific to the company's operational or financial health. It provides no indication of changes relevant to employee benefits or potential churn.
"#;

/// Overall verdict prompt. `{individual_analyses_summary}` is replaced with
/// the numbered per-article analyses.
pub const COMBINED_ANALYSIS_PROMPT: &str = r#"Given the individual analyses of news articles related to a company and potential client churn, provide an overall summary (at most 4 lines).

**Individual Article Analyses:**
{individual_analyses_summary}

In the first line, state the overall risk level for churn for the company (e.g., "Overall High Risk," "Overall Medium Risk," "Overall Low Risk," "Overall No Churn Risk Indicated"). In the subsequent lines, summarize the major reasons for this overall risk, drawing from the categories mentioned in the individual analyses. Be concise and focus on the most impactful reasons across all articles. If no relevant information is found across all articles, state "Overall No Churn Risk Indicated."
"#;

/// Which template a classification uses; part of the cache key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromptKind {
    /// One article's text analyzed on its own.
    Individual,
    /// The numbered concatenation of per-article analyses.
    Combined,
}

impl PromptKind {
    /// Render the template for this kind around the given text.
    pub fn render(self, company: &str, text: &str) -> String {
        match self {
            PromptKind::Individual => INDIVIDUAL_ANALYSIS_PROMPT
                .replace("{company_name}", company)
                .replace("{provided_text}", text),
            PromptKind::Combined => COMBINED_ANALYSIS_PROMPT
                .replace("{company_name}", company)
                .replace("{individual_analyses_summary}", text),
        }
    }
}

type ClassificationKey = (String, String, PromptKind);

/// Classifies text through a generation backend, with caching and local
/// failure degradation.
pub struct RiskClassifier<G> {
    client: G,
    cache: Arc<TtlCache<ClassificationKey, String>>,
}

impl<G> RiskClassifier<G>
where
    G: Generate,
{
    pub fn new(client: G, cache: Arc<TtlCache<ClassificationKey, String>>) -> Self {
        Self { client, cache }
    }

    /// Classify `text` for `company` with the template named by `kind`.
    ///
    /// Never fails: a provider error is logged and degrades to
    /// [`ANALYSIS_FAILED`]. Only successful responses are cached, so a
    /// transient provider outage does not poison the session.
    #[instrument(level = "info", skip_all, fields(company = %company, kind = ?kind))]
    pub async fn classify(&self, company: &str, text: &str, kind: PromptKind) -> String {
        let key = (company.to_string(), text.to_string(), kind);
        if let Some(cached) = self.cache.get(&key) {
            debug!("Classification cache hit");
            return cached;
        }

        let prompt = kind.render(company, text);
        match self.client.generate(&prompt).await {
            Ok(output) => {
                let output = if output.is_empty() {
                    format!("Unexpected response: {output}")
                } else {
                    output
                };
                self.cache.insert(key, output.clone());
                output
            }
            Err(e) => {
                error!(error = %e, "Classification failed; recording failure text");
                ANALYSIS_FAILED.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::DEFAULT_TTL;
    use crate::error::{Error, Result};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct MockGenerate {
        calls: AtomicUsize,
        prompts: Mutex<Vec<String>>,
        output: String,
        fail: bool,
    }

    impl MockGenerate {
        fn returning(output: &str) -> Self {
            Self {
                output: output.to_string(),
                ..Self::default()
            }
        }

        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl Generate for &MockGenerate {
        async fn generate(&self, prompt: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.prompts.lock().unwrap().push(prompt.to_string());
            if self.fail {
                return Err(Error::Generation("stubbed outage".to_string()));
            }
            Ok(self.output.clone())
        }
    }

    fn classifier(mock: &MockGenerate) -> RiskClassifier<&MockGenerate> {
        RiskClassifier::new(mock, Arc::new(TtlCache::new(DEFAULT_TTL)))
    }

    #[test]
    fn test_individual_render_embeds_text() {
        let prompt = PromptKind::Individual.render("Acme", "Plant closure announced.");
        assert!(prompt.contains("Plant closure announced."));
        assert!(!prompt.contains("{provided_text}"));
        assert!(prompt.contains("Categories for Reasons"));
    }

    #[test]
    fn test_combined_render_embeds_analyses() {
        let prompt = PromptKind::Combined.render("Acme", "Article 1 Analysis:\nHigh Risk");
        assert!(prompt.contains("Article 1 Analysis:\nHigh Risk"));
        assert!(!prompt.contains("{individual_analyses_summary}"));
        assert!(prompt.contains("overall summary (at most 4 lines)"));
    }

    #[tokio::test]
    async fn test_repeated_classification_hits_cache() {
        let mock = MockGenerate::returning("Low Risk\nSummary: fine.");
        let classifier = classifier(&mock);

        let first = classifier
            .classify("Acme", "text", PromptKind::Individual)
            .await;
        let second = classifier
            .classify("Acme", "text", PromptKind::Individual)
            .await;

        assert_eq!(first, "Low Risk\nSummary: fine.");
        assert_eq!(first, second);
        assert_eq!(mock.calls(), 1);
    }

    #[tokio::test]
    async fn test_prompt_kinds_never_collide_in_the_cache() {
        let mock = MockGenerate::returning("ok");
        let classifier = classifier(&mock);

        classifier
            .classify("Acme", "same text", PromptKind::Individual)
            .await;
        classifier
            .classify("Acme", "same text", PromptKind::Combined)
            .await;

        assert_eq!(mock.calls(), 2);
    }

    #[tokio::test]
    async fn test_failure_degrades_and_is_not_cached() {
        let mock = MockGenerate::failing();
        let classifier = classifier(&mock);

        let first = classifier
            .classify("Acme", "text", PromptKind::Individual)
            .await;
        let second = classifier
            .classify("Acme", "text", PromptKind::Individual)
            .await;

        assert_eq!(first, ANALYSIS_FAILED);
        assert_eq!(second, ANALYSIS_FAILED);
        assert_eq!(mock.calls(), 2);
    }

    #[tokio::test]
    async fn test_empty_output_is_flagged() {
        let mock = MockGenerate::returning("");
        let classifier = classifier(&mock);

        let result = classifier
            .classify("Acme", "text", PromptKind::Individual)
            .await;

        assert_eq!(result, "Unexpected response: ");
    }

    #[tokio::test]
    async fn test_rendered_prompt_is_what_the_provider_receives() {
        let mock = MockGenerate::returning("ok");
        let classifier = classifier(&mock);

        classifier
            .classify("Acme", "some article text", PromptKind::Individual)
            .await;

        let prompts = mock.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("some article text"));
        assert!(prompts[0].starts_with("Carefully analyze the following news article text"));
    }
}
