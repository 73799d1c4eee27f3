//! Search keyword taxonomy used to build news queries.
//!
//! The default taxonomy groups churn-signal keywords into ten categories
//! tuned for an employee-benefits provider watching Indian business news. An
//! operator-supplied comma-separated list replaces the whole thing with a
//! single "Custom" category. Either way the taxonomy is only ever used to
//! construct search queries; nothing downstream looks at it again.

use once_cell::sync::Lazy;

/// The built-in category -> keywords table, in presentation order.
pub static DEFAULT_CHURN_KEYWORDS: Lazy<Vec<(&'static str, Vec<&'static str>)>> =
    Lazy::new(|| {
        vec![
            (
                "Corporate Restructuring",
                vec![
                    "merger",
                    "acquisition",
                    "investment",
                    "joint venture",
                    "IPO",
                    "restructuring",
                    "realignment",
                    "rebranding",
                    "subsidiary",
                    "consolidation",
                ],
            ),
            (
                "Business Discontinuity",
                vec![
                    "shutdown",
                    "closed",
                    "bankruptcy",
                    "insolvency",
                    "pivot",
                    "market exit",
                ],
            ),
            (
                "Strategic Policy Changes",
                vec![
                    "benefits withdrawn",
                    "benefits discontinued",
                    "centralization",
                    "new CEO",
                    "cost cutting",
                    "budget cuts",
                    "strategy shift",
                ],
            ),
            (
                "Financial Constraints",
                vec![
                    "payroll issue",
                    "financial loss",
                    "cost pressure",
                    "cash flow",
                    "budget reallocation",
                ],
            ),
            (
                "Employment Structure Changes",
                vec![
                    "employee transfer",
                    "contractual workforce",
                    "remote work",
                    "layoffs",
                    "furloughs",
                    "downsizing",
                ],
            ),
            (
                "Regulatory & Compliance",
                vec![
                    "tax policy",
                    "labor law",
                    "income tax",
                    "GST change",
                    "budget amendment",
                    "social security",
                ],
            ),
            (
                "Competitive Market Dynamics",
                vec![
                    "switched vendor",
                    "new platform",
                    "competitor",
                    "pricing",
                    "market share",
                    "disruption",
                    "value proposition",
                ],
            ),
            (
                "Technological Transitions",
                vec![
                    "digital transformation",
                    "HRMS integration",
                    "API",
                    "analytics",
                    "mobile app",
                    "platform upgrade",
                ],
            ),
            (
                "Service Delivery Issues",
                vec![
                    "onboarding delay",
                    "tech issues",
                    "merchant issue",
                    "support problem",
                    "delivery delay",
                    "reimbursement issue",
                ],
            ),
            (
                "Employee Engagement",
                vec![
                    "low adoption",
                    "user experience",
                    "employee feedback",
                    "generation gap",
                    "hybrid work",
                    "usage drop",
                ],
            ),
        ]
    });

/// An ordered category -> keywords mapping driving query construction.
#[derive(Debug, Clone)]
pub struct KeywordTaxonomy {
    categories: Vec<(String, Vec<String>)>,
    custom: bool,
}

impl KeywordTaxonomy {
    /// The built-in ten-category taxonomy.
    pub fn default_taxonomy() -> Self {
        let categories = DEFAULT_CHURN_KEYWORDS
            .iter()
            .map(|(name, keywords)| {
                (
                    (*name).to_string(),
                    keywords.iter().map(|k| (*k).to_string()).collect(),
                )
            })
            .collect();
        Self {
            categories,
            custom: false,
        }
    }

    /// A single "Custom" category built from a comma-separated operator
    /// string. Returns `None` when the string holds no keywords after
    /// trimming, in which case callers fall back to the defaults.
    pub fn custom(raw: &str) -> Option<Self> {
        let keywords: Vec<String> = raw
            .split(',')
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(str::to_string)
            .collect();
        if keywords.is_empty() {
            return None;
        }
        Some(Self {
            categories: vec![("Custom".to_string(), keywords)],
            custom: true,
        })
    }

    /// Custom keywords when supplied and non-empty, defaults otherwise.
    pub fn from_custom_or_default(raw: Option<&str>) -> Self {
        raw.and_then(Self::custom)
            .unwrap_or_else(Self::default_taxonomy)
    }

    /// Whether this taxonomy came from operator-supplied keywords.
    pub fn is_custom(&self) -> bool {
        self.custom
    }

    pub fn categories(&self) -> &[(String, Vec<String>)] {
        &self.categories
    }

    /// Search queries for one company: the bare company name first, then
    /// `"{company} {keyword}"` for every keyword in category order.
    pub fn queries_for(&self, company: &str) -> Vec<String> {
        let mut queries = vec![company.to_string()];
        for (_, keywords) in &self.categories {
            for keyword in keywords {
                queries.push(format!("{company} {keyword}"));
            }
        }
        queries
    }
}
