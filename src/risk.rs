//! Risk level extraction from free-text classifier output.
//!
//! The classifier returns loosely-formatted prose whose first line is
//! expected to name a risk level. Rather than trusting that format, every
//! consumer derives the level by substring matching through
//! [`parse_risk_level`], the single place this convention lives. A future
//! structured-output provider only has to replace this module.

use std::fmt;

/// Discrete churn risk classification derived from analysis text.
///
/// Never stored independently; always recomputed from the text it
/// summarizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    NoChurnRiskIndicated,
    Unknown,
}

impl RiskLevel {
    /// The display form used in reports and the exported table.
    pub fn as_str(self) -> &'static str {
        match self {
            RiskLevel::Low => "Low Risk",
            RiskLevel::Medium => "Medium Risk",
            RiskLevel::High => "High Risk",
            RiskLevel::NoChurnRiskIndicated => "No Churn Risk Indicated",
            RiskLevel::Unknown => "Unknown Risk",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Extract a [`RiskLevel`] from classifier output.
///
/// Lower-cases the input, then tests substring containment in fixed priority
/// order: "low risk", "medium risk", "high risk", "no churn risk indicated".
/// The first match wins even when several phrases are present; text
/// containing both "low risk" and "high risk" resolves to
/// [`RiskLevel::Low`] because it is tested first. That ordering is part of
/// the contract, not an accident.
pub fn parse_risk_level(text: &str) -> RiskLevel {
    let lowered = text.to_lowercase();
    if lowered.contains("low risk") {
        RiskLevel::Low
    } else if lowered.contains("medium risk") {
        RiskLevel::Medium
    } else if lowered.contains("high risk") {
        RiskLevel::High
    } else if lowered.contains("no churn risk indicated") {
        RiskLevel::NoChurnRiskIndicated
    } else {
        RiskLevel::Unknown
    }
}
