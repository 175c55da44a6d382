use crate::models::{AnalysisTier, Diagnosis, DiagnosisSeverity};

/// Ordered severity rule table: first pattern group that matches the joined
/// issue text wins. Keeping this data-driven (rather than scattered string
/// checks) makes the classification auditable and testable.
const SEVERITY_RULES: &[(&[&str], DiagnosisSeverity, &str)] = &[
    (
        &["severely", "critically"],
        DiagnosisSeverity::High,
        "Severely impacts system stability",
    ),
    (
        &["bottleneck"],
        DiagnosisSeverity::Medium,
        "Degrades system response performance",
    ),
];

const DEFAULT_IMPACT: &str = "Minor impact on system operation";

/// Terminal analysis tier: deterministic mapping from issue keywords to a
/// diagnosis. Always succeeds; this is what the fallback ladder bottoms
/// out on.
pub fn rule_based_diagnosis(issues: &[String]) -> Diagnosis {
    let joined = issues.join("; ");
    let lowered = joined.to_lowercase();

    let (severity, impact) = SEVERITY_RULES
        .iter()
        .find(|(patterns, _, _)| patterns.iter().any(|p| lowered.contains(p)))
        .map(|(_, severity, impact)| (*severity, *impact))
        .unwrap_or((DiagnosisSeverity::Low, DEFAULT_IMPACT));

    Diagnosis {
        root_cause: format!("Rule-based detection: {joined}"),
        severity,
        impact: impact.to_string(),
        provenance: AnalysisTier::RuleBased,
    }
}
