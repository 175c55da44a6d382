use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Which fallback tier produced a diagnosis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnalysisTier {
    /// Structured-chain model call with JSON output.
    Chain,
    /// Single free-text model round trip.
    Direct,
    /// Deterministic keyword mapping; the terminal tier.
    RuleBased,
}

impl AnalysisTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisTier::Chain => "chain",
            AnalysisTier::Direct => "direct",
            AnalysisTier::RuleBased => "rule-based",
        }
    }
}

impl std::fmt::Display for AnalysisTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Diagnosis severity, distinct from alert levels: it grades the finding,
/// not the notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosisSeverity {
    Low,
    Medium,
    High,
}

impl DiagnosisSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosisSeverity::Low => "low",
            DiagnosisSeverity::Medium => "medium",
            DiagnosisSeverity::High => "high",
        }
    }
}

impl std::fmt::Display for DiagnosisSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DiagnosisSeverity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(DiagnosisSeverity::Low),
            "medium" => Ok(DiagnosisSeverity::Medium),
            "high" => Ok(DiagnosisSeverity::High),
            _ => Err(format!("unknown diagnosis severity: {s}")),
        }
    }
}

/// Root-cause finding for one analysis cycle.
#[derive(Debug, Clone, Serialize)]
pub struct Diagnosis {
    pub root_cause: String,
    pub severity: DiagnosisSeverity,
    pub impact: String,
    /// Which tier of the fallback ladder produced this.
    pub provenance: AnalysisTier,
}

/// Ranked remediation output of the solution synthesizer.
///
/// The three sequences are deduplicated (first occurrence wins) and capped
/// so the alert payload stays bounded.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SolutionSet {
    #[serde(default)]
    pub immediate_actions: Vec<String>,
    #[serde(default)]
    pub monitoring_steps: Vec<String>,
    #[serde(default)]
    pub preventive_measures: Vec<String>,
}

pub const MAX_IMMEDIATE_ACTIONS: usize = 5;
pub const MAX_MONITORING_STEPS: usize = 3;
pub const MAX_PREVENTIVE_MEASURES: usize = 3;

impl SolutionSet {
    /// Removes duplicates keeping the first occurrence, then truncates each
    /// list to its configured cap.
    pub fn dedup_and_cap(&mut self) {
        dedup_stable(&mut self.immediate_actions);
        dedup_stable(&mut self.monitoring_steps);
        dedup_stable(&mut self.preventive_measures);
        self.immediate_actions.truncate(MAX_IMMEDIATE_ACTIONS);
        self.monitoring_steps.truncate(MAX_MONITORING_STEPS);
        self.preventive_measures.truncate(MAX_PREVENTIVE_MEASURES);
    }

    pub fn is_empty(&self) -> bool {
        self.immediate_actions.is_empty()
            && self.monitoring_steps.is_empty()
            && self.preventive_measures.is_empty()
    }

    /// Flattens into one recommendation list, immediate actions first.
    pub fn into_recommendations(self) -> Vec<String> {
        let mut out = self.immediate_actions;
        out.extend(self.monitoring_steps);
        out.extend(self.preventive_measures);
        out
    }
}

fn dedup_stable(items: &mut Vec<String>) {
    let mut seen = std::collections::HashSet::new();
    items.retain(|item| seen.insert(item.clone()));
}

/// Outcome of one full analysis cycle, handed to the alert path.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResult {
    pub timestamp: DateTime<Utc>,
    pub hostname: String,
    pub issues: Vec<String>,
    pub recommendations: Vec<String>,
    /// Trust level in `[0, 1]` communicated to downstream consumers.
    pub confidence: f64,
    /// Provenance map: which tier ran, whether fallback was used, and the
    /// diagnosis fields when one exists.
    pub details: HashMap<String, String>,
}

impl AnalysisResult {
    pub fn new(
        hostname: &str,
        issues: Vec<String>,
        recommendations: Vec<String>,
        confidence: f64,
        details: HashMap<String, String>,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            hostname: hostname.to_string(),
            issues,
            recommendations,
            confidence: confidence.clamp(0.0, 1.0),
            details,
        }
    }

    /// Minimal synthetic result substituted when the pipeline collapses
    /// entirely, so the alert path still has something actionable.
    pub fn degraded(hostname: &str) -> Self {
        let mut details = HashMap::new();
        details.insert("degraded".to_string(), "true".to_string());
        Self::new(
            hostname,
            vec!["Analysis pipeline failure".to_string()],
            vec!["Manually inspect system state and logs".to_string()],
            0.3,
            details,
        )
    }
}
