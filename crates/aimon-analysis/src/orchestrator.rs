use crate::config::AnalysisConfig;
use crate::detector::ThresholdDetector;
use crate::error::AnalysisError;
use crate::gating::GatingPolicy;
use crate::models::{AnalysisResult, AnalysisTier, Diagnosis};
use crate::provider::ChatModel;
use crate::synthesizer::SolutionSynthesizer;
use crate::{prompt, rules};
use aimon_common::types::Snapshot;
use aimon_knowledge::KnowledgeStore;
use anyhow::{Context, Result};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Trust communicated downstream when local detection found nothing to
/// analyze further.
const CONFIDENCE_LOCAL_ONLY: f64 = 0.6;
/// Trust when the structured-chain tier produced the diagnosis.
const CONFIDENCE_CHAIN: f64 = 0.9;
/// Trust after degrading to the direct or rule-based tier.
const CONFIDENCE_DEGRADED: f64 = 0.7;

/// Runs one telemetry sample through the staged analysis ladder.
///
/// Tier order is fixed: structured chain, then direct completion, then the
/// rule-based terminal tier. Each model-backed tier runs under a hard
/// deadline; a timeout or error logs, records the fallback, and advances
/// the ladder. Tier failures never escape [`analyze`](Self::analyze); only
/// a malformed snapshot does.
pub struct AnalysisOrchestrator {
    detector: ThresholdDetector,
    gating: GatingPolicy,
    synthesizer: SolutionSynthesizer,
    model: Option<Arc<dyn ChatModel>>,
    tier_timeout: Duration,
}

impl AnalysisOrchestrator {
    pub fn new(
        config: AnalysisConfig,
        model: Option<Arc<dyn ChatModel>>,
        knowledge: Arc<dyn KnowledgeStore>,
    ) -> Self {
        let tier_timeout = Duration::from_secs(config.tier_timeout_secs);
        Self {
            detector: ThresholdDetector::new(config.thresholds.clone()),
            gating: GatingPolicy::new(config.complex_keywords.clone()),
            synthesizer: SolutionSynthesizer::new(
                knowledge,
                model.clone(),
                tier_timeout,
                config.snippets_per_issue,
            ),
            model,
            tier_timeout,
        }
    }

    /// Full analysis cycle: local detection, gated deep analysis, solution
    /// synthesis.
    ///
    /// # Errors
    ///
    /// [`AnalysisError::InvalidSnapshot`] for malformed telemetry. All tier
    /// failures are absorbed by the fallback ladder.
    pub async fn analyze(&self, snapshot: &Snapshot) -> Result<AnalysisResult, AnalysisError> {
        let issues = self.detector.detect(snapshot)?;

        if issues.is_empty() {
            tracing::debug!(hostname = %snapshot.hostname, "No issues detected, skipping deep analysis");
            let mut details = HashMap::new();
            details.insert("tier".to_string(), "none".to_string());
            details.insert("fallback_used".to_string(), "false".to_string());
            return Ok(AnalysisResult::new(
                &snapshot.hostname,
                issues,
                Vec::new(),
                CONFIDENCE_LOCAL_ONLY,
                details,
            ));
        }

        tracing::info!(
            hostname = %snapshot.hostname,
            issues = ?issues,
            "Issues detected"
        );

        let (diagnosis, fallback_used) = if self.gating.warrants_deep_analysis(&issues) {
            self.diagnose(snapshot, &issues).await
        } else {
            tracing::debug!("Simple issues only, using rule-based analysis");
            (rules::rule_based_diagnosis(&issues), false)
        };

        let confidence = match diagnosis.provenance {
            AnalysisTier::Chain => CONFIDENCE_CHAIN,
            AnalysisTier::Direct | AnalysisTier::RuleBased => CONFIDENCE_DEGRADED,
        };

        let solutions = self.synthesizer.synthesize(&issues, &diagnosis).await;
        let recommendations = solutions.into_recommendations();

        let mut details = HashMap::new();
        details.insert("tier".to_string(), diagnosis.provenance.as_str().to_string());
        details.insert("fallback_used".to_string(), fallback_used.to_string());
        details.insert("root_cause".to_string(), diagnosis.root_cause.clone());
        details.insert("severity".to_string(), diagnosis.severity.as_str().to_string());
        details.insert("impact".to_string(), diagnosis.impact.clone());
        if let Some(model) = &self.model {
            details.insert(
                "model".to_string(),
                format!("{}:{}", model.provider(), model.model_name()),
            );
        }

        Ok(AnalysisResult::new(
            &snapshot.hostname,
            issues,
            recommendations,
            confidence,
            details,
        ))
    }

    /// Walks the model-backed tiers top-down, bottoming out on the
    /// rule-based tier. Returns the diagnosis plus whether a fallback was
    /// taken.
    async fn diagnose(&self, snapshot: &Snapshot, issues: &[String]) -> (Diagnosis, bool) {
        let Some(model) = &self.model else {
            tracing::debug!("No chat model configured, using rule-based analysis");
            return (rules::rule_based_diagnosis(issues), true);
        };

        match self.chain_tier(model.as_ref(), snapshot, issues).await {
            Ok(diagnosis) => {
                tracing::info!(root_cause = %diagnosis.root_cause, "Structured-chain analysis complete");
                return (diagnosis, false);
            }
            Err(e) => tracing::warn!(error = %e, "Structured-chain tier failed, degrading"),
        }

        match self.direct_tier(model.as_ref(), snapshot, issues).await {
            Ok(diagnosis) => return (diagnosis, true),
            Err(e) => tracing::warn!(error = %e, "Direct-completion tier failed, degrading"),
        }

        (rules::rule_based_diagnosis(issues), true)
    }

    async fn chain_tier(
        &self,
        model: &dyn ChatModel,
        snapshot: &Snapshot,
        issues: &[String],
    ) -> Result<Diagnosis> {
        let user = prompt::build_analysis_prompt(snapshot, issues);
        let response = tokio::time::timeout(
            self.tier_timeout,
            model.chat(prompt::ANALYSIS_SYSTEM_PROMPT, &user),
        )
        .await
        .context("Structured-chain tier timed out")??;

        let parsed = prompt::parse_diagnosis(&response)?;
        Ok(Diagnosis {
            root_cause: parsed.root_cause,
            severity: parsed.severity,
            impact: parsed.impact,
            provenance: AnalysisTier::Chain,
        })
    }

    async fn direct_tier(
        &self,
        model: &dyn ChatModel,
        snapshot: &Snapshot,
        issues: &[String],
    ) -> Result<Diagnosis> {
        let user = prompt::build_direct_prompt(snapshot, issues);
        let response = tokio::time::timeout(
            self.tier_timeout,
            model.chat(prompt::DIRECT_SYSTEM_PROMPT, &user),
        )
        .await
        .context("Direct-completion tier timed out")??;

        let root_cause = response.trim().to_string();
        if root_cause.is_empty() {
            anyhow::bail!("Direct-completion tier returned an empty response");
        }
        Ok(Diagnosis {
            root_cause,
            severity: crate::models::DiagnosisSeverity::Medium,
            impact: "May affect system performance".to_string(),
            provenance: AnalysisTier::Direct,
        })
    }
}
