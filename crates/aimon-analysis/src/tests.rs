use crate::config::AnalysisConfig;
use crate::models::{AnalysisTier, DiagnosisSeverity};
use crate::orchestrator::AnalysisOrchestrator;
use crate::provider::ChatModel;
use crate::rules::rule_based_diagnosis;
use crate::synthesizer::SolutionSynthesizer;
use crate::{prompt, AnalysisError};
use aimon_common::types::{MemoryStats, Snapshot};
use aimon_knowledge::memory::MemoryKnowledgeStore;
use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

fn make_snapshot(cpu: f64, mem_ratio: f64, load: f64) -> Snapshot {
    let total: u64 = 16 << 30;
    Snapshot {
        hostname: "web-01".into(),
        timestamp: Utc::now(),
        load_1min: load,
        load_5min: load,
        load_15min: load,
        cpu_usage: cpu,
        cores: Vec::new(),
        memory: MemoryStats {
            total,
            used: (total as f64 * mem_ratio) as u64,
            available: (total as f64 * (1.0 - mem_ratio)) as u64,
        },
        interfaces: Vec::new(),
    }
}

/// Answers each prompt kind with a canned response; counts calls.
struct ScriptedModel {
    analysis_response: String,
    solution_response: String,
    direct_response: String,
    calls: AtomicUsize,
}

impl ScriptedModel {
    fn new(analysis: &str, solution: &str, direct: &str) -> Self {
        Self {
            analysis_response: analysis.to_string(),
            solution_response: solution.to_string(),
            direct_response: direct.to_string(),
            calls: AtomicUsize::new(0),
        }
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChatModel for ScriptedModel {
    fn provider(&self) -> &str {
        "scripted"
    }

    fn model_name(&self) -> &str {
        "scripted-1"
    }

    async fn chat(&self, system: &str, _user: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let response = if system == prompt::ANALYSIS_SYSTEM_PROMPT {
            &self.analysis_response
        } else if system == prompt::SOLUTION_SYSTEM_PROMPT {
            &self.solution_response
        } else {
            &self.direct_response
        };
        if response.is_empty() {
            anyhow::bail!("scripted failure");
        }
        Ok(response.clone())
    }
}

/// Never answers within any deadline.
struct HangingModel;

#[async_trait]
impl ChatModel for HangingModel {
    fn provider(&self) -> &str {
        "hanging"
    }

    fn model_name(&self) -> &str {
        "hanging-1"
    }

    async fn chat(&self, _system: &str, _user: &str) -> Result<String> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(String::new())
    }
}

fn orchestrator(model: Option<Arc<dyn ChatModel>>) -> AnalysisOrchestrator {
    AnalysisOrchestrator::new(
        AnalysisConfig::default(),
        model,
        Arc::new(MemoryKnowledgeStore::with_defaults()),
    )
}

const CHAIN_JSON: &str =
    r#"{"root_cause": "Runaway batch job saturating all cores", "severity": "high", "impact": "Request latency degraded"}"#;
const SOLUTION_JSON: &str = r#"{
    "immediate_actions": ["Kill the runaway batch job", "Renice remaining workers"],
    "monitoring_steps": ["Watch per-core usage for 15 minutes"],
    "preventive_measures": ["Move batch jobs to off-peak hours"]
}"#;

#[tokio::test]
async fn healthy_snapshot_yields_local_only_result() {
    let orch = orchestrator(None);
    let result = orch.analyze(&make_snapshot(30.0, 0.4, 1.0)).await.unwrap();
    assert!(result.issues.is_empty());
    assert!(result.recommendations.is_empty());
    assert_eq!(result.confidence, 0.6);
    assert_eq!(result.details.get("tier").unwrap(), "none");
}

#[tokio::test]
async fn chain_tier_success() {
    let model = Arc::new(ScriptedModel::new(CHAIN_JSON, SOLUTION_JSON, "direct"));
    let orch = orchestrator(Some(model.clone()));

    let result = orch.analyze(&make_snapshot(97.0, 0.6, 2.0)).await.unwrap();

    assert_eq!(result.issues, vec!["CPU severely overloaded"]);
    assert_eq!(result.confidence, 0.9);
    assert_eq!(result.details.get("tier").unwrap(), "chain");
    assert_eq!(result.details.get("fallback_used").unwrap(), "false");
    assert_eq!(
        result.details.get("root_cause").unwrap(),
        "Runaway batch job saturating all cores"
    );
    assert!(result
        .recommendations
        .contains(&"Kill the runaway batch job".to_string()));
    // One analysis call plus one solution call
    assert_eq!(model.call_count(), 2);
}

#[tokio::test]
async fn chain_parse_failure_degrades_to_direct() {
    let model = Arc::new(ScriptedModel::new(
        "the disk is probably full", // not JSON: chain tier parse fails
        SOLUTION_JSON,
        "Likely cause: leaking application heap",
    ));
    let orch = orchestrator(Some(model));

    let result = orch.analyze(&make_snapshot(40.0, 0.97, 1.0)).await.unwrap();

    assert_eq!(result.details.get("tier").unwrap(), "direct");
    assert_eq!(result.details.get("fallback_used").unwrap(), "true");
    assert_eq!(result.confidence, 0.7);
    assert_eq!(
        result.details.get("root_cause").unwrap(),
        "Likely cause: leaking application heap"
    );
}

#[tokio::test]
async fn all_model_tiers_failing_bottoms_out_rule_based() {
    // Empty scripted responses make every model call fail
    let model = Arc::new(ScriptedModel::new("", "", ""));
    let orch = orchestrator(Some(model));

    let result = orch.analyze(&make_snapshot(97.0, 0.6, 2.0)).await.unwrap();

    assert_eq!(result.details.get("tier").unwrap(), "rule-based");
    assert_eq!(result.details.get("fallback_used").unwrap(), "true");
    assert_eq!(result.confidence, 0.7);
    assert_eq!(result.details.get("severity").unwrap(), "high");
    assert!(!result.recommendations.is_empty());
}

#[tokio::test(start_paused = true)]
async fn tier_timeout_degrades() {
    let orch = orchestrator(Some(Arc::new(HangingModel)));

    let result = orch.analyze(&make_snapshot(97.0, 0.6, 2.0)).await.unwrap();

    assert_eq!(result.details.get("tier").unwrap(), "rule-based");
    assert_eq!(result.details.get("fallback_used").unwrap(), "true");
}

#[tokio::test]
async fn no_model_configured_skips_http_tiers() {
    let orch = orchestrator(None);

    let result = orch.analyze(&make_snapshot(97.0, 0.6, 2.0)).await.unwrap();

    assert_eq!(result.details.get("tier").unwrap(), "rule-based");
    assert_eq!(result.confidence, 0.7);
    assert!(!result.details.contains_key("model"));
}

#[tokio::test]
async fn simple_issues_are_gated_away_from_model() {
    let model = Arc::new(ScriptedModel::new(CHAIN_JSON, SOLUTION_JSON, "direct"));
    let orch = orchestrator(Some(model.clone()));

    // Elevated but not severe: gating keeps the model out
    let result = orch.analyze(&make_snapshot(85.0, 0.6, 2.0)).await.unwrap();

    assert_eq!(result.issues, vec!["CPU usage elevated"]);
    assert_eq!(result.details.get("tier").unwrap(), "rule-based");
    assert_eq!(result.details.get("fallback_used").unwrap(), "false");
    assert_eq!(model.call_count(), 0);
}

#[tokio::test]
async fn invalid_snapshot_is_the_only_escaping_error() {
    let orch = orchestrator(None);
    let mut snap = make_snapshot(30.0, 0.4, 1.0);
    snap.cpu_usage = -5.0;

    let err = orch.analyze(&snap).await.unwrap_err();
    assert!(matches!(err, AnalysisError::InvalidSnapshot(_)));
}

#[tokio::test]
async fn synthesizer_template_path_covers_io_bottleneck() {
    let synth = SolutionSynthesizer::new(
        Arc::new(MemoryKnowledgeStore::new()),
        None,
        Duration::from_secs(30),
        2,
    );
    let issues = vec!["High load with low CPU, likely I/O bottleneck".to_string()];
    let set = synth.synthesize(&issues, &rule_based_diagnosis(&issues)).await;

    assert!(set.immediate_actions[0].contains("iostat"));
    assert_eq!(set.monitoring_steps.len(), 1);
    assert_eq!(set.preventive_measures.len(), 1);
}

#[tokio::test]
async fn synthesizer_falls_back_to_generic_recommendation() {
    let synth = SolutionSynthesizer::new(
        Arc::new(MemoryKnowledgeStore::new()),
        None,
        Duration::from_secs(30),
        2,
    );
    let issues = vec!["Unclassified anomaly".to_string()];
    let set = synth.synthesize(&issues, &rule_based_diagnosis(&issues)).await;

    assert_eq!(set.immediate_actions, vec!["Run a basic system health check"]);
    assert!(set.monitoring_steps.is_empty());
}

#[tokio::test]
async fn synthesizer_appends_knowledge_snippets() {
    let synth = SolutionSynthesizer::new(
        Arc::new(MemoryKnowledgeStore::with_defaults()),
        None,
        Duration::from_secs(30),
        2,
    );
    let issues = vec!["Memory critically low".to_string()];
    let set = synth.synthesize(&issues, &rule_based_diagnosis(&issues)).await;

    assert_eq!(set.immediate_actions.len(), 2);
    assert_eq!(set.immediate_actions[0], "Check memory details with free -h");
    assert!(set.immediate_actions[1].contains("free -h") || set.immediate_actions[1].contains("memory"));
}

#[test]
fn rule_based_diagnosis_matches_spec_severities() {
    let high = rule_based_diagnosis(&["Memory critically low".into()]);
    assert_eq!(high.severity, DiagnosisSeverity::High);
    assert_eq!(high.provenance, AnalysisTier::RuleBased);
}
