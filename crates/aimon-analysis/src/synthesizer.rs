use crate::models::{AnalysisTier, Diagnosis, SolutionSet};
use crate::prompt;
use crate::provider::ChatModel;
use aimon_knowledge::KnowledgeStore;
use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;

struct CategoryTemplate {
    patterns: &'static [&'static str],
    immediate: &'static str,
    monitoring: &'static str,
    preventive: &'static str,
}

/// Ordered category templates; the first pattern group matching an issue
/// label wins, so the compound I/O signature must outrank the plain CPU
/// and load categories.
const CATEGORY_TEMPLATES: &[CategoryTemplate] = &[
    CategoryTemplate {
        patterns: &["i/o", "iowait"],
        immediate: "Check disk I/O with iostat -x and identify waiting processes with iotop",
        monitoring: "Watch I/O wait time and device throughput",
        preventive: "Optimize the I/O access pattern or upgrade storage",
    },
    CategoryTemplate {
        patterns: &["cpu"],
        immediate: "Use top to identify processes with high CPU usage",
        monitoring: "Watch the CPU usage trend",
        preventive: "Optimize hot processes or add CPU capacity",
    },
    CategoryTemplate {
        patterns: &["memory"],
        immediate: "Check memory details with free -h",
        monitoring: "Watch the memory usage pattern",
        preventive: "Hunt for memory leaks or add memory capacity",
    },
    CategoryTemplate {
        patterns: &["load"],
        immediate: "Check the run queue and current load sources",
        monitoring: "Keep watching the 1/5/15-minute load averages",
        preventive: "Identify the load source and optimize it",
    },
];

const GENERIC_RECOMMENDATION: &str = "Run a basic system health check";

/// Combines the diagnosis with knowledge-store lookups into the ranked
/// remediation lists.
///
/// Prefers the model's native structured plan when the structured-chain
/// tier produced the diagnosis; otherwise (or on any model failure) derives
/// recommendations from the category templates, raw snippets, and finally a
/// single generic fallback.
pub struct SolutionSynthesizer {
    knowledge: Arc<dyn KnowledgeStore>,
    model: Option<Arc<dyn ChatModel>>,
    tier_timeout: Duration,
    snippets_per_issue: usize,
}

impl SolutionSynthesizer {
    pub fn new(
        knowledge: Arc<dyn KnowledgeStore>,
        model: Option<Arc<dyn ChatModel>>,
        tier_timeout: Duration,
        snippets_per_issue: usize,
    ) -> Self {
        Self {
            knowledge,
            model,
            tier_timeout,
            snippets_per_issue,
        }
    }

    pub async fn synthesize(&self, issues: &[String], diagnosis: &Diagnosis) -> SolutionSet {
        let snippets: Vec<String> = issues
            .iter()
            .flat_map(|issue| self.knowledge.search(issue, self.snippets_per_issue))
            .map(|hit| hit.content)
            .collect();

        if diagnosis.provenance == AnalysisTier::Chain {
            if let Some(model) = &self.model {
                match self
                    .chain_solutions(model.as_ref(), issues, diagnosis, &snippets)
                    .await
                {
                    Ok(mut set) if !set.is_empty() => {
                        set.dedup_and_cap();
                        return set;
                    }
                    Ok(_) => {
                        tracing::warn!("Structured solution response was empty, using templates")
                    }
                    Err(e) => tracing::warn!(
                        error = %e,
                        "Structured solution generation failed, using templates"
                    ),
                }
            }
        }

        self.template_solutions(issues, &snippets)
    }

    async fn chain_solutions(
        &self,
        model: &dyn ChatModel,
        issues: &[String],
        diagnosis: &Diagnosis,
        snippets: &[String],
    ) -> Result<SolutionSet> {
        let knowledge = snippets.join("\n");
        let user = prompt::build_solution_prompt(issues, &diagnosis.root_cause, &knowledge);
        let response =
            tokio::time::timeout(self.tier_timeout, model.chat(prompt::SOLUTION_SYSTEM_PROMPT, &user))
                .await
                .context("Structured solution tier timed out")??;
        prompt::parse_solutions(&response)
    }

    fn template_solutions(&self, issues: &[String], snippets: &[String]) -> SolutionSet {
        let mut set = SolutionSet::default();

        for issue in issues {
            let lowered = issue.to_lowercase();
            let template = CATEGORY_TEMPLATES
                .iter()
                .find(|t| t.patterns.iter().any(|p| lowered.contains(p)));
            if let Some(t) = template {
                set.immediate_actions.push(t.immediate.to_string());
                set.monitoring_steps.push(t.monitoring.to_string());
                set.preventive_measures.push(t.preventive.to_string());
            }
        }

        // Raw snippets rank below template actions but above nothing
        for snippet in snippets.iter().take(2) {
            set.immediate_actions.push(snippet.clone());
        }

        set.dedup_and_cap();

        if set.is_empty() {
            set.immediate_actions.push(GENERIC_RECOMMENDATION.to_string());
        }
        set
    }
}
