use crate::models::{DiagnosisSeverity, SolutionSet};
use aimon_common::types::Snapshot;
use anyhow::{Context, Result};
use serde::Deserialize;

pub const ANALYSIS_SYSTEM_PROMPT: &str = "You are a Linux systems monitoring expert. \
Analyze the detected issues in depth. Respond with a single JSON object with keys \
root_cause (1-2 sentence root cause), severity (one of low|medium|high) and \
impact (system impact description). No prose outside the JSON.";

pub const DIRECT_SYSTEM_PROMPT: &str =
    "You are a Linux systems monitoring expert. Answer briefly in plain text.";

pub const SOLUTION_SYSTEM_PROMPT: &str = "You are a Linux operations expert. \
Produce a concrete remediation plan from the issue analysis and the knowledge \
base excerpts. Respond with a single JSON object with keys immediate_actions, \
monitoring_steps and preventive_measures, each a list of short imperative \
strings. No prose outside the JSON.";

/// 构建问题分析 prompt
pub fn build_analysis_prompt(snapshot: &Snapshot, issues: &[String]) -> String {
    let mem_ratio = snapshot.mem_used_ratio() * 100.0;
    let gib = 1024.0 * 1024.0 * 1024.0;
    format!(
        "Host: {hostname}\n\
         Detected issues: {issues}\n\
         \n\
         Metrics:\n\
         CPU usage: {cpu:.1}%\n\
         Memory usage: {mem:.1}%\n\
         Load average (1m): {load:.2}\n\
         Memory total: {mem_total:.1} GiB\n\
         Memory used: {mem_used:.1} GiB\n\
         \n\
         Analyze the root cause and impact:",
        hostname = snapshot.hostname,
        issues = issues.join(", "),
        cpu = snapshot.cpu_usage,
        mem = mem_ratio,
        load = snapshot.load_1min,
        mem_total = snapshot.memory.total as f64 / gib,
        mem_used = snapshot.memory.used as f64 / gib,
    )
}

/// 构建降级直答 prompt（单轮自由文本）
pub fn build_direct_prompt(snapshot: &Snapshot, issues: &[String]) -> String {
    format!(
        "Analyze these system issues: {issues}\n\
         \n\
         Host: {hostname}\n\
         CPU: {cpu:.1}%\n\
         Memory: {mem:.1}%\n\
         Load: {load:.2}\n\
         \n\
         Briefly state the likely root cause:",
        issues = issues.join(", "),
        hostname = snapshot.hostname,
        cpu = snapshot.cpu_usage,
        mem = snapshot.mem_used_ratio() * 100.0,
        load = snapshot.load_1min,
    )
}

/// 构建解决方案 prompt
pub fn build_solution_prompt(issues: &[String], root_cause: &str, knowledge: &str) -> String {
    let knowledge = if knowledge.is_empty() {
        "(no relevant knowledge base entries)"
    } else {
        knowledge
    };
    format!(
        "Detected issues: {issues}\n\
         Root cause analysis: {root_cause}\n\
         Knowledge base excerpts:\n{knowledge}\n\
         \n\
         Provide the structured remediation plan:",
        issues = issues.join(", "),
    )
}

#[derive(Debug, Deserialize)]
struct RawDiagnosis {
    root_cause: String,
    #[serde(default)]
    severity: String,
    #[serde(default)]
    impact: String,
}

/// Parsed fields of a structured analysis response.
pub struct ParsedDiagnosis {
    pub root_cause: String,
    pub severity: DiagnosisSeverity,
    pub impact: String,
}

/// Parses a structured `{root_cause, severity, impact}` completion.
///
/// Tolerates markdown code fences around the JSON. An unrecognized
/// severity string degrades to `medium` rather than failing the tier,
/// since the surrounding object was still well-formed.
pub fn parse_diagnosis(response: &str) -> Result<ParsedDiagnosis> {
    let raw: RawDiagnosis = serde_json::from_str(strip_code_fences(response))
        .context("Structured analysis response is not valid JSON")?;

    let severity = raw
        .severity
        .parse()
        .unwrap_or(DiagnosisSeverity::Medium);
    let impact = if raw.impact.is_empty() {
        "May affect system performance".to_string()
    } else {
        raw.impact
    };

    Ok(ParsedDiagnosis {
        root_cause: raw.root_cause,
        severity,
        impact,
    })
}

/// Parses a structured solution-plan completion.
pub fn parse_solutions(response: &str) -> Result<SolutionSet> {
    serde_json::from_str(strip_code_fences(response))
        .context("Structured solution response is not valid JSON")
}

fn strip_code_fences(s: &str) -> &str {
    let s = s.trim();
    let Some(inner) = s.strip_prefix("```") else {
        return s;
    };
    // Drop an optional language tag after the opening fence
    let inner = inner
        .split_once('\n')
        .map(|(_, rest)| rest)
        .unwrap_or(inner);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}
