use serde::{Deserialize, Serialize};

/// Tiered threshold table driving local issue detection.
///
/// Injected into the detector and the alert factory at construction so
/// tests can exercise arbitrary thresholds without touching process state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Thresholds {
    #[serde(default = "default_cpu_elevated")]
    pub cpu_elevated: f64,
    #[serde(default = "default_cpu_severe")]
    pub cpu_severe: f64,
    /// 内存使用率阈值（0-1 比例）
    #[serde(default = "default_memory_elevated_ratio")]
    pub memory_elevated_ratio: f64,
    #[serde(default = "default_memory_severe_ratio")]
    pub memory_severe_ratio: f64,
    /// 1 分钟负载阈值（按配置核数整体判断）
    #[serde(default = "default_load_elevated")]
    pub load_elevated: f64,
    #[serde(default = "default_load_severe")]
    pub load_severe: f64,
    /// I/O-bound signature: load above this while CPU stays below the ceiling
    #[serde(default = "default_io_bound_load")]
    pub io_bound_load: f64,
    #[serde(default = "default_io_bound_cpu_ceiling")]
    pub io_bound_cpu_ceiling: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            cpu_elevated: default_cpu_elevated(),
            cpu_severe: default_cpu_severe(),
            memory_elevated_ratio: default_memory_elevated_ratio(),
            memory_severe_ratio: default_memory_severe_ratio(),
            load_elevated: default_load_elevated(),
            load_severe: default_load_severe(),
            io_bound_load: default_io_bound_load(),
            io_bound_cpu_ceiling: default_io_bound_cpu_ceiling(),
        }
    }
}

fn default_cpu_elevated() -> f64 {
    80.0
}

fn default_cpu_severe() -> f64 {
    95.0
}

fn default_memory_elevated_ratio() -> f64 {
    0.85
}

fn default_memory_severe_ratio() -> f64 {
    0.95
}

fn default_load_elevated() -> f64 {
    4.0
}

fn default_load_severe() -> f64 {
    8.0
}

fn default_io_bound_load() -> f64 {
    5.0
}

fn default_io_bound_cpu_ceiling() -> f64 {
    50.0
}

/// Configuration for the analysis pipeline itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default)]
    pub thresholds: Thresholds,
    /// Issue keywords that justify the expensive analysis tier.
    #[serde(default = "default_complex_keywords")]
    pub complex_keywords: Vec<String>,
    /// Hard deadline per model-backed tier, in seconds.
    #[serde(default = "default_tier_timeout_secs")]
    pub tier_timeout_secs: u64,
    /// Snippets fetched from the knowledge store per detected issue.
    #[serde(default = "default_snippets_per_issue")]
    pub snippets_per_issue: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            thresholds: Thresholds::default(),
            complex_keywords: default_complex_keywords(),
            tier_timeout_secs: default_tier_timeout_secs(),
            snippets_per_issue: default_snippets_per_issue(),
        }
    }
}

fn default_complex_keywords() -> Vec<String> {
    vec![
        "severely".to_string(),
        "critically".to_string(),
        "bottleneck".to_string(),
    ]
}

fn default_tier_timeout_secs() -> u64 {
    30
}

fn default_snippets_per_issue() -> usize {
    2
}
