use aimon_analysis::config::Thresholds;
use aimon_analysis::models::AnalysisResult;
use aimon_common::types::{Alert, AlertLevel, MetricType, Snapshot};
use std::collections::HashMap;

/// Ordered level rules: the first pattern group found in the issue label
/// decides the level; anything unmatched is informational.
const LEVEL_RULES: &[(&[&str], AlertLevel)] = &[
    (&["severely", "critically"], AlertLevel::Critical),
    (&["elevated", "high"], AlertLevel::Warning),
];

/// Ordered metric rules. The compound I/O label mentions CPU and load too,
/// so "i/o" must come before both.
const METRIC_RULES: &[(&[&str], MetricType)] = &[
    (&["i/o"], MetricType::DiskIo),
    (&["network"], MetricType::NetworkTraffic),
    (&["memory"], MetricType::MemoryUsage),
    (&["load"], MetricType::CpuLoad),
    (&["cpu"], MetricType::CpuUsage),
];

/// Number of recommendations carried onto an alert.
const MAX_ALERT_ACTIONS: usize = 3;

/// Maps issues plus their analysis onto [`Alert`] value objects.
///
/// Side-effect free: one alert per issue, classified through the rule
/// tables above, with current/threshold values taken from the snapshot and
/// the configured threshold table.
pub struct AlertFactory {
    thresholds: Thresholds,
}

impl AlertFactory {
    pub fn new(thresholds: Thresholds) -> Self {
        Self { thresholds }
    }

    pub fn build(&self, snapshot: &Snapshot, analysis: &AnalysisResult) -> Vec<Alert> {
        analysis
            .issues
            .iter()
            .map(|issue| self.build_one(snapshot, analysis, issue))
            .collect()
    }

    fn build_one(&self, snapshot: &Snapshot, analysis: &AnalysisResult, issue: &str) -> Alert {
        let level = classify_level(issue);
        let metric_type = classify_metric(issue);
        let (current_value, threshold_value) = self.values_for(snapshot, metric_type);

        let mut context = HashMap::new();
        context.insert("confidence".to_string(), format!("{:.2}", analysis.confidence));
        for key in ["tier", "fallback_used", "root_cause"] {
            if let Some(value) = analysis.details.get(key) {
                context.insert(key.to_string(), value.clone());
            }
        }

        Alert {
            id: aimon_common::id::next_id(),
            timestamp: snapshot.timestamp,
            level,
            metric_type,
            title: format!("{}: {}", snapshot.hostname, issue),
            description: format!("Detected on {}: {}", snapshot.hostname, issue),
            current_value,
            threshold_value,
            hostname: snapshot.hostname.clone(),
            suggested_actions: analysis
                .recommendations
                .iter()
                .take(MAX_ALERT_ACTIONS)
                .cloned()
                .collect(),
            context,
            resolved: false,
            resolved_at: None,
        }
    }

    fn values_for(&self, snapshot: &Snapshot, metric_type: MetricType) -> (f64, f64) {
        match metric_type {
            MetricType::CpuUsage => (snapshot.cpu_usage, self.thresholds.cpu_elevated),
            MetricType::MemoryUsage => (
                snapshot.mem_used_ratio() * 100.0,
                self.thresholds.memory_elevated_ratio * 100.0,
            ),
            MetricType::CpuLoad => (snapshot.load_1min, self.thresholds.load_elevated),
            MetricType::DiskIo => (snapshot.load_1min, self.thresholds.io_bound_load),
            // The detector emits no network issues yet
            MetricType::NetworkTraffic => (0.0, 0.0),
        }
    }
}

fn classify_level(issue: &str) -> AlertLevel {
    let lowered = issue.to_lowercase();
    LEVEL_RULES
        .iter()
        .find(|(patterns, _)| patterns.iter().any(|p| lowered.contains(p)))
        .map(|(_, level)| *level)
        .unwrap_or(AlertLevel::Info)
}

fn classify_metric(issue: &str) -> MetricType {
    let lowered = issue.to_lowercase();
    METRIC_RULES
        .iter()
        .find(|(patterns, _)| patterns.iter().any(|p| lowered.contains(p)))
        .map(|(_, metric)| *metric)
        .unwrap_or(MetricType::CpuUsage)
}
