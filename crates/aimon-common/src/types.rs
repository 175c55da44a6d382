use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Per-core CPU usage breakdown from one sample.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreStats {
    /// Core name (e.g., `"cpu0"`)
    pub name: String,
    pub usage_percent: f64,
    pub user_percent: f64,
    pub system_percent: f64,
    pub idle_percent: f64,
    pub iowait_percent: f64,
}

/// 内存统计（字节）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryStats {
    pub total: u64,
    pub used: u64,
    pub available: u64,
}

impl MemoryStats {
    /// Used-to-total ratio in `[0, 1]`; `0.0` when total is unknown.
    pub fn used_ratio(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.used as f64 / self.total as f64
        }
    }
}

/// 网络接口速率统计（KB/s）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterfaceStats {
    pub name: String,
    pub rx_rate_kb: f64,
    pub tx_rate_kb: f64,
    pub rx_packets_rate: f64,
    pub tx_packets_rate: f64,
}

/// One point-in-time telemetry sample from a host.
///
/// Immutable once produced; the pipeline borrows it for the duration of a
/// single analysis cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub hostname: String,
    pub timestamp: DateTime<Utc>,
    pub load_1min: f64,
    pub load_5min: f64,
    pub load_15min: f64,
    /// Overall CPU usage percent across all cores.
    pub cpu_usage: f64,
    pub cores: Vec<CoreStats>,
    pub memory: MemoryStats,
    pub interfaces: Vec<InterfaceStats>,
}

impl Snapshot {
    pub fn mem_used_ratio(&self) -> f64 {
        self.memory.used_ratio()
    }

    /// Checks the sample for structurally impossible values.
    ///
    /// Rejects empty hostnames, negative loads, CPU percentages outside
    /// `[0, 100]`, and memory accounting where `used > total`.
    pub fn validate(&self) -> Result<(), String> {
        if self.hostname.trim().is_empty() {
            return Err("empty hostname".to_string());
        }
        if self.load_1min < 0.0 || self.load_5min < 0.0 || self.load_15min < 0.0 {
            return Err(format!(
                "negative load average: {}/{}/{}",
                self.load_1min, self.load_5min, self.load_15min
            ));
        }
        if !(0.0..=100.0).contains(&self.cpu_usage) {
            return Err(format!("cpu_usage out of range: {}", self.cpu_usage));
        }
        if self.memory.used > self.memory.total {
            return Err(format!(
                "memory used ({}) exceeds total ({})",
                self.memory.used, self.memory.total
            ));
        }
        Ok(())
    }
}

/// Alert severity level, ordered from lowest to highest.
///
/// # Examples
///
/// ```
/// use aimon_common::types::AlertLevel;
///
/// let level: AlertLevel = "critical".parse().unwrap();
/// assert_eq!(level, AlertLevel::Critical);
/// assert_eq!(level.to_string(), "critical");
/// assert!(AlertLevel::Emergency > AlertLevel::Warning);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    Info,
    Warning,
    Critical,
    Emergency,
}

impl std::fmt::Display for AlertLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlertLevel::Info => write!(f, "info"),
            AlertLevel::Warning => write!(f, "warning"),
            AlertLevel::Critical => write!(f, "critical"),
            AlertLevel::Emergency => write!(f, "emergency"),
        }
    }
}

impl std::str::FromStr for AlertLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "info" => Ok(AlertLevel::Info),
            "warning" => Ok(AlertLevel::Warning),
            "critical" => Ok(AlertLevel::Critical),
            "emergency" => Ok(AlertLevel::Emergency),
            _ => Err(format!("unknown alert level: {s}")),
        }
    }
}

/// Metric classification an alert is filed under.
///
/// Suppression rules and alert identity key on `(hostname, metric_type)`,
/// so the set is deliberately coarse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricType {
    CpuUsage,
    CpuLoad,
    MemoryUsage,
    DiskIo,
    NetworkTraffic,
}

impl MetricType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricType::CpuUsage => "cpu_usage",
            MetricType::CpuLoad => "cpu_load",
            MetricType::MemoryUsage => "memory_usage",
            MetricType::DiskIo => "disk_io",
            MetricType::NetworkTraffic => "network_traffic",
        }
    }
}

impl std::fmt::Display for MetricType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A detected anomaly turned into an operator-facing alert.
///
/// Created by the alert factory; only the lifecycle manager mutates one
/// afterward (value/timestamp refresh on merge, level escalation,
/// resolution).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub level: AlertLevel,
    pub metric_type: MetricType,
    pub title: String,
    pub description: String,
    pub current_value: f64,
    pub threshold_value: f64,
    pub hostname: String,
    /// 建议处理动作（通知时最多展示 3 条）
    pub suggested_actions: Vec<String>,
    /// Free-form provenance carried from the producing analysis
    /// (tier, confidence, fallback flag).
    pub context: HashMap<String, String>,
    pub resolved: bool,
    pub resolved_at: Option<DateTime<Utc>>,
}

impl Alert {
    /// Identity key used for dedup and suppression.
    pub fn identity(&self) -> (String, MetricType) {
        (self.hostname.clone(), self.metric_type)
    }
}

/// Aggregate counts over the manager's history and active set.
#[derive(Debug, Clone, Serialize)]
pub struct AlertStatistics {
    pub total_alerts: usize,
    pub active_alerts: usize,
    pub resolved_alerts: usize,
    pub level_distribution: HashMap<AlertLevel, usize>,
    pub hostname_distribution: HashMap<String, usize>,
}
