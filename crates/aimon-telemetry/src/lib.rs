//! Telemetry ingestion boundary.
//!
//! The pipeline pulls one [`Snapshot`] at a time from a
//! [`TelemetrySource`]; the consumer decides whether to continue. Real
//! transports live behind this trait. The built-in
//! [`sim::SimulatedSource`] feeds synthetic snapshots for demos and tests.
//!
//! [`Snapshot`]: aimon_common::types::Snapshot

pub mod sim;

use aimon_common::types::Snapshot;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A lazy, effectively infinite sequence of telemetry samples.
///
/// `recv` yields the next sample, pacing and transport recovery included;
/// `None` means the source was stopped and the stream is over. Stopping is
/// cooperative: it is observed between items, never mid-item.
#[async_trait]
pub trait TelemetrySource: Send {
    async fn recv(&mut self) -> Option<Snapshot>;
}

/// 采集源配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// 采样间隔（秒）
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    /// 传输错误后的冷却时间（秒）
    #[serde(default = "default_error_cooldown_secs")]
    pub error_cooldown_secs: u64,
    /// Hosts the simulated source cycles through.
    #[serde(default = "default_hostnames")]
    pub hostnames: Vec<String>,
    /// Probability per pull of a simulated transport error.
    #[serde(default)]
    pub failure_rate: f64,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            error_cooldown_secs: default_error_cooldown_secs(),
            hostnames: default_hostnames(),
            failure_rate: 0.0,
        }
    }
}

fn default_interval_secs() -> u64 {
    3
}

fn default_error_cooldown_secs() -> u64 {
    5
}

fn default_hostnames() -> Vec<String> {
    vec!["sim-host-01".to_string()]
}
