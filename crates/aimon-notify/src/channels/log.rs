use crate::NotificationChannel;
use aimon_common::types::{Alert, AlertLevel};
use anyhow::Result;
use async_trait::async_trait;

/// Emits one structured tracing event per alert so the alert stream lands
/// in whatever log pipeline the process is wired to.
#[derive(Default)]
pub struct LogChannel;

impl LogChannel {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl NotificationChannel for LogChannel {
    async fn send(&self, alert: &Alert) -> Result<()> {
        match alert.level {
            AlertLevel::Emergency | AlertLevel::Critical => tracing::error!(
                hostname = %alert.hostname,
                metric = %alert.metric_type,
                level = %alert.level,
                value = alert.current_value,
                threshold = alert.threshold_value,
                "{}",
                alert.title
            ),
            AlertLevel::Warning => tracing::warn!(
                hostname = %alert.hostname,
                metric = %alert.metric_type,
                value = alert.current_value,
                threshold = alert.threshold_value,
                "{}",
                alert.title
            ),
            AlertLevel::Info => tracing::info!(
                hostname = %alert.hostname,
                metric = %alert.metric_type,
                value = alert.current_value,
                threshold = alert.threshold_value,
                "{}",
                alert.title
            ),
        }
        Ok(())
    }

    fn channel_name(&self) -> &str {
        "log"
    }
}
