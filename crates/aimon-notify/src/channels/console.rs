use crate::{NotificationChannel, MAX_SURFACED_ACTIONS};
use aimon_common::types::{Alert, AlertLevel};
use anyhow::Result;
use async_trait::async_trait;

const RESET: &str = "\x1b[0m";

fn level_color(level: AlertLevel) -> &'static str {
    match level {
        AlertLevel::Info => "\x1b[36m",      // cyan
        AlertLevel::Warning => "\x1b[33m",   // yellow
        AlertLevel::Critical => "\x1b[31m",  // red
        AlertLevel::Emergency => "\x1b[91m", // bright red
    }
}

/// Human-facing terminal output, colored by level.
#[derive(Default)]
pub struct ConsoleChannel;

impl ConsoleChannel {
    pub fn new() -> Self {
        Self
    }

    fn render(alert: &Alert) -> String {
        let color = level_color(alert.level);
        let mut out = format!(
            "\n{color}[{level}]{RESET} {title}\n\
             Time: {time}\n\
             Host: {host}\n\
             Current value: {value:.2} (threshold: {threshold:.2})\n",
            level = alert.level.to_string().to_uppercase(),
            title = alert.title,
            time = alert.timestamp.format("%Y-%m-%d %H:%M:%S"),
            host = alert.hostname,
            value = alert.current_value,
            threshold = alert.threshold_value,
        );

        if !alert.suggested_actions.is_empty() {
            out.push_str("Suggested actions:\n");
            for (i, action) in alert
                .suggested_actions
                .iter()
                .take(MAX_SURFACED_ACTIONS)
                .enumerate()
            {
                out.push_str(&format!("  {}. {}\n", i + 1, action));
            }
        }
        out
    }
}

#[async_trait]
impl NotificationChannel for ConsoleChannel {
    async fn send(&self, alert: &Alert) -> Result<()> {
        println!("{}", Self::render(alert));
        Ok(())
    }

    fn channel_name(&self) -> &str {
        "console"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::collections::HashMap;

    fn alert(level: AlertLevel) -> Alert {
        Alert {
            id: "1".into(),
            timestamp: Utc::now(),
            level,
            metric_type: aimon_common::types::MetricType::CpuUsage,
            title: "web-01: CPU severely overloaded".into(),
            description: "Detected on web-01: CPU severely overloaded".into(),
            current_value: 97.0,
            threshold_value: 80.0,
            hostname: "web-01".into(),
            suggested_actions: (0..5).map(|i| format!("action {i}")).collect(),
            context: HashMap::new(),
            resolved: false,
            resolved_at: None,
        }
    }

    #[test]
    fn render_caps_actions_at_three() {
        let rendered = ConsoleChannel::render(&alert(AlertLevel::Critical));
        assert!(rendered.contains("action 0"));
        assert!(rendered.contains("action 2"));
        assert!(!rendered.contains("action 3"));
    }

    #[test]
    fn render_colors_by_level() {
        let rendered = ConsoleChannel::render(&alert(AlertLevel::Critical));
        assert!(rendered.contains("\x1b[31m[CRITICAL]\x1b[0m"));
        let rendered = ConsoleChannel::render(&alert(AlertLevel::Info));
        assert!(rendered.contains("\x1b[36m[INFO]\x1b[0m"));
    }

    #[test]
    fn render_includes_values() {
        let rendered = ConsoleChannel::render(&alert(AlertLevel::Warning));
        assert!(rendered.contains("97.00"));
        assert!(rendered.contains("80.00"));
        assert!(rendered.contains("web-01"));
    }
}
