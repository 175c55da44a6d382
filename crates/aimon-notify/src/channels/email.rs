use crate::{NotificationChannel, MAX_SURFACED_ACTIONS};
use aimon_common::types::Alert;
use anyhow::Result;
use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

pub struct EmailChannel {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: String,
    recipients: Vec<String>,
}

impl EmailChannel {
    pub fn new(
        smtp_host: &str,
        smtp_port: u16,
        username: Option<&str>,
        password: Option<&str>,
        from: &str,
        recipients: Vec<String>,
    ) -> Result<Self> {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::relay(smtp_host)?.port(smtp_port);

        if let (Some(user), Some(pass)) = (username, password) {
            builder = builder.credentials(Credentials::new(user.to_string(), pass.to_string()));
        }

        Ok(Self {
            transport: builder.build(),
            from: from.to_string(),
            recipients,
        })
    }

    fn format_body(alert: &Alert) -> String {
        let mut body = format!(
            "Alert: {level}\nHost: {host}\nMetric: {metric}\nValue: {value:.2}\nThreshold: {threshold:.2}\nDescription: {description}\nTime: {time}",
            level = alert.level,
            host = alert.hostname,
            metric = alert.metric_type,
            value = alert.current_value,
            threshold = alert.threshold_value,
            description = alert.description,
            time = alert.timestamp,
        );
        if !alert.suggested_actions.is_empty() {
            body.push_str("\n\nSuggested actions:");
            for action in alert.suggested_actions.iter().take(MAX_SURFACED_ACTIONS) {
                body.push_str(&format!("\n- {action}"));
            }
        }
        body
    }
}

#[async_trait]
impl NotificationChannel for EmailChannel {
    async fn send(&self, alert: &Alert) -> Result<()> {
        let subject = format!("[aimon][{}] {}", alert.level, alert.title);
        let body = Self::format_body(alert);

        for recipient in &self.recipients {
            let email = Message::builder()
                .from(self.from.parse()?)
                .to(recipient.parse()?)
                .subject(&subject)
                .header(ContentType::TEXT_PLAIN)
                .body(body.clone())?;

            let mut last_err = None;
            for attempt in 0..3 {
                match self.transport.send(email.clone()).await {
                    Ok(_) => {
                        last_err = None;
                        break;
                    }
                    Err(e) => {
                        tracing::warn!(
                            attempt = attempt + 1,
                            recipient = %recipient,
                            error = %e,
                            "Email send failed, retrying"
                        );
                        last_err = Some(e);
                        if attempt < 2 {
                            tokio::time::sleep(std::time::Duration::from_millis(
                                100 * 2u64.pow(attempt),
                            ))
                            .await;
                        }
                    }
                }
            }

            if let Some(e) = last_err {
                anyhow::bail!("email to {recipient} failed after 3 attempts: {e}");
            }
        }

        Ok(())
    }

    fn channel_name(&self) -> &str {
        "email"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aimon_common::types::{AlertLevel, MetricType};
    use chrono::Utc;
    use std::collections::HashMap;

    #[test]
    fn body_includes_capped_actions() {
        let alert = Alert {
            id: "1".into(),
            timestamp: Utc::now(),
            level: AlertLevel::Critical,
            metric_type: MetricType::MemoryUsage,
            title: "db-01: Memory critically low".into(),
            description: "Detected on db-01: Memory critically low".into(),
            current_value: 96.5,
            threshold_value: 85.0,
            hostname: "db-01".into(),
            suggested_actions: (0..5).map(|i| format!("step {i}")).collect(),
            context: HashMap::new(),
            resolved: false,
            resolved_at: None,
        };
        let body = EmailChannel::format_body(&alert);
        assert!(body.contains("memory_usage"));
        assert!(body.contains("step 2"));
        assert!(!body.contains("step 3"));
    }
}
