use crate::{NotificationChannel, MAX_SURFACED_ACTIONS};
use aimon_common::types::Alert;
use anyhow::Result;
use async_trait::async_trait;

pub struct WebhookChannel {
    client: reqwest::Client,
    url: String,
}

impl WebhookChannel {
    pub fn new(url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.to_string(),
        }
    }

    fn render_body(alert: &Alert) -> String {
        let actions: Vec<&String> = alert
            .suggested_actions
            .iter()
            .take(MAX_SURFACED_ACTIONS)
            .collect();
        serde_json::json!({
            "alert_id": alert.id,
            "level": alert.level.to_string(),
            "metric_type": alert.metric_type.to_string(),
            "title": alert.title,
            "description": alert.description,
            "hostname": alert.hostname,
            "current_value": alert.current_value,
            "threshold_value": alert.threshold_value,
            "suggested_actions": actions,
            "context": alert.context,
            "timestamp": alert.timestamp.to_rfc3339(),
            "resolved": alert.resolved,
        })
        .to_string()
    }
}

#[async_trait]
impl NotificationChannel for WebhookChannel {
    async fn send(&self, alert: &Alert) -> Result<()> {
        let body = Self::render_body(alert);

        let mut last_err = None;
        for attempt in 0..3u32 {
            match self
                .client
                .post(self.url.as_str())
                .header("Content-Type", "application/json")
                .body(body.clone())
                .send()
                .await
            {
                Ok(resp) if resp.status().is_success() => {
                    last_err = None;
                    break;
                }
                Ok(resp) => {
                    let status = resp.status();
                    tracing::warn!(
                        attempt = attempt + 1,
                        status = %status,
                        "Webhook returned non-success status, retrying"
                    );
                    last_err = Some(anyhow::anyhow!("HTTP {status}"));
                }
                Err(e) => {
                    tracing::warn!(
                        attempt = attempt + 1,
                        error = %e,
                        "Webhook send failed, retrying"
                    );
                    last_err = Some(e.into());
                }
            }
            if attempt < 2 {
                tokio::time::sleep(std::time::Duration::from_millis(100 * 2u64.pow(attempt)))
                    .await;
            }
        }

        if let Some(e) = last_err {
            anyhow::bail!("webhook {} failed after 3 attempts: {e}", self.url);
        }
        Ok(())
    }

    fn channel_name(&self) -> &str {
        "webhook"
    }
}
