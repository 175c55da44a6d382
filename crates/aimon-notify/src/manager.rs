use crate::routing::ChannelRoute;
use crate::{NotificationChannel, Notifier};
use aimon_common::types::{Alert, AlertLevel};
use async_trait::async_trait;

/// Fans one alert out to every channel whose route accepts its level.
///
/// Delivery is best-effort per channel: an error is logged with the
/// channel name and the remaining channels still run.
#[derive(Default)]
pub struct NotificationManager {
    channels: Vec<Box<dyn NotificationChannel>>,
    routes: Vec<ChannelRoute>,
}

impl NotificationManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a channel, routed at the given minimum level.
    pub fn add_channel(&mut self, channel: Box<dyn NotificationChannel>, min_level: AlertLevel) {
        self.routes.push(ChannelRoute {
            min_level,
            channel_index: self.channels.len(),
        });
        self.channels.push(channel);
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    pub async fn notify(&self, alert: &Alert) {
        for route in &self.routes {
            if !route.should_send(alert.level) {
                continue;
            }

            if let Some(channel) = self.channels.get(route.channel_index) {
                if let Err(e) = channel.send(alert).await {
                    tracing::error!(
                        channel = channel.channel_name(),
                        alert_id = %alert.id,
                        error = %e,
                        "Failed to send notification"
                    );
                }
            }
        }
    }
}

#[async_trait]
impl Notifier for NotificationManager {
    async fn deliver(&self, alert: &Alert) {
        self.notify(alert).await;
    }
}
