//! Alert delivery with pluggable channel support.
//!
//! Alerts are fanned out to one or more [`NotificationChannel`]
//! implementations based on severity routing. Built-in channels cover
//! console output, structured log records, email (SMTP), and webhooks.
//! A failure in one channel is logged and never blocks the others.

pub mod channels;
pub mod manager;
pub mod routing;


use aimon_common::types::Alert;
use anyhow::Result;
use async_trait::async_trait;

/// How many suggested actions a delivery surfaces at most.
pub const MAX_SURFACED_ACTIONS: usize = 3;

/// A delivery channel that pushes one alert to an external sink
/// (terminal, log stream, SMTP relay, HTTP endpoint).
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    /// Delivers the alert through this channel.
    ///
    /// # Errors
    ///
    /// Returns an error if delivery fails after retries (if applicable).
    async fn send(&self, alert: &Alert) -> Result<()>;

    /// Returns the channel type name (e.g., `"email"`, `"console"`).
    fn channel_name(&self) -> &str;
}

/// The alert pipeline's view of delivery: fire-and-forget, failures are
/// the implementation's problem. The lifecycle manager depends on this
/// seam so tests can count invocations.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn deliver(&self, alert: &Alert);
}
