use crate::config::{AgentConfig, NotifyConfig};
use aimon_alert::factory::AlertFactory;
use aimon_alert::manager::AlertLifecycleManager;
use aimon_analysis::error::AnalysisError;
use aimon_analysis::models::AnalysisResult;
use aimon_analysis::orchestrator::AnalysisOrchestrator;
use aimon_analysis::provider::ChatModel;
use aimon_analysis::providers::glm::GlmProvider;
use aimon_common::types::{AlertLevel, Snapshot};
use aimon_knowledge::memory::MemoryKnowledgeStore;
use aimon_notify::channels::console::ConsoleChannel;
use aimon_notify::channels::email::EmailChannel;
use aimon_notify::channels::log::LogChannel;
use aimon_notify::channels::webhook::WebhookChannel;
use aimon_notify::manager::NotificationManager;
use aimon_telemetry::TelemetrySource;
use anyhow::Result;
use std::sync::Arc;

/// The wired-up pipeline: one consumer loop from telemetry to alerts.
pub struct App {
    orchestrator: AnalysisOrchestrator,
    factory: AlertFactory,
    pub(crate) manager: AlertLifecycleManager,
}

impl App {
    pub fn build(config: &AgentConfig) -> Result<Self> {
        let model: Option<Arc<dyn ChatModel>> = match &config.llm {
            Some(llm) => {
                let provider = GlmProvider::new(
                    llm.api_key.clone(),
                    llm.model.clone(),
                    llm.base_url.clone(),
                    llm.timeout_secs,
                    llm.max_tokens,
                    llm.temperature,
                )?;
                tracing::info!(
                    provider = provider.provider(),
                    model = provider.model_name(),
                    "Chat model configured"
                );
                Some(Arc::new(provider))
            }
            None => {
                tracing::warn!("No LLM configured; model-backed analysis tiers disabled");
                None
            }
        };

        let knowledge = Arc::new(MemoryKnowledgeStore::with_defaults());
        tracing::info!(documents = knowledge.len(), "Knowledge store seeded");

        let orchestrator = AnalysisOrchestrator::new(config.analysis.clone(), model, knowledge);
        let factory = AlertFactory::new(config.analysis.thresholds.clone());
        let notifier = build_notifier(&config.notify)?;
        let manager = AlertLifecycleManager::new(Arc::new(notifier));

        Ok(Self {
            orchestrator,
            factory,
            manager,
        })
    }

    /// Single-consumer loop: each snapshot is fully analyzed and alerted
    /// before the next is pulled. A failure inside one cycle never ends
    /// the loop.
    pub async fn run(&self, source: &mut dyn TelemetrySource) {
        while let Some(snapshot) = source.recv().await {
            self.cycle(snapshot).await;
        }
        tracing::info!("Telemetry stream closed");
    }

    pub(crate) async fn cycle(&self, snapshot: Snapshot) {
        tracing::debug!(hostname = %snapshot.hostname, "Received snapshot");

        let analysis = match self.orchestrator.analyze(&snapshot).await {
            Ok(analysis) => analysis,
            Err(AnalysisError::InvalidSnapshot(reason)) => {
                tracing::warn!(
                    hostname = %snapshot.hostname,
                    reason = %reason,
                    "Skipping malformed snapshot"
                );
                return;
            }
            Err(e @ AnalysisError::Failed(_)) => {
                tracing::error!(error = %e, "Analysis collapsed, substituting degraded result");
                AnalysisResult::degraded(&snapshot.hostname)
            }
        };

        tracing::info!(
            hostname = %snapshot.hostname,
            cpu_usage = snapshot.cpu_usage,
            memory_ratio = snapshot.mem_used_ratio(),
            load_1min = snapshot.load_1min,
            confidence = analysis.confidence,
            issues = ?analysis.issues,
            "Analysis cycle complete"
        );

        if analysis.issues.is_empty() {
            return;
        }

        for alert in self.factory.build(&snapshot, &analysis) {
            let outcome = self.manager.process(alert).await;
            tracing::debug!(outcome = ?outcome, "Alert processed");
        }
    }
}

fn build_notifier(config: &NotifyConfig) -> Result<NotificationManager> {
    let mut manager = NotificationManager::new();

    if config.console {
        manager.add_channel(Box::new(ConsoleChannel::new()), AlertLevel::Info);
    }
    if config.log {
        manager.add_channel(Box::new(LogChannel::new()), AlertLevel::Info);
    }
    if let Some(email) = &config.email {
        let min_level: AlertLevel = email
            .min_level
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid email min_level: {e}"))?;
        let channel = EmailChannel::new(
            &email.smtp_host,
            email.smtp_port,
            email.username.as_deref(),
            email.password.as_deref(),
            &email.from,
            email.recipients.clone(),
        )?;
        manager.add_channel(Box::new(channel), min_level);
    }
    if let Some(webhook) = &config.webhook {
        let min_level: AlertLevel = webhook
            .min_level
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid webhook min_level: {e}"))?;
        manager.add_channel(Box::new(WebhookChannel::new(&webhook.url)), min_level);
    }

    if manager.channel_count() == 0 {
        tracing::warn!("No notification channels configured; alerts will only be tracked");
    }
    Ok(manager)
}
