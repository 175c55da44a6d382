use crate::factory::AlertFactory;
use crate::manager::{AlertLifecycleManager, ProcessOutcome};
use aimon_analysis::config::{AnalysisConfig, Thresholds};
use aimon_analysis::orchestrator::AnalysisOrchestrator;
use aimon_common::types::{Alert, AlertLevel, MemoryStats, MetricType, Snapshot};
use aimon_knowledge::memory::MemoryKnowledgeStore;
use aimon_notify::Notifier;
use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Records every delivered alert for assertions.
#[derive(Default)]
struct RecordingNotifier {
    delivered: Mutex<Vec<Alert>>,
}

impl RecordingNotifier {
    fn count(&self) -> usize {
        self.delivered.lock().unwrap().len()
    }

    fn last_level(&self) -> Option<AlertLevel> {
        self.delivered.lock().unwrap().last().map(|a| a.level)
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn deliver(&self, alert: &Alert) {
        self.delivered.lock().unwrap().push(alert.clone());
    }
}

fn make_alert(hostname: &str, metric: MetricType, level: AlertLevel, value: f64) -> Alert {
    Alert {
        id: aimon_common::id::next_id(),
        timestamp: Utc::now(),
        level,
        metric_type: metric,
        title: format!("{hostname}: test alert"),
        description: format!("Detected on {hostname}: test alert"),
        current_value: value,
        threshold_value: 80.0,
        hostname: hostname.to_string(),
        suggested_actions: Vec::new(),
        context: HashMap::new(),
        resolved: false,
        resolved_at: None,
    }
}

fn manager() -> (AlertLifecycleManager, Arc<RecordingNotifier>) {
    let notifier = Arc::new(RecordingNotifier::default());
    (AlertLifecycleManager::new(notifier.clone()), notifier)
}

#[tokio::test]
async fn duplicate_identity_merges_into_one_active_alert() {
    let (manager, notifier) = manager();

    let first = make_alert("web-01", MetricType::CpuUsage, AlertLevel::Warning, 85.0);
    let second = make_alert("web-01", MetricType::CpuUsage, AlertLevel::Warning, 88.5);

    assert_eq!(manager.process(first).await, ProcessOutcome::Created);
    assert_eq!(manager.process(second).await, ProcessOutcome::Refreshed);

    let active = manager.active_alerts();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].current_value, 88.5);
    // Only the creation notified
    assert_eq!(notifier.count(), 1);
}

#[tokio::test]
async fn distinct_identities_do_not_merge() {
    let (manager, notifier) = manager();

    manager
        .process(make_alert("web-01", MetricType::CpuUsage, AlertLevel::Warning, 85.0))
        .await;
    manager
        .process(make_alert("web-01", MetricType::MemoryUsage, AlertLevel::Warning, 90.0))
        .await;
    manager
        .process(make_alert("web-02", MetricType::CpuUsage, AlertLevel::Warning, 85.0))
        .await;

    assert_eq!(manager.active_alerts().len(), 3);
    assert_eq!(notifier.count(), 3);
}

#[tokio::test]
async fn level_change_escalates_and_renotifies() {
    let (manager, notifier) = manager();

    manager
        .process(make_alert("web-01", MetricType::CpuUsage, AlertLevel::Warning, 85.0))
        .await;
    let outcome = manager
        .process(make_alert("web-01", MetricType::CpuUsage, AlertLevel::Critical, 97.0))
        .await;

    assert_eq!(outcome, ProcessOutcome::Escalated);
    let active = manager.active_alerts();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].level, AlertLevel::Critical);
    assert_eq!(active[0].current_value, 97.0);
    // Create + escalate
    assert_eq!(notifier.count(), 2);
    assert_eq!(notifier.last_level(), Some(AlertLevel::Critical));
}

#[tokio::test]
async fn level_downgrade_also_notifies() {
    let (manager, notifier) = manager();

    manager
        .process(make_alert("web-01", MetricType::CpuUsage, AlertLevel::Critical, 97.0))
        .await;
    let outcome = manager
        .process(make_alert("web-01", MetricType::CpuUsage, AlertLevel::Warning, 85.0))
        .await;

    assert_eq!(outcome, ProcessOutcome::Escalated);
    assert_eq!(notifier.count(), 2);
    assert_eq!(notifier.last_level(), Some(AlertLevel::Warning));
}

#[tokio::test]
async fn suppression_blocks_creation_and_escalation() {
    let (manager, notifier) = manager();

    manager.suppress("web-01", MetricType::CpuUsage, Duration::minutes(10));

    let outcome = manager
        .process(make_alert("web-01", MetricType::CpuUsage, AlertLevel::Critical, 97.0))
        .await;

    assert_eq!(outcome, ProcessOutcome::Suppressed);
    assert!(manager.active_alerts().is_empty());
    assert_eq!(notifier.count(), 0);

    // A different identity is unaffected
    let outcome = manager
        .process(make_alert("web-01", MetricType::MemoryUsage, AlertLevel::Warning, 90.0))
        .await;
    assert_eq!(outcome, ProcessOutcome::Created);
}

#[tokio::test]
async fn expired_suppression_is_dropped_lazily() {
    let (manager, notifier) = manager();

    // Already-expired window
    manager.suppress("web-01", MetricType::CpuUsage, Duration::minutes(-1));

    let outcome = manager
        .process(make_alert("web-01", MetricType::CpuUsage, AlertLevel::Warning, 85.0))
        .await;

    assert_eq!(outcome, ProcessOutcome::Created);
    assert_eq!(notifier.count(), 1);
}

#[tokio::test]
async fn resolve_round_trip() {
    let (manager, _notifier) = manager();

    let alert = make_alert("web-01", MetricType::CpuUsage, AlertLevel::Warning, 85.0);
    let alert_id = alert.id.clone();
    manager.process(alert).await;

    assert!(manager.resolve(&alert_id));
    assert!(manager.active_alerts().is_empty());

    let stats = manager.statistics();
    assert_eq!(stats.total_alerts, 1);
    assert_eq!(stats.active_alerts, 0);
    assert_eq!(stats.resolved_alerts, 1);
}

#[tokio::test]
async fn resolve_unknown_id_is_a_noop() {
    let (manager, _notifier) = manager();
    assert!(!manager.resolve("no-such-id"));

    let alert = make_alert("web-01", MetricType::CpuUsage, AlertLevel::Warning, 85.0);
    let alert_id = alert.id.clone();
    manager.process(alert).await;
    assert!(manager.resolve(&alert_id));
    // Second resolve finds nothing active
    assert!(!manager.resolve(&alert_id));
}

#[tokio::test]
async fn statistics_distributions() {
    let (manager, _notifier) = manager();

    manager
        .process(make_alert("web-01", MetricType::CpuUsage, AlertLevel::Critical, 97.0))
        .await;
    manager
        .process(make_alert("web-01", MetricType::MemoryUsage, AlertLevel::Warning, 90.0))
        .await;
    manager
        .process(make_alert("db-01", MetricType::CpuLoad, AlertLevel::Warning, 9.0))
        .await;

    let stats = manager.statistics();
    assert_eq!(stats.total_alerts, 3);
    assert_eq!(stats.active_alerts, 3);
    assert_eq!(stats.resolved_alerts, 0);
    assert_eq!(stats.level_distribution[&AlertLevel::Warning], 2);
    assert_eq!(stats.level_distribution[&AlertLevel::Critical], 1);
    assert_eq!(stats.hostname_distribution["web-01"], 2);
    assert_eq!(stats.hostname_distribution["db-01"], 1);
}

fn make_snapshot(hostname: &str, cpu: f64, mem_ratio: f64, load: f64) -> Snapshot {
    let total: u64 = 16 << 30;
    Snapshot {
        hostname: hostname.into(),
        timestamp: Utc::now(),
        load_1min: load,
        load_5min: load,
        load_15min: load,
        cpu_usage: cpu,
        cores: Vec::new(),
        memory: MemoryStats {
            total,
            used: (total as f64 * mem_ratio) as u64,
            available: (total as f64 * (1.0 - mem_ratio)) as u64,
        },
        interfaces: Vec::new(),
    }
}

#[tokio::test]
async fn factory_builds_classified_alerts() {
    let orchestrator = AnalysisOrchestrator::new(
        AnalysisConfig::default(),
        None,
        Arc::new(MemoryKnowledgeStore::with_defaults()),
    );
    let factory = AlertFactory::new(Thresholds::default());

    let snapshot = make_snapshot("h1", 97.0, 0.60, 2.0);
    let analysis = orchestrator.analyze(&snapshot).await.unwrap();
    let alerts = factory.build(&snapshot, &analysis);

    assert_eq!(alerts.len(), 1);
    let alert = &alerts[0];
    assert_eq!(alert.level, AlertLevel::Critical);
    assert_eq!(alert.metric_type, MetricType::CpuUsage);
    assert_eq!(alert.current_value, 97.0);
    assert_eq!(alert.threshold_value, 80.0);
    assert_eq!(alert.hostname, "h1");
    assert_eq!(alert.title, "h1: CPU severely overloaded");
    assert!(alert.suggested_actions.len() <= 3);
    assert!(!alert.suggested_actions.is_empty());
    assert_eq!(alert.context.get("tier").unwrap(), "rule-based");
}

#[tokio::test]
async fn pipeline_end_to_end_creates_one_critical_cpu_alert() {
    let orchestrator = AnalysisOrchestrator::new(
        AnalysisConfig::default(),
        None,
        Arc::new(MemoryKnowledgeStore::with_defaults()),
    );
    let factory = AlertFactory::new(Thresholds::default());
    let (manager, notifier) = manager();

    let snapshot = make_snapshot("h1", 97.0, 0.60, 2.0);
    let analysis = orchestrator.analyze(&snapshot).await.unwrap();
    assert_eq!(analysis.issues, vec!["CPU severely overloaded"]);

    for alert in factory.build(&snapshot, &analysis) {
        manager.process(alert).await;
    }

    let active = manager.active_alerts();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].level, AlertLevel::Critical);
    assert_eq!(active[0].metric_type, MetricType::CpuUsage);
    assert_eq!(notifier.count(), 1);
}
