use aimon_common::types::{Alert, AlertStatistics, MetricType};
use aimon_notify::Notifier;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// How [`AlertLifecycleManager::process`] disposed of an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessOutcome {
    /// New identity: inserted into the active set and notified.
    Created,
    /// Existing identity with a level change: updated and re-notified.
    Escalated,
    /// Existing identity, same level: value/timestamp refresh, no
    /// notification.
    Refreshed,
    /// An unexpired suppression rule matched: dropped silently.
    Suppressed,
}

type IdentityKey = (String, MetricType);

/// The arena: history owns every alert ever processed; the active set maps
/// an identity to its history slot. Resolution removes the identity but
/// the record stays, now marked resolved.
struct ManagerState {
    history: Vec<Alert>,
    active: HashMap<IdentityKey, usize>,
    suppressions: HashMap<IdentityKey, DateTime<Utc>>,
}

enum Decision {
    Notify(Alert, ProcessOutcome),
    Silent(ProcessOutcome),
}

/// The stateful core of the alert path.
///
/// At most one unresolved alert exists per `(hostname, metric_type)`; a
/// repeat detection refreshes the existing record and only a level change
/// re-notifies. Suppression rules block creation and escalation alike and
/// expire lazily on the next evaluation.
///
/// All three collections sit behind one mutex, released before any await,
/// so the manager is safe to share across concurrent pipelines.
pub struct AlertLifecycleManager {
    notifier: Arc<dyn Notifier>,
    state: Mutex<ManagerState>,
}

impl AlertLifecycleManager {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self {
            notifier,
            state: Mutex::new(ManagerState {
                history: Vec::new(),
                active: HashMap::new(),
                suppressions: HashMap::new(),
            }),
        }
    }

    pub async fn process(&self, alert: Alert) -> ProcessOutcome {
        let decision = self.decide(alert);
        match decision {
            Decision::Notify(alert, outcome) => {
                self.notifier.deliver(&alert).await;
                outcome
            }
            Decision::Silent(outcome) => outcome,
        }
    }

    fn decide(&self, alert: Alert) -> Decision {
        let mut state = self.state.lock().unwrap();
        let key = alert.identity();

        if let Some(&expiry) = state.suppressions.get(&key) {
            if Utc::now() < expiry {
                tracing::debug!(
                    hostname = %alert.hostname,
                    metric = %alert.metric_type,
                    "Alert suppressed"
                );
                return Decision::Silent(ProcessOutcome::Suppressed);
            }
            // Window elapsed, drop the rule lazily
            state.suppressions.remove(&key);
        }

        if let Some(&idx) = state.active.get(&key) {
            let existing = &mut state.history[idx];
            existing.current_value = alert.current_value;
            existing.timestamp = alert.timestamp;

            if existing.level != alert.level {
                let old_level = existing.level;
                existing.level = alert.level;
                existing.description = alert.description;
                tracing::info!(
                    alert_id = %existing.id,
                    from = %old_level,
                    to = %alert.level,
                    "Alert level changed"
                );
                return Decision::Notify(existing.clone(), ProcessOutcome::Escalated);
            }
            return Decision::Silent(ProcessOutcome::Refreshed);
        }

        let idx = state.history.len();
        state.history.push(alert.clone());
        state.active.insert(key, idx);
        tracing::info!(
            alert_id = %alert.id,
            hostname = %alert.hostname,
            level = %alert.level,
            "Alert created"
        );
        Decision::Notify(alert, ProcessOutcome::Created)
    }

    /// Marks the alert resolved and removes it from the active set; its
    /// history record is retained. Returns false for unknown or already
    /// resolved IDs.
    pub fn resolve(&self, alert_id: &str) -> bool {
        let mut state = self.state.lock().unwrap();

        let found = state
            .active
            .iter()
            .find_map(|(key, &idx)| (state.history[idx].id == alert_id).then(|| (key.clone(), idx)));
        let Some((key, idx)) = found else {
            return false;
        };

        state.active.remove(&key);
        let record = &mut state.history[idx];
        record.resolved = true;
        record.resolved_at = Some(Utc::now());
        tracing::info!(alert_id, title = %record.title, "Alert resolved");
        true
    }

    /// Installs (or overwrites) a suppression rule for the identity pair.
    pub fn suppress(&self, hostname: &str, metric_type: MetricType, duration: Duration) {
        let expiry = Utc::now() + duration;
        let mut state = self.state.lock().unwrap();
        state
            .suppressions
            .insert((hostname.to_string(), metric_type), expiry);
        tracing::info!(
            hostname,
            metric = %metric_type,
            until = %expiry,
            "Alert suppression installed"
        );
    }

    /// Snapshot of the current unresolved alerts.
    pub fn active_alerts(&self) -> Vec<Alert> {
        let state = self.state.lock().unwrap();
        state
            .active
            .values()
            .map(|&idx| state.history[idx].clone())
            .collect()
    }

    pub fn statistics(&self) -> AlertStatistics {
        let state = self.state.lock().unwrap();

        let mut level_distribution = HashMap::new();
        let mut hostname_distribution = HashMap::new();
        for alert in &state.history {
            *level_distribution.entry(alert.level).or_insert(0) += 1;
            *hostname_distribution
                .entry(alert.hostname.clone())
                .or_insert(0) += 1;
        }

        let total_alerts = state.history.len();
        let active_alerts = state.active.len();
        AlertStatistics {
            total_alerts,
            active_alerts,
            resolved_alerts: total_alerts - active_alerts,
            level_distribution,
            hostname_distribution,
        }
    }
}
