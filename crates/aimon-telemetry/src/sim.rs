use crate::{TelemetryConfig, TelemetrySource};
use aimon_common::types::{CoreStats, InterfaceStats, MemoryStats, Snapshot};
use async_trait::async_trait;
use chrono::Utc;
use rand::Rng;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::time::{interval, Duration, Interval, MissedTickBehavior};

const CORE_COUNT: usize = 8;
/// Probability that one sample carries an anomalous spike, so the
/// downstream pipeline regularly has something to analyze.
const ANOMALY_CHANCE: f64 = 0.15;

/// Cooperative stop switch for a running source.
#[derive(Clone)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

/// Synthetic snapshot feed cycling through the configured hostnames.
///
/// Values hover in a healthy band with occasional spikes into anomaly
/// territory. A simulated transport error (per `failure_rate`) waits the
/// cooldown interval and moves on to the next item instead of ending the
/// stream.
pub struct SimulatedSource {
    hostnames: Vec<String>,
    next_host: usize,
    tick: Interval,
    error_cooldown: Duration,
    failure_rate: f64,
    stopped: Arc<AtomicBool>,
}

impl SimulatedSource {
    pub fn new(config: &TelemetryConfig) -> Self {
        let mut tick = interval(Duration::from_secs(config.interval_secs.max(1)));
        tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let hostnames = if config.hostnames.is_empty() {
            vec!["sim-host-01".to_string()]
        } else {
            config.hostnames.clone()
        };
        Self {
            hostnames,
            next_host: 0,
            tick,
            error_cooldown: Duration::from_secs(config.error_cooldown_secs),
            failure_rate: config.failure_rate.clamp(0.0, 1.0),
            stopped: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn stop_handle(&self) -> StopHandle {
        StopHandle(self.stopped.clone())
    }

    fn generate(&mut self) -> Snapshot {
        let hostname = self.hostnames[self.next_host].clone();
        self.next_host = (self.next_host + 1) % self.hostnames.len();

        let mut rng = rand::thread_rng();
        let spike = rng.gen::<f64>() < ANOMALY_CHANCE;

        let cpu_usage: f64 = if spike && rng.gen_bool(0.5) {
            rng.gen_range(90.0..99.5)
        } else {
            rng.gen_range(10.0..70.0)
        };
        let mem_ratio: f64 = if spike && rng.gen_bool(0.3) {
            rng.gen_range(0.90..0.99)
        } else {
            rng.gen_range(0.35..0.75)
        };
        let load_1min: f64 = if spike && rng.gen_bool(0.4) {
            rng.gen_range(6.0..12.0)
        } else {
            rng.gen_range(0.2..3.0)
        };

        let cores = (0..CORE_COUNT)
            .map(|i| {
                let usage = (cpu_usage + rng.gen_range(-10.0..10.0)).clamp(0.0, 100.0);
                let iowait = if i % 3 == 0 {
                    rng.gen_range(0.0..20.0)
                } else {
                    rng.gen_range(0.0..5.0)
                };
                CoreStats {
                    name: format!("cpu{i}"),
                    usage_percent: usage,
                    user_percent: usage * 0.6,
                    system_percent: rng.gen_range(2.0..10.0),
                    idle_percent: 100.0 - usage,
                    iowait_percent: iowait,
                }
            })
            .collect();

        let total: u64 = 16 << 30;
        let used = (total as f64 * mem_ratio) as u64;

        Snapshot {
            hostname,
            timestamp: Utc::now(),
            load_1min,
            load_5min: (load_1min * 0.8).max(0.1),
            load_15min: (load_1min * 0.6).max(0.1),
            cpu_usage,
            cores,
            memory: MemoryStats {
                total,
                used,
                available: total - used,
            },
            interfaces: vec![InterfaceStats {
                name: "eth0".to_string(),
                rx_rate_kb: rng.gen_range(10.0..2000.0),
                tx_rate_kb: rng.gen_range(10.0..2000.0),
                rx_packets_rate: rng.gen_range(50.0..5000.0),
                tx_packets_rate: rng.gen_range(50.0..5000.0),
            }],
        }
    }
}

#[async_trait]
impl TelemetrySource for SimulatedSource {
    async fn recv(&mut self) -> Option<Snapshot> {
        loop {
            if self.stopped.load(Ordering::SeqCst) {
                return None;
            }
            self.tick.tick().await;
            if self.stopped.load(Ordering::SeqCst) {
                return None;
            }

            if self.failure_rate > 0.0 && rand::thread_rng().gen::<f64>() < self.failure_rate {
                tracing::warn!(
                    cooldown_secs = self.error_cooldown.as_secs(),
                    "Simulated transport error, cooling down"
                );
                tokio::time::sleep(self.error_cooldown).await;
                continue;
            }

            return Some(self.generate());
        }
    }
}
