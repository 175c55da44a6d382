mod app;
mod config;

use aimon_telemetry::sim::SimulatedSource;
use anyhow::Result;
use tokio::signal;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("aimon=info".parse()?))
        .init();

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config/agent.toml".to_string());

    let config = match config::AgentConfig::load(&config_path) {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!(path = %config_path, error = %e, "Config not loaded, using defaults");
            config::AgentConfig::default()
        }
    };

    aimon_common::id::init(config.machine_id, config.node_id);

    tracing::info!(
        hosts = ?config.telemetry.hostnames,
        interval_secs = config.telemetry.interval_secs,
        "aimon-agent starting"
    );

    let app = app::App::build(&config)?;
    let mut source = SimulatedSource::new(&config.telemetry);
    let stop = source.stop_handle();

    let runner = app.run(&mut source);
    tokio::pin!(runner);

    tokio::select! {
        _ = &mut runner => {}
        _ = signal::ctrl_c() => {
            tracing::info!("Shutting down gracefully");
            stop.stop();
            // Let the in-flight cycle finish and the stream drain
            runner.await;
        }
    }

    let stats = app.manager.statistics();
    tracing::info!(
        total = stats.total_alerts,
        active = stats.active_alerts,
        resolved = stats.resolved_alerts,
        "Final alert statistics"
    );

    Ok(())
}
