use anyhow::{Context, Result};
use hostmon_agent::{RunConfig, Scheduler};
use hostmon_collector::{default_samplers, PingProber};
use tokio::signal;
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // stdout is reserved for the console mirror of the combined log.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env().add_directive("hostmon=info".parse()?))
        .init();

    let config_path = std::env::args().nth(1);
    let config = RunConfig::resolve(config_path.as_deref()).context("invalid configuration")?;
    tracing::info!(mode = %config.mode, "hostmon-agent starting");

    // Register for SIGTERM before any log file exists so an early stop is
    // still handled gracefully.
    let termination = termination_signal()?;

    let samplers = default_samplers(config.cpu_window(), config.process_count);
    let prober = PingProber::new(config.ping_host.clone(), config.ping_timeout());
    let mut scheduler = Scheduler::start(config, samplers, Box::new(prober))
        .context("failed to start monitor")?;

    let (stop_tx, stop_rx) = watch::channel(false);
    tokio::spawn(async move {
        termination.await;
        tracing::info!("Termination signal received");
        let _ = stop_tx.send(true);
    });

    let summary = scheduler.run(stop_rx).await;
    tracing::info!(cycles = summary.cycles, "hostmon-agent stopped");
    Ok(())
}

#[cfg(unix)]
fn termination_signal() -> Result<impl std::future::Future<Output = ()>> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut terminate =
        signal(SignalKind::terminate()).context("failed to install SIGTERM handler")?;
    Ok(async move {
        tokio::select! {
            _ = signal::ctrl_c() => {}
            _ = terminate.recv() => {}
        }
    })
}

#[cfg(not(unix))]
fn termination_signal() -> Result<impl std::future::Future<Output = ()>> {
    Ok(async {
        let _ = signal::ctrl_c().await;
    })
}
