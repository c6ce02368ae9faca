use crate::config::RunConfig;
use crate::error::StartupError;
use crate::format;
use crate::router::LogRouter;
use hostmon_collector::{Prober, Sampler};
use hostmon_common::types::{Category, Level, Sample};
use std::path::Path;
use std::time::{Duration, Instant};
use tokio::sync::watch;

const WRITE_CHECK_FILE: &str = ".hostmon-write-check";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Starting,
    Running,
    Stopping,
    Stopped,
}

/// What happened during one cycle.
#[derive(Debug, Clone)]
pub struct CycleReport {
    pub started_at: Instant,
    pub elapsed: Duration,
    pub samples_written: usize,
    pub sampler_failures: usize,
    pub probe_failed: bool,
    /// Shutdown was requested before every step ran.
    pub interrupted: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub cycles: u64,
}

/// Drives the sampling cadence: samplers, then the prober, then dispatch of
/// every successful sample through the [`LogRouter`].
///
/// Everything runs sequentially on the caller's task, so cycles never
/// overlap and the router needs no locking.
pub struct Scheduler {
    config: RunConfig,
    samplers: Vec<Box<dyn Sampler>>,
    prober: Box<dyn Prober>,
    router: LogRouter,
    state: SchedulerState,
    cycles: u64,
}

impl Scheduler {
    /// Runs the `Starting` phase: prepares the log directory, opens the
    /// sinks and writes the startup banner.
    ///
    /// # Errors
    ///
    /// Any failure here is fatal to the process.
    pub fn start(
        config: RunConfig,
        samplers: Vec<Box<dyn Sampler>>,
        prober: Box<dyn Prober>,
    ) -> Result<Self, StartupError> {
        config.validate()?;
        prepare_log_dir(&config.log_dir)?;
        let router = LogRouter::open(
            &config.log_dir,
            config.mode,
            config.rotation(),
            config.console_output,
        )?;

        tracing::info!(
            mode = %config.mode,
            interval_secs = config.interval_secs,
            ping_host = %config.ping_host,
            log_dir = %config.log_dir.display(),
            "Log sinks ready"
        );

        let mut scheduler = Self {
            config,
            samplers,
            prober,
            router,
            state: SchedulerState::Starting,
            cycles: 0,
        };
        scheduler.write_banner();
        Ok(scheduler)
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    pub fn log_path(&self, category: Category) -> &Path {
        self.router.path(category)
    }

    fn write_banner(&mut self) {
        let c = &self.config;
        let lines = [
            format!("Starting monitor in {} mode", c.mode),
            format!(
                "Interval: {}s | Ping target: {} | Log dir: {} | Rotation: {} bytes x {} backups",
                c.interval_secs,
                c.ping_host,
                c.log_dir.display(),
                c.max_log_bytes,
                c.log_backup_count
            ),
            format!(
                "Samplers: {}",
                self.samplers
                    .iter()
                    .map(|s| s.category().to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            "-".repeat(80),
        ];
        for line in &lines {
            self.router.write(Category::Combined, Level::Info, line);
        }
    }

    /// Runs cycles until `shutdown` turns true (or its sender goes away),
    /// then flushes and closes every sink.
    pub async fn run(&mut self, mut shutdown: watch::Receiver<bool>) -> RunSummary {
        self.state = SchedulerState::Running;
        let interval = self.config.interval();
        tracing::info!(interval_ms = interval.as_millis() as u64, "Starting collection loop");

        while !stop_requested(&shutdown) {
            let report = self.run_cycle(&shutdown).await;
            tracing::debug!(
                cycle = self.cycles,
                samples = report.samples_written,
                failures = report.sampler_failures,
                probe_failed = report.probe_failed,
                elapsed_ms = report.elapsed.as_millis() as u64,
                "Cycle complete"
            );
            if report.interrupted || stop_requested(&shutdown) {
                break;
            }

            let pause = interval.saturating_sub(report.started_at.elapsed());
            if pause.is_zero() {
                tracing::warn!(
                    elapsed_ms = report.elapsed.as_millis() as u64,
                    interval_ms = interval.as_millis() as u64,
                    "Cycle overran the interval, starting the next one immediately"
                );
                continue;
            }

            tokio::select! {
                _ = tokio::time::sleep(pause) => {}
                _ = wait_for_stop(&mut shutdown) => break,
            }
        }

        self.stop();
        RunSummary {
            cycles: self.cycles,
        }
    }

    fn stop(&mut self) {
        self.state = SchedulerState::Stopping;
        tracing::info!(cycles = self.cycles, "Shutting down gracefully");
        self.router.write(
            Category::Combined,
            Level::Info,
            &format!("Stopping monitor after {} cycles", self.cycles),
        );
        self.router.close();
        self.state = SchedulerState::Stopped;
    }

    /// Runs one cycle. Errors are turned into log lines; none escape.
    pub async fn run_cycle(&mut self, shutdown: &watch::Receiver<bool>) -> CycleReport {
        let started_at = Instant::now();
        self.cycles += 1;

        let mut samples: Vec<Sample> = Vec::with_capacity(self.samplers.len() + 1);
        let mut sampler_failures = 0;
        let mut probe_failed = false;
        let mut interrupted = false;

        for sampler in &mut self.samplers {
            if stop_requested(shutdown) {
                interrupted = true;
                break;
            }
            match sampler.sample() {
                Ok(sample) => samples.push(sample),
                Err(e) => {
                    sampler_failures += 1;
                    tracing::warn!(sampler = %sampler.category(), error = %e, "Sampling failed");
                    self.router.write(
                        e.sampler(),
                        Level::Warning,
                        &format::sampler_failure_message(&e),
                    );
                }
            }
        }

        if !interrupted && stop_requested(shutdown) {
            interrupted = true;
        }
        if !interrupted {
            match self.prober.probe().await {
                Ok(result) => samples.push(Sample::Ping(result)),
                Err(e) => {
                    probe_failed = true;
                    tracing::error!(host = %self.prober.target(), error = %e, "Probe failed");
                    self.router.write(
                        Category::Network,
                        Level::Error,
                        &format::probe_failure_message(self.prober.target(), &e),
                    );
                }
            }
        }

        // Samples already taken are written even when shutdown is pending.
        for sample in &samples {
            self.router.write(
                sample.category(),
                Level::Info,
                &format::sample_message(sample),
            );
        }

        CycleReport {
            started_at,
            elapsed: started_at.elapsed(),
            samples_written: samples.len(),
            sampler_failures,
            probe_failed,
            interrupted,
        }
    }
}

/// Creates the log directory and proves it accepts new files.
fn prepare_log_dir(dir: &Path) -> Result<(), StartupError> {
    std::fs::create_dir_all(dir).map_err(|source| StartupError::CreateLogDir {
        path: dir.to_path_buf(),
        source,
    })?;
    let check = dir.join(WRITE_CHECK_FILE);
    std::fs::write(&check, b"").map_err(|source| StartupError::LogDirNotWritable {
        path: dir.to_path_buf(),
        source,
    })?;
    let _ = std::fs::remove_file(&check);
    Ok(())
}

fn stop_requested(shutdown: &watch::Receiver<bool>) -> bool {
    *shutdown.borrow() || shutdown.has_changed().is_err()
}

async fn wait_for_stop(shutdown: &mut watch::Receiver<bool>) {
    loop {
        if *shutdown.borrow_and_update() {
            return;
        }
        if shutdown.changed().await.is_err() {
            return;
        }
    }
}
