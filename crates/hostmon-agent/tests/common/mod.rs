#![allow(dead_code)]

use async_trait::async_trait;
use chrono::Utc;
use hostmon_agent::RunConfig;
use hostmon_collector::{ProbeError, Prober, Sampler, SamplerError};
use hostmon_common::types::{
    Category, CpuSample, DiskSample, MemorySample, MonitorMode, NetworkSample, PingResult,
    Sample,
};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Sampler that returns canned readings and records when it was called.
pub struct FakeSampler {
    category: Category,
    fail: bool,
    calls: Arc<Mutex<Vec<Instant>>>,
}

impl FakeSampler {
    pub fn ok(category: Category) -> Self {
        Self {
            category,
            fail: false,
            calls: Arc::default(),
        }
    }

    pub fn failing(category: Category) -> Self {
        Self {
            fail: true,
            ..Self::ok(category)
        }
    }

    pub fn calls(&self) -> Arc<Mutex<Vec<Instant>>> {
        Arc::clone(&self.calls)
    }
}

impl Sampler for FakeSampler {
    fn category(&self) -> Category {
        self.category
    }

    fn sample(&mut self) -> Result<Sample, SamplerError> {
        self.calls.lock().unwrap().push(Instant::now());
        if self.fail {
            return Err(SamplerError::unavailable(self.category, "interface missing"));
        }
        let now = Utc::now();
        Ok(match self.category {
            Category::Cpu => Sample::Cpu(CpuSample {
                captured_at: now,
                usage_percent: 25.0,
                core_count: 2,
                per_core_percent: vec![20.0, 30.0],
                top_processes: Vec::new(),
            }),
            Category::Memory => Sample::Memory(MemorySample {
                captured_at: now,
                total_bytes: 2 * 1024 * 1024 * 1024,
                used_bytes: 1024 * 1024 * 1024,
                available_bytes: 1024 * 1024 * 1024,
                used_percent: 50.0,
                top_processes: Vec::new(),
            }),
            Category::Disk => Sample::Disk(DiskSample {
                captured_at: now,
                read_bytes: 4096,
                write_bytes: 8192,
                read_count: 1,
                write_count: 2,
                devices: Vec::new(),
            }),
            Category::Network | Category::Combined => Sample::Network(NetworkSample {
                captured_at: now,
                bytes_sent: 1024,
                bytes_recv: 2048,
                packets_sent: 1,
                packets_recv: 2,
                interface_count: 1,
            }),
        })
    }
}

pub enum ProbeOutcome {
    Reachable,
    Unreachable,
    Fails,
}

pub struct FakeProber {
    host: String,
    outcome: ProbeOutcome,
}

impl FakeProber {
    pub fn new(outcome: ProbeOutcome) -> Self {
        Self {
            host: "192.0.2.10".to_string(),
            outcome,
        }
    }
}

#[async_trait]
impl Prober for FakeProber {
    fn target(&self) -> &str {
        &self.host
    }

    async fn probe(&self) -> Result<PingResult, ProbeError> {
        let reachable = match self.outcome {
            ProbeOutcome::Reachable => true,
            ProbeOutcome::Unreachable => false,
            ProbeOutcome::Fails => {
                return Err(ProbeError::Timeout {
                    host: self.host.clone(),
                    timeout: Duration::from_secs(2),
                })
            }
        };
        Ok(PingResult {
            captured_at: Utc::now(),
            host: self.host.clone(),
            reachable,
            latency_ms: reachable.then_some(0.5),
            raw_output: String::new(),
        })
    }
}

pub fn test_config(log_dir: &Path, interval_secs: f64) -> RunConfig {
    RunConfig {
        mode: MonitorMode::Container,
        interval_secs,
        ping_host: "192.0.2.10".to_string(),
        log_dir: log_dir.to_path_buf(),
        console_output: false,
        process_count: 0,
        cpu_window_ms: 200,
        ..RunConfig::default()
    }
}

pub fn read_lines(path: &Path) -> Vec<String> {
    std::fs::read_to_string(path)
        .unwrap_or_default()
        .lines()
        .map(str::to_string)
        .collect()
}

pub fn log_file(dir: &Path, stem: &str) -> std::path::PathBuf {
    dir.join(format!("{stem}-container.log"))
}
