use crate::error::SamplerError;
use crate::process;
use crate::Sampler;
use chrono::Utc;
use hostmon_common::types::{Category, CpuSample, Sample};
use std::time::Duration;
use sysinfo::{ProcessesToUpdate, System, MINIMUM_CPU_UPDATE_INTERVAL};

/// Samples CPU utilisation over a short blocking window.
///
/// A zero-length read is meaningless for utilisation, so the window never
/// drops below [`MINIMUM_CPU_UPDATE_INTERVAL`].
pub struct CpuSampler {
    system: System,
    window: Duration,
    process_count: usize,
}

impl CpuSampler {
    pub fn new(window: Duration, process_count: usize) -> Self {
        Self {
            system: System::new(),
            window: window.max(MINIMUM_CPU_UPDATE_INTERVAL),
            process_count,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    fn refresh(&mut self) {
        self.system.refresh_cpu_usage();
        if self.process_count > 0 {
            self.system.refresh_processes(ProcessesToUpdate::All, true);
        }
    }
}

impl Sampler for CpuSampler {
    fn category(&self) -> Category {
        Category::Cpu
    }

    fn sample(&mut self) -> Result<Sample, SamplerError> {
        self.refresh();
        std::thread::sleep(self.window);
        self.refresh();
        if self.process_count > 0 {
            self.system.refresh_memory();
        }

        let cpus = self.system.cpus();
        if cpus.is_empty() {
            return Err(SamplerError::unavailable(
                Category::Cpu,
                "no logical CPUs reported",
            ));
        }

        Ok(Sample::Cpu(CpuSample {
            captured_at: Utc::now(),
            usage_percent: self.system.global_cpu_usage(),
            core_count: cpus.len(),
            per_core_percent: cpus.iter().map(|cpu| cpu.cpu_usage()).collect(),
            top_processes: process::top_by_cpu(&self.system, self.process_count),
        }))
    }
}
