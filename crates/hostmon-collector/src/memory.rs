use crate::error::SamplerError;
use crate::process;
use crate::Sampler;
use chrono::Utc;
use hostmon_common::types::{Category, MemorySample, Sample};
use sysinfo::{ProcessesToUpdate, System};

pub struct MemorySampler {
    system: System,
    process_count: usize,
}

impl MemorySampler {
    pub fn new(process_count: usize) -> Self {
        Self {
            system: System::new(),
            process_count,
        }
    }
}

impl Sampler for MemorySampler {
    fn category(&self) -> Category {
        Category::Memory
    }

    fn sample(&mut self) -> Result<Sample, SamplerError> {
        self.system.refresh_memory();

        let total = self.system.total_memory();
        if total == 0 {
            return Err(SamplerError::unavailable(
                Category::Memory,
                "total memory reported as zero",
            ));
        }
        let used = self.system.used_memory();
        let available = self.system.available_memory();
        let used_percent = (used as f64 / total as f64) * 100.0;

        let top_processes = if self.process_count > 0 {
            self.system.refresh_processes(ProcessesToUpdate::All, true);
            process::top_by_memory(&self.system, self.process_count, total)
        } else {
            Vec::new()
        };

        Ok(Sample::Memory(MemorySample {
            captured_at: Utc::now(),
            total_bytes: total,
            used_bytes: used,
            available_bytes: available,
            used_percent,
            top_processes,
        }))
    }
}
