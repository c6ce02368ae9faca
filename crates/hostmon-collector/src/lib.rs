//! Resource samplers and the reachability prober for the hostmon agent.
//!
//! Each [`Sampler`] reads one category of OS resource state (CPU, memory,
//! disk I/O, network) and returns a single [`Sample`]. Samplers never retain
//! history between calls beyond what the underlying OS API needs to compute a
//! utilisation figure.

pub mod cpu;
pub mod disk;
pub mod error;
pub mod memory;
pub mod network;
pub mod ping;
pub mod process;

use hostmon_common::types::{Category, Sample};

pub use error::{ProbeError, SamplerError};
pub use ping::{PingProber, Prober};

/// A resource sampler driven by the agent's scheduler loop.
///
/// Implementations are called sequentially once per cycle. `Send` is
/// required so the scheduler can be moved onto a runtime task.
pub trait Sampler: Send {
    /// Category the sampler reports under; also used as its name in logs.
    fn category(&self) -> Category;

    /// Reads the current resource state.
    ///
    /// # Errors
    ///
    /// Returns [`SamplerError::Unavailable`] if the underlying OS interface
    /// is missing or reports nothing usable.
    fn sample(&mut self) -> Result<Sample, SamplerError>;
}

/// Builds the four standard samplers in cycle order.
pub fn default_samplers(
    cpu_window: std::time::Duration,
    process_count: usize,
) -> Vec<Box<dyn Sampler>> {
    vec![
        Box::new(cpu::CpuSampler::new(cpu_window, process_count)),
        Box::new(memory::MemorySampler::new(process_count)),
        Box::new(disk::DiskSampler::new()),
        Box::new(network::NetworkSampler::new()),
    ]
}
