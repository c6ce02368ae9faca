//! Collection-and-logging pipeline of the hostmon agent.
//!
//! [`scheduler::Scheduler`] samples CPU, memory, disk I/O, network counters
//! and reachability once per interval and hands each reading to
//! [`router::LogRouter`], which fans lines out to five size-rotated log files.

pub mod config;
pub mod error;
pub mod format;
pub mod router;
pub mod scheduler;
pub mod sink;

pub use config::RunConfig;
pub use scheduler::{RunSummary, Scheduler, SchedulerState};
