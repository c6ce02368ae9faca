use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Routing category of a log line.
///
/// Every category except [`Category::Combined`] owns a dedicated log file;
/// all lines also land in the combined file.
///
/// # Examples
///
/// ```
/// use hostmon_common::types::Category;
///
/// assert_eq!(Category::Cpu.to_string(), "cpu");
/// assert_eq!(Category::Combined.file_stem(), "monitor");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Combined,
    Cpu,
    Memory,
    Disk,
    Network,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Combined,
        Category::Cpu,
        Category::Memory,
        Category::Disk,
        Category::Network,
    ];

    /// File name prefix used for this category's log file.
    pub fn file_stem(self) -> &'static str {
        match self {
            Category::Combined => "monitor",
            Category::Cpu => "cpu",
            Category::Memory => "memory",
            Category::Disk => "disk",
            Category::Network => "network",
        }
    }

    /// Label used at the start of sampler failure messages.
    pub fn label(self) -> &'static str {
        match self {
            Category::Combined => "Monitor",
            Category::Cpu => "CPU",
            Category::Memory => "Memory",
            Category::Disk => "Disk",
            Category::Network => "Network",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Category::Combined => write!(f, "combined"),
            Category::Cpu => write!(f, "cpu"),
            Category::Memory => write!(f, "memory"),
            Category::Disk => write!(f, "disk"),
            Category::Network => write!(f, "network"),
        }
    }
}

/// Severity of a log line, ordered from lowest to highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Info,
    Warning,
    Error,
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Level::Info => write!(f, "INFO"),
            Level::Warning => write!(f, "WARNING"),
            Level::Error => write!(f, "ERROR"),
        }
    }
}

/// Deployment label. Only affects log file names and the startup banner.
///
/// # Examples
///
/// ```
/// use hostmon_common::types::MonitorMode;
///
/// let mode: MonitorMode = "Host".parse().unwrap();
/// assert_eq!(mode, MonitorMode::Host);
/// assert_eq!(mode.to_string(), "host");
/// assert!("vm".parse::<MonitorMode>().is_err());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MonitorMode {
    #[default]
    Container,
    Host,
}

impl std::fmt::Display for MonitorMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MonitorMode::Container => write!(f, "container"),
            MonitorMode::Host => write!(f, "host"),
        }
    }
}

impl std::str::FromStr for MonitorMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "container" => Ok(MonitorMode::Container),
            "host" => Ok(MonitorMode::Host),
            _ => Err(format!("unknown monitor mode: {s}")),
        }
    }
}

/// Resource usage of a single process, used for top-N rankings.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessUsage {
    pub pid: u32,
    pub name: String,
    pub cpu_percent: f32,
    pub memory_bytes: u64,
    pub memory_percent: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CpuSample {
    pub captured_at: DateTime<Utc>,
    pub usage_percent: f32,
    pub core_count: usize,
    pub per_core_percent: Vec<f32>,
    pub top_processes: Vec<ProcessUsage>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MemorySample {
    pub captured_at: DateTime<Utc>,
    pub total_bytes: u64,
    pub used_bytes: u64,
    pub available_bytes: u64,
    pub used_percent: f64,
    pub top_processes: Vec<ProcessUsage>,
}

/// Cumulative I/O counters of one block device since boot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiskDeviceIo {
    pub name: String,
    pub read_bytes: u64,
    pub write_bytes: u64,
    pub read_count: u64,
    pub write_count: u64,
}

/// Cumulative disk I/O since boot, summed over whole disks.
#[derive(Debug, Clone, PartialEq)]
pub struct DiskSample {
    pub captured_at: DateTime<Utc>,
    pub read_bytes: u64,
    pub write_bytes: u64,
    pub read_count: u64,
    pub write_count: u64,
    pub devices: Vec<DiskDeviceIo>,
}

/// Cumulative network counters since boot, summed over all interfaces.
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkSample {
    pub captured_at: DateTime<Utc>,
    pub bytes_sent: u64,
    pub bytes_recv: u64,
    pub packets_sent: u64,
    pub packets_recv: u64,
    pub interface_count: usize,
}

/// Outcome of a single reachability probe.
///
/// An unreachable target is a normal result (`reachable == false`), not an
/// error.
#[derive(Debug, Clone, PartialEq)]
pub struct PingResult {
    pub captured_at: DateTime<Utc>,
    pub host: String,
    pub reachable: bool,
    pub latency_ms: Option<f64>,
    pub raw_output: String,
}

/// One reading produced during a cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum Sample {
    Cpu(CpuSample),
    Memory(MemorySample),
    Disk(DiskSample),
    Network(NetworkSample),
    Ping(PingResult),
}

impl Sample {
    /// Category the sample is routed to. Ping results share the network log.
    pub fn category(&self) -> Category {
        match self {
            Sample::Cpu(_) => Category::Cpu,
            Sample::Memory(_) => Category::Memory,
            Sample::Disk(_) => Category::Disk,
            Sample::Network(_) | Sample::Ping(_) => Category::Network,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_file_stems_are_distinct() {
        let stems: std::collections::HashSet<&str> =
            Category::ALL.iter().map(|c| c.file_stem()).collect();
        assert_eq!(stems.len(), Category::ALL.len());
        assert_eq!(Category::Network.label(), "Network");
    }

    #[test]
    fn test_ping_routes_to_network() {
        let sample = Sample::Ping(PingResult {
            captured_at: Utc::now(),
            host: "127.0.0.1".to_string(),
            reachable: true,
            latency_ms: Some(0.1),
            raw_output: String::new(),
        });
        assert_eq!(sample.category(), Category::Network);
    }

    #[test]
    fn test_level_renders_uppercase() {
        assert_eq!(Level::Info.to_string(), "INFO");
        assert_eq!(Level::Warning.to_string(), "WARNING");
        assert_eq!(Level::Error.to_string(), "ERROR");
        assert!(Level::Error > Level::Warning);
    }

    #[test]
    fn test_mode_parse_is_case_insensitive() {
        assert_eq!(" CONTAINER ".parse::<MonitorMode>(), Ok(MonitorMode::Container));
        assert_eq!(MonitorMode::default(), MonitorMode::Container);
    }
}
