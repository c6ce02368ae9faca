use crate::error::ConfigError;
use crate::sink::RotationPolicy;
use hostmon_common::types::MonitorMode;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Immutable run configuration, resolved once at startup.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RunConfig {
    /// Label only: selects the file name suffix, never the sampling logic.
    #[serde(default)]
    pub mode: MonitorMode,
    /// Seconds between cycle starts. Fractions are allowed.
    #[serde(default = "default_interval_secs")]
    pub interval_secs: f64,
    #[serde(default = "default_ping_host")]
    pub ping_host: String,
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,
    /// Mirror the combined log to stdout
    #[serde(default = "default_console_output")]
    pub console_output: bool,
    /// Processes listed in CPU and memory lines; 0 disables the ranking
    #[serde(default = "default_process_count")]
    pub process_count: usize,
    #[serde(default = "default_max_log_bytes")]
    pub max_log_bytes: u64,
    #[serde(default = "default_log_backup_count")]
    pub log_backup_count: usize,
    #[serde(default = "default_ping_timeout_secs")]
    pub ping_timeout_secs: f64,
    #[serde(default = "default_cpu_window_ms")]
    pub cpu_window_ms: u64,
}

fn default_interval_secs() -> f64 {
    5.0
}

fn default_ping_host() -> String {
    "8.8.8.8".to_string()
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("/var/log/monitor")
}

fn default_console_output() -> bool {
    true
}

fn default_process_count() -> usize {
    5
}

fn default_max_log_bytes() -> u64 {
    10 * 1024 * 1024
}

fn default_log_backup_count() -> usize {
    5
}

fn default_ping_timeout_secs() -> f64 {
    2.0
}

fn default_cpu_window_ms() -> u64 {
    500
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            mode: MonitorMode::default(),
            interval_secs: default_interval_secs(),
            ping_host: default_ping_host(),
            log_dir: default_log_dir(),
            console_output: default_console_output(),
            process_count: default_process_count(),
            max_log_bytes: default_max_log_bytes(),
            log_backup_count: default_log_backup_count(),
            ping_timeout_secs: default_ping_timeout_secs(),
            cpu_window_ms: default_cpu_window_ms(),
        }
    }
}

impl RunConfig {
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: PathBuf::from(path),
            source,
        })?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Resolves the configuration from an optional TOML file plus process
    /// environment overrides, then validates it.
    pub fn resolve(path: Option<&str>) -> Result<Self, ConfigError> {
        let base = match path {
            Some(p) => Self::load(p)?,
            None => Self::default(),
        };
        let config = base.with_env_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Applies `MONITOR_*`-style overrides read through `lookup`.
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("MONITOR_MODE") {
            self.mode = v.parse().map_err(|reason| invalid("MONITOR_MODE", &v, reason))?;
        }
        if let Some(v) = get("MONITOR_INTERVAL") {
            self.interval_secs = parse_number("MONITOR_INTERVAL", &v)?;
        }
        if let Some(v) = get("PING_HOST") {
            self.ping_host = v.trim().to_string();
        }
        if let Some(v) = get("LOG_DIR") {
            self.log_dir = PathBuf::from(v);
        }
        if let Some(v) = get("CONSOLE_OUTPUT") {
            self.console_output = parse_bool("CONSOLE_OUTPUT", &v)?;
        }
        if let Some(v) = get("PROCESS_COUNT") {
            self.process_count = parse_number("PROCESS_COUNT", &v)?;
        }
        if let Some(v) = get("LOG_MAX_BYTES") {
            self.max_log_bytes = parse_number("LOG_MAX_BYTES", &v)?;
        }
        if let Some(v) = get("LOG_BACKUP_COUNT") {
            self.log_backup_count = parse_number("LOG_BACKUP_COUNT", &v)?;
        }
        if let Some(v) = get("PING_TIMEOUT_SECS") {
            self.ping_timeout_secs = parse_number("PING_TIMEOUT_SECS", &v)?;
        }
        if let Some(v) = get("CPU_SAMPLE_MS") {
            self.cpu_window_ms = parse_number("CPU_SAMPLE_MS", &v)?;
        }
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        positive_duration("interval_secs", self.interval_secs)?;
        positive_duration("ping_timeout_secs", self.ping_timeout_secs)?;
        if self.ping_host.trim().is_empty() {
            return Err(invalid("ping_host", "", "must not be empty"));
        }
        if self.max_log_bytes == 0 {
            return Err(invalid("max_log_bytes", "0", "must be greater than zero"));
        }
        if self.log_dir.as_os_str().is_empty() {
            return Err(invalid("log_dir", "", "must not be empty"));
        }
        Ok(())
    }

    /// Sampling interval. Out-of-range values saturate; `validate` rejects them.
    pub fn interval(&self) -> Duration {
        saturating_duration(self.interval_secs)
    }

    pub fn ping_timeout(&self) -> Duration {
        saturating_duration(self.ping_timeout_secs)
    }

    pub fn cpu_window(&self) -> Duration {
        Duration::from_millis(self.cpu_window_ms)
    }

    pub fn rotation(&self) -> RotationPolicy {
        RotationPolicy {
            max_bytes: self.max_log_bytes,
            backup_count: self.log_backup_count,
        }
    }
}

fn invalid(key: &str, value: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

/// Converts seconds to a non-zero [`Duration`], rejecting NaN, negative,
/// overflowing and sub-nanosecond values.
fn positive_duration(key: &str, secs: f64) -> Result<Duration, ConfigError> {
    match Duration::try_from_secs_f64(secs) {
        Ok(d) if !d.is_zero() => Ok(d),
        Ok(_) => Err(invalid(key, &secs.to_string(), "must be a positive number of seconds")),
        Err(e) => Err(invalid(key, &secs.to_string(), e.to_string())),
    }
}

fn saturating_duration(secs: f64) -> Duration {
    match Duration::try_from_secs_f64(secs) {
        Ok(d) => d,
        Err(_) if secs > 0.0 => Duration::MAX,
        Err(_) => Duration::ZERO,
    }
}

fn parse_number<T>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse::<T>()
        .map_err(|e| invalid(key, value, e.to_string()))
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(invalid(key, value, "expected true or false")),
    }
}
