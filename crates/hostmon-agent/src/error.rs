use std::path::PathBuf;

/// Invalid or unreadable run configuration.
///
/// # Examples
///
/// ```rust
/// use hostmon_agent::error::ConfigError;
///
/// let err = ConfigError::Invalid {
///     key: "MONITOR_INTERVAL".to_string(),
///     value: "-1".to_string(),
///     reason: "must be positive".to_string(),
/// };
/// assert!(err.to_string().contains("MONITOR_INTERVAL"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config: invalid value '{value}' for {key}: {reason}")]
    Invalid {
        key: String,
        value: String,
        reason: String,
    },

    #[error("Config: cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Config: TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

/// A log sink could not be opened, written or rotated.
///
/// Recoverable: the router reports it and keeps going.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("Sink: cannot open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Sink: write to {} failed: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Sink: rotation of {} failed: {source}", path.display())]
    Rotate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Fatal conditions raised before the scheduler enters its loop.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("Startup: cannot create log directory {}: {source}", path.display())]
    CreateLogDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Startup: log directory {} is not writable: {source}", path.display())]
    LogDirNotWritable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Startup: {0}")]
    Sink(#[from] SinkError),

    #[error("Startup: {0}")]
    Config(#[from] ConfigError),
}
