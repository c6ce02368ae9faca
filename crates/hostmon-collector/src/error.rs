use hostmon_common::types::Category;
use std::time::Duration;

/// Errors raised by a [`Sampler`](crate::Sampler).
///
/// # Examples
///
/// ```rust
/// use hostmon_collector::error::SamplerError;
/// use hostmon_common::types::Category;
///
/// let err = SamplerError::unavailable(Category::Disk, "no block devices");
/// assert!(err.to_string().contains("no block devices"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum SamplerError {
    /// The OS interface backing the sampler is absent, unreadable, or empty.
    #[error("{} sampler unavailable: {reason}", sampler.label())]
    Unavailable { sampler: Category, reason: String },
}

impl SamplerError {
    pub fn unavailable(sampler: Category, reason: impl Into<String>) -> Self {
        SamplerError::Unavailable {
            sampler,
            reason: reason.into(),
        }
    }

    pub fn sampler(&self) -> Category {
        match self {
            SamplerError::Unavailable { sampler, .. } => *sampler,
        }
    }
}

/// A reachability probe that could not produce a result.
///
/// Distinct from an unreachable target, which is a successful probe with
/// `reachable == false`.
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    /// The ping program could not be started.
    #[error("failed to launch '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The ping program did not finish within the deadline.
    #[error("ping to {host} timed out after {}ms", timeout.as_millis())]
    Timeout { host: String, timeout: Duration },

    /// Waiting on the ping program failed after it started.
    #[error("ping to {host} failed: {source}")]
    Io {
        host: String,
        #[source]
        source: std::io::Error,
    },
}
