use crate::error::ProbeError;
use async_trait::async_trait;
use chrono::Utc;
use hostmon_common::types::PingResult;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// A single-shot reachability check against a fixed target.
#[async_trait]
pub trait Prober: Send + Sync {
    /// Host name or address being probed.
    fn target(&self) -> &str;

    /// Sends one echo request.
    ///
    /// An unreachable target yields `Ok` with `reachable == false`.
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError`] if the probe itself could not run to completion.
    async fn probe(&self) -> Result<PingResult, ProbeError>;
}

/// Probes a host by running the system `ping` utility once.
pub struct PingProber {
    host: String,
    program: String,
    timeout: Duration,
}

impl PingProber {
    pub fn new(host: impl Into<String>, timeout: Duration) -> Self {
        Self {
            host: host.into(),
            program: "ping".to_string(),
            timeout,
        }
    }

    /// Overrides the executable used to send the echo request.
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Seconds `ping` itself waits for a reply, leaving headroom under the
    /// hard deadline.
    fn reply_wait_secs(&self) -> u64 {
        self.timeout.as_secs().saturating_sub(1).max(1)
    }
}

#[async_trait]
impl Prober for PingProber {
    fn target(&self) -> &str {
        &self.host
    }

    async fn probe(&self) -> Result<PingResult, ProbeError> {
        let child = Command::new(&self.program)
            .arg("-c")
            .arg("1")
            .arg("-W")
            .arg(self.reply_wait_secs().to_string())
            .arg(&self.host)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| ProbeError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(source)) => {
                return Err(ProbeError::Io {
                    host: self.host.clone(),
                    source,
                })
            }
            Err(_) => {
                return Err(ProbeError::Timeout {
                    host: self.host.clone(),
                    timeout: self.timeout,
                })
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout);
        let raw_output = if stdout.trim().is_empty() {
            String::from_utf8_lossy(&output.stderr).trim().to_string()
        } else {
            stdout.trim().to_string()
        };
        let reachable = output.status.success();
        let latency_ms = if reachable {
            parse_latency_ms(&raw_output)
        } else {
            None
        };

        tracing::debug!(
            host = %self.host,
            reachable,
            latency_ms = ?latency_ms,
            "Probe finished"
        );

        Ok(PingResult {
            captured_at: Utc::now(),
            host: self.host.clone(),
            reachable,
            latency_ms,
            raw_output,
        })
    }
}

/// Extracts the round-trip time from `ping` output (`time=12.3 ms`,
/// `time=0.045ms` or `time<1ms`).
pub fn parse_latency_ms(output: &str) -> Option<f64> {
    output.lines().find_map(|line| {
        let idx = line.find("time=").or_else(|| line.find("time<"))?;
        let rest = &line[idx + 5..];
        let value: String = rest
            .chars()
            .take_while(|c| c.is_ascii_digit() || *c == '.')
            .collect();
        value.parse::<f64>().ok()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const LINUX_OUTPUT: &str = "\
PING 8.8.8.8 (8.8.8.8) 56(84) bytes of data.
64 bytes from 8.8.8.8: icmp_seq=1 ttl=117 time=12.3 ms

--- 8.8.8.8 ping statistics ---
1 packets transmitted, 1 received, 0% packet loss, time 0ms
rtt min/avg/max/mdev = 12.300/12.300/12.300/0.000 ms";

    #[test]
    fn test_parse_latency_linux() {
        assert_eq!(parse_latency_ms(LINUX_OUTPUT), Some(12.3));
    }

    #[test]
    fn test_parse_latency_compact_and_sub_ms() {
        assert_eq!(
            parse_latency_ms("64 bytes from ::1: icmp_seq=1 ttl=64 time=0.045ms"),
            Some(0.045)
        );
        assert_eq!(parse_latency_ms("Reply from 10.0.0.1: bytes=32 time<1ms TTL=64"), Some(1.0));
    }

    #[test]
    fn test_parse_latency_ignores_summary_time() {
        // "time 0ms" in the statistics line has no '=' and must not match.
        assert_eq!(
            parse_latency_ms("1 packets transmitted, 0 received, 100% packet loss, time 0ms"),
            None
        );
    }

    #[test]
    fn test_reply_wait_leaves_headroom() {
        assert_eq!(PingProber::new("h", Duration::from_secs(2)).reply_wait_secs(), 1);
        assert_eq!(PingProber::new("h", Duration::from_secs(5)).reply_wait_secs(), 4);
        assert_eq!(PingProber::new("h", Duration::from_millis(300)).reply_wait_secs(), 1);
    }

    #[tokio::test]
    async fn test_missing_program_is_probe_failure() {
        let prober = PingProber::new("127.0.0.1", Duration::from_secs(2))
            .with_program("hostmon-no-such-ping-binary");
        let err = prober.probe().await.unwrap_err();
        assert!(matches!(err, ProbeError::Spawn { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_nonzero_exit_is_unreachable_not_error() {
        // `false` ignores its arguments and exits 1, like ping with no reply.
        let prober = PingProber::new("192.0.2.1", Duration::from_secs(2)).with_program("false");
        let result = prober.probe().await.expect("unreachable is not an error");
        assert!(!result.reachable);
        assert_eq!(result.latency_ms, None);
        assert_eq!(result.host, "192.0.2.1");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_success_exit_is_reachable() {
        let prober = PingProber::new("127.0.0.1", Duration::from_secs(2)).with_program("true");
        let result = prober.probe().await.unwrap();
        assert!(result.reachable);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_hung_program_times_out() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("slow-ping");
        std::fs::write(&script, "#!/bin/sh\nsleep 5\n").unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let prober = PingProber::new("127.0.0.1", Duration::from_millis(300))
            .with_program(script.to_string_lossy());
        let started = std::time::Instant::now();
        let err = prober.probe().await.unwrap_err();
        assert!(matches!(err, ProbeError::Timeout { .. }));
        assert!(started.elapsed() < Duration::from_secs(3));
    }
}
