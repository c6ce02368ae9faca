//! Category-specific message bodies. The leading words of each message
//! (`CPU Usage:`, `Memory:`, `Disk I/O:`, `Network:`, `Ping to`) are what
//! `grep`-based consumers key on.

use hostmon_collector::{ProbeError, SamplerError};
use hostmon_common::types::{
    CpuSample, DiskSample, MemorySample, NetworkSample, PingResult, ProcessUsage, Sample,
};
use std::borrow::Cow;

const GB: f64 = 1024.0 * 1024.0 * 1024.0;
const MB: f64 = 1024.0 * 1024.0;

fn gb(bytes: u64) -> f64 {
    bytes as f64 / GB
}

fn mb(bytes: u64) -> f64 {
    bytes as f64 / MB
}

/// Escapes control characters (`\n` becomes the two characters `\` `n`) so
/// that names taken from the system cannot split or forge log lines.
pub fn escape_controls(text: &str) -> Cow<'_, str> {
    if !text.chars().any(char::is_control) {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len() + 8);
    for c in text.chars() {
        if c.is_control() {
            out.extend(c.escape_default());
        } else {
            out.push(c);
        }
    }
    Cow::Owned(out)
}

pub fn sample_message(sample: &Sample) -> String {
    match sample {
        Sample::Cpu(s) => cpu_message(s),
        Sample::Memory(s) => memory_message(s),
        Sample::Disk(s) => disk_message(s),
        Sample::Network(s) => network_message(s),
        Sample::Ping(s) => ping_message(s),
    }
}

pub fn cpu_message(s: &CpuSample) -> String {
    let per_core: Vec<String> = s
        .per_core_percent
        .iter()
        .map(|p| format!("{p:.1}"))
        .collect();
    let mut msg = format!(
        "CPU Usage: {:.1}% | Cores: {} | Per-core: [{}]",
        s.usage_percent,
        s.core_count,
        per_core.join(", ")
    );
    if !s.top_processes.is_empty() {
        let top: Vec<String> = s
            .top_processes
            .iter()
            .map(|p| {
                format!(
                    "{} ({}) {:.1}%",
                    escape_controls(&p.name),
                    p.pid,
                    p.cpu_percent
                )
            })
            .collect();
        msg.push_str(&top_suffix(&s.top_processes, &top));
    }
    msg
}

pub fn memory_message(s: &MemorySample) -> String {
    let mut msg = format!(
        "Memory: {:.2}/{:.2} GB | {:.1}% | Available: {:.2} GB",
        gb(s.used_bytes),
        gb(s.total_bytes),
        s.used_percent,
        gb(s.available_bytes)
    );
    if !s.top_processes.is_empty() {
        let top: Vec<String> = s
            .top_processes
            .iter()
            .map(|p| {
                format!(
                    "{} ({}) {:.2} MB ({:.1}%)",
                    escape_controls(&p.name),
                    p.pid,
                    mb(p.memory_bytes),
                    p.memory_percent
                )
            })
            .collect();
        msg.push_str(&top_suffix(&s.top_processes, &top));
    }
    msg
}

fn top_suffix(procs: &[ProcessUsage], rendered: &[String]) -> String {
    format!(" | Top {}: {}", procs.len(), rendered.join(", "))
}

pub fn disk_message(s: &DiskSample) -> String {
    let mut msg = format!(
        "Disk I/O: Read {:.2} MB ({} ops) | Write {:.2} MB ({} ops)",
        mb(s.read_bytes),
        s.read_count,
        mb(s.write_bytes),
        s.write_count
    );
    for dev in &s.devices {
        msg.push_str(&format!(
            " | {}: R {:.2} MB W {:.2} MB",
            escape_controls(&dev.name),
            mb(dev.read_bytes),
            mb(dev.write_bytes)
        ));
    }
    msg
}

pub fn network_message(s: &NetworkSample) -> String {
    format!(
        "Network: Sent {:.2} MB ({} pkts) | Recv {:.2} MB ({} pkts) | Interfaces: {}",
        mb(s.bytes_sent),
        s.packets_sent,
        mb(s.bytes_recv),
        s.packets_recv,
        s.interface_count
    )
}

pub fn ping_message(s: &PingResult) -> String {
    let host = escape_controls(&s.host);
    match (s.reachable, s.latency_ms) {
        (true, Some(ms)) => format!("Ping to {host}: {ms:.1} ms - SUCCESS"),
        (true, None) => format!("Ping to {host}: latency unknown - SUCCESS"),
        (false, _) => format!("Ping to {host}: no reply - FAILED"),
    }
}

pub fn sampler_failure_message(err: &SamplerError) -> String {
    escape_controls(&err.to_string()).into_owned()
}

pub fn probe_failure_message(host: &str, err: &ProbeError) -> String {
    let msg = format!("Ping to {host}: ERROR - {err}");
    escape_controls(&msg).into_owned()
}
