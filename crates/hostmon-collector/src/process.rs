use hostmon_common::types::ProcessUsage;
use std::cmp::Ordering;
use sysinfo::System;

fn usage_of(system: &System, total_memory: u64) -> Vec<ProcessUsage> {
    system
        .processes()
        .values()
        .map(|proc_| {
            let memory_bytes = proc_.memory();
            let memory_percent = if total_memory > 0 {
                (memory_bytes as f64 / total_memory as f64) * 100.0
            } else {
                0.0
            };
            ProcessUsage {
                pid: proc_.pid().as_u32(),
                name: proc_.name().to_string_lossy().into_owned(),
                cpu_percent: proc_.cpu_usage(),
                memory_bytes,
                memory_percent,
            }
        })
        .collect()
}

/// Top `n` processes by CPU usage since the previous process refresh.
pub fn top_by_cpu(system: &System, n: usize) -> Vec<ProcessUsage> {
    if n == 0 {
        return Vec::new();
    }
    let mut procs = usage_of(system, system.total_memory());
    rank(&mut procs, |a, b| {
        b.cpu_percent
            .partial_cmp(&a.cpu_percent)
            .unwrap_or(Ordering::Equal)
    });
    procs.truncate(n);
    procs
}

/// Top `n` processes by resident memory.
pub fn top_by_memory(system: &System, n: usize, total_memory: u64) -> Vec<ProcessUsage> {
    if n == 0 {
        return Vec::new();
    }
    let mut procs = usage_of(system, total_memory);
    rank(&mut procs, |a, b| b.memory_bytes.cmp(&a.memory_bytes));
    procs.truncate(n);
    procs
}

// Ties broken by pid so the ranking is stable across cycles.
fn rank<F>(procs: &mut [ProcessUsage], by: F)
where
    F: Fn(&ProcessUsage, &ProcessUsage) -> Ordering,
{
    procs.sort_by(|a, b| by(a, b).then_with(|| a.pid.cmp(&b.pid)));
}
