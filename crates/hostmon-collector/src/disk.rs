use crate::error::SamplerError;
use crate::Sampler;
use chrono::Utc;
use hostmon_common::types::{Category, DiskDeviceIo, DiskSample, Sample};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

const DEFAULT_DISKSTATS: &str = "/proc/diskstats";
const SECTOR_SIZE: u64 = 512;

/// Virtual devices whose I/O is already counted on the backing disk.
const SKIPPED_PREFIXES: &[&str] = &["loop", "ram", "zram", "dm-", "md"];

/// Reads cumulative block device counters from a `diskstats` table.
pub struct DiskSampler {
    source: PathBuf,
}

impl DiskSampler {
    pub fn new() -> Self {
        Self::with_source(DEFAULT_DISKSTATS)
    }

    /// Reads from an alternate `diskstats` file, e.g. a host procfs mount.
    pub fn with_source(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
        }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }
}

impl Default for DiskSampler {
    fn default() -> Self {
        Self::new()
    }
}

impl Sampler for DiskSampler {
    fn category(&self) -> Category {
        Category::Disk
    }

    fn sample(&mut self) -> Result<Sample, SamplerError> {
        let raw = std::fs::read_to_string(&self.source).map_err(|e| {
            SamplerError::unavailable(
                Category::Disk,
                format!("cannot read {}: {e}", self.source.display()),
            )
        })?;

        let devices = parse_diskstats(&raw);
        if devices.is_empty() {
            return Err(SamplerError::unavailable(
                Category::Disk,
                format!("no block devices in {}", self.source.display()),
            ));
        }

        let mut sample = DiskSample {
            captured_at: Utc::now(),
            read_bytes: 0,
            write_bytes: 0,
            read_count: 0,
            write_count: 0,
            devices: Vec::new(),
        };
        for dev in &devices {
            sample.read_bytes = sample.read_bytes.saturating_add(dev.read_bytes);
            sample.write_bytes = sample.write_bytes.saturating_add(dev.write_bytes);
            sample.read_count = sample.read_count.saturating_add(dev.read_count);
            sample.write_count = sample.write_count.saturating_add(dev.write_count);
        }
        sample.devices = devices;

        Ok(Sample::Disk(sample))
    }
}

/// Parses whole-disk rows out of a `/proc/diskstats` table.
///
/// Columns: major, minor, name, reads completed, reads merged, sectors read,
/// ms reading, writes completed, writes merged, sectors written, ...
pub fn parse_diskstats(raw: &str) -> Vec<DiskDeviceIo> {
    let mut rows = Vec::new();
    for line in raw.lines() {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 10 {
            continue;
        }
        let name = parts[2];
        if SKIPPED_PREFIXES.iter().any(|p| name.starts_with(p)) {
            continue;
        }
        let field = |idx: usize| parts[idx].parse::<u64>().ok();
        let (Some(reads), Some(sectors_read), Some(writes), Some(sectors_written)) =
            (field(3), field(5), field(7), field(9))
        else {
            continue;
        };
        rows.push(DiskDeviceIo {
            name: name.to_string(),
            read_bytes: sectors_read.saturating_mul(SECTOR_SIZE),
            write_bytes: sectors_written.saturating_mul(SECTOR_SIZE),
            read_count: reads,
            write_count: writes,
        });
    }

    let names: HashSet<String> = rows.iter().map(|r| r.name.clone()).collect();
    rows.retain(|r| parent_disk(&r.name).map_or(true, |p| !names.contains(p)));
    rows
}

/// Name of the disk a partition belongs to, if the name looks like one:
/// `sda1` -> `sda`, `nvme0n1p2` -> `nvme0n1`, `mmcblk0p1` -> `mmcblk0`.
fn parent_disk(name: &str) -> Option<&str> {
    let stem = name.trim_end_matches(|c: char| c.is_ascii_digit());
    if stem.len() == name.len() || stem.is_empty() {
        return None;
    }
    let stem = match stem.strip_suffix('p') {
        Some(s) if s.ends_with(|c: char| c.is_ascii_digit()) => s,
        _ => stem,
    };
    Some(stem)
}
