//! Size-bounded, append-only log file with a ring of numbered backups.
//!
//! The active file is `<path>`; backups are `<path>.1` (newest) through
//! `<path>.<backup_count>` (oldest). Rotation happens before a write that
//! would push the active file past `max_bytes`, so the on-disk footprint stays
//! within `max_bytes * (1 + backup_count)` unless a single line is larger than
//! `max_bytes`.

use crate::error::SinkError;
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotationPolicy {
    pub max_bytes: u64,
    pub backup_count: usize,
}

impl Default for RotationPolicy {
    fn default() -> Self {
        Self {
            max_bytes: 10 * 1024 * 1024,
            backup_count: 5,
        }
    }
}

pub struct RotatingFile {
    path: PathBuf,
    policy: RotationPolicy,
    file: Option<File>,
    size: u64,
}

impl RotatingFile {
    /// Opens `path` for appending, creating it if needed.
    pub fn open(path: impl Into<PathBuf>, policy: RotationPolicy) -> Result<Self, SinkError> {
        let path = path.into();
        let file = open_append(&path)?;
        let size = file.metadata().map(|m| m.len()).unwrap_or(0);
        Ok(Self {
            path,
            policy,
            file: Some(file),
            size,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Bytes currently in the active file, as tracked by this writer.
    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn backup_path(&self, index: usize) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(format!(".{index}"));
        PathBuf::from(name)
    }

    /// Appends `line` plus a newline, rotating first if needed.
    ///
    /// A failed write drops the handle; the next call reopens the file.
    pub fn write_line(&mut self, line: &str) -> Result<(), SinkError> {
        let len = line.len() as u64 + 1;
        if self.should_rotate(len) {
            self.rotate()?;
        }

        if self.file.is_none() {
            let file = open_append(&self.path)?;
            self.size = file.metadata().map(|m| m.len()).unwrap_or(0);
            self.file = Some(file);
        }

        let mut buf = Vec::with_capacity(line.len() + 1);
        buf.extend_from_slice(line.as_bytes());
        buf.push(b'\n');

        let result = match self.file.as_mut() {
            Some(file) => file.write_all(&buf),
            None => Ok(()),
        };
        match result {
            Ok(()) => {
                self.size += len;
                Ok(())
            }
            Err(source) => {
                self.file = None;
                Err(SinkError::Write {
                    path: self.path.clone(),
                    source,
                })
            }
        }
    }

    fn should_rotate(&self, incoming: u64) -> bool {
        self.size > 0 && self.size + incoming > self.policy.max_bytes
    }

    /// Shifts the backup ring by one and starts a fresh active file.
    pub fn rotate(&mut self) -> Result<(), SinkError> {
        if let Some(mut file) = self.file.take() {
            let _ = file.flush();
        }

        let rotate_err = |source| SinkError::Rotate {
            path: self.path.clone(),
            source,
        };

        if self.policy.backup_count > 0 {
            let oldest = self.backup_path(self.policy.backup_count);
            match fs::remove_file(&oldest) {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(rotate_err(e)),
            }
            for index in (1..self.policy.backup_count).rev() {
                let src = self.backup_path(index);
                if src.exists() {
                    fs::rename(&src, self.backup_path(index + 1)).map_err(rotate_err)?;
                }
            }
            match fs::rename(&self.path, self.backup_path(1)) {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(rotate_err(e)),
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&self.path)
            .map_err(|source| SinkError::Open {
                path: self.path.clone(),
                source,
            })?;
        self.file = Some(file);
        self.size = 0;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), SinkError> {
        if let Some(file) = self.file.as_mut() {
            file.flush().map_err(|source| SinkError::Write {
                path: self.path.clone(),
                source,
            })?;
        }
        Ok(())
    }

    /// Flushes and releases the file handle.
    pub fn close(&mut self) -> Result<(), SinkError> {
        let result = self.flush();
        if let Some(file) = self.file.take() {
            let _ = file.sync_all();
        }
        result
    }
}

fn open_append(path: &Path) -> Result<File, SinkError> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| SinkError::Open {
            path: path.to_path_buf(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_policy(max_bytes: u64, backup_count: usize) -> RotationPolicy {
        RotationPolicy {
            max_bytes,
            backup_count,
        }
    }

    #[test]
    fn test_appends_to_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cpu.log");
        std::fs::write(&path, "old\n").unwrap();

        let mut sink = RotatingFile::open(&path, small_policy(1024, 2)).unwrap();
        assert_eq!(sink.size(), 4);
        sink.write_line("new").unwrap();
        sink.close().unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "old\nnew\n");
    }

    #[test]
    fn test_rotates_before_exceeding_max() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cpu.log");
        let mut sink = RotatingFile::open(&path, small_policy(20, 2)).unwrap();

        sink.write_line("aaaaaaaaa").unwrap(); // 10 bytes
        sink.write_line("bbbbbbbbb").unwrap(); // 20 bytes, exactly at max
        sink.write_line("ccccccccc").unwrap(); // would exceed: rotate first
        sink.close().unwrap();

        assert_eq!(
            std::fs::read_to_string(sink.backup_path(1)).unwrap(),
            "aaaaaaaaa\nbbbbbbbbb\n"
        );
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "ccccccccc\n");
        assert!(!sink.backup_path(2).exists());
    }

    #[test]
    fn test_ring_evicts_oldest_backup() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("net.log");
        let policy = small_policy(10, 2);
        let mut sink = RotatingFile::open(&path, policy).unwrap();

        // Each line fills a whole file, so every write after the first rotates.
        for i in 0..6 {
            sink.write_line(&format!("line-{i:03}")).unwrap();
        }
        sink.close().unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "line-005\n");
        assert_eq!(
            std::fs::read_to_string(sink.backup_path(1)).unwrap(),
            "line-004\n"
        );
        assert_eq!(
            std::fs::read_to_string(sink.backup_path(2)).unwrap(),
            "line-003\n"
        );
        assert!(!sink.backup_path(3).exists());

        let files = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(files, 1 + policy.backup_count);
    }

    #[test]
    fn test_footprint_stays_bounded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("disk.log");
        let policy = small_policy(100, 3);
        let mut sink = RotatingFile::open(&path, policy).unwrap();

        for i in 0..200 {
            sink.write_line(&format!("sample {i}")).unwrap();
        }
        sink.close().unwrap();

        let total: u64 = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().metadata().unwrap().len())
            .sum();
        assert!(total <= policy.max_bytes * (1 + policy.backup_count as u64));
        assert!(sink.backup_path(3).exists());
        assert!(!sink.backup_path(4).exists());
    }

    #[test]
    fn test_zero_backups_truncates_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mem.log");
        let mut sink = RotatingFile::open(&path, small_policy(8, 0)).unwrap();

        sink.write_line("first").unwrap();
        sink.write_line("second").unwrap();
        sink.close().unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "second\n");
        assert!(!sink.backup_path(1).exists());
    }

    #[test]
    fn test_oversized_line_goes_to_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.log");
        let mut sink = RotatingFile::open(&path, small_policy(4, 1)).unwrap();

        sink.write_line("much longer than four bytes").unwrap();
        sink.close().unwrap();

        assert!(!sink.backup_path(1).exists());
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "much longer than four bytes\n"
        );
    }

    #[test]
    fn test_default_policy_rotation_preserves_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("monitor-container.log");
        let mut sink = RotatingFile::open(&path, RotationPolicy::default()).unwrap();

        let line = "x".repeat(1023);
        let mut written = String::new();
        while (written.len() as u64) < RotationPolicy::default().max_bytes {
            sink.write_line(&line).unwrap();
            written.push_str(&line);
            written.push('\n');
        }
        assert!(!sink.backup_path(1).exists());

        sink.write_line("after rotation").unwrap();
        sink.close().unwrap();

        let backup = std::fs::read_to_string(sink.backup_path(1)).unwrap();
        assert_eq!(backup, written);
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "after rotation\n"
        );
        assert!(sink.size() < 1024);
    }

    #[test]
    fn test_write_reopens_after_handle_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cpu.log");
        let mut sink = RotatingFile::open(&path, small_policy(1024, 1)).unwrap();
        sink.write_line("one").unwrap();
        sink.close().unwrap();

        sink.write_line("two").unwrap();
        sink.close().unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "one\ntwo\n");
    }
}
