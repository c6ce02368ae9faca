use crate::error::SinkError;
use crate::format::escape_controls;
use crate::sink::{RotatingFile, RotationPolicy};
use chrono::{DateTime, Local};
use hostmon_common::types::{Category, Level, MonitorMode};
use std::io::Write;
use std::path::{Path, PathBuf};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S,%3f";

/// Renders one log line: `<timestamp> - <LEVEL> - <message>`. Control
/// characters in `message` are escaped so a record is always one line.
pub fn format_line(at: DateTime<Local>, level: Level, message: &str) -> String {
    format!(
        "{} - {level} - {}",
        at.format(TIMESTAMP_FORMAT),
        escape_controls(message)
    )
}

/// Path of a category's active log file for the given mode.
pub fn log_path(dir: &Path, category: Category, mode: MonitorMode) -> PathBuf {
    dir.join(format!("{}-{mode}.log", category.file_stem()))
}

/// Owns the five category sinks and routes every line to the combined sink
/// and, for non-combined categories, to the category's own sink.
pub struct LogRouter {
    combined: RotatingFile,
    cpu: RotatingFile,
    memory: RotatingFile,
    disk: RotatingFile,
    network: RotatingFile,
    console: Option<Box<dyn Write + Send>>,
    failed_writes: u64,
}

impl LogRouter {
    /// Opens (or creates) all five sinks under `dir`.
    pub fn open(
        dir: &Path,
        mode: MonitorMode,
        policy: RotationPolicy,
        console_output: bool,
    ) -> Result<Self, SinkError> {
        let open = |category| RotatingFile::open(log_path(dir, category, mode), policy);
        let console: Option<Box<dyn Write + Send>> = if console_output {
            Some(Box::new(std::io::stdout()))
        } else {
            None
        };
        Ok(Self {
            combined: open(Category::Combined)?,
            cpu: open(Category::Cpu)?,
            memory: open(Category::Memory)?,
            disk: open(Category::Disk)?,
            network: open(Category::Network)?,
            console,
            failed_writes: 0,
        })
    }

    /// Replaces the console mirror target.
    pub fn with_console_writer(mut self, writer: Box<dyn Write + Send>) -> Self {
        self.console = Some(writer);
        self
    }

    pub fn path(&self, category: Category) -> &Path {
        self.sink(category).path()
    }

    /// Total sink writes that failed since the router was opened.
    pub fn failed_writes(&self) -> u64 {
        self.failed_writes
    }

    fn sink(&self, category: Category) -> &RotatingFile {
        match category {
            Category::Combined => &self.combined,
            Category::Cpu => &self.cpu,
            Category::Memory => &self.memory,
            Category::Disk => &self.disk,
            Category::Network => &self.network,
        }
    }

    fn sink_mut(&mut self, category: Category) -> &mut RotatingFile {
        match category {
            Category::Combined => &mut self.combined,
            Category::Cpu => &mut self.cpu,
            Category::Memory => &mut self.memory,
            Category::Disk => &mut self.disk,
            Category::Network => &mut self.network,
        }
    }

    /// Appends one line to the category sink and the combined sink.
    ///
    /// Sink failures never propagate: they are reported on stderr through
    /// `tracing` and, when only the category sink failed, as a warning in the
    /// combined log.
    pub fn write(&mut self, category: Category, level: Level, message: &str) {
        let line = format_line(Local::now(), level, message);

        if category != Category::Combined {
            if let Err(e) = self.sink_mut(category).write_line(&line) {
                self.failed_writes += 1;
                tracing::error!(sink = %category, error = %e, "Log write failed");
                let note = format_line(
                    Local::now(),
                    Level::Warning,
                    &format!("{} log write failed: {e}", category.label()),
                );
                self.write_combined(&note);
            }
        }

        self.write_combined(&line);
    }

    fn write_combined(&mut self, line: &str) {
        if let Err(e) = self.combined.write_line(line) {
            self.failed_writes += 1;
            tracing::error!(sink = %Category::Combined, error = %e, "Log write failed");
        }
        if let Some(console) = self.console.as_mut() {
            if writeln!(console, "{line}").is_err() {
                tracing::warn!("Console mirror write failed");
            }
        }
    }

    pub fn flush(&mut self) {
        for category in Category::ALL {
            if let Err(e) = self.sink_mut(category).flush() {
                tracing::error!(sink = %category, error = %e, "Log flush failed");
            }
        }
        if let Some(console) = self.console.as_mut() {
            let _ = console.flush();
        }
    }

    /// Flushes and closes every sink. A later write reopens its sink.
    pub fn close(&mut self) {
        for category in Category::ALL {
            if let Err(e) = self.sink_mut(category).close() {
                tracing::error!(sink = %category, error = %e, "Log close failed");
            }
        }
        if let Some(console) = self.console.as_mut() {
            let _ = console.flush();
        }
    }
}
