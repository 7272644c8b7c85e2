//! Line-oriented build log.
//!
//! This is the console the pipeline shows for the step, separate from the
//! `tracing` diagnostics the process emits.

use std::io::Write;
use std::sync::Mutex;

/// Sink for human-readable step output.
pub trait BuildLog: Send + Sync {
    fn info(&self, line: &str);
    fn error(&self, line: &str);
}

/// Writes to stderr. Errors are prefixed with `ERROR: `.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleLog;

impl BuildLog for ConsoleLog {
    fn info(&self, line: &str) {
        let _ = writeln!(std::io::stderr().lock(), "{line}");
    }

    fn error(&self, line: &str) {
        let _ = writeln!(std::io::stderr().lock(), "ERROR: {line}");
    }
}

/// A single captured line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogLine {
    Info(String),
    Error(String),
}

/// Keeps every line in memory.
///
/// # Examples
///
/// ```
/// use ugs_notify::log::{BufferLog, BuildLog};
///
/// let log = BufferLog::default();
/// log.info("posting");
/// log.error("failed");
/// assert_eq!(log.errors(), vec!["failed".to_string()]);
/// ```
#[derive(Debug, Default)]
pub struct BufferLog {
    lines: Mutex<Vec<LogLine>>,
}

impl BufferLog {
    pub fn lines(&self) -> Vec<LogLine> {
        self.lines.lock().map(|l| l.clone()).unwrap_or_default()
    }

    pub fn errors(&self) -> Vec<String> {
        self.lines()
            .into_iter()
            .filter_map(|l| match l {
                LogLine::Error(s) => Some(s),
                LogLine::Info(_) => None,
            })
            .collect()
    }

    pub fn infos(&self) -> Vec<String> {
        self.lines()
            .into_iter()
            .filter_map(|l| match l {
                LogLine::Info(s) => Some(s),
                LogLine::Error(_) => None,
            })
            .collect()
    }

    fn push(&self, line: LogLine) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(line);
        }
    }
}

impl BuildLog for BufferLog {
    fn info(&self, line: &str) {
        self.push(LogLine::Info(line.to_string()));
    }

    fn error(&self, line: &str) {
        self.push(LogLine::Error(line.to_string()));
    }
}
