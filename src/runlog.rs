//! Per-run audit log.
//!
//! Each run appends markdown sections (`## <header> (<timestamp>)` followed by
//! a fenced block) to one file. Components receive a `&dyn RunLog` so tests can
//! capture records in memory or discard them.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Local};
use serde::Serialize;
use tracing::error;

/// Sink for run artifacts. Recording must never fail the run.
pub trait RunLog: Send + Sync {
    /// Record a plain-text artifact.
    fn record(&self, header: &str, content: &str);

    /// Record a structured artifact as pretty-printed JSON.
    fn record_json(&self, header: &str, value: &serde_json::Value) {
        let pretty = serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
        self.record_block(header, "json", &pretty);
    }

    /// Record content inside a fenced block with the given info string.
    fn record_block(&self, header: &str, lang: &str, content: &str);
}

/// Serialize any value for [`RunLog::record_json`].
pub fn to_json<T: Serialize>(value: &T) -> serde_json::Value {
    serde_json::to_value(value).unwrap_or(serde_json::Value::Null)
}

/// Appends sections to a markdown file, reopening it for every record.
#[derive(Debug, Clone)]
pub struct MarkdownRunLog {
    path: PathBuf,
}

impl MarkdownRunLog {
    /// Log file for a run started at `started`: `<dir>/commitcast_run_<YYYYMMDD_HHMMSS>.md`.
    pub fn for_run(dir: &Path, started: DateTime<Local>) -> Self {
        let name = format!("commitcast_run_{}.md", started.format("%Y%m%d_%H%M%S"));
        Self {
            path: dir.join(name),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the log directory. Called before the first record.
    pub fn ensure_dir(&self) -> std::io::Result<()> {
        match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => fs::create_dir_all(dir),
            _ => Ok(()),
        }
    }

    fn append(&self, text: &str) -> std::io::Result<()> {
        // The directory may have been removed mid-run.
        self.ensure_dir()?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(text.as_bytes())
    }
}

impl RunLog for MarkdownRunLog {
    fn record(&self, header: &str, content: &str) {
        self.record_block(header, "", content);
    }

    fn record_block(&self, header: &str, lang: &str, content: &str) {
        let section = format_section(header, lang, content, Local::now());
        if let Err(e) = self.append(&section) {
            error!(
                "Failed to write to log file '{}': {}",
                self.path.display(),
                e
            );
        }
    }
}

/// Discards every record.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullRunLog;

impl RunLog for NullRunLog {
    fn record(&self, _header: &str, _content: &str) {}

    fn record_block(&self, _header: &str, _lang: &str, _content: &str) {}
}

/// Keeps records in memory, in order. Useful for asserting on run artifacts.
#[derive(Debug, Default)]
pub struct MemoryRunLog {
    entries: Mutex<Vec<(String, String)>>,
}

impl MemoryRunLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// All `(header, content)` pairs recorded so far.
    pub fn entries(&self) -> Vec<(String, String)> {
        self.entries.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Headers recorded so far.
    pub fn headers(&self) -> Vec<String> {
        self.entries().into_iter().map(|(h, _)| h).collect()
    }

    /// Content of the first record with `header`.
    pub fn find(&self, header: &str) -> Option<String> {
        self.entries()
            .into_iter()
            .find(|(h, _)| h == header)
            .map(|(_, c)| c)
    }
}

impl RunLog for MemoryRunLog {
    fn record(&self, header: &str, content: &str) {
        self.record_block(header, "", content);
    }

    fn record_block(&self, header: &str, _lang: &str, content: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.push((header.to_string(), content.to_string()));
        }
    }
}

fn format_section(header: &str, lang: &str, content: &str, at: DateTime<Local>) -> String {
    format!(
        "## {} ({})\n\n```{}\n{}\n```\n\n",
        header,
        at.format("%Y-%m-%d %H:%M:%S"),
        lang,
        content
    )
}
