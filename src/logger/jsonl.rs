//! JSONL activity log: append-only line-delimited JSON, one object per event.
//!
//! Lines are assembled in memory and written with a single `write_all` so a
//! concurrent `tail -f` never observes a partial line.
//!
//! Fallback chain:
//! 1. Primary file path
//! 2. stderr with `[MON-JSONL]` prefix (skipped while the dashboard owns the terminal)
//! 3. Silent discard (the dashboard must never crash for logging failures)

#![allow(missing_docs)]

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::errors::{MonError, Result};

/// Severity level for log events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

/// Activity events emitted by the dashboard and one-shot commands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    SessionStart,
    SessionStop,
    ConfigLoaded,
    LayoutResolved,
    RefreshComplete,
    FetchError,
    RenderFailure,
}

/// A single JSONL log entry; all fields optional except `ts`, `event`, `severity`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    /// RFC 3339 UTC timestamp.
    pub ts: String,
    pub event: EventType,
    pub severity: Severity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cluster: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl LogEntry {
    /// Create a new entry stamped with the current UTC time.
    pub fn new(event: EventType, severity: Severity) -> Self {
        Self {
            ts: utc_timestamp(),
            event,
            severity,
            cluster: None,
            layout: None,
            group: None,
            duration_ms: None,
            error_code: None,
            error_message: None,
            details: None,
        }
    }

    /// Attach an error's code and message.
    #[must_use]
    pub fn with_error(mut self, err: &MonError) -> Self {
        self.error_code = Some(err.code().to_string());
        self.error_message = Some(err.to_string());
        self
    }

    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// Where the next line goes.
enum Target {
    File { out: BufWriter<File>, len: u64 },
    Stderr,
    Discard,
}

/// Configuration for the JSONL writer.
#[derive(Debug, Clone)]
pub struct JsonlConfig {
    pub path: PathBuf,
    /// Rotate once the file would grow past this many bytes.
    pub max_bytes: u64,
    /// Rotated generations kept next to the live file (`.1` is newest).
    pub keep_rotated: u32,
    /// Whether stderr is an acceptable fallback sink.
    pub stderr_fallback: bool,
}

impl Default for JsonlConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("activity.jsonl"),
            max_bytes: 4 * 1024 * 1024,
            keep_rotated: 3,
            stderr_fallback: true,
        }
    }
}

/// Append-only JSONL log writer with rotation and graceful degradation.
pub struct JsonlWriter {
    config: JsonlConfig,
    target: Target,
}

impl JsonlWriter {
    /// Open the log file, degrading to stderr or discard when it cannot be opened.
    pub fn open(config: JsonlConfig) -> Self {
        let target = match open_log_file(&config.path) {
            Ok(target) => target,
            Err(err) => degraded(&config, &err),
        };
        Self { config, target }
    }

    /// Writer that drops everything; used when no log path is configured.
    pub fn discard() -> Self {
        Self {
            config: JsonlConfig {
                stderr_fallback: false,
                ..JsonlConfig::default()
            },
            target: Target::Discard,
        }
    }

    /// Serialize `entry` and append it as one line.
    pub fn write_entry(&mut self, entry: &LogEntry) {
        match serde_json::to_string(entry) {
            Ok(mut line) => {
                line.push('\n');
                self.append(&line);
            }
            Err(e) if self.config.stderr_fallback => {
                eprintln!("[MON-JSONL] unable to serialize entry: {e}");
            }
            Err(_) => {}
        }
    }

    /// Stop using stderr as a fallback sink (the terminal is now owned by the dashboard).
    pub fn silence_stderr(&mut self) {
        self.config.stderr_fallback = false;
        if matches!(self.target, Target::Stderr) {
            self.target = Target::Discard;
        }
    }

    /// Name of the sink currently receiving lines.
    pub fn state(&self) -> &'static str {
        match self.target {
            Target::File { .. } => "file",
            Target::Stderr => "stderr",
            Target::Discard => "discard",
        }
    }

    fn append(&mut self, line: &str) {
        let incoming = line.len() as u64;
        if let Target::File { len, .. } = &self.target
            && *len > 0
            && *len + incoming > self.config.max_bytes
        {
            self.rotate();
        }

        let failure = match &mut self.target {
            Target::File { out, len } => {
                match out.write_all(line.as_bytes()).and_then(|()| out.flush()) {
                    Ok(()) => {
                        *len += incoming;
                        None
                    }
                    Err(e) => Some(MonError::io(&self.config.path, e)),
                }
            }
            Target::Stderr => write!(io::stderr(), "[MON-JSONL] {line}")
                .err()
                .map(|e| MonError::io("<stderr>", e)),
            Target::Discard => None,
        };

        if let Some(err) = failure {
            let was_file = matches!(self.target, Target::File { .. });
            self.target = if was_file {
                degraded(&self.config, &err)
            } else {
                Target::Discard
            };
            if was_file {
                self.append(line);
            }
        }
    }

    /// Shift `log.N-1` to `log.N` down to `log` to `log.1`, then reopen.
    fn rotate(&mut self) {
        if let Target::File { out, .. } = &mut self.target {
            let _ = out.flush();
        }
        self.target = Target::Discard;

        let base = &self.config.path;
        let keep = self.config.keep_rotated;
        if keep == 0 {
            let _ = fs::remove_file(base);
        } else {
            let _ = fs::remove_file(generation(base, keep));
            for n in (1..keep).rev() {
                let _ = fs::rename(generation(base, n), generation(base, n + 1));
            }
            let _ = fs::rename(base, generation(base, 1));
        }

        self.target = match open_log_file(base) {
            Ok(target) => target,
            Err(err) => degraded(&self.config, &err),
        };
    }
}

// ──────────────────────── helpers ────────────────────────

fn open_log_file(path: &Path) -> Result<Target> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).map_err(|source| MonError::io(dir, source))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| MonError::io(path, source))?;
    let len = file.metadata().map_or(0, |m| m.len());
    Ok(Target::File {
        out: BufWriter::new(file),
        len,
    })
}

fn degraded(config: &JsonlConfig, err: &MonError) -> Target {
    if config.stderr_fallback {
        eprintln!("[MON-JSONL] {err}; activity log continues on stderr");
        Target::Stderr
    } else {
        Target::Discard
    }
}

/// `activity.jsonl` -> `activity.jsonl.2`.
fn generation(base: &Path, n: u32) -> PathBuf {
    let mut name = base.as_os_str().to_owned();
    name.push(format!(".{n}"));
    PathBuf::from(name)
}

fn utc_timestamp() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

// ──────────────────────── tests ────────────────────────
