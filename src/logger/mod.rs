//! Activity logging: JSONL append-only log shared across threads.

pub mod jsonl;

use std::sync::Arc;

use parking_lot::Mutex;

use self::jsonl::{JsonlConfig, JsonlWriter, LogEntry};

/// Cheaply cloneable handle to the process-wide activity log.
#[derive(Clone)]
pub struct ActivityLog {
    inner: Arc<Mutex<JsonlWriter>>,
}

impl ActivityLog {
    /// Open the log at `config.path`, degrading per [`JsonlWriter::open`].
    pub fn open(config: JsonlConfig) -> Self {
        Self {
            inner: Arc::new(Mutex::new(JsonlWriter::open(config))),
        }
    }

    /// Log handle that drops every entry.
    pub fn disabled() -> Self {
        Self {
            inner: Arc::new(Mutex::new(JsonlWriter::discard())),
        }
    }

    /// Append one entry.
    pub fn record(&self, entry: &LogEntry) {
        self.inner.lock().write_entry(entry);
    }

    /// Keep log output off the terminal while the dashboard owns it.
    pub fn silence_stderr(&self) {
        self.inner.lock().silence_stderr();
    }
}

impl std::fmt::Debug for ActivityLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActivityLog")
            .field("state", &self.inner.lock().state())
            .finish()
    }
}
